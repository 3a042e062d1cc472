//! Zoom/pan transform, fit-to-bounds framing, and label level-of-detail.
//!
//! The viewport owns the render transform; nothing else writes it. Zoom
//! composes uniform scale about the cursor with the existing translation,
//! and fit-to-bounds eases toward a framing that fills 85% of the viewport
//! instead of jumping.

use super::types::NodeKind;

/// Smallest permitted zoom factor.
pub const ZOOM_MIN: f64 = 0.1;
/// Largest permitted zoom factor.
pub const ZOOM_MAX: f64 = 8.0;

const FIT_FILL: f64 = 0.85;
const FIT_DURATION_SECS: f64 = 0.75;
/// Below this zoom only high-importance labels render.
const LOD_LOW_K: f64 = 0.6;
/// Between the low and mid thresholds the importance bar drops; above it
/// every label renders.
const LOD_MID_K: f64 = 1.4;
const LOD_HIGH_IMPORTANCE: f64 = 0.5;
const LOD_LOW_IMPORTANCE: f64 = 0.2;

/// Pan and zoom transform: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Zoom factor, kept inside `[ZOOM_MIN, ZOOM_MAX]`.
	pub k: f64,
	/// Screen-space translation.
	pub x: f64,
	/// Screen-space translation.
	pub y: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			k: 1.0,
			x: 0.0,
			y: 0.0,
		}
	}
}

impl ViewTransform {
	/// Map a graph-space point to screen space.
	pub fn apply(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Map a screen-space point to graph space.
	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	fn lerp(a: Self, b: Self, t: f64) -> Self {
		Self {
			k: a.k + (b.k - a.k) * t,
			x: a.x + (b.x - a.x) * t,
			y: a.y + (b.y - a.y) * t,
		}
	}
}

/// In-progress eased framing transition.
#[derive(Clone, Copy, Debug)]
struct FitTransition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
}

/// Owns the render transform and any framing transition in progress.
#[derive(Clone, Debug)]
pub struct Viewport {
	/// Current transform applied to all rendering.
	pub transform: ViewTransform,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	fit: Option<FitTransition>,
}

impl Viewport {
	/// Identity view over a `width` by `height` canvas.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform::default(),
			width,
			height,
			fit: None,
		}
	}

	/// Zoom by `factor`, keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.fit = None;
		let new_k = (self.transform.k * factor).clamp(ZOOM_MIN, ZOOM_MAX);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Begin an eased transition framing `bounds` (graph-space
	/// `(min_x, min_y, max_x, max_y)`) at 85% of the viewport, centered.
	/// No-op when there is nothing to frame.
	pub fn fit_to_bounds(&mut self, bounds: Option<(f64, f64, f64, f64)>) {
		let Some((min_x, min_y, max_x, max_y)) = bounds else {
			return;
		};
		let bbox_w = (max_x - min_x).max(1.0);
		let bbox_h = (max_y - min_y).max(1.0);
		let k = (FIT_FILL / (bbox_w / self.width).max(bbox_h / self.height))
			.clamp(ZOOM_MIN, ZOOM_MAX);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		let to = ViewTransform {
			k,
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
		};
		self.fit = Some(FitTransition {
			from: self.transform,
			to,
			elapsed: 0.0,
		});
	}

	/// Advance the framing transition, if one is running.
	pub fn tick(&mut self, dt: f64) {
		let Some(mut fit) = self.fit else {
			return;
		};
		fit.elapsed += dt;
		let t = (fit.elapsed / FIT_DURATION_SECS).min(1.0);
		self.transform = ViewTransform::lerp(fit.from, fit.to, ease_in_out_cubic(t));
		self.fit = (t < 1.0).then_some(fit);
	}

	/// Whether a framing transition is in progress.
	pub fn fitting(&self) -> bool {
		self.fit.is_some()
	}

	/// Record a canvas resize.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn ease_in_out_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Step-function label policy.
///
/// The focal node's label is always visible. Other labels require more
/// importance (weight relative to the heaviest node) the further out the
/// view is zoomed, so detail grows with zoom instead of cluttering it.
pub fn label_visible(kind: NodeKind, weight: f64, max_weight: f64, k: f64) -> bool {
	if kind == NodeKind::Primary {
		return true;
	}
	let importance = if max_weight > 0.0 {
		weight / max_weight
	} else {
		0.0
	};
	if k < LOD_LOW_K {
		importance >= LOD_HIGH_IMPORTANCE
	} else if k < LOD_MID_K {
		importance >= LOD_LOW_IMPORTANCE
	} else {
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn settle_fit(viewport: &mut Viewport) {
		// Well past the transition duration; the last frame lands on `to`.
		viewport.tick(FIT_DURATION_SECS * 2.0);
	}

	#[test]
	fn fit_scale_stays_inside_zoom_range() {
		let mut tight = Viewport::new(800.0, 600.0);
		tight.fit_to_bounds(Some((0.0, 0.0, 2.0, 2.0)));
		settle_fit(&mut tight);
		assert!(tight.transform.k <= ZOOM_MAX);

		let mut vast = Viewport::new(800.0, 600.0);
		vast.fit_to_bounds(Some((-50_000.0, -50_000.0, 50_000.0, 50_000.0)));
		settle_fit(&mut vast);
		assert!(vast.transform.k >= ZOOM_MIN);
	}

	#[test]
	fn fit_centers_the_bounding_box() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.transform = ViewTransform {
			k: 2.5,
			x: -340.0,
			y: 95.0,
		};
		viewport.fit_to_bounds(Some((100.0, 200.0, 500.0, 420.0)));
		settle_fit(&mut viewport);
		let (sx, sy) = viewport.transform.apply(300.0, 310.0);
		assert!((sx - 400.0).abs() < 1.0, "bbox center x off: {sx}");
		assert!((sy - 300.0).abs() < 1.0, "bbox center y off: {sy}");
	}

	#[test]
	fn fit_fills_most_of_the_viewport() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.fit_to_bounds(Some((0.0, 0.0, 400.0, 200.0)));
		settle_fit(&mut viewport);
		// Width is the binding axis: 0.85 / (400 / 800).
		assert!((viewport.transform.k - 1.7).abs() < 1e-9);
	}

	#[test]
	fn fit_transition_eases_rather_than_jumps() {
		let mut viewport = Viewport::new(800.0, 600.0);
		let before = viewport.transform;
		viewport.fit_to_bounds(Some((0.0, 0.0, 4_000.0, 3_000.0)));
		assert!(viewport.fitting());
		// The transform has not jumped before any time passes.
		assert_eq!(viewport.transform, before);
		viewport.tick(FIT_DURATION_SECS / 2.0);
		assert!(viewport.fitting());
		assert!(viewport.transform != before);
		viewport.tick(FIT_DURATION_SECS);
		assert!(!viewport.fitting());
	}

	#[test]
	fn zoom_is_clamped() {
		let mut viewport = Viewport::new(800.0, 600.0);
		for _ in 0..100 {
			viewport.zoom_at(400.0, 300.0, 1.5);
		}
		assert!(viewport.transform.k <= ZOOM_MAX);
		for _ in 0..200 {
			viewport.zoom_at(400.0, 300.0, 0.5);
		}
		assert!(viewport.transform.k >= ZOOM_MIN);
	}

	#[test]
	fn zoom_keeps_the_cursor_anchored() {
		let mut viewport = Viewport::new(800.0, 600.0);
		let (gx, gy) = viewport.transform.invert(250.0, 130.0);
		viewport.zoom_at(250.0, 130.0, 1.4);
		let (sx, sy) = viewport.transform.apply(gx, gy);
		assert!((sx - 250.0).abs() < 1e-9);
		assert!((sy - 130.0).abs() < 1e-9);
	}

	#[test]
	fn ease_hits_both_endpoints() {
		assert_eq!(ease_in_out_cubic(0.0), 0.0);
		assert_eq!(ease_in_out_cubic(1.0), 1.0);
	}

	#[test]
	fn primary_label_is_always_visible() {
		assert!(label_visible(NodeKind::Primary, 0.0, 100.0, ZOOM_MIN));
		assert!(label_visible(NodeKind::Primary, 0.0, 0.0, ZOOM_MAX));
	}

	#[test]
	fn label_bar_lowers_as_zoom_increases() {
		// Low zoom: only the important half.
		assert!(label_visible(NodeKind::Secondary, 60.0, 100.0, 0.3));
		assert!(!label_visible(NodeKind::Secondary, 30.0, 100.0, 0.3));
		// Mid zoom: the bar drops.
		assert!(label_visible(NodeKind::Secondary, 30.0, 100.0, 1.0));
		assert!(!label_visible(NodeKind::Secondary, 10.0, 100.0, 1.0));
		// High zoom: everything labels.
		assert!(label_visible(NodeKind::Secondary, 0.0, 100.0, 2.0));
		assert!(label_visible(NodeKind::Group, 1.0, 100.0, 2.0));
	}
}
