//! Weight- and zoom-dependent scaling for graph visuals.
//!
//! Node radii live in world-space and derive from node weight through a
//! square-root scale, so rendered *area* rather than radius grows linearly
//! with weight — perceptually honest for a count-like quantity. Line
//! widths, hit-test slack, and label fonts are screen-space sizes divided
//! by the zoom factor to stay legible at any zoom.

/// Smallest rendered node radius, world units.
pub const MIN_RADIUS: f64 = 6.0;
/// Largest rendered node radius, world units.
pub const MAX_RADIUS: f64 = 26.0;

const LABEL_SIZE_PX: f64 = 11.0;
const LABEL_MIN_K: f64 = 0.5;
const EDGE_WIDTH_PX: f64 = 1.5;
const HIT_PADDING_PX: f64 = 6.0;
const RING_WIDTH_PX: f64 = 1.5;

/// Radius for a node of `weight` in a graph whose heaviest node has
/// `max_weight`.
///
/// Square-root interpolation from `[0, max_weight]` onto
/// `[MIN_RADIUS, MAX_RADIUS]`. Monotone in weight; equal weights always
/// map to equal radii.
pub fn radius_for_weight(weight: f64, max_weight: f64) -> f64 {
	if max_weight <= 0.0 {
		return MIN_RADIUS;
	}
	let t = (weight.max(0.0) / max_weight).min(1.0).sqrt();
	MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * t
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create once per frame and pass to rendering and hit-testing; all values
/// are world-space, ready to use after the canvas transform.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom factor.
	pub k: f64,
	/// Label font spec, e.g. `"11px sans-serif"`.
	pub label_font: String,
	/// Edge line width.
	pub edge_line_width: f64,
	/// Extra hit-test slack around a node's rim.
	pub hit_padding: f64,
	/// Focal/hover ring stroke width.
	pub ring_width: f64,
}

impl ScaledValues {
	/// Compute scaled values for zoom factor `k`.
	pub fn new(k: f64) -> Self {
		let font_px = LABEL_SIZE_PX / k.max(LABEL_MIN_K);
		Self {
			k,
			label_font: format!("{font_px}px sans-serif"),
			edge_line_width: EDGE_WIDTH_PX / k,
			hit_padding: HIT_PADDING_PX / k,
			ring_width: RING_WIDTH_PX / k,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn radius_is_monotone_in_weight() {
		let mut last = 0.0;
		for w in 0..=40 {
			let r = radius_for_weight(f64::from(w), 40.0);
			assert!(r >= last, "radius shrank at weight {w}");
			last = r;
		}
	}

	#[test]
	fn equal_weights_get_equal_radii() {
		assert_eq!(radius_for_weight(9.0, 30.0), radius_for_weight(9.0, 30.0));
	}

	#[test]
	fn radius_respects_bounds() {
		assert_eq!(radius_for_weight(0.0, 50.0), MIN_RADIUS);
		assert_eq!(radius_for_weight(50.0, 50.0), MAX_RADIUS);
		// Weights above the scale domain saturate instead of overflowing.
		assert_eq!(radius_for_weight(120.0, 50.0), MAX_RADIUS);
		// A degenerate all-zero graph still renders visible nodes.
		assert_eq!(radius_for_weight(10.0, 0.0), MIN_RADIUS);
	}

	#[test]
	fn doubling_weight_less_than_doubles_radius() {
		let r1 = radius_for_weight(10.0, 40.0);
		let r2 = radius_for_weight(20.0, 40.0);
		assert!(r2 > r1);
		assert!(r2 < r1 * std::f64::consts::SQRT_2);
	}
}
