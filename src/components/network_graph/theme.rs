//! Visual theming for the collaboration graph.
//!
//! Colors key off a node's role rather than arbitrary cluster names: the
//! network only distinguishes the focal person, collaborators, and group
//! nodes.

use super::types::NodeKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color from channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color from channels and alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with a different alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten by a factor (0.0 = unchanged, 1.0 = white).
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken by a factor (0.0 = unchanged, 1.0 = black).
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// CSS color string.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Primary background color.
	pub background: Color,
	/// Secondary background color for the radial gradient.
	pub background_secondary: Color,
	/// Whether the background uses a radial gradient.
	pub use_gradient: bool,
	/// Edge stroke color.
	pub edge: Color,
	/// Label text color.
	pub label: Color,
	/// Fill for the focal node.
	pub primary: Color,
	/// Fill for collaborator nodes.
	pub secondary: Color,
	/// Fill for group nodes.
	pub group: Color,
	/// Stroke for the focal/hover ring.
	pub ring: Color,
}

impl Theme {
	/// Dark default theme.
	pub fn dark() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			background_secondary: Color::rgb(30, 35, 42),
			use_gradient: true,
			edge: Color::rgba(140, 160, 180, 0.5),
			label: Color::rgba(255, 255, 255, 0.85),
			primary: Color::rgb(230, 170, 80),
			secondary: Color::rgb(94, 129, 172),
			group: Color::rgb(100, 148, 160),
			ring: Color::rgba(255, 255, 255, 0.8),
		}
	}

	/// Node fill for a role.
	pub fn color_for(&self, kind: NodeKind) -> Color {
		match kind {
			NodeKind::Primary => self.primary,
			NodeKind::Secondary => self.secondary,
			NodeKind::Group => self.group,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
