//! Graph interaction state.
//!
//! Combines the force simulation with the viewport and drag/pan/hover
//! tracking. Created when the component mounts, then mutated each frame by
//! the animation loop; node positions change only inside `tick` and the
//! drag handlers.

use super::scale::ScaledValues;
use super::simulation::Simulation;
use super::types::GraphData;
use super::viewport::Viewport;

/// Seed for the deterministic initial scatter.
const SCATTER_SEED: u64 = 0x0C0A_57A9;

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

/// Tracks an in-progress canvas pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Core graph state: simulation, viewport, and interaction tracking.
pub struct GraphState {
	/// The force simulation owning node positions.
	pub sim: Simulation,
	/// The viewport owning the render transform.
	pub viewport: Viewport,
	/// Current node drag, if any.
	pub drag: DragState,
	/// Current canvas pan, if any.
	pub pan: PanState,
	/// Node under the cursor, if any.
	pub hovered: Option<usize>,
}

impl GraphState {
	/// Build state for a network over a `width` by `height` canvas.
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		Self {
			sim: Simulation::ingest(data, width, height, SCATTER_SEED),
			viewport: Viewport::new(width, height),
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
		}
	}

	/// Advance physics and any framing transition by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.sim.tick();
		self.viewport.tick(dt);
	}

	/// Topmost node whose rendered extent covers the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.viewport.transform.invert(sx, sy);
		let scale = ScaledValues::new(self.viewport.transform.k);
		let mut found = None;
		for (idx, node) in self.sim.nodes().iter().enumerate() {
			let (dx, dy) = (node.x - gx, node.y - gy);
			let hit = node.radius + scale.hit_padding;
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(idx);
			}
		}
		found
	}

	/// Begin dragging a node: pin it where it stands and reheat so the
	/// rest of the layout resettles around it.
	pub fn begin_drag(&mut self, idx: usize, sx: f64, sy: f64) {
		let Some(node) = self.sim.nodes().get(idx) else {
			return;
		};
		self.drag = DragState {
			active: true,
			node: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: node.x,
			node_start_y: node.y,
		};
		let (x, y) = (node.x, node.y);
		self.sim.pin(idx, x, y);
		self.sim.reheat();
	}

	/// Track cursor movement: the dragged node follows, staying pinned.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node else {
			return;
		};
		let k = self.viewport.transform.k;
		let gx = self.drag.node_start_x + (sx - self.drag.start_x) / k;
		let gy = self.drag.node_start_y + (sy - self.drag.start_y) / k;
		self.sim.pin(idx, gx, gy);
	}

	/// Release the dragged node back to the forces.
	pub fn end_drag(&mut self) {
		if let Some(idx) = self.drag.node {
			self.sim.unpin(idx);
			self.sim.reheat();
		}
		self.drag = DragState::default();
	}

	/// Frame every node in view with an eased transition.
	pub fn fit_all(&mut self) {
		self.viewport.fit_to_bounds(self.sim.bounds());
	}

	/// Record a canvas resize.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
		self.sim.set_center(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use super::super::types::{GraphLink, GraphNode, NodeKind};

	fn pair() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode {
					id: "a".into(),
					display_name: "A".into(),
					kind: NodeKind::Primary,
					weight: 10.0,
				},
				GraphNode {
					id: "b".into(),
					display_name: "B".into(),
					kind: NodeKind::Secondary,
					weight: 5.0,
				},
			],
			links: vec![GraphLink {
				source: "a".into(),
				target: "b".into(),
				value: 2.0,
			}],
		}
	}

	#[test]
	fn hit_test_finds_a_node_under_the_cursor() {
		let state = GraphState::new(&pair(), 800.0, 600.0);
		let node = &state.sim.nodes()[0];
		let (sx, sy) = state.viewport.transform.apply(node.x, node.y);
		assert_eq!(state.node_at_position(sx, sy), Some(0));
		assert_eq!(state.node_at_position(sx + 500.0, sy + 500.0), None);
	}

	#[test]
	fn dragging_pins_and_release_unpins() {
		let mut state = GraphState::new(&pair(), 800.0, 600.0);
		state.begin_drag(1, 100.0, 100.0);
		assert!(state.drag.active);
		assert!(state.sim.nodes()[1].pinned);
		state.drag_to(150.0, 130.0);
		let node = &state.sim.nodes()[1];
		assert_eq!(node.x, state.drag.node_start_x + 50.0);
		assert_eq!(node.y, state.drag.node_start_y + 30.0);
		state.end_drag();
		assert!(!state.drag.active);
		assert!(!state.sim.nodes()[1].pinned);
	}

	#[test]
	fn fit_all_starts_a_framing_transition() {
		let mut state = GraphState::new(&pair(), 800.0, 600.0);
		assert!(!state.viewport.fitting());
		state.fit_all();
		assert!(state.viewport.fitting());
	}
}
