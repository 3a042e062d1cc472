//! Force-directed layout over an arena of nodes.
//!
//! Nodes live in a flat arena addressed by stable `usize` index and edges
//! are index pairs, so re-ingesting a changed network never aliases stale
//! node identity. Each [`Simulation::tick`] applies pairwise repulsion,
//! per-edge springs, and a centering pull — all scaled by a cooling factor
//! `alpha` — then integrates damped velocities and resolves collisions
//! positionally. The integration step draws no randomness: identical
//! inputs and seed reproduce the settled layout exactly.

use std::collections::HashMap;

use log::{info, warn};

use super::scale::radius_for_weight;
use super::types::{GraphData, NodeKind};

/// Cooling floor: once alpha decays below this the simulation stops.
pub const ALPHA_MIN: f64 = 0.005;
/// Alpha restored by [`Simulation::reheat`] when an interaction disturbs
/// the layout.
pub const REHEAT_ALPHA: f64 = 0.35;
/// Minimum empty space kept between node rims.
pub const COLLIDE_MARGIN: f64 = 3.0;

const ALPHA_DECAY: f64 = 0.028;
const VELOCITY_RETAIN: f64 = 0.6;
const REPULSION: f64 = 1_800.0;
const REPULSION_SOFTENING: f64 = 25.0;
const SPRING: f64 = 0.06;
const REST_LENGTH: f64 = 110.0;
const CENTERING: f64 = 0.04;
const COLLIDE_STRENGTH: f64 = 0.8;
const COLLIDE_PASSES: usize = 2;

/// One simulated node. Position and velocity are mutated only by the
/// simulation itself and by pin/drag calls.
#[derive(Clone, Debug)]
pub struct SimNode {
	/// Entity id from the wire data.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Role in the network.
	pub kind: NodeKind,
	/// Importance; drives radius and collision size.
	pub weight: f64,
	/// Rendered radius derived from weight.
	pub radius: f64,
	/// Position.
	pub x: f64,
	/// Position.
	pub y: f64,
	/// Velocity.
	pub vx: f64,
	/// Velocity.
	pub vy: f64,
	/// Pinned nodes hold their position until released.
	pub pinned: bool,
}

/// An edge as a pair of arena indices.
#[derive(Clone, Copy, Debug)]
pub struct SimEdge {
	/// Source arena index.
	pub source: usize,
	/// Target arena index.
	pub target: usize,
	/// Connection strength. Rendering weight only; the spring force uses a
	/// constant stiffness independent of it.
	pub strength: f64,
}

/// Force simulation state: node arena, index-pair edges, cooling factor.
pub struct Simulation {
	nodes: Vec<SimNode>,
	edges: Vec<SimEdge>,
	index: HashMap<String, usize>,
	/// Cooling temperature, decaying monotonically toward 0.
	pub alpha: f64,
	/// Whether ticks still move the layout.
	pub running: bool,
	center: (f64, f64),
	/// Largest node weight in the arena (0 when empty).
	pub max_weight: f64,
}

impl Simulation {
	/// Build a simulation from wire data, scattering nodes on a
	/// deterministic seeded ring around the viewport center. Links that
	/// reference unknown ids (or form self-loops) are dropped silently.
	pub fn ingest(data: &GraphData, width: f64, height: f64, seed: u64) -> Self {
		let center = (width / 2.0, height / 2.0);
		let max_weight = data.nodes.iter().map(|n| n.weight).fold(0.0, f64::max);

		let mut rng = SplitMix64::new(seed);
		let mut nodes: Vec<SimNode> = Vec::with_capacity(data.nodes.len());
		let mut index = HashMap::new();
		let count = data.nodes.len().max(1) as f64;
		for (i, node) in data.nodes.iter().enumerate() {
			if index.contains_key(&node.id) {
				continue;
			}
			let angle = (i as f64 / count) * std::f64::consts::TAU + rng.next_f64() * 0.25;
			let ring = 90.0 + rng.next_f64() * 120.0;
			let (x, y) = if node.kind == NodeKind::Primary {
				center
			} else {
				(center.0 + ring * angle.cos(), center.1 + ring * angle.sin())
			};
			index.insert(node.id.clone(), nodes.len());
			nodes.push(SimNode {
				id: node.id.clone(),
				label: node.display_name.clone(),
				kind: node.kind,
				weight: node.weight.max(0.0),
				radius: radius_for_weight(node.weight, max_weight),
				x,
				y,
				vx: 0.0,
				vy: 0.0,
				pinned: false,
			});
		}

		let mut edges = Vec::with_capacity(data.links.len());
		let mut dropped = 0usize;
		for link in &data.links {
			match (index.get(&link.source), index.get(&link.target)) {
				(Some(&source), Some(&target)) if source != target => edges.push(SimEdge {
					source,
					target,
					strength: link.value.max(0.0),
				}),
				_ => dropped += 1,
			}
		}
		if dropped > 0 {
			warn!("simulation ingest: dropped {dropped} links with unknown endpoints");
		}
		info!(
			"simulation ingest: {} nodes, {} edges",
			nodes.len(),
			edges.len()
		);

		Self {
			nodes,
			edges,
			index,
			alpha: 1.0,
			running: true,
			center,
			max_weight,
		}
	}

	/// Advance one frame. Returns whether the simulation is still hot.
	pub fn tick(&mut self) -> bool {
		if !self.running || self.nodes.is_empty() {
			return false;
		}
		self.apply_repulsion();
		self.apply_springs();
		self.apply_centering();
		self.integrate();
		self.resolve_collisions();
		self.alpha *= 1.0 - ALPHA_DECAY;
		if self.alpha < ALPHA_MIN {
			self.alpha = 0.0;
			self.running = false;
		}
		self.running
	}

	/// Raise the cooling temperature so the layout visibly resettles.
	pub fn reheat(&mut self) {
		self.alpha = self.alpha.max(REHEAT_ALPHA);
		self.running = true;
	}

	/// Fix a node at a position and exclude it from force integration.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pinned = true;
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// Release a pinned node back to the forces.
	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pinned = false;
		}
	}

	/// Arena index for an entity id.
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// The node arena, in ingest order.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Edges as arena index pairs.
	pub fn edges(&self) -> &[SimEdge] {
		&self.edges
	}

	/// Move the centering target after a viewport resize.
	pub fn set_center(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
	}

	/// Radius-inclusive bounding box `(min_x, min_y, max_x, max_y)`, or
	/// `None` for an empty arena.
	pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		let first = self.nodes.first()?;
		let mut bounds = (
			first.x - first.radius,
			first.y - first.radius,
			first.x + first.radius,
			first.y + first.radius,
		);
		for node in &self.nodes[1..] {
			bounds.0 = bounds.0.min(node.x - node.radius);
			bounds.1 = bounds.1.min(node.y - node.radius);
			bounds.2 = bounds.2.max(node.x + node.radius);
			bounds.3 = bounds.3.max(node.y + node.radius);
		}
		Some(bounds)
	}

	fn apply_repulsion(&mut self) {
		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let dx = self.nodes[j].x - self.nodes[i].x;
				let dy = self.nodes[j].y - self.nodes[i].y;
				let dist_sq = (dx * dx + dy * dy).max(REPULSION_SOFTENING);
				let dist = dist_sq.sqrt();
				let push = REPULSION * self.alpha / dist_sq;
				let (ux, uy) = (dx / dist, dy / dist);
				if !self.nodes[i].pinned {
					self.nodes[i].vx -= ux * push;
					self.nodes[i].vy -= uy * push;
				}
				if !self.nodes[j].pinned {
					self.nodes[j].vx += ux * push;
					self.nodes[j].vy += uy * push;
				}
			}
		}
	}

	fn apply_springs(&mut self) {
		for e in 0..self.edges.len() {
			let SimEdge { source, target, .. } = self.edges[e];
			let dx = self.nodes[target].x - self.nodes[source].x;
			let dy = self.nodes[target].y - self.nodes[source].y;
			let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
			let pull = SPRING * (dist - REST_LENGTH) * self.alpha;
			let (ux, uy) = (dx / dist, dy / dist);
			if !self.nodes[source].pinned {
				self.nodes[source].vx += ux * pull;
				self.nodes[source].vy += uy * pull;
			}
			if !self.nodes[target].pinned {
				self.nodes[target].vx -= ux * pull;
				self.nodes[target].vy -= uy * pull;
			}
		}
	}

	fn apply_centering(&mut self) {
		let (cx, cy) = self.center;
		for node in &mut self.nodes {
			if node.pinned {
				continue;
			}
			node.vx += (cx - node.x) * CENTERING * self.alpha;
			node.vy += (cy - node.y) * CENTERING * self.alpha;
		}
	}

	fn integrate(&mut self) {
		for node in &mut self.nodes {
			if node.pinned {
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx *= VELOCITY_RETAIN;
			node.vy *= VELOCITY_RETAIN;
			node.x += node.vx;
			node.y += node.vy;
		}
	}

	/// Positional separation keeping rendered extents apart. Deliberately
	/// not scaled by alpha: the separation invariant must still hold in
	/// the settled layout.
	fn resolve_collisions(&mut self) {
		for _ in 0..COLLIDE_PASSES {
			for i in 0..self.nodes.len() {
				for j in (i + 1)..self.nodes.len() {
					let min_dist = self.nodes[i].radius + self.nodes[j].radius + COLLIDE_MARGIN;
					let mut dx = self.nodes[j].x - self.nodes[i].x;
					let mut dy = self.nodes[j].y - self.nodes[i].y;
					let mut dist = (dx * dx + dy * dy).sqrt();
					if dist >= min_dist {
						continue;
					}
					if dist < 1e-6 {
						// Coincident centers: separate along a direction
						// fixed by index so the step stays deterministic.
						let angle = (i * 31 + j) as f64;
						dx = angle.cos();
						dy = angle.sin();
						dist = 1.0;
					}
					let push = (min_dist - dist).min(min_dist) * COLLIDE_STRENGTH;
					let (ux, uy) = (dx / dist, dy / dist);
					match (self.nodes[i].pinned, self.nodes[j].pinned) {
						(false, false) => {
							self.nodes[i].x -= ux * push * 0.5;
							self.nodes[i].y -= uy * push * 0.5;
							self.nodes[j].x += ux * push * 0.5;
							self.nodes[j].y += uy * push * 0.5;
						}
						(true, false) => {
							self.nodes[j].x += ux * push;
							self.nodes[j].y += uy * push;
						}
						(false, true) => {
							self.nodes[i].x -= ux * push;
							self.nodes[i].y -= uy * push;
						}
						(true, true) => {}
					}
				}
			}
		}
	}
}

/// Deterministic seeded generator for the initial scatter. The layout must
/// be reproducible for a given node set and seed, so no global RNG.
struct SplitMix64(u64);

impl SplitMix64 {
	fn new(seed: u64) -> Self {
		Self(seed)
	}

	fn next_f64(&mut self) -> f64 {
		self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
		let mut z = self.0;
		z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
		z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
		z ^= z >> 31;
		(z >> 11) as f64 / (1u64 << 53) as f64
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use super::super::types::{GraphLink, GraphNode};

	fn node(id: &str, kind: NodeKind, weight: f64) -> GraphNode {
		GraphNode {
			id: id.into(),
			display_name: id.to_uppercase(),
			kind,
			weight,
		}
	}

	fn link(source: &str, target: &str) -> GraphLink {
		GraphLink {
			source: source.into(),
			target: target.into(),
			value: 1.0,
		}
	}

	/// One focal node with five collaborators, all linked to the focus.
	fn star() -> GraphData {
		GraphData {
			nodes: vec![
				node("q0", NodeKind::Primary, 20.0),
				node("q1", NodeKind::Secondary, 8.0),
				node("q2", NodeKind::Secondary, 6.0),
				node("q3", NodeKind::Secondary, 4.0),
				node("q4", NodeKind::Secondary, 2.0),
				node("q5", NodeKind::Secondary, 1.0),
			],
			links: vec![
				link("q0", "q1"),
				link("q0", "q2"),
				link("q0", "q3"),
				link("q0", "q4"),
				link("q0", "q5"),
			],
		}
	}

	fn settle(sim: &mut Simulation) {
		let mut ticks = 0usize;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 10_000, "simulation failed to cool");
		}
	}

	#[test]
	fn dangling_links_are_dropped() {
		let mut data = star();
		data.links.push(link("q0", "missing"));
		data.links.push(link("nope", "q1"));
		let sim = Simulation::ingest(&data, 800.0, 600.0, 1);
		assert_eq!(sim.edges().len(), 5);
	}

	#[test]
	fn self_loops_are_dropped() {
		let mut data = star();
		data.links.push(link("q1", "q1"));
		let sim = Simulation::ingest(&data, 800.0, 600.0, 1);
		assert_eq!(sim.edges().len(), 5);
	}

	#[test]
	fn duplicate_node_ids_keep_the_first() {
		let mut data = star();
		data.nodes.push(node("q1", NodeKind::Group, 99.0));
		let sim = Simulation::ingest(&data, 800.0, 600.0, 1);
		assert_eq!(sim.nodes().len(), 6);
		let idx = sim.node_index("q1").unwrap();
		assert_eq!(sim.nodes()[idx].kind, NodeKind::Secondary);
	}

	#[test]
	fn layout_is_deterministic_for_equal_seeds() {
		let data = star();
		let mut a = Simulation::ingest(&data, 800.0, 600.0, 42);
		let mut b = Simulation::ingest(&data, 800.0, 600.0, 42);
		settle(&mut a);
		settle(&mut b);
		for (na, nb) in a.nodes().iter().zip(b.nodes()) {
			assert_eq!(na.x.to_bits(), nb.x.to_bits());
			assert_eq!(na.y.to_bits(), nb.y.to_bits());
		}
	}

	#[test]
	fn alpha_decays_monotonically_and_stops() {
		let mut sim = Simulation::ingest(&star(), 800.0, 600.0, 7);
		let mut last = sim.alpha;
		while sim.tick() {
			assert!(sim.alpha < last, "alpha rose from {last} to {}", sim.alpha);
			last = sim.alpha;
		}
		assert!(!sim.running);
		assert!(sim.alpha < ALPHA_MIN);
	}

	#[test]
	fn settled_layout_respects_collision_radii() {
		let mut sim = Simulation::ingest(&star(), 800.0, 600.0, 3);
		settle(&mut sim);
		let nodes = sim.nodes();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let dx = nodes[j].x - nodes[i].x;
				let dy = nodes[j].y - nodes[i].y;
				let dist = (dx * dx + dy * dy).sqrt();
				let min_dist = nodes[i].radius + nodes[j].radius + COLLIDE_MARGIN;
				assert!(
					dist >= min_dist - 0.1,
					"nodes {i} and {j} too close: {dist:.2} < {min_dist:.2}"
				);
			}
		}
	}

	#[test]
	fn pinned_nodes_are_excluded_from_integration() {
		let mut sim = Simulation::ingest(&star(), 800.0, 600.0, 9);
		let idx = sim.node_index("q1").unwrap();
		sim.pin(idx, 50.0, 60.0);
		for _ in 0..30 {
			sim.tick();
		}
		let node = &sim.nodes()[idx];
		assert_eq!((node.x, node.y), (50.0, 60.0));
		sim.unpin(idx);
		sim.reheat();
		sim.tick();
		let node = &sim.nodes()[idx];
		assert!((node.x, node.y) != (50.0, 60.0), "released node never moved");
	}

	#[test]
	fn reheat_restarts_a_settled_simulation() {
		let mut sim = Simulation::ingest(&star(), 800.0, 600.0, 5);
		settle(&mut sim);
		assert!(!sim.running);
		sim.reheat();
		assert!(sim.running);
		assert!((sim.alpha - REHEAT_ALPHA).abs() < 1e-12);
		assert!(sim.tick());
	}

	#[test]
	fn empty_graph_never_runs() {
		let mut sim = Simulation::ingest(&GraphData::default(), 800.0, 600.0, 1);
		assert!(!sim.tick());
		assert!(sim.bounds().is_none());
	}
}
