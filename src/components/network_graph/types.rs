//! Graph data structures for input to the network graph component.

use serde::Deserialize;

/// Role of a node in the collaboration network.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// The focal person the network was queried for.
	Primary,
	/// A collaborator of the focal person.
	#[default]
	Secondary,
	/// A grouping node, e.g. a production shared by several people.
	Group,
}

/// A node in the collaboration network.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Name rendered next to the node.
	pub display_name: String,
	/// Role in the network; drives color and label policy.
	#[serde(default)]
	pub kind: NodeKind,
	/// Non-negative importance (shared-credit count). Drives rendered
	/// radius and collision size.
	#[serde(default)]
	pub weight: f64,
}

/// An undirected connection between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Connection strength (shared credits). Rendering weight only.
	#[serde(default)]
	pub value: f64,
}

/// Complete network data: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// Nodes keyed by id.
	pub nodes: Vec<GraphNode>,
	/// Connections between nodes. Links referencing unknown ids are
	/// dropped at ingest, not treated as errors.
	pub links: Vec<GraphLink>,
}
