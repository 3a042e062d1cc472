//! Force-directed collaboration network component.
//!
//! Renders an interactive network of people on an HTML canvas with:
//! - An arena-based force simulation with cooling, collision avoidance,
//!   and deterministic seeded layout
//! - Pan, zoom, node dragging, and fit-to-bounds framing
//! - Zoom- and importance-aware label level-of-detail
//!
//! # Example
//!
//! ```ignore
//! use costar_graph::{NetworkGraphCanvas, GraphData, GraphNode, GraphLink};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         GraphNode { id: "a".into(), display_name: "Ana".into(), .. },
//!         GraphNode { id: "b".into(), display_name: "Ben".into(), .. },
//!     ],
//!     links: vec![
//!         GraphLink { source: "a".into(), target: "b".into(), value: 3.0 },
//!     ],
//! };
//!
//! view! { <NetworkGraphCanvas data=data.into() /> }
//! ```

mod component;
mod render;
pub mod scale;
pub mod simulation;
mod state;
pub mod theme;
pub mod types;
pub mod viewport;

pub use component::NetworkGraphCanvas;
pub use theme::Theme;
pub use types::{GraphData, GraphLink, GraphNode, NodeKind};
