//! TradeNet Graph - trade network construction and layout
//!
//! Turns a partner ranking into a weighted star graph centered on the
//! reporting country, attaches the visual attributes a drawing layer
//! needs (node color and size, edge width and intensity), and computes
//! 2D positions with one of several layouts.
//!
//! # Example
//!
//! ```no_run
//! use tradenet_core::{rank, TradeDataset, DEFAULT_TOP_K};
//! use tradenet_graph::{layout, GraphBuilder, GraphStyle, LayoutKind, DEFAULT_SEED};
//!
//! let dataset = TradeDataset::from_path("trade.csv").unwrap();
//! let ranking = rank(&dataset, "Japan", DEFAULT_TOP_K);
//!
//! let graph = GraphBuilder::new(GraphStyle::default()).build("Japan", &ranking);
//! let positions = layout(&graph, LayoutKind::Spring, DEFAULT_SEED);
//! ```

mod builder;
mod edge;
mod graph;
mod layout;
mod style;

pub use builder::GraphBuilder;
pub use edge::{GraphEdge, TradeEdge};
pub use graph::{GraphExport, GraphNode, GraphStats, NodeId, TradeGraph, TradeNode};
pub use layout::{layout, Layout, LayoutKind, ParseLayoutError, Position, DEFAULT_SEED};
pub use style::{edge_width, ColorScale, GraphStyle, NodeRole, Rgb};
