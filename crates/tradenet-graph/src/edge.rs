//! Edge types for the trade graph.

use serde::{Deserialize, Serialize};

/// A trade relationship between the reporter and one partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEdge {
    /// Summed trade value, in thousands of USD.
    pub weight: f64,

    /// Stroke width in `[0, max_edge_width]`.
    pub width: f64,

    /// Weight relative to the heaviest edge, in `[0, 1]`.
    pub intensity: f64,
}

/// A flattened edge for export and drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub width: f64,
    pub intensity: f64,
    /// Intensity mapped through the export color scale.
    pub color: String,
}
