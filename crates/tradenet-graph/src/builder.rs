//! Graph builder for constructing the trade graph from a ranking.
//!
//! The builder resolves visual attributes from a `GraphStyle` while it
//! adds nodes and edges, so a built graph is ready to draw.

use crate::edge::TradeEdge;
use crate::graph::{TradeGraph, TradeNode};
use crate::style::{GraphStyle, NodeRole};
use tradenet_core::PartnerRanking;
use tracing::{debug, warn};

/// Builds a `TradeGraph` from a partner ranking.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    style: GraphStyle,
}

impl GraphBuilder {
    /// Creates a builder using the given style.
    pub fn new(style: GraphStyle) -> Self {
        Self { style }
    }

    /// The style applied to built graphs.
    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    fn node(&self, name: &str, role: NodeRole) -> TradeNode {
        let (color, size) = self.style.node_attributes(role);
        TradeNode {
            name: name.to_string(),
            role,
            color: color.to_string(),
            size,
        }
    }

    /// Builds the star graph of `reporter` and its ranked partners.
    ///
    /// An empty ranking gives a graph with only the reporter node.
    pub fn build(&self, reporter: &str, ranking: &PartnerRanking) -> TradeGraph {
        let mut graph = TradeGraph::new(self.node(reporter, NodeRole::Reporter));
        let max = ranking.max_value().unwrap_or(0.0);

        for entry in ranking.iter() {
            let edge = TradeEdge {
                weight: entry.total_value,
                width: self.style.edge_width(entry.total_value, max),
                intensity: ranking.normalized(entry.total_value),
            };

            let node = self.node(&entry.partner, NodeRole::Partner);
            if graph.add_partner(node, edge).is_none() {
                warn!("Skipping {}: already in the graph of {}", entry.partner, reporter);
            }
        }

        debug!(
            "Built trade graph for {} ({} nodes, {} edges)",
            reporter,
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradenet_core::{rank, TradeDataset, TradeRecord, DEFAULT_TOP_K};

    fn ranking(rows: &[(&str, &str, f64)]) -> PartnerRanking {
        let dataset = TradeDataset::from_records(
            rows.iter()
                .map(|(r, p, v)| TradeRecord::new(r, p, *v))
                .collect(),
        );
        rank(&dataset, "A", DEFAULT_TOP_K)
    }

    #[test]
    fn test_builder_creates_star() {
        let ranking = ranking(&[
            ("A", "B", 100000.0),
            ("A", "C", 50000.0),
            ("A", "B", 20000.0),
            ("A", "Unspecified", 999999.0),
        ]);

        let graph = GraphBuilder::default().build("A", &ranking);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.reporter().name, "A");
        assert_eq!(graph.edge_to("B").unwrap().width, 5.0);
        assert!((graph.edge_to("C").unwrap().width - 2.0833333).abs() < 1e-6);
    }

    #[test]
    fn test_node_roles_and_styles() {
        let ranking = ranking(&[("A", "B", 1.0)]);
        let graph = GraphBuilder::default().build("A", &ranking);

        let reporter = graph.get_by_name("A").unwrap();
        assert_eq!(reporter.role, NodeRole::Reporter);
        assert_eq!((reporter.color.as_str(), reporter.size), ("#E74C3C", 800));

        let partner = graph.get_by_name("B").unwrap();
        assert_eq!(partner.role, NodeRole::Partner);
        assert_eq!((partner.color.as_str(), partner.size), ("#3498DB", 600));
    }

    #[test]
    fn test_empty_ranking_gives_single_node() {
        let graph = GraphBuilder::default().build("A", &PartnerRanking::default());

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_zero_values_use_fallback_width() {
        let ranking = ranking(&[("A", "B", 0.0), ("A", "C", 0.0)]);
        let graph = GraphBuilder::default().build("A", &ranking);

        assert!(graph.edges().all(|e| e.width == 1.0 && e.intensity == 0.0));
    }

    #[test]
    fn test_self_trade_is_not_a_loop() {
        let ranking = ranking(&[("A", "A", 10.0), ("A", "B", 5.0)]);
        let graph = GraphBuilder::default().build("A", &ranking);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge_to("A").is_none());
    }

    #[test]
    fn test_widths_and_intensities_in_range() {
        let ranking = ranking(&[("A", "B", 7.0), ("A", "C", 3.5), ("A", "D", 0.0)]);
        let graph = GraphBuilder::default().build("A", &ranking);

        for edge in graph.edges() {
            assert!((0.0..=5.0).contains(&edge.width));
            assert!((0.0..=1.0).contains(&edge.intensity));
        }
    }
}
