//! One full recomputation of the trade view.

use crate::config::ViewConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tradenet_core::{
    filtered_subset, rank, CoordinateRegistry, PartnerRanking, TradeDataset, ValueSummary,
};
use tradenet_geo::{GeoComposer, GeoError, GeoView};
use tradenet_graph::{layout, GraphBuilder, GraphExport, LayoutKind};

/// What the user selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub reporter: String,
    /// Falls back to the configured layout.
    pub layout: Option<LayoutKind>,
    /// Falls back to the reporter's own longitude.
    pub lon_offset: Option<f64>,
    /// Falls back to the configured top-K.
    pub top_k: Option<usize>,
}

impl ViewRequest {
    pub fn new(reporter: impl Into<String>) -> Self {
        Self {
            reporter: reporter.into(),
            ..Self::default()
        }
    }
}

/// Ranking, graph and map of one reporter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeView {
    pub reporter: String,
    pub layout: LayoutKind,
    pub ranking: PartnerRanking,
    /// Number of source rows behind the ranking.
    pub subset_rows: usize,
    pub summary: Option<ValueSummary>,
    pub graph: GraphExport,
    pub map: GeoView,
}

/// Computes the full view for one request.
///
/// A reporter without qualifying rows yields an empty ranking, a
/// single-node graph and a map with at most the reporter marker. The only
/// failure is an out-of-range longitude offset.
pub fn compute_view(
    dataset: &TradeDataset,
    request: &ViewRequest,
    config: &ViewConfig,
    registry: &CoordinateRegistry,
) -> Result<TradeView, GeoError> {
    let reporter = request.reporter.as_str();
    let kind = request.layout.unwrap_or(config.layout);
    let top_k = request.top_k.unwrap_or(config.top_k);

    let ranking = rank(dataset, reporter, top_k);
    let subset = filtered_subset(dataset, reporter, &ranking);
    let values: Vec<f64> = subset.iter().filter_map(|r| r.value).collect();

    let graph = GraphBuilder::new(config.graph.clone()).build(reporter, &ranking);
    let positions = layout(&graph, kind, config.seed);

    let map = GeoComposer::new(config.map.clone()).compose(
        reporter,
        &ranking,
        registry,
        request.lon_offset,
    )?;

    debug!(
        "View for {}: {} partners, {} rows, {} layout",
        reporter,
        ranking.len(),
        subset.len(),
        kind
    );

    Ok(TradeView {
        reporter: reporter.to_string(),
        layout: kind,
        subset_rows: subset.len(),
        summary: ValueSummary::from_values(&values),
        graph: graph.export(&positions, config.graph.color_scale),
        map,
        ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradenet_core::TradeRecord;

    fn dataset() -> TradeDataset {
        TradeDataset::from_records(vec![
            TradeRecord::new("Germany", "France", 100000.0),
            TradeRecord::new("Germany", "China", 50000.0),
            TradeRecord::new("Germany", "France", 20000.0),
            TradeRecord::new("Germany", "Unspecified", 999999.0),
            TradeRecord::new("Germany", "Atlantis", 10000.0),
            TradeRecord::new("Japan", "China", 5.0),
        ])
    }

    #[test]
    fn test_full_view() {
        let view = compute_view(
            &dataset(),
            &ViewRequest::new("Germany"),
            &ViewConfig::default(),
            CoordinateRegistry::builtin(),
        )
        .unwrap();

        assert_eq!(view.ranking.len(), 3);
        assert_eq!(view.subset_rows, 4);
        assert_eq!(view.summary.as_ref().unwrap().count, 4);

        assert_eq!(view.graph.stats.node_count, 4);
        assert_eq!(view.graph.stats.edge_count, 3);

        // Atlantis has no coordinate: ranked and graphed, but not mapped.
        assert!(view.ranking.contains("Atlantis"));
        assert_eq!(view.map.markers.len(), 3);
        assert_eq!(view.map.links.len(), 2);
    }

    #[test]
    fn test_empty_selection_is_not_an_error() {
        let data = TradeDataset::from_records(vec![TradeRecord::new(
            "Germany",
            "Unspecified",
            1.0,
        )]);

        let view = compute_view(
            &data,
            &ViewRequest::new("Germany"),
            &ViewConfig::default(),
            CoordinateRegistry::builtin(),
        )
        .unwrap();

        assert!(view.ranking.is_empty());
        assert!(view.summary.is_none());
        assert_eq!(view.graph.nodes.len(), 1);
        assert_eq!(view.map.markers.len(), 1);
        assert!(view.map.links.is_empty());
    }

    #[test]
    fn test_request_overrides_config() {
        let request = ViewRequest {
            layout: Some(LayoutKind::Circular),
            top_k: Some(1),
            ..ViewRequest::new("Germany")
        };

        let view = compute_view(
            &dataset(),
            &request,
            &ViewConfig::default(),
            CoordinateRegistry::builtin(),
        )
        .unwrap();

        assert_eq!(view.layout, LayoutKind::Circular);
        assert_eq!(view.ranking.len(), 1);
        assert_eq!(view.subset_rows, 2);
    }

    #[test]
    fn test_view_is_reproducible() {
        let data = dataset();
        let request = ViewRequest::new("Germany");
        let config = ViewConfig::default();
        let registry = CoordinateRegistry::builtin();

        let a = compute_view(&data, &request, &config, registry).unwrap();
        let b = compute_view(&data, &request, &config, registry).unwrap();

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_bad_offset_fails() {
        let request = ViewRequest {
            lon_offset: Some(-181.0),
            ..ViewRequest::new("Germany")
        };

        assert!(compute_view(
            &dataset(),
            &request,
            &ViewConfig::default(),
            CoordinateRegistry::builtin()
        )
        .is_err());
    }
}
