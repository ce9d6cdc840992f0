//! Request handlers for protocol methods.
//!
//! Each handler implements one method and recomputes what it needs from
//! the loaded dataset.

use crate::protocol::{
    RankingParams, ReporterParams, Response, RpcError, ViewParams, INVALID_PARAMS,
    UNKNOWN_REPORTER,
};
use crate::server::ServerState;
use crate::view::{compute_view, ViewRequest};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tradenet_core::{filtered_subset, rank, PartnerRanking, ValueSummary};
use tradenet_graph::LayoutKind;

fn check_reporter(state: &ServerState<'_>, reporter: &str) -> Result<(), RpcError> {
    state
        .dataset
        .require_reporter(reporter)
        .map_err(|e| RpcError::new(UNKNOWN_REPORTER, e.to_string()))
}

/// Handles the dataset.info method.
pub fn handle_info(state: &ServerState<'_>, id: Option<Value>) -> Response {
    #[derive(Serialize)]
    struct InfoResult {
        #[serde(rename = "rowCount")]
        row_count: usize,
        #[serde(rename = "reporterCount")]
        reporter_count: usize,
        version: &'static str,
    }

    Response::success(
        id,
        InfoResult {
            row_count: state.dataset.len(),
            reporter_count: state.dataset.reporters().len(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Handles the reporters method.
pub fn handle_reporters(state: &ServerState<'_>, id: Option<Value>) -> Response {
    Response::success(
        id,
        serde_json::json!({ "reporters": state.dataset.reporters() }),
    )
}

/// Handles the ranking method.
pub fn handle_ranking(state: &ServerState<'_>, id: Option<Value>, params: RankingParams) -> Response {
    if let Err(e) = check_reporter(state, &params.reporter) {
        return Response::failure(id, e);
    }

    let top_k = params.top_k.unwrap_or(state.config.top_k);
    debug!("Ranking for {} (top {})", params.reporter, top_k);

    #[derive(Serialize)]
    struct RankingResult<'a> {
        reporter: &'a str,
        partners: PartnerRanking,
    }

    Response::success(
        id,
        RankingResult {
            reporter: &params.reporter,
            partners: rank(&state.dataset, &params.reporter, top_k),
        },
    )
}

/// Handles the view method.
pub fn handle_view(state: &ServerState<'_>, id: Option<Value>, params: ViewParams) -> Response {
    if let Err(e) = check_reporter(state, &params.reporter) {
        return Response::failure(id, e);
    }

    let layout = match params.layout.as_deref().map(str::parse::<LayoutKind>) {
        None => None,
        Some(Ok(kind)) => Some(kind),
        Some(Err(e)) => return Response::error(id, INVALID_PARAMS, e.to_string()),
    };

    let request = ViewRequest {
        reporter: params.reporter,
        layout,
        lon_offset: params.lon_offset,
        top_k: params.top_k,
    };

    match compute_view(&state.dataset, &request, &state.config, state.registry) {
        Ok(view) => Response::success(id, view),
        Err(e) => Response::error(id, INVALID_PARAMS, e.to_string()),
    }
}

/// Handles the summary method.
pub fn handle_summary(state: &ServerState<'_>, id: Option<Value>, params: ReporterParams) -> Response {
    if let Err(e) = check_reporter(state, &params.reporter) {
        return Response::failure(id, e);
    }

    let ranking = rank(&state.dataset, &params.reporter, state.config.top_k);
    let values: Vec<f64> = filtered_subset(&state.dataset, &params.reporter, &ranking)
        .iter()
        .filter_map(|r| r.value)
        .collect();

    Response::success(id, ValueSummary::from_values(&values))
}
