//! Line-oriented JSON-RPC server.
//!
//! Reads one request per line, answers with one response per line. The
//! dataset and registry are loaded once and never change afterwards, so
//! every request is an independent recomputation.

use crate::config::ViewConfig;
use crate::handlers;
use crate::protocol::{Request, Response, RpcError, METHOD_NOT_FOUND, PARSE_ERROR};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};
use tradenet_core::{CoordinateRegistry, TradeDataset};

/// Read-only state shared by all requests.
pub struct ServerState<'r> {
    pub dataset: TradeDataset,
    pub config: ViewConfig,
    pub registry: &'r CoordinateRegistry,
}

/// JSON-RPC server over a loaded dataset.
pub struct TradeServer<'r> {
    state: ServerState<'r>,
}

impl<'r> TradeServer<'r> {
    pub fn new(dataset: TradeDataset, config: ViewConfig, registry: &'r CoordinateRegistry) -> Self {
        Self {
            state: ServerState {
                dataset,
                config,
                registry,
            },
        }
    }

    /// The state requests are answered from.
    pub fn state(&self) -> &ServerState<'r> {
        &self.state
    }

    /// Serves requests from stdin until it closes.
    pub fn run_stdio(&self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    /// Serves requests from `input`, writing responses to `output`.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        info!(
            "Serving {} rows ({} reporters)",
            self.state.dataset.len(),
            self.state.dataset.reporters().len()
        );

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line);
            writeln!(output, "{}", serde_json::to_string(&response)?)?;
            output.flush()?;
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Parses and answers a single request line.
    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Response::error(None, PARSE_ERROR, format!("Parse error: {}", e))
            }
        }
    }

    /// Dispatches a request to its handler.
    pub fn handle_request(&self, request: Request) -> Response {
        debug!("Request: {}", request.method);

        let state = &self.state;
        let id = request.id;
        let params = request.params.unwrap_or(Value::Null);

        match request.method.as_str() {
            "dataset.info" => handlers::handle_info(state, id),
            "reporters" => handlers::handle_reporters(state, id),
            "ranking" => match parse_params(params) {
                Ok(p) => handlers::handle_ranking(state, id, p),
                Err(e) => Response::failure(id, e),
            },
            "view" => match parse_params(params) {
                Ok(p) => handlers::handle_view(state, id, p),
                Err(e) => Response::failure(id, e),
            },
            "summary" => match parse_params(params) {
                Ok(p) => handlers::handle_summary(state, id, p),
                Err(e) => Response::failure(id, e),
            },
            method => Response::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", method)),
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{INVALID_PARAMS, UNKNOWN_REPORTER};
    use serde_json::json;
    use std::io::Cursor;
    use tradenet_core::TradeRecord;

    fn server() -> TradeServer<'static> {
        let dataset = TradeDataset::from_records(vec![
            TradeRecord::new("Germany", "France", 100.0),
            TradeRecord::new("Germany", "China", 50.0),
            TradeRecord::new("Japan", "China", 10.0),
        ]);
        TradeServer::new(dataset, ViewConfig::default(), CoordinateRegistry::builtin())
    }

    fn call(server: &TradeServer<'_>, request: Value) -> Response {
        server.handle_line(&request.to_string())
    }

    #[test]
    fn test_info_and_reporters() {
        let server = server();

        let info = call(&server, json!({"jsonrpc": "2.0", "method": "dataset.info", "id": 1}));
        let result = info.result.unwrap();
        assert_eq!(result["rowCount"], 3);
        assert_eq!(result["reporterCount"], 2);

        let reporters = call(&server, json!({"method": "reporters", "id": 2}));
        assert_eq!(
            reporters.result.unwrap()["reporters"],
            json!(["Germany", "Japan"])
        );
    }

    #[test]
    fn test_ranking() {
        let response = call(
            &server(),
            json!({"method": "ranking", "params": {"reporter": "Germany", "topK": 1}, "id": 3}),
        );

        let result = response.result.unwrap();
        assert_eq!(result["partners"], json!([{"partner": "France", "totalValue": 100.0}]));
        assert_eq!(response.id, Some(json!(3)));
    }

    #[test]
    fn test_view() {
        let response = call(
            &server(),
            json!({"method": "view", "params": {"reporter": "Germany", "layout": "circular"}, "id": 4}),
        );

        let result = response.result.unwrap();
        assert_eq!(result["layout"], "circular");
        assert_eq!(result["graph"]["stats"]["nodeCount"], 3);
        assert_eq!(result["map"]["links"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_errors() {
        let server = server();

        let unknown = call(&server, json!({"method": "ranking", "params": {"reporter": "Peru"}, "id": 5}));
        assert_eq!(unknown.error.unwrap().code, UNKNOWN_REPORTER);

        let missing = call(&server, json!({"method": "view", "params": {}, "id": 6}));
        assert_eq!(missing.error.unwrap().code, INVALID_PARAMS);

        let layout = call(
            &server,
            json!({"method": "view", "params": {"reporter": "Japan", "layout": "radial"}, "id": 7}),
        );
        assert_eq!(layout.error.unwrap().code, INVALID_PARAMS);

        let offset = call(
            &server,
            json!({"method": "view", "params": {"reporter": "Japan", "lonOffset": 500.0}, "id": 8}),
        );
        assert_eq!(offset.error.unwrap().code, INVALID_PARAMS);

        let method = call(&server, json!({"method": "nope", "id": 9}));
        assert_eq!(method.error.unwrap().code, METHOD_NOT_FOUND);

        assert_eq!(server.handle_line("{oops").error.unwrap().code, PARSE_ERROR);
    }

    #[test]
    fn test_run_answers_each_line() {
        let input = Cursor::new(
            "{\"method\":\"reporters\",\"id\":1}\n\n{\"method\":\"summary\",\"params\":{\"reporter\":\"Japan\"},\"id\":2}\n",
        );
        let mut output = Vec::new();

        server().run(input, &mut output).unwrap();

        let lines: Vec<Response> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].result.as_ref().unwrap()["count"], 1);
    }
}
