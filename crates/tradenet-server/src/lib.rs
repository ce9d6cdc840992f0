//! TradeNet Server - view composition and the JSON-RPC shell
//!
//! `compute_view` ties the pipeline together: rank the reporter's
//! partners, build the trade graph and its layout, and compose the map.
//! The server wraps it in a line-oriented JSON-RPC 2.0 loop over stdio,
//! recomputing the view from scratch for every request.

mod config;
mod handlers;
mod protocol;
mod server;
mod view;

pub use config::{ConfigError, ViewConfig, CONFIG_DIR, CONFIG_FILE};
pub use protocol::{Request, Response, RpcError};
pub use server::{ServerState, TradeServer};
pub use view::{compute_view, TradeView, ViewRequest};
