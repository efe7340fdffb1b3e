//! HTTP surface of the Scanbridge telemetry platform.
//!
//! Devices talk plain request/response JSON (register, ping, scan);
//! viewers receive a one-directional Server-Sent Events stream fanned out
//! by [`infra::fanout::FanoutHub`]. Domain logic lives in
//! `scanbridge-core`; this crate wires it to axum.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::config::Config;
pub use infra::fanout::FanoutHub;
