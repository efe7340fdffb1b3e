//! Viewer-side reception for the Scanbridge push channel.
//!
//! Connects to the server's Server-Sent Events stream, keeps a local
//! mirror of the device list and the latest scan, and filters incoming
//! scan events through a completeness predicate and a source allow-list
//! before they touch local state. The connection reconnects with bounded
//! exponential backoff and jitter; a periodic device poll covers the gaps
//! a missed push would leave.
#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod filter;
pub mod state;

pub use client::{Viewer, ViewerHandle};
pub use config::{ReconnectPolicy, ViewerConfig};
pub use filter::SourceFilter;
pub use state::ViewerState;
