//! Core data model definitions shared across Scanbridge crates.
#![allow(missing_docs)]

pub mod device;
pub mod events;
pub mod report;
pub mod scan;

// Intentionally curated re-exports for downstream consumers.
pub use device::{Device, DeviceSnapshot, DeviceStatus, LIVENESS_TIMEOUT_SECS};
pub use events::PushEvent;
pub use report::{RawScanReport, ScanReport};
pub use scan::{ProductInfo, ScanEvent, is_complete};
