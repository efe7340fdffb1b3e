//! Domain services for the Scanbridge telemetry platform.
//!
//! This crate owns the concurrency- and delivery-sensitive pieces of the
//! system: the device registry with derived liveness, the scan ingestion
//! pipeline, the duplicate-save guard, and the narrow ports through which
//! the durable record store and the product-analysis collaborator are
//! reached. HTTP and fan-out wiring live in `scanbridge-server`.
#![allow(missing_docs)]

pub mod annotate;
pub mod error;
pub mod guard;
pub mod ingest;
pub mod registry;
pub mod store;

pub use annotate::{HttpProductAnnotator, ProductAnnotator};
pub use error::{AnnotateError, IngestError, RegistryError, SaveError, StoreError};
pub use guard::{DuplicateGuard, SaveRequest};
pub use ingest::{EventPublisher, IngestPipeline};
pub use registry::{DeviceRegistration, DeviceRegistry, RegisterOutcome};
pub use store::{
    MemoryScanRecordStore, NewScanRecord, PgScanRecordStore, RecordKind, SavedScan,
    ScanRecordStore,
};
