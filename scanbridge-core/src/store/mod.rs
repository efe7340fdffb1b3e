//! Durable record store port.
//!
//! The store's internal schema/engine is deliberately out of scope; the
//! rest of the system only ever inserts a record, asks for the most
//! recent record matching a barcode, and lists recent saves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

mod memory;
mod postgres;

pub use memory::MemoryScanRecordStore;
pub use postgres::PgScanRecordStore;

/// Provenance of a persisted record: written automatically by the
/// ingestion pipeline on a device-side product match, or written by an
/// operator's explicit save action. Duplicate detection considers save
/// actions only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Ingest,
    Save,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Ingest => "ingest",
            RecordKind::Save => "save",
        }
    }
}

/// A record about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScanRecord {
    pub kind: RecordKind,
    pub barcode_data: String,
    pub scan_type: Option<String>,
    pub source: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub metadata: Option<serde_json::Value>,
    pub saved_at: DateTime<Utc>,
}

/// A persisted scan record as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedScan {
    pub id: i64,
    pub kind: RecordKind,
    pub barcode_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_type: Option<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub saved_at: DateTime<Utc>,
}

#[async_trait]
pub trait ScanRecordStore: Send + Sync {
    /// Ensure backing schema exists. Called once at startup.
    async fn initialize_schema(&self) -> Result<(), StoreError>;

    /// Insert a record and return its id.
    async fn insert(&self, record: NewScanRecord) -> Result<i64, StoreError>;

    /// Most recent record of the given kind with the given barcode, if
    /// any.
    async fn latest_by_barcode(
        &self,
        barcode: &str,
        kind: RecordKind,
    ) -> Result<Option<SavedScan>, StoreError>;

    /// Recent records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<SavedScan>, StoreError>;
}
