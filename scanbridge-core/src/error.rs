use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("device not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("device not registered: {0}")]
    DeviceNotRegistered(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("barcode data is required")]
    MissingBarcode,

    #[error("barcode already saved at {last_saved}")]
    Duplicate { last_saved: DateTime<Utc> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis service returned status {0}")]
    Status(u16),

    #[error("analysis response malformed: {0}")]
    Malformed(String),
}
