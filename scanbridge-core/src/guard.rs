use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::SaveError;
use crate::store::{NewScanRecord, RecordKind, SavedScan, ScanRecordStore};

/// An explicit viewer-initiated save.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub barcode_data: String,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default = "SaveRequest::default_source")]
    pub source: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl SaveRequest {
    fn default_source() -> String {
        "viewer".to_string()
    }
}

/// Rejects saves of a barcode that was already saved within a sliding
/// window, quoting the prior save's timestamp so the caller can show it.
pub struct DuplicateGuard {
    store: Arc<dyn ScanRecordStore>,
    window: Duration,
}

impl std::fmt::Debug for DuplicateGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateGuard")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl DuplicateGuard {
    pub fn new(store: Arc<dyn ScanRecordStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub async fn try_save(&self, request: SaveRequest) -> Result<SavedScan, SaveError> {
        self.try_save_at(request, Utc::now()).await
    }

    /// Save unless the same barcode was saved within the window.
    ///
    /// The window check is inclusive: a prior save aged exactly the window
    /// length still counts as a duplicate.
    pub async fn try_save_at(
        &self,
        request: SaveRequest,
        now: DateTime<Utc>,
    ) -> Result<SavedScan, SaveError> {
        if request.barcode_data.trim().is_empty() {
            return Err(SaveError::MissingBarcode);
        }

        // Scoped to explicit save actions: a record the ingestion pipeline
        // persisted on a device-side match must not block the operator's
        // first save of that barcode.
        if let Some(prior) = self
            .store
            .latest_by_barcode(&request.barcode_data, RecordKind::Save)
            .await?
        {
            let age = now.signed_duration_since(prior.saved_at);
            if age <= self.window {
                debug!(
                    barcode = %request.barcode_data,
                    age_secs = age.num_seconds(),
                    "rejecting duplicate save"
                );
                return Err(SaveError::Duplicate {
                    last_saved: prior.saved_at,
                });
            }
        }

        let record = NewScanRecord {
            kind: RecordKind::Save,
            barcode_data: request.barcode_data.clone(),
            scan_type: request.scan_type.clone(),
            source: request.source.clone(),
            product_name: request.product_name.clone(),
            category: request.category.clone(),
            price: request.price,
            metadata: request.metadata.clone(),
            saved_at: now,
        };
        let id = self.store.insert(record).await?;

        Ok(SavedScan {
            id,
            kind: RecordKind::Save,
            barcode_data: request.barcode_data,
            scan_type: request.scan_type,
            source: request.source,
            product_name: request.product_name,
            category: request.category,
            price: request.price,
            metadata: request.metadata,
            saved_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryScanRecordStore;

    fn guard(window_secs: i64) -> (DuplicateGuard, Arc<MemoryScanRecordStore>) {
        let store = Arc::new(MemoryScanRecordStore::new());
        let guard = DuplicateGuard::new(store.clone(), Duration::seconds(window_secs));
        (guard, store)
    }

    fn request(barcode: &str) -> SaveRequest {
        SaveRequest {
            barcode_data: barcode.into(),
            scan_type: Some("qr".into()),
            source: "viewer".into(),
            product_name: Some("Widget".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn first_save_succeeds() {
        let (guard, store) = guard(300);
        let saved = guard.try_save(request("12345")).await.unwrap();
        assert_eq!(saved.barcode_data, "12345");
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn blank_barcode_is_rejected() {
        let (guard, store) = guard(300);
        let result = guard.try_save(request("   ")).await;
        assert!(matches!(result, Err(SaveError::MissingBarcode)));
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_within_window_quotes_prior_timestamp() {
        let (guard, store) = guard(300);
        let t0 = Utc::now();
        guard.try_save_at(request("12345"), t0).await.unwrap();

        let result = guard
            .try_save_at(request("12345"), t0 + Duration::seconds(120))
            .await;
        match result {
            Err(SaveError::Duplicate { last_saved }) => assert_eq!(last_saved, t0),
            other => panic!("expected duplicate rejection, got {other:?}"),
        }
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn save_succeeds_once_window_elapses() {
        let (guard, store) = guard(300);
        let t0 = Utc::now();
        guard.try_save_at(request("12345"), t0).await.unwrap();

        guard
            .try_save_at(request("12345"), t0 + Duration::seconds(301))
            .await
            .unwrap();
        assert_eq!(store.record_count(), 2);
    }

    #[tokio::test]
    async fn ingest_persisted_record_does_not_block_first_save() {
        let (guard, store) = guard(300);
        let t0 = Utc::now();

        store
            .insert(NewScanRecord {
                kind: RecordKind::Ingest,
                barcode_data: "12345".into(),
                scan_type: Some("qr".into()),
                source: "scanner".into(),
                product_name: Some("Widget".into()),
                category: None,
                price: None,
                metadata: None,
                saved_at: t0,
            })
            .await
            .unwrap();

        guard.try_save_at(request("12345"), t0).await.unwrap();
        assert_eq!(store.record_count(), 2);

        // The explicit save now guards subsequent saves as usual.
        let result = guard
            .try_save_at(request("12345"), t0 + Duration::seconds(60))
            .await;
        assert!(matches!(result, Err(SaveError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn different_barcodes_do_not_collide() {
        let (guard, store) = guard(300);
        let t0 = Utc::now();
        guard.try_save_at(request("12345"), t0).await.unwrap();
        guard.try_save_at(request("67890"), t0).await.unwrap();
        assert_eq!(store.record_count(), 2);
    }
}
