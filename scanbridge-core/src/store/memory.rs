use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::store::{NewScanRecord, RecordKind, SavedScan, ScanRecordStore};

/// In-memory store used in tests and in DB-less development mode.
#[derive(Debug, Default)]
pub struct MemoryScanRecordStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<SavedScan>,
    next_id: i64,
}

impl MemoryScanRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().records.len()
    }
}

#[async_trait]
impl ScanRecordStore for MemoryScanRecordStore {
    async fn initialize_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, record: NewScanRecord) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.push(SavedScan {
            id,
            kind: record.kind,
            barcode_data: record.barcode_data,
            scan_type: record.scan_type,
            source: record.source,
            product_name: record.product_name,
            category: record.category,
            price: record.price,
            metadata: record.metadata,
            saved_at: record.saved_at,
        });
        Ok(id)
    }

    async fn latest_by_barcode(
        &self,
        barcode: &str,
        kind: RecordKind,
    ) -> Result<Option<SavedScan>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .records
            .iter()
            .filter(|r| r.barcode_data == barcode && r.kind == kind)
            .max_by_key(|r| r.saved_at)
            .cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SavedScan>, StoreError> {
        let inner = self.inner.lock();
        let mut records = inner.records.clone();
        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(barcode: &str, age_secs: i64) -> NewScanRecord {
        NewScanRecord {
            kind: RecordKind::Save,
            barcode_data: barcode.into(),
            scan_type: Some("qr".into()),
            source: "scanner".into(),
            product_name: None,
            category: None,
            price: None,
            metadata: None,
            saved_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn latest_by_barcode_picks_newest() {
        let store = MemoryScanRecordStore::new();
        store.insert(record("12345", 120)).await.unwrap();
        let newest = store.insert(record("12345", 10)).await.unwrap();
        store.insert(record("99999", 0)).await.unwrap();

        let latest = store
            .latest_by_barcode("12345", RecordKind::Save)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, newest);
    }

    #[tokio::test]
    async fn latest_by_barcode_is_scoped_to_kind() {
        let store = MemoryScanRecordStore::new();
        store
            .insert(NewScanRecord {
                kind: RecordKind::Ingest,
                ..record("12345", 10)
            })
            .await
            .unwrap();

        let latest = store
            .latest_by_barcode("12345", RecordKind::Save)
            .await
            .unwrap();
        assert!(latest.is_none());
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let store = MemoryScanRecordStore::new();
        store.insert(record("a", 30)).await.unwrap();
        store.insert(record("b", 20)).await.unwrap();
        store.insert(record("c", 10)).await.unwrap();

        let recent = store.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].barcode_data, "c");
        assert_eq!(recent[1].barcode_data, "b");
    }
}
