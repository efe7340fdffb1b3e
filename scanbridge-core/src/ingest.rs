use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use scanbridge_model::{ProductInfo, PushEvent, ScanEvent, ScanReport};

use crate::error::IngestError;
use crate::registry::DeviceRegistry;
use crate::store::{NewScanRecord, RecordKind, ScanRecordStore};

/// Seam between the pipeline and the server's fan-out hub.
///
/// Publishing is fire-and-forget: delivery to viewers is best-effort
/// at-most-once, so the pipeline never waits on it and never sees a
/// failure.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: PushEvent);
}

/// Validates device reports against the registry, conditionally persists
/// them, and emits canonical scan events.
pub struct IngestPipeline {
    registry: Arc<DeviceRegistry>,
    store: Arc<dyn ScanRecordStore>,
    publisher: Arc<dyn EventPublisher>,
    persist_timeout: Duration,
}

impl std::fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestPipeline")
            .field("persist_timeout", &self.persist_timeout)
            .finish_non_exhaustive()
    }
}

impl IngestPipeline {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        store: Arc<dyn ScanRecordStore>,
        publisher: Arc<dyn EventPublisher>,
        persist_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            publisher,
            persist_timeout,
        }
    }

    /// Ingest a validated device report.
    ///
    /// Fails fast with [`IngestError::DeviceNotRegistered`] before any
    /// state is touched or anything is broadcast. Once past that gate the
    /// pipeline runs to completion: persistence failures and timeouts are
    /// logged and swallowed so scan visibility to live viewers is never
    /// blocked by a storage hiccup.
    pub async fn ingest(&self, report: ScanReport) -> Result<ScanEvent, IngestError> {
        if self.registry.get(&report.device_id).is_none() {
            return Err(IngestError::DeviceNotRegistered(report.device_id));
        }

        let device = self
            .registry
            .record_scan(&report.device_id)
            .map_err(|_| IngestError::DeviceNotRegistered(report.device_id.clone()))?;

        let received_at = Utc::now();
        let device_name = report
            .device_name
            .clone()
            .unwrap_or_else(|| device.device_name.clone());

        let mut scan = ScanEvent {
            id: ScanEvent::generate_id(&report.device_id, received_at),
            device_id: report.device_id.clone(),
            device_name,
            barcode_data: report.barcode_data.clone(),
            scan_type: report.scan_type.clone(),
            source: report.source.clone(),
            raw_timestamp: report.raw_timestamp,
            received_at,
            processed: false,
            product_info: None,
        };

        // Durable persistence only when the device asserts a local product
        // match; bounded so a slow store cannot delay the broadcast.
        if report.asserts_local_match() {
            self.persist_local_match(&report, &scan).await;
        }

        scan.processed = true;
        scan.product_info = report.product_name.clone().map(|name| ProductInfo {
            name,
            category: report.product_type.clone(),
            description: report.product_details.clone(),
            found_locally: report.found_in_local_db,
        });

        // Both signals are emitted for every ingested scan: the raw
        // "received" event and the "processed" event, in that order.
        self.publisher.publish(PushEvent::Scan { scan: scan.clone() });
        self.publisher
            .publish(PushEvent::ScanProcessed { scan: scan.clone() });

        Ok(scan)
    }

    async fn persist_local_match(&self, report: &ScanReport, scan: &ScanEvent) {
        let record = NewScanRecord {
            kind: RecordKind::Ingest,
            barcode_data: report.barcode_data.clone(),
            scan_type: report.scan_type.clone(),
            source: report.source.clone(),
            product_name: report.product_name.clone(),
            category: report.product_type.clone(),
            price: None,
            metadata: None,
            saved_at: scan.received_at,
        };

        match tokio::time::timeout(self.persist_timeout, self.store.insert(record)).await {
            Ok(Ok(id)) => {
                debug!(scan_id = %scan.id, record_id = id, "persisted locally-matched scan");
            }
            Ok(Err(err)) => {
                warn!(scan_id = %scan.id, "scan persistence failed: {err}");
            }
            Err(_) => {
                warn!(
                    scan_id = %scan.id,
                    timeout_ms = self.persist_timeout.as_millis() as u64,
                    "scan persistence timed out"
                );
            }
        }
    }
}
