use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product annotation attached to a scan, either reported by the device
/// (local lookup) or produced later by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub found_locally: bool,
}

/// Canonical scan event, immutable once built by the ingestion pipeline.
///
/// `raw_timestamp` is device-supplied and untrusted; `received_at` is the
/// server-assigned instant every consumer should order by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    pub id: String,
    pub device_id: String,
    pub device_name: String,
    pub barcode_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_type: Option<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_timestamp: Option<i64>,
    pub received_at: DateTime<Utc>,
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_info: Option<ProductInfo>,
}

impl ScanEvent {
    /// Event ids are `scan_<millis>_<deviceId>`; collisions are tolerable
    /// because a device cannot report twice in the same millisecond.
    pub fn generate_id(device_id: &str, received_at: DateTime<Utc>) -> String {
        format!("scan_{}_{}", received_at.timestamp_millis(), device_id)
    }
}

/// Completeness predicate: whether a scan carries enough to be shown to a
/// user. Incomplete scans still travel through the hub; viewers drop them
/// before they touch "latest scan" state.
pub fn is_complete(scan: &ScanEvent) -> bool {
    !scan.barcode_data.trim().is_empty()
        && !scan.device_name.trim().is_empty()
        && scan
            .scan_type
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(barcode: &str, device_name: &str, scan_type: Option<&str>) -> ScanEvent {
        let now = Utc::now();
        ScanEvent {
            id: ScanEvent::generate_id("dev-1", now),
            device_id: "dev-1".into(),
            device_name: device_name.into(),
            barcode_data: barcode.into(),
            scan_type: scan_type.map(Into::into),
            source: "scanner".into(),
            raw_timestamp: None,
            received_at: now,
            processed: true,
            product_info: None,
        }
    }

    #[test]
    fn complete_scan_passes() {
        assert!(is_complete(&scan("12345", "Dock Scanner", Some("qr"))));
    }

    #[test]
    fn empty_barcode_is_incomplete() {
        assert!(!is_complete(&scan("", "Dock Scanner", Some("qr"))));
        assert!(!is_complete(&scan("   ", "Dock Scanner", Some("qr"))));
    }

    #[test]
    fn missing_device_name_or_scan_type_is_incomplete() {
        assert!(!is_complete(&scan("12345", "", Some("qr"))));
        assert!(!is_complete(&scan("12345", "Dock Scanner", None)));
        assert!(!is_complete(&scan("12345", "Dock Scanner", Some(""))));
    }

    #[test]
    fn id_embeds_device_and_millis() {
        let now = Utc::now();
        let id = ScanEvent::generate_id("dev-9", now);
        assert!(id.starts_with("scan_"));
        assert!(id.ends_with("_dev-9"));
    }
}
