use serde::{Deserialize, Serialize};

/// Scan payload exactly as devices send it: every field optional, shapes
/// drift between firmware revisions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScanReport {
    pub barcode_data: Option<String>,
    pub scan_type: Option<String>,
    pub device_name: Option<String>,
    pub source: Option<String>,
    pub timestamp: Option<i64>,
    // Devices send "DB" fully capitalized; camelCase renaming alone would
    // produce "foundInLocalDb" and the key would never match.
    #[serde(rename = "foundInLocalDB")]
    pub found_in_local_db: Option<bool>,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub product_details: Option<String>,
}

/// Validated ingestion input. Coercions applied while normalizing the raw
/// payload are returned alongside so the ingest path can log them instead
/// of defaulting silently.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub device_id: String,
    pub device_name: Option<String>,
    pub barcode_data: String,
    pub scan_type: Option<String>,
    pub source: String,
    pub raw_timestamp: Option<i64>,
    pub found_in_local_db: bool,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub product_details: Option<String>,
}

impl ScanReport {
    /// Normalize a raw device payload for the given device id.
    ///
    /// An empty `barcode_data` is kept (completeness filtering is a viewer
    /// concern), but its absence is still reported as a coercion.
    pub fn from_raw(device_id: &str, raw: RawScanReport) -> (Self, Vec<&'static str>) {
        let mut coercions = Vec::new();

        let barcode_data = match raw.barcode_data {
            Some(data) => data,
            None => {
                coercions.push("barcodeData missing; treated as empty");
                String::new()
            }
        };

        let scan_type = raw.scan_type.filter(|t| !t.trim().is_empty());

        let source = match raw.source.filter(|s| !s.trim().is_empty()) {
            Some(source) => source,
            None => {
                coercions.push("source missing; defaulted to \"scanner\"");
                "scanner".to_string()
            }
        };

        let found_in_local_db = match raw.found_in_local_db {
            Some(found) => found,
            None => {
                coercions.push("foundInLocalDB missing; treated as false");
                false
            }
        };

        let report = Self {
            device_id: device_id.to_string(),
            device_name: raw.device_name.filter(|n| !n.trim().is_empty()),
            barcode_data,
            scan_type,
            source,
            raw_timestamp: raw.timestamp,
            found_in_local_db,
            product_name: raw.product_name.filter(|n| !n.trim().is_empty()),
            product_type: raw.product_type,
            product_details: raw.product_details,
        };

        (report, coercions)
    }

    /// Whether this report asserts a successful device-side product lookup,
    /// which is the sole trigger for durable persistence at ingest time.
    pub fn asserts_local_match(&self) -> bool {
        self.found_in_local_db && self.product_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_has_no_coercions() {
        let raw = RawScanReport {
            barcode_data: Some("12345".into()),
            scan_type: Some("qr".into()),
            device_name: Some("Dock Scanner".into()),
            source: Some("scanner".into()),
            timestamp: Some(1_700_000_000),
            found_in_local_db: Some(true),
            product_name: Some("Widget".into()),
            product_type: None,
            product_details: None,
        };
        let (report, coercions) = ScanReport::from_raw("dev-1", raw);
        assert!(coercions.is_empty());
        assert!(report.asserts_local_match());
    }

    #[test]
    fn missing_fields_are_coerced_and_reported() {
        let (report, coercions) = ScanReport::from_raw("dev-1", RawScanReport::default());
        assert_eq!(report.barcode_data, "");
        assert_eq!(report.source, "scanner");
        assert!(!report.found_in_local_db);
        assert_eq!(coercions.len(), 3);
    }

    #[test]
    fn local_match_requires_product_name() {
        let raw = RawScanReport {
            barcode_data: Some("12345".into()),
            found_in_local_db: Some(true),
            product_name: Some("   ".into()),
            ..Default::default()
        };
        let (report, _) = ScanReport::from_raw("dev-1", raw);
        assert!(!report.asserts_local_match());
    }

    #[test]
    fn found_in_local_db_parses_from_device_wire_key() {
        let raw: RawScanReport = serde_json::from_str(
            r#"{"barcodeData":"12345","foundInLocalDB":true,"productName":"Widget"}"#,
        )
        .unwrap();
        assert_eq!(raw.found_in_local_db, Some(true));

        let (report, _) = ScanReport::from_raw("dev-1", raw);
        assert!(report.asserts_local_match());
    }

    #[test]
    fn blank_scan_type_becomes_none() {
        let raw = RawScanReport {
            barcode_data: Some("12345".into()),
            scan_type: Some("  ".into()),
            ..Default::default()
        };
        let (report, _) = ScanReport::from_raw("dev-1", raw);
        assert_eq!(report.scan_type, None);
    }
}
