use scanbridge_model::{ScanEvent, is_complete};

/// Source allow-list applied after the completeness predicate.
///
/// Only scans that plausibly originate from a scanning device are
/// surfaced: either the `source` field matches a known device source or
/// the device name contains one of the known name fragments. Anything
/// else is silently dropped.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    pub allowed_sources: Vec<String>,
    pub name_fragments: Vec<String>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            allowed_sources: vec![
                "scanner".to_string(),
                "scanner_basic".to_string(),
                "live_scanner".to_string(),
            ],
            name_fragments: vec!["Scanner".to_string(), "Bridge".to_string()],
        }
    }
}

impl SourceFilter {
    /// Whether a scan should reach local "latest scan" state.
    ///
    /// Incomplete scans never pass, regardless of source.
    pub fn accepts(&self, scan: &ScanEvent) -> bool {
        if !is_complete(scan) {
            return false;
        }
        self.allowed_sources.iter().any(|s| s == &scan.source)
            || self
                .name_fragments
                .iter()
                .any(|fragment| scan.device_name.contains(fragment.as_str()))
    }
}
