use scanbridge_model::{DeviceSnapshot, PushEvent, ScanEvent};

use crate::filter::SourceFilter;

/// Local mirror of server state as seen by one viewer.
#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    pub devices: Vec<DeviceSnapshot>,
    pub latest_scan: Option<ScanEvent>,
    pub connected: bool,
}

impl ViewerState {
    /// Apply one push event.
    ///
    /// Device snapshots replace the local list wholesale; the server
    /// always sends the full set, so there is nothing to merge. Scan
    /// events pass through the completeness predicate and the source
    /// allow-list before touching `latest_scan`.
    pub fn apply_event(&mut self, event: PushEvent, filter: &SourceFilter) {
        match event {
            PushEvent::DeviceUpdate { devices } => {
                self.devices = devices;
            }
            PushEvent::DeviceConnected { device } => {
                match self
                    .devices
                    .iter_mut()
                    .find(|d| d.device_id == device.device_id)
                {
                    Some(existing) => *existing = device,
                    None => self.devices.push(device),
                }
            }
            PushEvent::Scan { scan } | PushEvent::ScanProcessed { scan } => {
                if filter.accepts(&scan) {
                    self.latest_scan = Some(scan);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scanbridge_model::DeviceStatus;

    fn snapshot(id: &str, name: &str) -> DeviceSnapshot {
        DeviceSnapshot {
            device_id: id.into(),
            device_name: name.into(),
            ip_address: "10.0.0.7".into(),
            firmware_version: "1.4.2".into(),
            last_seen_at: Utc::now(),
            total_scan_count: 0,
            status: DeviceStatus::Connected,
        }
    }

    fn scan(barcode: &str, source: &str) -> ScanEvent {
        scan_from(barcode, source, "Dock Scanner")
    }

    fn scan_from(barcode: &str, source: &str, device_name: &str) -> ScanEvent {
        let now = Utc::now();
        ScanEvent {
            id: ScanEvent::generate_id("dev-1", now),
            device_id: "dev-1".into(),
            device_name: device_name.into(),
            barcode_data: barcode.into(),
            scan_type: Some("qr".into()),
            source: source.into(),
            raw_timestamp: None,
            received_at: now,
            processed: true,
            product_info: None,
        }
    }

    #[test]
    fn device_update_replaces_list_wholesale() {
        let mut state = ViewerState::default();
        let filter = SourceFilter::default();
        state.apply_event(
            PushEvent::DeviceUpdate {
                devices: vec![snapshot("dev-1", "A"), snapshot("dev-2", "B")],
            },
            &filter,
        );
        assert_eq!(state.devices.len(), 2);

        state.apply_event(
            PushEvent::DeviceUpdate {
                devices: vec![snapshot("dev-3", "C")],
            },
            &filter,
        );
        assert_eq!(state.devices.len(), 1);
        assert_eq!(state.devices[0].device_id, "dev-3");
    }

    #[test]
    fn device_connected_upserts() {
        let mut state = ViewerState::default();
        let filter = SourceFilter::default();
        state.apply_event(
            PushEvent::DeviceConnected {
                device: snapshot("dev-1", "A"),
            },
            &filter,
        );
        state.apply_event(
            PushEvent::DeviceConnected {
                device: snapshot("dev-1", "A-renamed"),
            },
            &filter,
        );
        assert_eq!(state.devices.len(), 1);
        assert_eq!(state.devices[0].device_name, "A-renamed");
    }

    #[test]
    fn complete_scan_updates_latest() {
        let mut state = ViewerState::default();
        state.apply_event(
            PushEvent::Scan {
                scan: scan("12345", "scanner"),
            },
            &SourceFilter::default(),
        );
        assert_eq!(state.latest_scan.as_ref().unwrap().barcode_data, "12345");
    }

    #[test]
    fn incomplete_scan_is_dropped_without_error() {
        let mut state = ViewerState::default();
        state.apply_event(
            PushEvent::Scan {
                scan: scan("", "scanner"),
            },
            &SourceFilter::default(),
        );
        assert!(state.latest_scan.is_none());
    }

    #[test]
    fn filtered_source_does_not_clobber_latest() {
        let mut state = ViewerState::default();
        let filter = SourceFilter::default();
        state.apply_event(
            PushEvent::Scan {
                scan: scan("12345", "scanner"),
            },
            &filter,
        );
        state.apply_event(
            PushEvent::ScanProcessed {
                scan: scan_from("99999", "web", "Dashboard"),
            },
            &filter,
        );
        assert_eq!(state.latest_scan.as_ref().unwrap().barcode_data, "12345");
    }
}
