use serde::{Deserialize, Serialize};

use crate::device::DeviceSnapshot;
use crate::scan::ScanEvent;

/// Server → viewer push events carried over the real-time channel.
///
/// The variant tag doubles as the SSE event name; the data payload is the
/// whole tagged value so viewers can decode without consulting the event
/// name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    DeviceUpdate { devices: Vec<DeviceSnapshot> },
    DeviceConnected { device: DeviceSnapshot },
    Scan { scan: ScanEvent },
    ScanProcessed { scan: ScanEvent },
}

impl PushEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            PushEvent::DeviceUpdate { .. } => "device_update",
            PushEvent::DeviceConnected { .. } => "device_connected",
            PushEvent::Scan { .. } => "scan",
            PushEvent::ScanProcessed { .. } => "scan_processed",
        }
    }
}
