use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds of silence after which a device is reported as disconnected.
pub const LIVENESS_TIMEOUT_SECS: i64 = 60;

/// Liveness status derived at read time; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Connected,
    Disconnected,
}

/// A registered scanning device.
///
/// Identity is the device-assigned `device_id`; re-registration with the
/// same id overwrites name/ip/firmware (last-write-wins) but keeps the
/// scan counter. Records are never deleted: a silent device simply ages
/// past the liveness window and comes back on its next contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    pub device_name: String,
    pub ip_address: String,
    pub firmware_version: String,
    pub last_seen_at: DateTime<Utc>,
    pub total_scan_count: u64,
}

impl Device {
    /// Derive liveness against `now`. Disconnected iff the device has been
    /// silent for strictly longer than the liveness window.
    pub fn status_at(&self, now: DateTime<Utc>) -> DeviceStatus {
        let silence = now.signed_duration_since(self.last_seen_at);
        if silence.num_seconds() > LIVENESS_TIMEOUT_SECS {
            DeviceStatus::Disconnected
        } else {
            DeviceStatus::Connected
        }
    }

    /// Wire snapshot with the status materialized for a given instant.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> DeviceSnapshot {
        DeviceSnapshot {
            device_id: self.device_id.clone(),
            device_name: self.device_name.clone(),
            ip_address: self.ip_address.clone(),
            firmware_version: self.firmware_version.clone(),
            last_seen_at: self.last_seen_at,
            total_scan_count: self.total_scan_count,
            status: self.status_at(now),
        }
    }
}

/// A device record as pushed to viewers, with derived status embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    pub device_id: String,
    pub device_name: String,
    pub ip_address: String,
    pub firmware_version: String,
    pub last_seen_at: DateTime<Utc>,
    pub total_scan_count: u64,
    pub status: DeviceStatus,
}
