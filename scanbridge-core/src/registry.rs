use chrono::{DateTime, Utc};
use dashmap::DashMap;

use scanbridge_model::{Device, DeviceSnapshot};

use crate::error::RegistryError;

/// Fields a device supplies when announcing itself.
#[derive(Debug, Clone)]
pub struct DeviceRegistration {
    pub device_id: String,
    pub device_name: String,
    pub ip_address: String,
    pub firmware_version: String,
}

/// Result of a registration: the stored record plus whether the id was
/// previously unknown (callers announce genuinely new devices).
#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub device: Device,
    pub is_new: bool,
}

/// In-memory table of known devices with pull-based liveness.
///
/// Constructed once at process start and shared by handle; there is no
/// background sweep that flips or evicts stale records — staleness is only
/// visible to a caller who asks via [`DeviceRegistry::list`].
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: DashMap<String, Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
        }
    }

    /// Insert or overwrite a device record (last-write-wins, no merge).
    ///
    /// Re-registration of an existing id refreshes name/ip/firmware and
    /// `last_seen_at` but never resets the scan counter; the counter is
    /// zeroed only for a genuinely new id.
    pub fn register(&self, registration: DeviceRegistration) -> RegisterOutcome {
        self.register_at(registration, Utc::now())
    }

    pub fn register_at(
        &self,
        registration: DeviceRegistration,
        now: DateTime<Utc>,
    ) -> RegisterOutcome {
        let mut is_new = true;
        let mut total_scan_count = 0;

        if let Some(existing) = self.devices.get(&registration.device_id) {
            is_new = false;
            total_scan_count = existing.total_scan_count;
        }

        let device = Device {
            device_id: registration.device_id.clone(),
            device_name: registration.device_name,
            ip_address: registration.ip_address,
            firmware_version: registration.firmware_version,
            last_seen_at: now,
            total_scan_count,
        };
        self.devices
            .insert(registration.device_id, device.clone());

        RegisterOutcome { device, is_new }
    }

    /// Refresh `last_seen_at` for a known device.
    pub fn heartbeat(&self, device_id: &str) -> Result<DateTime<Utc>, RegistryError> {
        self.heartbeat_at(device_id, Utc::now())
    }

    pub fn heartbeat_at(
        &self,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, RegistryError> {
        let mut device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| RegistryError::NotFound(device_id.to_string()))?;
        device.last_seen_at = now;
        Ok(now)
    }

    /// Bump the scan counter and `last_seen_at`, returning the updated
    /// record.
    pub fn record_scan(&self, device_id: &str) -> Result<Device, RegistryError> {
        self.record_scan_at(device_id, Utc::now())
    }

    pub fn record_scan_at(
        &self,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Device, RegistryError> {
        let mut device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| RegistryError::NotFound(device_id.to_string()))?;
        device.total_scan_count += 1;
        device.last_seen_at = now;
        Ok(device.clone())
    }

    pub fn get(&self, device_id: &str) -> Option<Device> {
        self.devices.get(device_id).map(|d| d.clone())
    }

    /// All known devices with status derived at call time.
    pub fn list(&self) -> Vec<DeviceSnapshot> {
        self.list_at(Utc::now())
    }

    pub fn list_at(&self, now: DateTime<Utc>) -> Vec<DeviceSnapshot> {
        let mut snapshots: Vec<DeviceSnapshot> = self
            .devices
            .iter()
            .map(|entry| entry.snapshot_at(now))
            .collect();
        snapshots.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
