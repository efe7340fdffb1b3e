use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use scanbridge_core::{DeviceRegistry, EventPublisher};
use scanbridge_model::{PushEvent, ScanEvent};

const CHANNEL_CAPACITY: usize = 64;

/// Fan-out hub for viewer push channels.
///
/// Each subscriber gets a bounded mpsc channel. Delivery is best-effort
/// at-most-once: a full channel drops the event for that viewer, a closed
/// channel prunes the connection. New subscribers are seeded with the
/// current device snapshot and the most recent scan so they render
/// immediately instead of waiting for the next event.
pub struct FanoutHub {
    registry: Arc<DeviceRegistry>,
    connections: DashMap<Uuid, mpsc::Sender<PushEvent>>,
    latest_scan: RwLock<Option<ScanEvent>>,
}

impl std::fmt::Debug for FanoutHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutHub")
            .field("viewers", &self.connections.len())
            .finish_non_exhaustive()
    }
}

impl FanoutHub {
    pub fn new(registry: Arc<DeviceRegistry>) -> Self {
        Self {
            registry,
            connections: DashMap::new(),
            latest_scan: RwLock::new(None),
        }
    }

    /// Register a viewer and return its seeded event channel.
    pub fn subscribe(&self) -> (Uuid, mpsc::Receiver<PushEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        // Seed before the sender is visible to publishers so the snapshot
        // always precedes live events on this channel.
        let snapshot = PushEvent::DeviceUpdate {
            devices: self.registry.list(),
        };
        let _ = tx.try_send(snapshot);
        if let Some(scan) = self.latest_scan.read().clone() {
            let _ = tx.try_send(PushEvent::Scan { scan });
        }

        self.connections.insert(id, tx);
        debug!(viewer = %id, viewers = self.connections.len(), "viewer subscribed");
        (id, rx)
    }

    pub fn disconnect(&self, id: Uuid) {
        if self.connections.remove(&id).is_some() {
            debug!(viewer = %id, viewers = self.connections.len(), "viewer disconnected");
        }
    }

    pub fn viewer_count(&self) -> usize {
        self.connections.len()
    }

    /// Most recent scan observed by the hub, if any.
    pub fn latest_scan(&self) -> Option<ScanEvent> {
        self.latest_scan.read().clone()
    }

    /// Broadcast a fresh device snapshot to all viewers.
    pub fn broadcast_device_update(&self) {
        self.publish(PushEvent::DeviceUpdate {
            devices: self.registry.list(),
        });
    }
}

/// Unregisters a viewer when its SSE stream is dropped, so an abandoned
/// connection does not linger until the next publish prunes it.
pub struct SubscriptionGuard {
    hub: Arc<FanoutHub>,
    viewer_id: Uuid,
}

impl std::fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("viewer_id", &self.viewer_id)
            .finish_non_exhaustive()
    }
}

impl SubscriptionGuard {
    pub fn new(hub: Arc<FanoutHub>, viewer_id: Uuid) -> Self {
        Self { hub, viewer_id }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.hub.disconnect(self.viewer_id);
    }
}

impl EventPublisher for FanoutHub {
    fn publish(&self, event: PushEvent) {
        if let PushEvent::Scan { scan } = &event {
            *self.latest_scan.write() = Some(scan.clone());
        }

        let mut stale = Vec::new();
        for entry in self.connections.iter() {
            match entry.value().try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(viewer = %entry.key(), event = event.event_name(), "viewer channel full; dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    stale.push(*entry.key());
                }
            }
        }
        for id in stale {
            self.disconnect(id);
        }
    }
}
