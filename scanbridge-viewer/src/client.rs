use std::sync::Arc;

use futures::StreamExt;
use parking_lot::RwLock;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use scanbridge_model::{DeviceSnapshot, PushEvent};

use crate::config::ViewerConfig;
use crate::state::ViewerState;

/// Internal event type for channel communication between the SSE task and
/// the reception loop.
#[derive(Debug)]
enum SseSignal {
    Open,
    Message(eventsource_stream::Event),
    Error(String),
    Closed,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<DeviceSnapshot>,
}

/// Entry point for viewer applications.
#[derive(Debug)]
pub struct Viewer;

impl Viewer {
    /// Connect to a server: fetch the initial device list, then keep the
    /// shared state current from the push channel and the periodic poll.
    ///
    /// A failed initial fetch is logged, not fatal: the viewer starts
    /// with an empty list and the poll/subscription tasks recover once
    /// the server is reachable.
    pub async fn connect(config: ViewerConfig) -> ViewerHandle {
        let client = reqwest::Client::new();
        let state = Arc::new(RwLock::new(ViewerState::default()));

        // Plain fetch first so the caller starts with a populated list
        // even if the subscription takes a retry or two to come up.
        match fetch_devices(&client, &config.server_url).await {
            Ok(devices) => state.write().devices = devices,
            Err(e) => log::warn!("initial device fetch failed: {e}"),
        }

        let sse_task = tokio::spawn(run_subscription(
            config.clone(),
            client.clone(),
            state.clone(),
        ));
        let poll_task = tokio::spawn(run_device_poll(config, client, state.clone()));

        ViewerHandle {
            state,
            sse_task,
            poll_task,
        }
    }
}

/// Handle to a live viewer connection. Dropping it tears both background
/// tasks down.
#[derive(Debug)]
pub struct ViewerHandle {
    state: Arc<RwLock<ViewerState>>,
    sse_task: JoinHandle<()>,
    poll_task: JoinHandle<()>,
}

impl ViewerHandle {
    /// Snapshot of the current local state.
    pub fn state(&self) -> ViewerState {
        self.state.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().connected
    }

    pub fn shutdown(self) {
        self.sse_task.abort();
        self.poll_task.abort();
    }
}

impl Drop for ViewerHandle {
    fn drop(&mut self) {
        self.sse_task.abort();
        self.poll_task.abort();
    }
}

async fn fetch_devices(
    client: &reqwest::Client,
    server_url: &str,
) -> Result<Vec<DeviceSnapshot>, reqwest::Error> {
    let url = format!("{server_url}/api/v1/devices");
    let response: DevicesResponse = client.get(&url).send().await?.json().await?;
    Ok(response.devices)
}

async fn run_device_poll(
    config: ViewerConfig,
    client: reqwest::Client,
    state: Arc<RwLock<ViewerState>>,
) {
    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        interval.tick().await;
        match fetch_devices(&client, &config.server_url).await {
            Ok(devices) => {
                log::debug!("device poll returned {} devices", devices.len());
                state.write().devices = devices;
            }
            Err(e) => {
                log::warn!("device poll failed: {e}");
            }
        }
    }
}

async fn run_subscription(
    config: ViewerConfig,
    client: reqwest::Client,
    state: Arc<RwLock<ViewerState>>,
) {
    let mut retry_count: u32 = 0;

    loop {
        if retry_count > 0 {
            if config.reconnect.exhausted(retry_count) {
                log::error!("max retries exceeded for event subscription");
                return;
            }
            let delay = config.reconnect.delay_for(retry_count);
            log::info!(
                "retrying event subscription in {:.1}s (attempt #{})",
                delay.as_secs_f64(),
                retry_count + 1
            );
            tokio::time::sleep(delay).await;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream_task = spawn_event_source(&config.server_url, &client, tx);

        while let Some(signal) = rx.recv().await {
            match signal {
                SseSignal::Open => {
                    log::info!("event subscription opened");
                    retry_count = 0;
                    state.write().connected = true;
                }
                SseSignal::Message(msg) => {
                    handle_sse_message(&config, &state, msg);
                }
                SseSignal::Error(e) => {
                    log::error!("event subscription error: {e}");
                    break;
                }
                SseSignal::Closed => {
                    log::warn!("event stream ended");
                    break;
                }
            }
        }

        stream_task.abort();
        state.write().connected = false;
        retry_count += 1;
    }
}

fn spawn_event_source(
    server_url: &str,
    client: &reqwest::Client,
    tx: mpsc::UnboundedSender<SseSignal>,
) -> JoinHandle<()> {
    let url = format!("{server_url}/api/v1/events");
    let request = client.get(&url);

    tokio::spawn(async move {
        match reqwest_eventsource::EventSource::new(request) {
            Ok(mut event_source) => {
                while let Some(event) = event_source.next().await {
                    let signal = match event {
                        Ok(reqwest_eventsource::Event::Open) => SseSignal::Open,
                        Ok(reqwest_eventsource::Event::Message(msg)) => SseSignal::Message(msg),
                        Err(e) => SseSignal::Error(e.to_string()),
                    };
                    if tx.send(signal).is_err() {
                        break;
                    }
                }
                let _ = tx.send(SseSignal::Closed);
            }
            Err(err) => {
                let _ = tx.send(SseSignal::Error(err.to_string()));
            }
        }
    })
}

fn handle_sse_message(
    config: &ViewerConfig,
    state: &Arc<RwLock<ViewerState>>,
    msg: eventsource_stream::Event,
) {
    // Keepalive comments arrive as empty data; skip silently.
    if msg.data.is_empty() || msg.data == "keep-alive" {
        return;
    }

    match serde_json::from_str::<PushEvent>(&msg.data) {
        Ok(event) => {
            log::debug!("received {} event", event.event_name());
            state.write().apply_event(event, &config.filter);
        }
        Err(e) => {
            log::error!("failed to parse push event: {e} - data: {}", msg.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(event: &str, data: &str) -> eventsource_stream::Event {
        eventsource_stream::Event {
            event: event.into(),
            data: data.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn connect_survives_unreachable_server() {
        // Nothing listens on port 9; the initial fetch fails but the
        // handle still comes up with empty state.
        let handle = Viewer::connect(ViewerConfig::new("http://127.0.0.1:9")).await;
        let state = handle.state();
        assert!(state.devices.is_empty());
        assert!(!state.connected);
    }

    #[tokio::test]
    async fn device_update_message_replaces_devices() {
        let config = ViewerConfig::new("http://localhost:3001");
        let state = Arc::new(RwLock::new(ViewerState::default()));

        let data = r#"{"type":"device_update","devices":[{"deviceId":"dev-1","deviceName":"Dock Scanner","ipAddress":"10.0.0.7","firmwareVersion":"1.4.2","lastSeenAt":"2026-08-23T10:00:00Z","totalScanCount":3,"status":"connected"}]}"#;
        handle_sse_message(&config, &state, message("device_update", data));

        let snapshot = state.read().clone();
        assert_eq!(snapshot.devices.len(), 1);
        assert_eq!(snapshot.devices[0].total_scan_count, 3);
    }

    #[tokio::test]
    async fn keepalive_and_garbage_are_ignored() {
        let config = ViewerConfig::new("http://localhost:3001");
        let state = Arc::new(RwLock::new(ViewerState::default()));

        handle_sse_message(&config, &state, message("", "keep-alive"));
        handle_sse_message(&config, &state, message("scan", "not json"));

        let snapshot = state.read().clone();
        assert!(snapshot.devices.is_empty());
        assert!(snapshot.latest_scan.is_none());
    }
}
