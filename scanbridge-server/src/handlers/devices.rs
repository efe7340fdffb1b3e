use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use scanbridge_core::{DeviceRegistration, EventPublisher};
use scanbridge_model::PushEvent;

use crate::errors::ServerError;
use crate::infra::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub device_id: String,
    pub device_name: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, ServerError> {
    if request.device_id.trim().is_empty() {
        return Err(ServerError::new(
            axum::http::StatusCode::BAD_REQUEST,
            "deviceId is required",
        ));
    }

    let outcome = state.registry.register(DeviceRegistration {
        device_id: request.device_id.clone(),
        device_name: request.device_name,
        ip_address: request.ip_address.unwrap_or_default(),
        firmware_version: request.firmware_version.unwrap_or_default(),
    });

    info!(
        device = %outcome.device.device_id,
        name = %outcome.device.device_name,
        is_new = outcome.is_new,
        "device registered"
    );

    let snapshot = outcome.device.snapshot_at(chrono::Utc::now());
    state
        .hub
        .publish(PushEvent::DeviceConnected { device: snapshot });
    state.hub.broadcast_device_update();

    Ok(Json(json!({
        "success": true,
        "deviceId": outcome.device.device_id,
        "isNew": outcome.is_new,
    })))
}

pub async fn ping_handler(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let timestamp = state.registry.heartbeat(&device_id)?;
    Ok(Json(json!({
        "success": true,
        "timestamp": timestamp,
    })))
}

pub async fn list_devices_handler(State(state): State<AppState>) -> Json<Value> {
    let devices = state.registry.list();
    let total = devices.len();
    Json(json!({
        "success": true,
        "devices": devices,
        "totalDevices": total,
    }))
}
