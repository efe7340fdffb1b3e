use axum::Router;
use axum::routing::{get, post};

use crate::handlers::{devices, events, scans};
use crate::infra::app_state::AppState;

/// Create all v1 API routes.
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Device-facing endpoints
        .route("/devices/register", post(devices::register_handler))
        .route("/devices/{id}/ping", post(devices::ping_handler))
        .route("/devices/{id}/scan", post(scans::scan_handler))
        // Viewer-facing endpoints
        .route("/devices", get(devices::list_devices_handler))
        .route("/scans/latest", get(scans::latest_scan_handler))
        .route("/scans/save", post(scans::save_scan_handler))
        .route("/scans/saved", get(scans::saved_scans_handler))
        .route("/scans/analyze", post(scans::analyze_handler))
        .route("/events", get(events::events_handler))
}
