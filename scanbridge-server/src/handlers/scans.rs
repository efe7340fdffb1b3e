use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use scanbridge_core::{SaveError, SaveRequest};
use scanbridge_model::{RawScanReport, ScanReport};

use crate::errors::ServerError;
use crate::infra::app_state::AppState;

pub async fn scan_handler(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(raw): Json<RawScanReport>,
) -> Result<Json<Value>, ServerError> {
    let (report, notes) = ScanReport::from_raw(&device_id, raw);
    for note in notes {
        debug!(device = %device_id, note, "coerced scan payload field");
    }

    let scan = state.pipeline.ingest(report).await?;
    state.hub.broadcast_device_update();

    Ok(Json(json!({
        "success": true,
        "scanId": scan.id,
    })))
}

pub async fn latest_scan_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "scan": state.hub.latest_scan(),
    }))
}

pub async fn save_scan_handler(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<Value>, ServerError> {
    match state.guard.try_save(request).await {
        Ok(saved) => Ok(Json(json!({
            "success": true,
            "id": saved.id,
        }))),
        // Duplicates are a distinguishable outcome, not an HTTP failure:
        // the viewer shows "already saved at <time>" off this payload.
        Err(SaveError::Duplicate { last_saved }) => Ok(Json(json!({
            "success": false,
            "duplicate": true,
            "error": "Barcode already saved recently",
            "lastSaved": last_saved,
        }))),
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct SavedQuery {
    pub limit: Option<usize>,
}

pub async fn saved_scans_handler(
    State(state): State<AppState>,
    Query(query): Query<SavedQuery>,
) -> Result<Json<Value>, ServerError> {
    let limit = query.limit.unwrap_or(50).min(500);
    let scans = state.store.recent(limit).await?;
    Ok(Json(json!({
        "success": true,
        "scans": scans,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub barcode_data: String,
    #[serde(default)]
    pub scan_type: Option<String>,
}

pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ServerError> {
    if request.barcode_data.trim().is_empty() {
        return Err(ServerError::new(
            axum::http::StatusCode::BAD_REQUEST,
            "barcodeData is required",
        ));
    }

    let Some(annotator) = &state.annotator else {
        return Ok(degraded("analysis service not configured"));
    };

    match annotator
        .annotate(&request.barcode_data, request.scan_type.as_deref())
        .await
    {
        Ok(product) => Ok(Json(json!({
            "success": true,
            "productInfo": product,
        }))),
        Err(err) => {
            warn!(barcode = %request.barcode_data, "annotation failed: {err}");
            Ok(degraded(&err.to_string()))
        }
    }
}

// Collaborator failure degrades instead of erroring: the caller still gets
// a usable response, just without the annotation.
fn degraded(reason: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "productInfo": Value::Null,
        "degraded": true,
        "reason": reason,
    }))
}
