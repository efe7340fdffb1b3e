use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use scanbridge_core::{IngestError, RegistryError, SaveError, StoreError};

/// HTTP error envelope: `{"success": false, "error": "..."}` with the
/// mapped status code.
#[derive(Debug)]
pub struct ServerError {
    status: StatusCode,
    message: String,
}

impl ServerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let payload = Json(json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, payload).into_response()
    }
}

impl From<RegistryError> for ServerError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "Device not found")
            }
        }
    }
}

impl From<IngestError> for ServerError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::DeviceNotRegistered(_) => {
                Self::new(StatusCode::NOT_FOUND, "Device not found")
            }
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(error: StoreError) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<SaveError> for ServerError {
    fn from(error: SaveError) -> Self {
        match error {
            SaveError::MissingBarcode => {
                Self::new(StatusCode::BAD_REQUEST, "barcodeData is required")
            }
            // Duplicates are answered inline by the save handler; reaching
            // here means a caller skipped that mapping.
            SaveError::Duplicate { .. } => {
                Self::new(StatusCode::CONFLICT, "Barcode already saved recently")
            }
            SaveError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_not_found_maps_to_404() {
        let err: ServerError = RegistryError::NotFound("dev-1".into()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Device not found");
    }

    #[test]
    fn missing_barcode_maps_to_400() {
        let err: ServerError = SaveError::MissingBarcode.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
