use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scanbridge_model::ProductInfo;

use crate::error::AnnotateError;

/// External product-lookup collaborator.
///
/// The server treats annotation as best-effort enrichment; callers decide
/// what a failure means (typically a degraded response, never an outage).
#[async_trait]
pub trait ProductAnnotator: Send + Sync {
    async fn annotate(
        &self,
        barcode: &str,
        scan_type: Option<&str>,
    ) -> Result<ProductInfo, AnnotateError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest<'a> {
    barcode_data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scan_type: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP-backed annotator talking to the external analysis service.
#[derive(Debug, Clone)]
pub struct HttpProductAnnotator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpProductAnnotator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnnotateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ProductAnnotator for HttpProductAnnotator {
    async fn annotate(
        &self,
        barcode: &str,
        scan_type: Option<&str>,
    ) -> Result<ProductInfo, AnnotateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnnotateRequest {
                barcode_data: barcode,
                scan_type,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnnotateError::Status(status.as_u16()));
        }

        let body: AnnotateResponse = response.json().await?;
        if !body.success {
            return Err(AnnotateError::Malformed(
                body.error
                    .unwrap_or_else(|| "analysis service reported failure".to_string()),
            ));
        }

        let name = body
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AnnotateError::Malformed("response missing title".to_string()))?;

        debug!(barcode, product = %name, "annotated barcode");

        Ok(ProductInfo {
            name,
            category: body.category,
            description: body.description,
            found_locally: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_tolerates_missing_fields() {
        let body: AnnotateResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(body.success);
        assert!(body.title.is_none());
    }

    #[test]
    fn response_parses_full_payload() {
        let body: AnnotateResponse = serde_json::from_str(
            r#"{"success":true,"title":"Widget","category":"Hardware","description":"A widget"}"#,
        )
        .unwrap();
        assert_eq!(body.title.as_deref(), Some("Widget"));
        assert_eq!(body.category.as_deref(), Some("Hardware"));
    }

    #[test]
    fn request_omits_absent_scan_type() {
        let json = serde_json::to_string(&AnnotateRequest {
            barcode_data: "12345",
            scan_type: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"barcodeData":"12345"}"#);
    }
}
