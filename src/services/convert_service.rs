//! Client side of the conversion server.
//!
//! The server normalizes raw insight JSON (`/convert`) and builds spreadsheets
//! (`/download`, `/download-csv`). Its behavior is outside this crate; only the
//! request and response shapes are relied on here.

use crate::core::{cell_text, is_truthy, ExportEndpoint, Insight, InsightCollection, InsightError};
use crate::services::tab_service::NO_INSIGHTS_MESSAGE;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_DISPOSITION;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bytes returned by an export endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    /// Filename suggested by the server's `Content-Disposition` header
    pub filename_hint: Option<String>,
}

/// The remote half of conversion and export.
///
/// Implemented over HTTP by [`HttpBackend`]; tests substitute their own.
pub trait ConversionBackend: Send + Sync {
    fn convert(&self, payload: &Value) -> Result<InsightCollection, InsightError>;

    fn download(&self, endpoint: ExportEndpoint, body: &Value) -> Result<ExportFile, InsightError>;
}

pub struct ConvertService;

impl ConvertService {
    /// Shape a parsed document into a `/convert` request.
    ///
    /// A document with a truthy `insights` field is sent unchanged. Anything else
    /// is wrapped as `{requestId, insights}`, with a bare object becoming a
    /// one-element list.
    pub fn normalize_payload(document: Value, request_id: impl Into<String>) -> Value {
        if document.get("insights").is_some_and(is_truthy) {
            return document;
        }
        let insights = match document {
            Value::Array(items) => Value::Array(items),
            other => Value::Array(vec![other]),
        };
        json!({
            "requestId": request_id.into(),
            "insights": insights,
        })
    }

    /// Combine several loaded documents into one insight list, in order.
    pub fn merge_documents(documents: Vec<Value>) -> Value {
        let mut merged = Vec::new();
        for document in documents {
            match document {
                Value::Object(mut obj) if obj.get("insights").is_some_and(is_truthy) => {
                    match obj.remove("insights") {
                        Some(Value::Array(items)) => merged.extend(items),
                        Some(other) => merged.push(other),
                        None => {}
                    }
                }
                Value::Array(items) => merged.extend(items),
                other => merged.push(other),
            }
        }
        Value::Array(merged)
    }

    /// Interpret a `/convert` reply body.
    pub fn parse_response(value: Value) -> Result<InsightCollection, InsightError> {
        let Value::Object(mut obj) = value else {
            return Err(InsightError::network("Unexpected response from server"));
        };

        if let Some(error) = obj.get("error").filter(|e| is_truthy(e)) {
            return Err(InsightError::network(cell_text(error)));
        }

        let request_id = obj
            .get("requestId")
            .filter(|v| !v.is_null())
            .map(cell_text);

        let insights = match obj.remove("insights") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .filter_map(|(i, item)| match serde_json::from_value::<Insight>(item) {
                    Ok(insight) => Some(insight),
                    Err(e) => {
                        warn!("Dropping insight {i}: {e}");
                        None
                    }
                })
                .collect(),
            Some(other) => {
                warn!("insights is not a sequence: {other}");
                return Err(InsightError::data_shape(NO_INSIGHTS_MESSAGE));
            }
        };

        Ok(InsightCollection {
            request_id,
            insights,
        })
    }

    /// The server's `{error}` message from a failed reply, or `fallback`.
    pub fn error_message(body: &[u8], fallback: &str) -> String {
        serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").filter(|e| is_truthy(e)).map(cell_text))
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Filename from a `Content-Disposition` header value.
    pub fn filename_from_disposition(header: &str) -> Option<String> {
        let mut extended = None;
        for part in header.split(';').map(str::trim) {
            if let Some(value) = part.strip_prefix("filename=") {
                let name = value.trim_matches('"');
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            } else if let Some(value) = part.strip_prefix("filename*=") {
                let name = value
                    .split_once("''")
                    .map(|(_, name)| name)
                    .unwrap_or(value)
                    .trim_matches('"');
                if !name.is_empty() {
                    extended = Some(name.to_string());
                }
            }
        }
        extended
    }
}

/// [`ConversionBackend`] over HTTP with a blocking client.
///
/// Calls block; the terminal UI runs them on worker threads.
pub struct HttpBackend {
    base_url: String,
    http: HttpClient,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, InsightError> {
        let http = HttpClient::builder()
            .user_agent(concat!("insightview/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ConversionBackend for HttpBackend {
    fn convert(&self, payload: &Value) -> Result<InsightCollection, InsightError> {
        let url = self.url("/convert");
        debug!("POST {url}");
        let resp = self.http.post(&url).json(payload).send()?;
        let status = resp.status();
        let body = resp.bytes()?;

        if !status.is_success() {
            warn!("{url} answered {status}");
            return Err(InsightError::network(ConvertService::error_message(
                &body,
                "Server error occurred",
            )));
        }

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| InsightError::network(format!("Invalid response from server: {e}")))?;
        let collection = ConvertService::parse_response(value)?;
        info!(
            "Converted {} insights (requestId={})",
            collection.len(),
            collection.request_id.as_deref().unwrap_or("-")
        );
        Ok(collection)
    }

    fn download(&self, endpoint: ExportEndpoint, body: &Value) -> Result<ExportFile, InsightError> {
        let url = self.url(endpoint.path());
        debug!("POST {url}");
        let resp = self.http.post(&url).json(body).send()?;
        let status = resp.status();
        let filename_hint = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(ConvertService::filename_from_disposition);
        let bytes = resp.bytes()?;

        if !status.is_success() {
            warn!("{url} answered {status}");
            return Err(InsightError::network(ConvertService::error_message(
                &bytes,
                "Download failed",
            )));
        }

        Ok(ExportFile {
            bytes: bytes.to_vec(),
            filename_hint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_keeps_envelope() {
        let doc = json!({"requestId": "r1", "insights": [{"id": 1}]});
        assert_eq!(ConvertService::normalize_payload(doc.clone(), "ignored"), doc);
    }

    #[test]
    fn test_normalize_wraps_array_and_object() {
        let wrapped = ConvertService::normalize_payload(json!([{"id": 1}, {"id": 2}]), "42");
        assert_eq!(wrapped, json!({"requestId": "42", "insights": [{"id": 1}, {"id": 2}]}));

        let wrapped = ConvertService::normalize_payload(json!({"id": 1}), "42");
        assert_eq!(wrapped, json!({"requestId": "42", "insights": [{"id": 1}]}));
    }

    #[test]
    fn test_normalize_wraps_falsy_insights_field() {
        let doc = json!({"insights": null, "id": 3});
        let wrapped = ConvertService::normalize_payload(doc.clone(), "7");
        assert_eq!(wrapped["insights"], json!([doc]));
    }

    #[test]
    fn test_merge_documents_flattens_in_order() {
        let merged = ConvertService::merge_documents(vec![
            json!({"requestId": "a", "insights": [{"useCaseId": "A"}, {"useCaseId": "B"}]}),
            json!([{"useCaseId": "C"}]),
            json!({"useCaseId": "D"}),
        ]);
        let ids: Vec<&str> = merged
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["useCaseId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_parse_response_error_field() {
        let err = ConvertService::parse_response(json!({"error": "No valid insights data provided"}))
            .unwrap_err();
        assert!(matches!(err, InsightError::Network(_)));
        assert_eq!(err.to_string(), "No valid insights data provided");
    }

    #[test]
    fn test_parse_response_insights() {
        let collection = ConvertService::parse_response(json!({
            "requestId": 99,
            "insights": [{"useCaseId": "Churn", "facts": {}}, 5]
        }))
        .unwrap();
        assert_eq!(collection.request_id.as_deref(), Some("99"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_parse_response_non_sequence_insights() {
        let err = ConvertService::parse_response(json!({"insights": {"a": 1}})).unwrap_err();
        assert!(matches!(err, InsightError::DataShape(_)));
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(
            ConvertService::error_message(br#"{"error":"boom"}"#, "Download failed"),
            "boom"
        );
        assert_eq!(
            ConvertService::error_message(b"<html>502</html>", "Download failed"),
            "Download failed"
        );
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            ConvertService::filename_from_disposition("attachment; filename=insights_r1.xlsx"),
            Some("insights_r1.xlsx".to_string())
        );
        assert_eq!(
            ConvertService::filename_from_disposition(r#"attachment; filename="a b.xlsx""#),
            Some("a b.xlsx".to_string())
        );
        assert_eq!(
            ConvertService::filename_from_disposition("attachment; filename*=UTF-8''report.xlsx"),
            Some("report.xlsx".to_string())
        );
        assert_eq!(ConvertService::filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_http_backend_trims_base_url() {
        let backend = HttpBackend::new("http://localhost:5013/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5013");
        assert_eq!(backend.url("/convert"), "http://localhost:5013/convert");
    }
}
