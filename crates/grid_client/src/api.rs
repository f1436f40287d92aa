use grid_core::{BatchId, BatchProgress};
use grid_logging::grid_debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    ApiError, BatchReceipt, ClientConfig, ConfigError, PollError, ReadyBatch, SubmitError,
    UPLOAD_REJECTED_FALLBACK,
};

/// The two backend calls the upload workflow depends on.
#[async_trait::async_trait]
pub trait BatchApi: Send + Sync {
    /// Sends one multipart upload. Exactly one request per call, no retries.
    async fn upload_batch(&self, batch: &ReadyBatch) -> Result<BatchReceipt, SubmitError>;

    /// Reads the current progress document for a batch.
    async fn fetch_progress(&self, batch_id: &BatchId) -> Result<BatchProgress, PollError>;
}

/// reqwest-backed client for the Strategic Grid REST API.
#[derive(Debug, Clone)]
pub struct GridClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GridClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

#[async_trait::async_trait]
impl BatchApi for GridClient {
    async fn upload_batch(&self, batch: &ReadyBatch) -> Result<BatchReceipt, SubmitError> {
        let mut form = Form::new();
        for (slot, payload) in batch.files() {
            let part = Part::bytes(payload.bytes.to_vec()).file_name(payload.file_name.clone());
            form = form.part(slot.field_name(), part);
        }
        if let Some(start) = batch.start_index() {
            form = form.text("start_index", start.to_string());
        }
        if let Some(end) = batch.end_index() {
            form = form.text("end_index", end.to_string());
        }

        let url = self.config.endpoint(&["batch", "upload"]);
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message: error_detail(&body)
                    .unwrap_or_else(|| UPLOAD_REJECTED_FALLBACK.to_string()),
            });
        }

        serde_json::from_slice(&body).map_err(|err| SubmitError::InvalidResponse(err.to_string()))
    }

    async fn fetch_progress(&self, batch_id: &BatchId) -> Result<BatchProgress, PollError> {
        let url = self
            .config
            .endpoint(&["batch", batch_id.as_str(), "progress"]);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| PollError::Transport(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(PollError::NotFound),
            status if !status.is_success() => return Err(PollError::HttpStatus(status.as_u16())),
            _ => {}
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| PollError::Transport(err.to_string()))?;
        serde_json::from_slice(&body).map_err(|err| PollError::Decode(err.to_string()))
    }
}

/// Extracts the `detail` field of an error body.
///
/// String details are returned as-is; structured ones (validation error
/// lists) are returned as compact JSON. Anything unparseable yields `None`.
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(detail) if detail.trim().is_empty() => None,
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

/// Decodes a JSON body, mapping non-success statuses to [`ApiError::Status`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    if !status.is_success() {
        grid_debug!("Request failed with status {}", status);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_detail(&body).unwrap_or_else(|| fallback.to_string()),
        });
    }

    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}
