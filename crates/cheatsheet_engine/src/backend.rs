use std::time::Duration;

use bytes::{Bytes, BytesMut};
use cheatsheet_logging::{sheet_debug, sheet_info, sheet_warn};
use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::filename::filename_from_disposition;
use crate::{
    ApiEndpoints, Artifact, ArtifactFormat, BackendError, FailureKind, GenerateSummary,
    JobStatus, ParseReceipt, ServiceInfo, UploadFile,
};

const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` leaves long generations unbounded.
    pub request_timeout: Option<Duration>,
    pub max_download_bytes: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

/// The processing service as seen by the engine.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Phase 1: upload and parse. Returns the job identifier and page counts.
    async fn parse(&self, files: &[UploadFile], doc_type: &str)
        -> Result<ParseReceipt, BackendError>;

    /// Phase 2: synthesize the cheat sheet for a parsed job.
    async fn generate(&self, job_id: &str) -> Result<GenerateSummary, BackendError>;

    async fn download(
        &self,
        job_id: &str,
        format: ArtifactFormat,
    ) -> Result<Artifact, BackendError>;

    async fn status(&self, job_id: &str) -> Result<JobStatus, BackendError>;

    async fn health(&self) -> Result<ServiceInfo, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    endpoints: ApiEndpoints,
    client: reqwest::Client,
    max_download_bytes: u64,
}

impl ReqwestBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let endpoints = ApiEndpoints::new(&settings.base_url)?;
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            endpoints,
            client,
            max_download_bytes: settings.max_download_bytes,
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let response = reject_unless_success(response).await?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| BackendError::new(FailureKind::InvalidResponse, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn parse(
        &self,
        files: &[UploadFile],
        doc_type: &str,
    ) -> Result<ParseReceipt, BackendError> {
        let mut form = Form::new().text("doc_type", doc_type.to_string());
        for file in files {
            let part = Part::stream_with_length(file.contents.clone(), file.contents.len() as u64)
                .file_name(file.name.clone())
                .mime_str(PDF_MIME)
                .map_err(map_reqwest_error)?;
            form = form.part("files", part);
        }

        sheet_info!(
            "POST {} files={} doc_type={}",
            self.endpoints.parse_url(),
            files.len(),
            doc_type
        );
        let receipt: ParseReceipt = self
            .send_json(self.client.post(self.endpoints.parse_url()).multipart(form))
            .await?;
        sheet_debug!(
            "Parsed job {} ({} pdfs, {} pages)",
            receipt.job_id,
            receipt.pdfs.len(),
            receipt.pages_total
        );
        Ok(receipt)
    }

    async fn generate(&self, job_id: &str) -> Result<GenerateSummary, BackendError> {
        let form = Form::new().text("job_id", job_id.to_string());
        sheet_info!("POST {} job_id={}", self.endpoints.generate_url(), job_id);
        self.send_json(self.client.post(self.endpoints.generate_url()).multipart(form))
            .await
    }

    async fn download(
        &self,
        job_id: &str,
        format: ArtifactFormat,
    ) -> Result<Artifact, BackendError> {
        let url = self.endpoints.download_url(job_id, format);
        sheet_info!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let response = reject_unless_success(response).await?;

        let max_bytes = self.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let content_type = header_string(&response, CONTENT_TYPE);
        let file_name = header_string(&response, CONTENT_DISPOSITION)
            .as_deref()
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format.default_file_name().to_string());

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = buffer.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(Artifact {
            format,
            content_type,
            file_name,
            bytes: buffer.freeze(),
        })
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, BackendError> {
        self.send_json(self.client.get(self.endpoints.status_url(job_id)))
            .await
    }

    async fn health(&self) -> Result<ServiceInfo, BackendError> {
        self.send_json(self.client.get(self.endpoints.health_url()))
            .await
    }
}

/// Turns a non-2xx response into a rejection, keeping the service's `detail`.
async fn reject_unless_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_else(|_| Bytes::new());
    let detail = extract_detail(&body);
    sheet_warn!("Service answered {}: {:?}", status, detail);
    Err(BackendError::rejected(
        status.as_u16(),
        detail,
        status.to_string(),
    ))
}

/// Reads `detail` from an error body. Validation errors send a list of
/// objects with `msg`; those are joined.
pub(crate) fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

fn header_string(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn too_large(max_bytes: u64, actual: u64) -> BackendError {
    BackendError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "artifact too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::InvalidResponse, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
