use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub type RunId = u64;

/// One multipart `files` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub contents: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParsedPdf {
    pub pdf_index: usize,
    pub pdf_name: String,
    pub pages: u64,
}

/// Successful `/parse` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParseReceipt {
    pub job_id: String,
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub pdfs: Vec<ParsedPdf>,
    #[serde(default)]
    pub pages_total: u64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Successful `/generate` body: two required counts plus whatever else was sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateSummary {
    pub sections_generated: u64,
    pub pages_processed: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `/status/{job_id}` body. Unknown jobs only carry `status: "not_found"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub parsed: bool,
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl JobStatus {
    pub fn is_known(&self) -> bool {
        self.status.as_deref() != Some("not_found")
    }
}

/// Health check body from `/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceInfo {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactFormat {
    Markdown,
    Json,
    Pdf,
}

impl ArtifactFormat {
    pub fn token(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Markdown => "cheatsheet.md",
            Self::Json => "cheatsheet.json",
            Self::Pdf => "cheatsheet.pdf",
        }
    }
}

/// Raw artifact as returned by `/download`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub format: ArtifactFormat,
    pub content_type: Option<String>,
    pub file_name: String,
    pub bytes: Bytes,
}

/// Artifact written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub path: PathBuf,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ParseCompleted {
        run_id: RunId,
        result: Result<ParseReceipt, BackendError>,
    },
    GenerateCompleted {
        run_id: RunId,
        result: Result<GenerateSummary, BackendError>,
    },
    DownloadCompleted {
        job_id: String,
        format: ArtifactFormat,
        result: Result<SavedArtifact, BackendError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Persist,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response body"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Persist => write!(f, "could not save artifact"),
        }
    }
}

/// Failure talking to the processing service.
///
/// `detail` is only set when the service itself explained the rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub detail: Option<String>,
    pub message: String,
}

impl BackendError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            detail: None,
            message: message.into(),
        }
    }

    pub(crate) fn rejected(status: u16, detail: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::HttpStatus(status),
            detail,
            message: message.into(),
        }
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Network | FailureKind::Timeout)
    }
}
