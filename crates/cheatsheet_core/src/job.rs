use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary returned by the generate phase.
///
/// `sections_generated` and `pages_processed` are required; anything else the
/// service sends is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationPreview {
    pub sections_generated: u64,
    pub pages_processed: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GenerationPreview {
    pub fn new(sections_generated: u64, pages_processed: u64) -> Self {
        Self {
            sections_generated,
            pages_processed,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// A finished generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub job_id: String,
    pub preview: GenerationPreview,
}

/// Why a remote phase did not succeed.
///
/// `detail` is the service's human-readable reason, when it sent one.
/// Transport failures never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteFailure {
    pub detail: Option<String>,
}

impl RemoteFailure {
    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    pub fn transport() -> Self {
        Self { detail: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadFormat {
    Markdown,
    Json,
    Pdf,
}

impl DownloadFormat {
    pub const ALL: [DownloadFormat; 3] = [Self::Markdown, Self::Json, Self::Pdf];

    /// Token the retrieval endpoint expects in its `format` parameter.
    pub fn token(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Markdown => "cheatsheet.md",
            Self::Json => "cheatsheet.json",
            Self::Pdf => "cheatsheet.pdf",
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown format '{}' (expected markdown, json or pdf)",
            self.0
        )
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for DownloadFormat {
    type Err = UnknownFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.token().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFormat(raw.to_string()))
    }
}
