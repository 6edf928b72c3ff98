use url::Url;

use crate::{ArtifactFormat, BackendError, FailureKind};

/// URL builder for the processing service rooted at a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: Url,
}

impl ApiEndpoints {
    pub fn new(base: &str) -> Result<Self, BackendError> {
        let base = Url::parse(base.trim())
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(BackendError::new(
                FailureKind::InvalidUrl,
                format!("unsupported service url {base}"),
            ));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn health_url(&self) -> Url {
        self.endpoint(&[""])
    }

    pub fn parse_url(&self) -> Url {
        self.endpoint(&["parse"])
    }

    pub fn generate_url(&self) -> Url {
        self.endpoint(&["generate"])
    }

    pub fn status_url(&self, job_id: &str) -> Url {
        self.endpoint(&["status", job_id])
    }

    /// Retrieval reference for a finished job: `/download/{job_id}?format={token}`.
    pub fn download_url(&self, job_id: &str, format: ArtifactFormat) -> Url {
        let mut url = self.endpoint(&["download", job_id]);
        url.query_pairs_mut().append_pair("format", format.token());
        url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
