use crate::{DownloadFormat, RunId, SelectedFile};

/// Work the core asks the outside world to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Phase 1: upload every file and have the service parse them.
    SubmitParse {
        run_id: RunId,
        files: Vec<SelectedFile>,
        doc_type: String,
    },
    /// Phase 2: synthesize the cheat sheet for a parsed job.
    SubmitGenerate { run_id: RunId, job_id: String },
    /// Fetch a finished artifact. Not awaited by the workflow.
    OpenDownload(DownloadRequest),
    /// Blocking notification for the user.
    NotifyFailure { message: String },
}

/// Retrieval reference: which job, in which format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub job_id: String,
    pub format: DownloadFormat,
}
