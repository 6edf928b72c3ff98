use crate::{DownloadFormat, GenerationPreview, RemoteFailure, RunId, SelectedFile};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A batch of files arrived from the intake surface.
    FilesAdded(Vec<SelectedFile>),
    /// User removed the file at this position.
    FileRemoved { index: usize },
    /// User asked for a cheat sheet.
    GenerateClicked,
    /// Phase 1 reply; `Ok` carries the job identifier.
    ParseFinished {
        run_id: RunId,
        result: Result<String, RemoteFailure>,
    },
    /// Phase 2 reply.
    GenerateFinished {
        run_id: RunId,
        result: Result<GenerationPreview, RemoteFailure>,
    },
    /// User asked for the artifact in a given format.
    DownloadClicked(DownloadFormat),
    /// Fallback for placeholder wiring.
    NoOp,
}
