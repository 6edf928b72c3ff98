//! Cheat sheet core: the file selection store and the generation workflow as a
//! pure state machine. All I/O lives in `cheatsheet_engine`.
mod effect;
mod files;
mod job;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{DownloadRequest, Effect};
pub use files::{FileSelection, SelectedFile};
pub use job::{DownloadFormat, GenerationJob, GenerationPreview, RemoteFailure, UnknownFormat};
pub use msg::Msg;
pub use state::{
    AppState, RunId, WorkflowPhase, DEFAULT_DOC_TYPE, GENERIC_FAILURE_MESSAGE,
};
pub use update::update;
pub use view_model::{AppViewModel, FileRowView, LABEL_GENERATING, LABEL_UPLOADING};
