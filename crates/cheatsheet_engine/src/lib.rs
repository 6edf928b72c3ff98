//! Cheat sheet engine: HTTP client for the processing service and effect execution.
mod backend;
mod endpoints;
mod engine;
mod filename;
mod persist;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use endpoints::ApiEndpoints;
pub use engine::EngineHandle;
pub use filename::{artifact_filename, filename_from_disposition};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    Artifact, ArtifactFormat, BackendError, EngineEvent, FailureKind, GenerateSummary,
    JobStatus, ParseReceipt, ParsedPdf, RunId, SavedArtifact, ServiceInfo, UploadFile,
};
