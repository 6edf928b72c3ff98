use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cheatsheet_logging::{sheet_debug, sheet_error};

use crate::backend::{Backend, BackendSettings, ReqwestBackend};
use crate::filename::artifact_filename;
use crate::persist::AtomicFileWriter;
use crate::{
    ArtifactFormat, BackendError, EngineEvent, FailureKind, RunId, SavedArtifact, UploadFile,
};

enum EngineCommand {
    Parse {
        run_id: RunId,
        files: Vec<UploadFile>,
        doc_type: String,
    },
    Generate {
        run_id: RunId,
        job_id: String,
    },
    Download {
        job_id: String,
        format: ArtifactFormat,
        output_dir: PathBuf,
    },
}

/// Runs backend calls on a background tokio runtime.
///
/// Commands are fire-and-forget; every command produces exactly one
/// [`EngineEvent`] that the caller drains with [`EngineHandle::recv`] or
/// [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: &BackendSettings) -> io::Result<Self> {
        let backend = ReqwestBackend::new(settings)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(backend: Arc<dyn Backend>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("cheatsheet-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("cheatsheet-dispatch".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let backend = backend.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        let event = handle_command(backend.as_ref(), command).await;
                        let _ = event_tx.send(event);
                    });
                }
                // Let in-flight requests finish before the runtime is dropped.
                runtime.shutdown_timeout(Duration::from_secs(5));
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn parse(&self, run_id: RunId, files: Vec<UploadFile>, doc_type: impl Into<String>) {
        self.send(EngineCommand::Parse {
            run_id,
            files,
            doc_type: doc_type.into(),
        });
    }

    pub fn generate(&self, run_id: RunId, job_id: impl Into<String>) {
        self.send(EngineCommand::Generate {
            run_id,
            job_id: job_id.into(),
        });
    }

    pub fn download(&self, job_id: impl Into<String>, format: ArtifactFormat, output_dir: PathBuf) {
        self.send(EngineCommand::Download {
            job_id: job_id.into(),
            format,
            output_dir,
        });
    }

    /// Blocks until the next event. `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            sheet_error!("Engine thread has stopped; command dropped");
        }
    }
}

async fn handle_command(backend: &dyn Backend, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::Parse {
            run_id,
            files,
            doc_type,
        } => EngineEvent::ParseCompleted {
            run_id,
            result: backend.parse(&files, &doc_type).await,
        },
        EngineCommand::Generate { run_id, job_id } => EngineEvent::GenerateCompleted {
            run_id,
            result: backend.generate(&job_id).await,
        },
        EngineCommand::Download {
            job_id,
            format,
            output_dir,
        } => {
            let result = download_to(backend, &job_id, format, output_dir).await;
            EngineEvent::DownloadCompleted {
                job_id,
                format,
                result,
            }
        }
    }
}

async fn download_to(
    backend: &dyn Backend,
    job_id: &str,
    format: ArtifactFormat,
    output_dir: PathBuf,
) -> Result<SavedArtifact, BackendError> {
    let artifact = backend.download(job_id, format).await?;
    let filename = artifact_filename(Some(&artifact.file_name), format);
    let byte_len = artifact.bytes.len() as u64;

    let written = tokio::task::spawn_blocking(move || {
        AtomicFileWriter::new(output_dir).write(&filename, &artifact.bytes)
    })
    .await
    .map_err(|err| BackendError::new(FailureKind::Persist, err.to_string()))?
    .map_err(|err| BackendError::new(FailureKind::Persist, err.to_string()))?;

    sheet_debug!("Saved {} ({} bytes)", written.display(), byte_len);
    Ok(SavedArtifact {
        path: written,
        byte_len,
    })
}
