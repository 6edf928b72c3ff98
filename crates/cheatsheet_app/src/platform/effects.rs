use std::path::PathBuf;
use std::time::Duration;

use cheatsheet_core::{
    DownloadFormat, Effect, GenerationPreview, Msg, RemoteFailure, SelectedFile,
};
use cheatsheet_engine::{
    ArtifactFormat, BackendError, EngineEvent, EngineHandle, GenerateSummary, UploadFile,
};
use cheatsheet_logging::{sheet_info, sheet_warn};

/// What the session hears back after running effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// Feed back into `update`.
    Msg(Msg),
    /// The user must see this before anything else happens.
    Notify(String),
    DownloadSaved {
        format: DownloadFormat,
        path: PathBuf,
        byte_len: u64,
    },
    DownloadFailed {
        format: DownloadFormat,
        message: String,
    },
}

pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, output_dir: PathBuf) -> Self {
        Self { engine, output_dir }
    }

    /// Starts engine work for each effect. Effects that need no I/O come back
    /// immediately as feedback.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Feedback> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::SubmitParse {
                    run_id,
                    files,
                    doc_type,
                } => {
                    sheet_info!("SubmitParse run_id={} files={}", run_id, files.len());
                    let uploads = files.into_iter().map(to_upload).collect();
                    self.engine.parse(run_id, uploads, doc_type);
                }
                Effect::SubmitGenerate { run_id, job_id } => {
                    sheet_info!("SubmitGenerate run_id={} job_id={}", run_id, job_id);
                    self.engine.generate(run_id, job_id);
                }
                Effect::OpenDownload(request) => {
                    sheet_info!(
                        "OpenDownload job_id={} format={}",
                        request.job_id,
                        request.format
                    );
                    self.engine.download(
                        request.job_id,
                        map_format(request.format),
                        self.output_dir.clone(),
                    );
                }
                Effect::NotifyFailure { message } => immediate.push(Feedback::Notify(message)),
            }
        }
        immediate
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next(&self, timeout: Duration) -> Option<Feedback> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Feedback {
    match event {
        EngineEvent::ParseCompleted { run_id, result } => Feedback::Msg(Msg::ParseFinished {
            run_id,
            result: result
                .map(|receipt| receipt.job_id)
                .map_err(|err| map_failure(&err)),
        }),
        EngineEvent::GenerateCompleted { run_id, result } => {
            Feedback::Msg(Msg::GenerateFinished {
                run_id,
                result: result.map(map_summary).map_err(|err| map_failure(&err)),
            })
        }
        EngineEvent::DownloadCompleted {
            job_id,
            format,
            result,
        } => {
            let format = unmap_format(format);
            match result {
                Ok(saved) => Feedback::DownloadSaved {
                    format,
                    path: saved.path,
                    byte_len: saved.byte_len,
                },
                Err(err) => {
                    sheet_warn!("Download of {} as {} failed: {}", job_id, format, err);
                    Feedback::DownloadFailed {
                        format,
                        message: err.detail().map(str::to_string).unwrap_or_else(|| err.to_string()),
                    }
                }
            }
        }
    }
}

fn map_failure(err: &BackendError) -> RemoteFailure {
    sheet_warn!("Service call failed: {}", err);
    RemoteFailure {
        detail: err.detail().map(str::to_string),
    }
}

fn map_summary(summary: GenerateSummary) -> GenerationPreview {
    GenerationPreview {
        sections_generated: summary.sections_generated,
        pages_processed: summary.pages_processed,
        extra: summary.extra,
    }
}

fn to_upload(file: SelectedFile) -> UploadFile {
    UploadFile::new(file.name, file.contents)
}

fn map_format(format: DownloadFormat) -> ArtifactFormat {
    match format {
        DownloadFormat::Markdown => ArtifactFormat::Markdown,
        DownloadFormat::Json => ArtifactFormat::Json,
        DownloadFormat::Pdf => ArtifactFormat::Pdf,
    }
}

fn unmap_format(format: ArtifactFormat) -> DownloadFormat {
    match format {
        ArtifactFormat::Markdown => DownloadFormat::Markdown,
        ArtifactFormat::Json => DownloadFormat::Json,
        ArtifactFormat::Pdf => DownloadFormat::Pdf,
    }
}

#[cfg(test)]
mod tests {
    use cheatsheet_core::{DownloadFormat, Msg, RemoteFailure};
    use cheatsheet_engine::{
        BackendError, EngineEvent, FailureKind, GenerateSummary, ParseReceipt,
    };

    use super::{map_event, map_format, unmap_format, Feedback};

    #[test]
    fn formats_map_both_ways_with_same_token() {
        for format in DownloadFormat::ALL {
            let artifact = map_format(format);
            assert_eq!(artifact.token(), format.token());
            assert_eq!(unmap_format(artifact), format);
        }
    }

    #[test]
    fn parse_receipt_becomes_job_id() {
        let event = EngineEvent::ParseCompleted {
            run_id: 3,
            result: Ok(ParseReceipt {
                job_id: "abc123".to_string(),
                doc_type: None,
                pdfs: Vec::new(),
                pages_total: 0,
                status: None,
            }),
        };
        assert_eq!(
            map_event(event),
            Feedback::Msg(Msg::ParseFinished {
                run_id: 3,
                result: Ok("abc123".to_string()),
            })
        );
    }

    #[test]
    fn transport_error_has_no_detail() {
        let event = EngineEvent::GenerateCompleted {
            run_id: 1,
            result: Err(BackendError {
                kind: FailureKind::Network,
                detail: None,
                message: "connection refused".to_string(),
            }),
        };
        assert_eq!(
            map_event(event),
            Feedback::Msg(Msg::GenerateFinished {
                run_id: 1,
                result: Err(RemoteFailure::transport()),
            })
        );
    }

    #[test]
    fn summary_keeps_extra_fields() {
        let mut extra = std::collections::BTreeMap::new();
        extra.insert("pages_selected".to_string(), serde_json::json!(10));
        let event = EngineEvent::GenerateCompleted {
            run_id: 1,
            result: Ok(GenerateSummary {
                sections_generated: 5,
                pages_processed: 12,
                extra,
            }),
        };
        match map_event(event) {
            Feedback::Msg(Msg::GenerateFinished {
                result: Ok(preview),
                ..
            }) => {
                assert_eq!(preview.sections_generated, 5);
                assert_eq!(preview.field("pages_selected"), Some(&serde_json::json!(10)));
            }
            other => panic!("unexpected feedback {other:?}"),
        }
    }
}
