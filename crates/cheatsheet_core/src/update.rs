use cheatsheet_logging::{sheet_debug, sheet_info, sheet_warn};

use crate::{
    AppState, DownloadRequest, Effect, Msg, RemoteFailure, WorkflowPhase, GENERIC_FAILURE_MESSAGE,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesAdded(batch) => {
            state.add_files(batch);
            Vec::new()
        }
        Msg::FileRemoved { index } => {
            if !state.remove_file(index) {
                sheet_debug!(
                    "Ignoring removal of index {} from {} files",
                    index,
                    state.files().len()
                );
            }
            Vec::new()
        }
        Msg::GenerateClicked => {
            if state.files().is_empty() {
                return (state, Vec::new());
            }
            // Runs never overlap: a second request while one is in flight is dropped.
            if state.phase().is_busy() {
                sheet_debug!("Generate requested while {:?}; ignoring", state.phase());
                return (state, Vec::new());
            }
            let run_id = state.begin_run();
            let files = state.files().as_slice().to_vec();
            sheet_info!(
                "Run {} started with {} files ({} bytes)",
                run_id,
                files.len(),
                state.files().total_bytes()
            );
            vec![Effect::SubmitParse {
                run_id,
                files,
                doc_type: state.doc_type().to_string(),
            }]
        }
        Msg::ParseFinished { run_id, result } => {
            if !state.accepts(run_id, WorkflowPhase::Uploading) {
                return (state, Vec::new());
            }
            match result {
                Ok(job_id) => {
                    sheet_info!("Run {} parsed as job {}", run_id, job_id);
                    state.parse_succeeded(job_id.clone());
                    vec![Effect::SubmitGenerate { run_id, job_id }]
                }
                Err(failure) => fail_run(&mut state, run_id, &failure),
            }
        }
        Msg::GenerateFinished { run_id, result } => {
            if !state.accepts(run_id, WorkflowPhase::Generating) {
                return (state, Vec::new());
            }
            match result {
                Ok(preview) => {
                    if state.generate_succeeded(preview) {
                        sheet_info!("Run {} succeeded", run_id);
                        Vec::new()
                    } else {
                        fail_run(&mut state, run_id, &RemoteFailure::transport())
                    }
                }
                Err(failure) => fail_run(&mut state, run_id, &failure),
            }
        }
        Msg::DownloadClicked(format) => match state.result() {
            Some(job) => vec![Effect::OpenDownload(DownloadRequest {
                job_id: job.job_id.clone(),
                format,
            })],
            None => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn fail_run(state: &mut AppState, run_id: crate::RunId, failure: &RemoteFailure) -> Vec<Effect> {
    let message = failure_message(failure);
    sheet_warn!("Run {} failed during {:?}: {}", run_id, state.phase(), message);
    state.fail(message.clone());
    vec![Effect::NotifyFailure { message }]
}

fn failure_message(failure: &RemoteFailure) -> String {
    failure
        .detail
        .as_deref()
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .unwrap_or(GENERIC_FAILURE_MESSAGE)
        .to_string()
}
