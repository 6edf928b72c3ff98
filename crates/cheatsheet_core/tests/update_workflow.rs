use std::sync::Once;

use cheatsheet_core::{
    update, AppState, Effect, GenerationJob, GenerationPreview, Msg, RemoteFailure, RunId,
    SelectedFile, WorkflowPhase, DEFAULT_DOC_TYPE, GENERIC_FAILURE_MESSAGE, LABEL_GENERATING,
    LABEL_UPLOADING,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(cheatsheet_logging::initialize_for_tests);
}

fn with_files(names: &[&str]) -> AppState {
    let batch = names
        .iter()
        .map(|name| SelectedFile::new(*name, b"%PDF-1.4".to_vec()))
        .collect();
    let (state, _) = update(AppState::new(), Msg::FilesAdded(batch));
    state
}

fn start(state: AppState) -> (AppState, RunId) {
    let (state, effects) = update(state, Msg::GenerateClicked);
    let run_id = match effects.as_slice() {
        [Effect::SubmitParse { run_id, .. }] => *run_id,
        other => panic!("expected a single SubmitParse, got {other:?}"),
    };
    (state, run_id)
}

fn parsed(state: AppState, run_id: RunId, job_id: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ParseFinished {
            run_id,
            result: Ok(job_id.to_string()),
        },
    )
}

fn sample_preview() -> GenerationPreview {
    GenerationPreview::new(5, 12)
}

#[test]
fn generate_submits_snapshot_of_files_with_doc_type() {
    init_logging();
    let state = with_files(&["a.pdf", "b.pdf"]);

    let (state, effects) = update(state, Msg::GenerateClicked);

    assert_eq!(state.phase(), WorkflowPhase::Uploading);
    match effects.as_slice() {
        [Effect::SubmitParse {
            run_id,
            files,
            doc_type,
        }] => {
            assert_eq!(*run_id, 1);
            assert_eq!(doc_type, DEFAULT_DOC_TYPE);
            let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    let view = state.view();
    assert!(view.busy);
    assert_eq!(view.progress_label, Some(LABEL_UPLOADING));
}

#[test]
fn configured_doc_type_is_sent() {
    init_logging();
    let batch = vec![SelectedFile::new("a.pdf", Vec::new())];
    let (state, _) = update(
        AppState::new().with_doc_type("summary"),
        Msg::FilesAdded(batch),
    );

    let (_state, effects) = update(state, Msg::GenerateClicked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::SubmitParse { doc_type, .. }] if doc_type == "summary"
    ));
}

#[test]
fn successful_run_holds_job_and_preview() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));

    let (state, effects) = parsed(state, run_id, "abc123");
    assert_eq!(state.phase(), WorkflowPhase::Generating);
    assert_eq!(state.view().progress_label, Some(LABEL_GENERATING));
    assert_eq!(
        effects,
        vec![Effect::SubmitGenerate {
            run_id,
            job_id: "abc123".to_string(),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            run_id,
            result: Ok(sample_preview()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), WorkflowPhase::Succeeded);
    assert_eq!(
        state.result(),
        Some(&GenerationJob {
            job_id: "abc123".to_string(),
            preview: sample_preview(),
        })
    );
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.progress_label, None);
    assert_eq!(view.job_id.as_deref(), Some("abc123"));
    assert_eq!(view.preview.map(|p| p.sections_generated), Some(5));
}

#[test]
fn parse_rejection_surfaces_detail_and_skips_generate() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));

    let (state, effects) = update(
        state,
        Msg::ParseFinished {
            run_id,
            result: Err(RemoteFailure::rejected("unsupported file")),
        },
    );

    assert_eq!(state.phase(), WorkflowPhase::Failed);
    assert_eq!(state.last_error(), Some("unsupported file"));
    assert_eq!(
        effects,
        vec![Effect::NotifyFailure {
            message: "unsupported file".to_string(),
        }]
    );
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::SubmitGenerate { .. })));
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.progress_label, None);
}

#[test]
fn generate_failure_without_detail_uses_generic_message() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));
    let (state, _) = parsed(state, run_id, "abc123");

    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            run_id,
            result: Err(RemoteFailure::transport()),
        },
    );

    assert_eq!(state.phase(), WorkflowPhase::Failed);
    assert_eq!(state.last_error(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(state.result(), None);
    assert_eq!(
        effects,
        vec![Effect::NotifyFailure {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }]
    );
}

#[test]
fn blank_detail_falls_back_to_generic_message() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));

    let (state, _) = update(
        state,
        Msg::ParseFinished {
            run_id,
            result: Err(RemoteFailure::rejected("   ")),
        },
    );
    assert_eq!(state.last_error(), Some(GENERIC_FAILURE_MESSAGE));
}

#[test]
fn new_run_clears_previous_result_and_failure_does_not_restore_it() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));
    let (state, _) = parsed(state, run_id, "first");
    let (state, _) = update(
        state,
        Msg::GenerateFinished {
            run_id,
            result: Ok(sample_preview()),
        },
    );
    assert!(state.result().is_some());

    let (state, second_run) = start(state);
    assert_eq!(second_run, run_id + 1);
    assert_eq!(state.result(), None);
    assert_eq!(state.view().job_id, None);

    let (state, _) = parsed(state, second_run, "second");
    let (state, _) = update(
        state,
        Msg::GenerateFinished {
            run_id: second_run,
            result: Err(RemoteFailure::default()),
        },
    );
    assert_eq!(state.phase(), WorkflowPhase::Failed);
    assert_eq!(state.result(), None);
}

#[test]
fn retry_after_failure_starts_fresh_run() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));
    let (state, _) = update(
        state,
        Msg::ParseFinished {
            run_id,
            result: Err(RemoteFailure::transport()),
        },
    );

    let (state, retry_run) = start(state);
    assert_eq!(state.phase(), WorkflowPhase::Uploading);
    assert_eq!(state.last_error(), None);
    assert_ne!(retry_run, run_id);
}

#[test]
fn generate_while_busy_is_rejected() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));

    let (state, effects) = update(state, Msg::GenerateClicked);
    assert!(effects.is_empty());
    assert_eq!(state.active_run(), Some(run_id));
    assert!(!state.view().can_generate);

    let (state, _) = parsed(state, run_id, "abc123");
    let (state, effects) = update(state, Msg::GenerateClicked);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), WorkflowPhase::Generating);
}

#[test]
fn stale_and_out_of_phase_replies_are_ignored() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf"]));

    // Reply for a run that never existed.
    let (state, effects) = parsed(state, run_id + 7, "ghost");
    assert!(effects.is_empty());
    assert_eq!(state.phase(), WorkflowPhase::Uploading);

    // Generate reply before parse finished.
    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            run_id,
            result: Ok(sample_preview()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), WorkflowPhase::Uploading);
    assert_eq!(state.result(), None);
}

#[test]
fn editing_files_mid_run_does_not_disturb_run() {
    init_logging();
    let (state, run_id) = start(with_files(&["a.pdf", "b.pdf"]));

    let (state, _) = update(state, Msg::FileRemoved { index: 0 });
    let (state, effects) = parsed(state, run_id, "abc123");

    assert_eq!(state.files().len(), 1);
    assert_eq!(state.phase(), WorkflowPhase::Generating);
    assert_eq!(effects.len(), 1);
}
