use cheatsheet_logging::sheet_debug;

use crate::view_model::{progress_label, AppViewModel, FileRowView};
use crate::{FileSelection, GenerationJob, GenerationPreview, SelectedFile};

pub type RunId = u64;

/// Document-type tag sent with every parse request unless configured otherwise.
pub const DEFAULT_DOC_TYPE: &str = "cheatsheet";

/// Shown when the service gave no usable reason for a failure.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while generating the cheat sheet. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Uploading,
    Generating,
    Succeeded,
    Failed,
}

impl WorkflowPhase {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Uploading | Self::Generating)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    files: FileSelection,
    doc_type: String,
    phase: WorkflowPhase,
    last_run_id: RunId,
    active_run: Option<RunId>,
    pending_job_id: Option<String>,
    result: Option<GenerationJob>,
    last_error: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            files: FileSelection::new(),
            doc_type: DEFAULT_DOC_TYPE.to_string(),
            phase: WorkflowPhase::Idle,
            last_run_id: 0,
            active_run: None,
            pending_job_id: None,
            result: None,
            last_error: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn files(&self) -> &FileSelection {
        &self.files
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn result(&self) -> Option<&GenerationJob> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active_run
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase,
            busy: self.phase.is_busy(),
            progress_label: progress_label(self.phase),
            files: self
                .files
                .iter()
                .enumerate()
                .map(|(index, file)| FileRowView {
                    index,
                    name: file.name.clone(),
                    size: file.size,
                })
                .collect(),
            can_generate: !self.files.is_empty() && !self.phase.is_busy(),
            job_id: self.result.as_ref().map(|job| job.job_id.clone()),
            preview: self.result.as_ref().map(|job| job.preview.clone()),
            error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn add_files(&mut self, batch: Vec<SelectedFile>) {
        if batch.is_empty() {
            return;
        }
        self.files.add(batch);
        self.mark_dirty();
    }

    pub(crate) fn remove_file(&mut self, index: usize) -> bool {
        let removed = self.files.remove_at(index).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Clears the previous outcome and opens a new run.
    pub(crate) fn begin_run(&mut self) -> RunId {
        self.last_run_id += 1;
        let run_id = self.last_run_id;
        self.active_run = Some(run_id);
        self.result = None;
        self.last_error = None;
        self.pending_job_id = None;
        self.phase = WorkflowPhase::Uploading;
        self.mark_dirty();
        run_id
    }

    /// True when `run_id` belongs to the active run and it is in `expected`.
    pub(crate) fn accepts(&self, run_id: RunId, expected: WorkflowPhase) -> bool {
        let accepted = self.active_run == Some(run_id) && self.phase == expected;
        if !accepted {
            sheet_debug!(
                "Ignoring reply for run {} (active {:?}, phase {:?}, expected {:?})",
                run_id,
                self.active_run,
                self.phase,
                expected
            );
        }
        accepted
    }

    pub(crate) fn parse_succeeded(&mut self, job_id: String) {
        self.pending_job_id = Some(job_id);
        self.phase = WorkflowPhase::Generating;
        self.mark_dirty();
    }

    /// Stores the finished job. Returns false if no job id was pending.
    pub(crate) fn generate_succeeded(&mut self, preview: GenerationPreview) -> bool {
        let Some(job_id) = self.pending_job_id.take() else {
            return false;
        };
        self.result = Some(GenerationJob { job_id, preview });
        self.phase = WorkflowPhase::Succeeded;
        self.active_run = None;
        self.mark_dirty();
        true
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.phase = WorkflowPhase::Failed;
        self.active_run = None;
        self.pending_job_id = None;
        self.result = None;
        self.last_error = Some(message);
        self.mark_dirty();
    }
}
