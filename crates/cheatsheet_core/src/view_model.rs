use crate::{GenerationPreview, WorkflowPhase};

pub const LABEL_UPLOADING: &str = "Uploading and parsing PDFs...";
pub const LABEL_GENERATING: &str = "Generating cheat sheet...";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: WorkflowPhase,
    pub busy: bool,
    pub progress_label: Option<&'static str>,
    pub files: Vec<FileRowView>,
    pub can_generate: bool,
    pub job_id: Option<String>,
    pub preview: Option<GenerationPreview>,
    pub error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub index: usize,
    pub name: String,
    pub size: u64,
}

pub(crate) fn progress_label(phase: WorkflowPhase) -> Option<&'static str> {
    match phase {
        WorkflowPhase::Uploading => Some(LABEL_UPLOADING),
        WorkflowPhase::Generating => Some(LABEL_GENERATING),
        WorkflowPhase::Idle | WorkflowPhase::Succeeded | WorkflowPhase::Failed => None,
    }
}
