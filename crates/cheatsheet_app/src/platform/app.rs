use std::io::{self, Write};
use std::time::Duration;

use cheatsheet_core::{update, AppState, DownloadFormat, Effect, Msg, WorkflowPhase};
use cheatsheet_logging::sheet_debug;

use super::effects::{EffectRunner, Feedback};
use super::render;

/// How long to wait for the engine before printing the progress label again.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { job_id: String },
    Failed { message: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub saved: usize,
    pub failed: usize,
}

/// Owns the core state and drives it with user intents and engine replies.
pub struct Session<W: Write, E: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
    err: E,
    pending_downloads: usize,
    report: DownloadReport,
    notice: Option<String>,
}

impl<W: Write, E: Write> Session<W, E> {
    pub fn new(state: AppState, runner: EffectRunner, out: W, err: E) -> Self {
        Self {
            state,
            runner,
            out,
            err,
            pending_downloads: 0,
            report: DownloadReport::default(),
            notice: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let before = state.phase();
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        self.state = state;

        if changed && self.state.phase() != before {
            sheet_debug!("Phase {:?} -> {:?}", before, self.state.phase());
            render::render_progress(&mut self.err, &self.state.view())?;
        }
        self.run_effects(effects)
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> io::Result<()> {
        self.pending_downloads += effects
            .iter()
            .filter(|effect| matches!(effect, Effect::OpenDownload(_)))
            .count();
        for feedback in self.runner.run(effects) {
            self.handle(feedback)?;
        }
        Ok(())
    }

    fn handle(&mut self, feedback: Feedback) -> io::Result<()> {
        match feedback {
            Feedback::Msg(msg) => self.dispatch(msg),
            Feedback::Notify(message) => {
                render::render_failure(&mut self.err, &message)?;
                self.notice = Some(message);
                Ok(())
            }
            Feedback::DownloadSaved {
                format,
                path,
                byte_len,
            } => {
                self.pending_downloads = self.pending_downloads.saturating_sub(1);
                self.report.saved += 1;
                render::render_saved(&mut self.out, format, &path, byte_len)
            }
            Feedback::DownloadFailed { format, message } => {
                self.pending_downloads = self.pending_downloads.saturating_sub(1);
                self.report.failed += 1;
                writeln!(self.err, "Could not download {format}: {message}")
            }
        }
    }

    /// Runs one generation for the current files and waits for it to settle.
    /// Returns `None` when there was nothing to do.
    pub fn generate(&mut self) -> io::Result<Option<RunOutcome>> {
        render::render_files(&mut self.out, &self.state.view())?;
        self.notice = None;
        self.dispatch(Msg::GenerateClicked)?;
        if !self.state.phase().is_busy() {
            return Ok(None);
        }

        while self.state.phase().is_busy() {
            match self.runner.next(PROGRESS_INTERVAL) {
                Some(feedback) => self.handle(feedback)?,
                None => render::render_progress(&mut self.err, &self.state.view())?,
            }
        }

        let view = self.state.view();
        let outcome = match (self.state.phase(), self.state.result()) {
            (WorkflowPhase::Succeeded, Some(job)) => {
                render::render_result(&mut self.out, &view)?;
                RunOutcome::Succeeded {
                    job_id: job.job_id.clone(),
                }
            }
            _ => RunOutcome::Failed {
                message: self
                    .notice
                    .clone()
                    .or(view.error)
                    .unwrap_or_else(|| cheatsheet_core::GENERIC_FAILURE_MESSAGE.to_string()),
            },
        };
        Ok(Some(outcome))
    }

    /// Requests each format for the held job and waits until all are saved or failed.
    pub fn download(&mut self, formats: &[DownloadFormat]) -> io::Result<DownloadReport> {
        self.report = DownloadReport::default();
        for format in formats {
            self.dispatch(Msg::DownloadClicked(*format))?;
        }
        while self.pending_downloads > 0 {
            match self.runner.next(PROGRESS_INTERVAL) {
                Some(feedback) => self.handle(feedback)?,
                None => writeln!(self.err, "Waiting for downloads...")?,
            }
        }
        Ok(std::mem::take(&mut self.report))
    }

    #[cfg(test)]
    pub fn into_writers(self) -> (W, E) {
        (self.out, self.err)
    }
}
