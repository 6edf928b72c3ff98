//! Terminal presentation of the view model.

use std::io::{self, Write};
use std::path::Path;

use cheatsheet_core::{AppViewModel, DownloadFormat, GenerationPreview};

const TRUNCATED_MARKER: &str = "\n... [truncated]";
pub const MAX_PREVIEW_CHARS: usize = 4_096;

pub fn render_files(out: &mut impl Write, view: &AppViewModel) -> io::Result<()> {
    if view.files.is_empty() {
        return writeln!(out, "No files selected.");
    }
    writeln!(out, "Selected files:")?;
    for row in &view.files {
        writeln!(
            out,
            "  [{:>2}] {}  ({})",
            row.index,
            row.name,
            format_megabytes(row.size)
        )?;
    }
    Ok(())
}

pub fn render_progress(out: &mut impl Write, view: &AppViewModel) -> io::Result<()> {
    match view.progress_label {
        Some(label) => writeln!(out, "{label}"),
        None => Ok(()),
    }
}

/// Blocking notification for a failed run.
pub fn render_failure(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "Error: {message}")?;
    out.flush()
}

pub fn render_result(out: &mut impl Write, view: &AppViewModel) -> io::Result<()> {
    let (Some(job_id), Some(preview)) = (view.job_id.as_deref(), view.preview.as_ref()) else {
        return Ok(());
    };
    writeln!(out, "Cheat sheet ready (job {job_id})")?;
    writeln!(
        out,
        "  {} sections from {} pages",
        preview.sections_generated, preview.pages_processed
    )?;
    writeln!(out, "{}", preview_dump(preview))
}

pub fn render_saved(
    out: &mut impl Write,
    format: DownloadFormat,
    path: &Path,
    byte_len: u64,
) -> io::Result<()> {
    writeln!(
        out,
        "Saved {format} to {} ({})",
        path.display(),
        format_megabytes(byte_len)
    )
}

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Pretty JSON of the whole preview, cut at [`MAX_PREVIEW_CHARS`].
pub fn preview_dump(preview: &GenerationPreview) -> String {
    let dump = serde_json::to_string_pretty(preview)
        .unwrap_or_else(|err| format!("<preview not printable: {err}>"));
    truncate(&dump, MAX_PREVIEW_CHARS)
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{TRUNCATED_MARKER}", &text[..end])
}
