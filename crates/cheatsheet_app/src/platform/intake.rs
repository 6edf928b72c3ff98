//! File intake: turns path arguments into a batch for the selection store.

use std::fs;
use std::path::{Path, PathBuf};

use cheatsheet_core::SelectedFile;
use cheatsheet_logging::sheet_debug;
use thiserror::Error;

/// Most files accepted in one batch.
pub const MAX_FILES: usize = 20;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("at most {max} files can be uploaded at once (got {count})")]
    TooMany { count: usize, max: usize },
    #[error("{0:?} is not a PDF file")]
    NotPdf(PathBuf),
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Reads every path into a [`SelectedFile`], preserving argument order.
/// The whole batch is rejected if any path is unacceptable.
pub fn load_batch(paths: &[PathBuf]) -> Result<Vec<SelectedFile>, IntakeError> {
    if paths.len() > MAX_FILES {
        return Err(IntakeError::TooMany {
            count: paths.len(),
            max: MAX_FILES,
        });
    }
    if let Some(bad) = paths.iter().find(|path| !is_pdf(path)) {
        return Err(IntakeError::NotPdf(bad.clone()));
    }

    paths
        .iter()
        .map(|path| {
            let contents = fs::read(path).map_err(|source| IntakeError::Io {
                path: path.clone(),
                source,
            })?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            sheet_debug!("Picked {} ({} bytes)", name, contents.len());
            Ok(SelectedFile::new(name, contents))
        })
        .collect()
}
