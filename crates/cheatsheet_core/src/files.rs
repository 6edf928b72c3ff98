use bytes::Bytes;

/// A file the user picked for upload.
///
/// Names are display-only and may repeat; a file is identified by its
/// position in the [`FileSelection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub contents: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        let contents = contents.into();
        Self {
            name: name.into(),
            size: contents.len() as u64,
            contents,
        }
    }
}

/// Ordered batch of files waiting to be submitted.
///
/// Newly added batches go in front of what is already held.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `new_files`, keeping their relative order.
    pub fn add(&mut self, new_files: Vec<SelectedFile>) {
        if new_files.is_empty() {
            return;
        }
        let mut merged = new_files;
        merged.append(&mut self.files);
        self.files = merged;
    }

    /// Removes the file at `index`. Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<SelectedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }
}
