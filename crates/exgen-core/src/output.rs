use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::GeneratedFile;

/// Result of writing one generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File was skipped (already exists)
    Skipped,
}

/// Outcome of writing a batch of files, in write order.
#[derive(Debug, Default, Clone)]
pub struct WriteReport {
    pub entries: Vec<(PathBuf, WriteResult)>,
}

impl WriteReport {
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .filter(|(_, r)| *r == WriteResult::Written)
            .map(|(p, _)| p.as_path())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .filter(|(_, r)| *r == WriteResult::Skipped)
            .map(|(p, _)| p.as_path())
    }

    pub fn extend(&mut self, other: WriteReport) {
        self.entries.extend(other.entries);
    }
}

/// Write `file` under `base` only if nothing exists at the target path yet.
/// Generated files are never overwritten.
pub fn write_if_absent(base: &Path, file: &GeneratedFile) -> io::Result<(PathBuf, WriteResult)> {
    let path = base.join(&file.path);
    if path.exists() {
        log::debug!("skipping existing {}", path.display());
        return Ok((path, WriteResult::Skipped));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &file.content)?;
    log::debug!("wrote {}", path.display());
    Ok((path, WriteResult::Written))
}

/// Write every file in order, each in full before the next begins.
pub fn write_all_if_absent(
    base: &Path,
    files: &[GeneratedFile],
) -> Result<WriteReport, (PathBuf, io::Error)> {
    let mut report = WriteReport::default();
    for file in files {
        let entry = write_if_absent(base, file).map_err(|e| (base.join(&file.path), e))?;
        report.entries.push(entry);
    }
    Ok(report)
}
