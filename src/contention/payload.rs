//! Host-side payload files pushed by contention workers

use crate::error::{AppError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Payload size class; each class has its own worker count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    pub fn file_name(&self) -> &'static str {
        match self {
            SizeClass::Small => "small.txt",
            SizeClass::Medium => "med.txt",
            SizeClass::Large => "large.txt",
        }
    }

    /// Size used when the payload has to be generated
    pub fn default_size(&self) -> u64 {
        match self {
            SizeClass::Small => 4 * 1024,
            SizeClass::Medium => 1024 * 1024,
            SizeClass::Large => 16 * 1024 * 1024,
        }
    }
}

/// The three source files contention workers push, one per size class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentionFiles {
    pub small: PathBuf,
    pub medium: PathBuf,
    pub large: PathBuf,
}

impl ContentionFiles {
    /// `small.txt`, `med.txt` and `large.txt` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            small: dir.join(SizeClass::Small.file_name()),
            medium: dir.join(SizeClass::Medium.file_name()),
            large: dir.join(SizeClass::Large.file_name()),
        }
    }

    pub fn path(&self, class: SizeClass) -> &Path {
        match class {
            SizeClass::Small => &self.small,
            SizeClass::Medium => &self.medium,
            SizeClass::Large => &self.large,
        }
    }

    /// Generate any payload that does not exist yet.
    ///
    /// Existing files are left alone whatever their size. Returns the paths
    /// that were written.
    pub fn prepare(&self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for class in SizeClass::ALL {
            let path = self.path(class);
            if path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::io(format!("Failed to create payload directory {}: {}", parent.display(), e))
                })?;
            }
            write_payload(path, class.default_size())?;
            written.push(path.to_path_buf());
        }
        Ok(written)
    }
}

fn write_payload(path: &Path, size: u64) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create payload {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    // Plain text lines keep the payloads readable on the guest
    let line = b"contention payload ........................................ \n";
    let mut remaining = size;
    while remaining > 0 {
        let chunk = remaining.min(line.len() as u64) as usize;
        writer.write_all(&line[..chunk])?;
        remaining -= chunk as u64;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_in_dir() {
        let files = ContentionFiles::in_dir(Path::new("contention"));
        assert_eq!(files.path(SizeClass::Small), Path::new("contention/small.txt"));
        assert_eq!(files.path(SizeClass::Medium), Path::new("contention/med.txt"));
        assert_eq!(files.path(SizeClass::Large), Path::new("contention/large.txt"));
    }

    #[test]
    fn test_prepare_generates_missing_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let files = ContentionFiles::in_dir(&dir.path().join("contention"));

        std::fs::create_dir_all(dir.path().join("contention")).unwrap();
        std::fs::write(&files.small, "hand made").unwrap();

        let written = files.prepare().unwrap();
        assert_eq!(written, vec![files.medium.clone(), files.large.clone()]);

        assert_eq!(std::fs::read_to_string(&files.small).unwrap(), "hand made");
        assert_eq!(std::fs::metadata(&files.medium).unwrap().len(), SizeClass::Medium.default_size());
        assert_eq!(std::fs::metadata(&files.large).unwrap().len(), SizeClass::Large.default_size());

        assert!(files.prepare().unwrap().is_empty());
    }
}
