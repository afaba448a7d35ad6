use anyhow::{Context, Result};
use std::fs::{create_dir_all, File, OpenOptions};
use std::path::{Path, PathBuf};

/// A freshly truncated file inside the output folder
pub struct OutputFile {
    pub file: File,
    pub relative_path: PathBuf,
}

impl OutputFile {
    /// Create (or truncate) `folder/file_name`, creating missing folders
    pub fn new(folder: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        let relative_path = folder.as_ref().join(file_name);

        if let Some(parent) = relative_path.parent() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directories for {:?}", parent))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&relative_path)
            .with_context(|| format!("Failed to open file: {:?}", relative_path))?;

        Ok(OutputFile {
            file,
            relative_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_creates_folders_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("a").join("b");

        let mut out = OutputFile::new(&folder, "x.txt").unwrap();
        out.file.write_all(b"first run").unwrap();
        drop(out);

        let out = OutputFile::new(&folder, "x.txt").unwrap();
        assert_eq!(out.relative_path, folder.join("x.txt"));
        assert_eq!(std::fs::read_to_string(folder.join("x.txt")).unwrap(), "");
    }
}
