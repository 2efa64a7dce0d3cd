use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Sibling of a demo file sharing its stem, e.g. `reports.script`
    pub fn sibling_with_extension<P: AsRef<Path>>(demo: P, extension: &str) -> PathBuf {
        demo.as_ref().with_extension(extension.trim_start_matches('.'))
    }

    // @generates: Sibling directory named `<stem><suffix>`, e.g. `reports_Audio`
    pub fn sibling_dir<P: AsRef<Path>>(demo: P, suffix: &str) -> PathBuf {
        let demo = demo.as_ref();
        let stem = demo.file_stem().unwrap_or_default().to_string_lossy();
        demo.with_file_name(format!("{}{}", stem, suffix))
    }

    // @generates: `<file name><suffix>` next to the original
    pub fn appended_path<P: AsRef<Path>>(path: P, suffix: &str) -> PathBuf {
        let path = path.as_ref();
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        path.with_file_name(format!("{}{}", name, suffix))
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a directory tree. Returns the number of files copied
    pub fn copy_dir_recursive<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<usize> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.is_dir() {
            return Err(anyhow::anyhow!("Source directory does not exist: {:?}", from));
        }
        if to.exists() {
            return Err(anyhow::anyhow!("Target directory already exists: {:?}", to));
        }

        let mut copied = 0;
        for entry in WalkDir::new(from) {
            let entry = entry.context("Failed to read directory entry")?;
            let relative = entry
                .path()
                .strip_prefix(from)
                .with_context(|| format!("Entry outside source directory: {:?}", entry.path()))?;
            let target = to.join(relative);

            if entry.file_type().is_dir() {
                Self::ensure_dir(&target)?;
            } else {
                fs::copy(entry.path(), &target)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), target))?;
                copied += 1;
            }
        }

        Ok(copied)
    }
}
