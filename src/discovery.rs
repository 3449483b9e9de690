//! Input file discovery
//!
//! Lists the regular files directly inside one directory whose extension
//! matches the configured set (case-insensitive). Subdirectories are not
//! entered. Files come back sorted by name so every run sees the same order.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{Result, TallyError};
use crate::tally::FileTask;

#[derive(Debug, Clone)]
pub struct FileDiscovery {
    extensions: Vec<String>,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new(["txt"])
    }
}

impl FileDiscovery {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Check that `dir` exists and is a directory
    pub fn validate_directory(dir: &Path) -> Result<()> {
        if !dir.exists() {
            return Err(TallyError::config(format!(
                "Directory does not exist: {}",
                dir.display()
            )));
        }
        if !dir.is_dir() {
            return Err(TallyError::config(format!(
                "Provided path is not a directory: {}",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Case-insensitive suffix match on the file name, so a file named
    /// exactly `.txt` counts as a `txt` file
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let name = name.to_lowercase();
        self.extensions.iter().any(|wanted| {
            name.strip_suffix(wanted.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    /// Discover matching files as tasks numbered in discovery order
    pub fn discover(&self, dir: &Path) -> Result<Vec<FileTask>> {
        Self::validate_directory(dir)?;

        let walker = WalkBuilder::new(dir)
            .max_depth(Some(1))
            .standard_filters(false)
            .follow_links(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.depth() == 0 {
                        continue;
                    }
                    let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                    if is_file && self.matches(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory entry: {}", e);
                }
            }
        }

        tracing::debug!("Discovered {} matching files in {}", files.len(), dir.display());
        Ok(FileTask::from_paths(files))
    }
}
