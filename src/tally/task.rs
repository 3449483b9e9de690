use std::path::{Path, PathBuf};

use super::frequency::LocalFrequencyMap;
use crate::error::TallyError;

/// One discovered file waiting to be tokenized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTask {
    index: usize,
    path: PathBuf,
}

impl FileTask {
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// Build tasks from paths, numbering them in the order given
    pub fn from_paths<I, P>(paths: I) -> Vec<FileTask>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| FileTask::new(index, path))
            .collect()
    }

    /// Position in discovery order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for log lines, falling back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// How a single task settled
#[derive(Debug)]
pub enum TaskOutcome {
    Completed(LocalFrequencyMap),
    Failed(TallyError),
    /// Interrupted by a shutdown request; any partial counts are discarded
    Cancelled,
}

impl TaskOutcome {
    /// The map this task contributes to the global table.
    /// Failed and cancelled tasks contribute nothing.
    pub fn into_local_map(self) -> Option<LocalFrequencyMap> {
        match self {
            TaskOutcome::Completed(map) => Some(map),
            TaskOutcome::Failed(_) | TaskOutcome::Cancelled => None,
        }
    }
}
