use crate::app::ignore::IgnoreSet;
use std::collections::HashSet;
use std::fs::Metadata;
use std::path::PathBuf;

/// Effective settings for a single scan. Built once, never mutated while walking.
#[derive(Debug)]
pub struct ScanConfig {
    /// Lower-cased extensions (".rs") and bare file names ("dockerfile").
    pub extensions: HashSet<String>,
    /// `None` means unbounded.
    pub max_depth: Option<usize>,
    /// `None` means unbounded.
    pub max_file_size_bytes: Option<u64>,
    pub ignore: IgnoreSet,
}

impl ScanConfig {
    pub fn new<I, S>(extensions: I, ignore: IgnoreSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            max_depth: None,
            max_file_size_bytes: None,
            ignore,
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_file_size_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_file_size_bytes = limit;
        self
    }
}

/// A file that survived every filter during the scan.
#[derive(Debug, Clone)]
pub struct FileRef {
    pub path: PathBuf,
    /// Relative to the scan root, always `/`-separated.
    pub relative_path: String,
    pub metadata: Metadata,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub included_files: Vec<FileRef>,
    pub tree_text: String,
}
