use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use pathdiff::diff_paths;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid ignore pattern '{pattern}': {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: globset::Error,
}

/// Rewrites a gitignore-style pattern into the flat glob form used for matching.
///
/// A leading `/` is dropped, and a pattern without any `/` is anchored with `**/`
/// so that it matches at any depth.
pub fn normalize_pattern(pattern: &str) -> String {
    let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
    if pattern.starts_with("**/") || pattern.starts_with("**\\") || pattern.contains('/') {
        pattern.to_string()
    } else {
        format!("**/{}", pattern)
    }
}

/// Compiles one raw pattern. `*` stays within a path segment, `**` crosses them.
pub fn compile_pattern(pattern: &str) -> Result<Glob, PatternError> {
    GlobBuilder::new(&normalize_pattern(pattern))
        .literal_separator(true)
        .build()
        .map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })
}

/// The union of every ignore pattern in effect for a scan.
#[derive(Debug, Default)]
pub struct IgnoreSet {
    set: Option<GlobSet>,
    len: usize,
}

impl IgnoreSet {
    /// Merges configured patterns, CLI patterns and (optionally) every `.gitignore`
    /// between `root` and the enclosing repository root.
    pub fn build(
        config_patterns: &[String],
        cli_patterns: &[String],
        use_gitignore: bool,
        root: &Path,
    ) -> Self {
        let mut patterns: Vec<String> = config_patterns.to_vec();
        patterns.extend(cli_patterns.iter().cloned());

        if use_gitignore {
            for gitignore in find_gitignore_files(root) {
                let shown = diff_paths(&gitignore, root).unwrap_or_else(|| gitignore.clone());
                log::info!("Loading ignore patterns from: {}", shown.display());
                match read_gitignore(&gitignore) {
                    Ok(lines) => patterns.extend(lines),
                    Err(e) => log::warn!(
                        "Could not read or parse {}: {}",
                        gitignore.display(),
                        e
                    ),
                }
            }
        }

        Self::from_patterns(&patterns)
    }

    /// Compiles patterns into one set. Malformed patterns are logged and skipped.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        if patterns.is_empty() {
            return Self::default();
        }

        let mut builder = GlobSetBuilder::new();
        let mut len = 0;
        for pat in patterns {
            match compile_pattern(pat.as_ref()) {
                Ok(glob) => {
                    builder.add(glob);
                    len += 1;
                }
                Err(e) => log::warn!("Failed to parse ignore pattern: {}", e),
            }
        }

        if len == 0 {
            return Self::default();
        }

        match builder.build() {
            Ok(set) => Self {
                set: Some(set),
                len,
            },
            Err(e) => {
                log::warn!("Failed to build ignore matcher, ignoring nothing: {}", e);
                Self::default()
            }
        }
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `relative_path` is `/`-separated and relative to the scan root. Directories are
    /// tested with a trailing `/`.
    pub fn should_ignore(&self, relative_path: &str, is_dir: bool) -> bool {
        let Some(set) = &self.set else {
            return false;
        };
        if is_dir && !relative_path.ends_with('/') {
            set.is_match(format!("{}/", relative_path))
        } else {
            set.is_match(relative_path)
        }
    }
}

/// Every `.gitignore` from `start` upward, nearest first. Stops after the first
/// directory holding `.git`, or at the filesystem root.
pub fn find_gitignore_files(start: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in start.ancestors() {
        let candidate = dir.join(".gitignore");
        if candidate.is_file() {
            found.push(candidate);
        }
        if dir.join(".git").is_dir() {
            break;
        }
    }
    found
}

fn read_gitignore(path: &Path) -> std::io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
