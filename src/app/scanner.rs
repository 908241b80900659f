use crate::app::binary::{dotted_extension, is_likely_binary};
use crate::app::formatter::tree_prefix;
use crate::app::models::{FileRef, ScanConfig, ScanResult};
use pathdiff::diff_paths;
use std::fs::{self, DirEntry, Metadata};
use std::path::{Path, PathBuf};

enum EntryKind {
    File,
    Dir,
    /// Symlinks, sockets, FIFOs and devices: listed for positioning, never drawn.
    Skipped,
}

/// A raw directory entry in listing order.
struct Listed {
    entry: DirEntry,
    kind: EntryKind,
}

/// One directory entry that passed every filter and will be drawn.
struct Visible {
    name: String,
    path: PathBuf,
    relative: String,
    metadata: Metadata,
    is_dir: bool,
}

/// Depth-first, pre-order walk that produces the tree text and the list of
/// included files in one pass.
///
/// Within a directory files come first, then subdirectories, each group sorted
/// byte-wise by name. The same order drives both outputs.
pub struct TreeScanner<'a> {
    root: PathBuf,
    config: &'a ScanConfig,
}

impl<'a> TreeScanner<'a> {
    pub fn new(root: PathBuf, config: &'a ScanConfig) -> Self {
        Self { root, config }
    }

    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();
        let mut ancestors = Vec::new();
        self.walk(&self.root, self.config.max_depth, &mut ancestors, &mut result);
        result
    }

    /// `ancestors` holds one "was last sibling" flag per directory above `dir`.
    /// Callers push before recursing and pop on return.
    fn walk(
        &self,
        dir: &Path,
        remaining: Option<usize>,
        ancestors: &mut Vec<bool>,
        result: &mut ScanResult,
    ) {
        if remaining == Some(0) {
            return;
        }

        let entries = match self.list_sorted(dir) {
            Ok(entries) => entries,
            Err(e) => {
                let name = dir.file_name().unwrap_or_default().to_string_lossy();
                if ancestors.is_empty() {
                    log::warn!(
                        "Cannot access contents of {}. Skipping. ({:?})",
                        dir.display(),
                        e.kind()
                    );
                } else {
                    log::warn!("Cannot access {}: {}", dir.display(), e);
                    result.tree_text.push_str(&format!(
                        "{}└── [!] Cannot access: {}/ ({:?})\n",
                        tree_prefix(ancestors),
                        name,
                        e.kind()
                    ));
                }
                return;
            }
        };

        let prefix = tree_prefix(ancestors);
        let count = entries.len();
        for (i, listed) in entries.into_iter().enumerate() {
            // Last-ness is positional over the full listing, before any filter runs.
            let is_last = i + 1 == count;
            let Some(item) = self.admit(listed) else {
                continue;
            };
            let connector = if is_last { "└──" } else { "├──" };

            if item.is_dir {
                result
                    .tree_text
                    .push_str(&format!("{}{} {}/\n", prefix, connector, item.name));
                ancestors.push(is_last);
                self.walk(
                    &item.path,
                    remaining.map(|d| d - 1),
                    ancestors,
                    result,
                );
                ancestors.pop();
            } else {
                result
                    .tree_text
                    .push_str(&format!("{}{} {}\n", prefix, connector, item.name));
                result.included_files.push(FileRef {
                    path: item.path,
                    relative_path: item.relative,
                    metadata: item.metadata,
                });
            }
        }
    }

    /// Reads `dir` and returns every entry ordered files-then-directories. Symlinks
    /// are grouped by their target (dangling ones with the files) and kept so the
    /// listing positions match the directory.
    fn list_sorted(&self, dir: &Path) -> std::io::Result<Vec<Listed>> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Error reading entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    log::warn!("Cannot stat {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let (kind, groups_as_dir) = if file_type.is_symlink() {
                let target_is_dir = fs::metadata(entry.path()).is_ok_and(|m| m.is_dir());
                (EntryKind::Skipped, target_is_dir)
            } else if file_type.is_dir() {
                (EntryKind::Dir, true)
            } else if file_type.is_file() {
                (EntryKind::File, false)
            } else {
                (EntryKind::Skipped, false)
            };

            if groups_as_dir {
                dirs.push(Listed { entry, kind });
            } else {
                files.push(Listed { entry, kind });
            }
        }

        files.sort_by_key(|l| l.entry.file_name());
        dirs.sort_by_key(|l| l.entry.file_name());
        files.extend(dirs);
        Ok(files)
    }

    /// Drops symlinks and special files, then applies the ignore set and (for
    /// files) the extension, size and binary checks. The first failing check
    /// excludes the entry silently.
    fn admit(&self, listed: Listed) -> Option<Visible> {
        let is_dir = match listed.kind {
            EntryKind::Skipped => return None,
            EntryKind::Dir => true,
            EntryKind::File => false,
        };
        let entry = listed.entry;
        let path = entry.path();
        let relative = diff_paths(&path, &self.root)?
            .to_string_lossy()
            .replace('\\', "/");

        if self.config.ignore.should_ignore(&relative, is_dir) {
            return None;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Cannot stat {}: {}", path.display(), e);
                return None;
            }
        };

        if !is_dir {
            if !self.extension_allowed(&name) {
                return None;
            }
            if self
                .config
                .max_file_size_bytes
                .is_some_and(|limit| metadata.len() > limit)
            {
                return None;
            }
            if is_likely_binary(&path, metadata.len()) {
                return None;
            }
        }

        Some(Visible {
            name,
            path,
            relative,
            metadata,
            is_dir,
        })
    }

    fn extension_allowed(&self, name: &str) -> bool {
        let allowed = &self.config.extensions;
        dotted_extension(name).is_some_and(|ext| allowed.contains(&ext))
            || allowed.contains(&name.to_lowercase())
    }
}
