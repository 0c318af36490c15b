/*!
 * Directory and file scanning functionality
 */

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{Config, DirErrorPolicy};
use crate::error::Result;
use crate::loader::{load_text, ContentStatus};
use crate::report::FileReportInfo;
use crate::sanitize::sanitize_for_xml;
use crate::types::{DirectoryNode, FileNode, Node};

/// Scanner statistics
#[derive(Debug, Clone, Default)]
pub struct ScannerStatistics {
    /// Number of directories walked, root included
    pub directories_scanned: usize,
    /// Number of files packed
    pub files_processed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Files cut by a truncation rule
    pub truncated_files: usize,
    /// Files replaced by the binary placeholder
    pub binary_files: usize,
    /// Files replaced by a read-error placeholder
    pub unreadable_files: usize,
    /// Details for each file, keyed by relative path
    pub file_details: BTreeMap<String, FileReportInfo>,
}

/// What a directory entry resolves to, following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    /// Broken symlinks, sockets, fifos
    Other,
}

/// A direct child of a directory, as listed before filtering
#[derive(Debug, Clone)]
pub struct ListedEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    sort_key: String,
}

impl ListedEntry {
    pub fn new(name: String, path: PathBuf, kind: EntryKind) -> Self {
        let sort_key = name.to_lowercase();
        Self {
            name,
            path,
            kind,
            sort_key,
        }
    }
}

/// Walk order within one directory.
///
/// Everything that is not a regular file comes first, then files. Inside
/// each group names compare case-insensitively, and names that only differ
/// in case fall back to a byte-wise comparison so the order is total.
pub fn entry_order(a: &ListedEntry, b: &ListedEntry) -> Ordering {
    let a_is_file = a.kind == EntryKind::File;
    let b_is_file = b.kind == EntryKind::File;
    a_is_file
        .cmp(&b_is_file)
        .then_with(|| a.sort_key.cmp(&b.sort_key))
        .then_with(|| a.name.cmp(&b.name))
}

/// List the direct children of `dir` in walk order
pub fn list_directory(dir: &Path) -> Result<Vec<ListedEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path().to_path_buf();
        // `Path::is_dir` and `is_file` follow symlinks
        let kind = if path.is_dir() {
            EntryKind::Directory
        } else if path.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        let name = entry.file_name().to_string_lossy().to_string();
        entries.push(ListedEntry::new(name, path, kind));
    }
    entries.sort_by(entry_order);
    Ok(entries)
}

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Scanner statistics
    statistics: RefCell<ScannerStatistics>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            progress,
            statistics: RefCell::new(ScannerStatistics::default()),
        }
    }

    /// Get scanner statistics
    pub fn get_statistics(&self) -> ScannerStatistics {
        self.statistics.borrow().clone()
    }

    /// Scan the target directory and return the directory tree
    pub fn scan(&self) -> Result<DirectoryNode> {
        let target = &self.config.target_dir;
        let abs_path = fs::canonicalize(target).map_err(|e| {
            crate::error!(PathNotFound, "{}: {}", target.display(), e)
        })?;
        crate::ensure!(
            abs_path.is_dir(),
            PathNotFound,
            "{} is not a directory",
            target.display()
        );

        let mut ancestors = vec![abs_path.clone()];
        self.scan_directory(&abs_path, Path::new(""), &mut ancestors)
    }

    /// Scan a directory and return its node representation
    fn scan_directory(
        &self,
        abs_path: &Path,
        rel_path: &Path,
        ancestors: &mut Vec<PathBuf>,
    ) -> Result<DirectoryNode> {
        let entries = list_directory(abs_path)?;
        self.statistics.borrow_mut().directories_scanned += 1;

        let filter = &self.config.filter;
        let mut contents = Vec::new();

        for entry in entries {
            if filter.is_excluded(&entry.name) {
                debug!(path = %entry.path.display(), "excluded");
                continue;
            }
            let new_rel_path = rel_path.join(&entry.name);

            match entry.kind {
                EntryKind::Directory => {
                    let canonical =
                        fs::canonicalize(&entry.path).unwrap_or_else(|_| entry.path.clone());
                    if ancestors.contains(&canonical) {
                        warn!(path = %entry.path.display(), "skipping symlink loop");
                        continue;
                    }

                    ancestors.push(canonical);
                    let result = self.scan_directory(&entry.path, &new_rel_path, ancestors);
                    ancestors.pop();

                    match result {
                        Ok(dir_node) => contents.push(Node::Directory(dir_node)),
                        Err(e) if self.config.dir_error_policy == DirErrorPolicy::Skip => {
                            warn!(
                                path = %entry.path.display(),
                                error = %e,
                                "skipping unreadable directory"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
                EntryKind::File if filter.is_includable(&entry.name) => {
                    contents.push(self.process_file(&entry, &new_rel_path));
                }
                _ => debug!(path = %entry.path.display(), "not eligible"),
            }
        }

        let name = abs_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(DirectoryNode {
            name: sanitize_for_xml(&name),
            path: rel_path.to_path_buf(),
            contents,
        })
    }

    /// Load, truncate and sanitize a single file
    fn process_file(&self, entry: &ListedEntry, rel_path: &Path) -> Node {
        self.progress.inc(1);
        self.progress
            .set_message(format!("Current file: {}", display_name(&entry.name, 40)));

        let rule = self.config.filter.truncation_for(&entry.name);
        let loaded = load_text(&entry.path, rule);
        let content = sanitize_for_xml(&loaded.text);

        {
            let lines = content.lines().count();
            let chars = content.chars().count();
            let mut stats = self.statistics.borrow_mut();
            stats.files_processed += 1;
            stats.total_lines += lines;
            stats.total_chars += chars;
            match loaded.status {
                ContentStatus::Full => {}
                ContentStatus::Truncated => stats.truncated_files += 1,
                ContentStatus::Binary => stats.binary_files += 1,
                ContentStatus::Unreadable => stats.unreadable_files += 1,
            }
            stats.file_details.insert(
                rel_path.to_string_lossy().to_string(),
                FileReportInfo {
                    lines,
                    chars,
                    status: loaded.status,
                },
            );
        }

        Node::File(FileNode {
            name: sanitize_for_xml(&entry.name),
            path: rel_path.to_path_buf(),
            content,
        })
    }
}

/// Shorten long names from the left so the progress line stays readable
fn display_name(name: &str, max_chars: usize) -> String {
    let count = name.chars().count();
    if count <= max_chars {
        return name.to_string();
    }
    let tail: String = name.chars().skip(count - (max_chars - 3)).collect();
    format!("...{}", tail)
}
