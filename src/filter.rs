/*!
 * Filter policy: which entries are skipped, which files are packed
 */

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Default output file name, also excluded from every walk
pub const DEFAULT_OUTPUT_NAME: &str = "pkm_summary.xml";

/// Names skipped by default, whether file or directory
pub static DEFAULT_EXCLUDED: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version control & editors
        ".git",
        ".idea",
        ".vscode",
        ".DS_Store",
        // Node / Python environments
        "node_modules",
        "dist",
        "build",
        "__pycache__",
        "venv",
        ".venv",
        "env",
        // Project-specific
        "ST",
        "docs",
        "scripts",
        ".github",
        "public",
        // Asset directories (binary)
        "avatar",
        "bgm",
        "sfx",
        // Config files
        "package-lock.json",
        "vite.config.js",
        ".gitignore",
        // Output
        "package_manifest.py",
        DEFAULT_OUTPUT_NAME,
    ]
});

/// Extensions packed by default (lower-case, no leading dot)
pub static DEFAULT_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "py", "pyi", "js", "jsx", "ts", "tsx", "json", "jsonc", "md", "mdx", "txt", "html", "htm",
        "css", "scss", "sass", "less", "yml", "yaml", "toml", "ini", "cfg", "conf", "env", "sh",
        "bash", "zsh", "ps1", "xml",
    ]
});

/// Exact file names packed regardless of extension
pub static DEFAULT_FILENAMES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Dockerfile",
        "Makefile",
        "Procfile",
        "LICENSE",
        "README",
        "README.md",
    ]
});

/// How much of a file to embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Truncation {
    /// Keep only the first `lines` lines
    Head { lines: usize },
    /// Keep the first `head` and the last `tail` lines
    HeadTail { head: usize, tail: usize },
}

/// Static filter configuration for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Entry names skipped entirely
    pub excluded_names: BTreeSet<String>,
    /// Case-insensitive extensions eligible for inclusion
    pub allowed_extensions: BTreeSet<String>,
    /// Exact file names always eligible
    pub allowed_filenames: BTreeSet<String>,
    /// Per-filename truncation rules
    pub truncation: BTreeMap<String, Truncation>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_names: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            allowed_filenames: DEFAULT_FILENAMES.iter().map(|s| s.to_string()).collect(),
            truncation: BTreeMap::new(),
        }
    }
}

impl FilterConfig {
    /// A configuration that excludes nothing and allows nothing
    pub fn empty() -> Self {
        Self {
            excluded_names: BTreeSet::new(),
            allowed_extensions: BTreeSet::new(),
            allowed_filenames: BTreeSet::new(),
            truncation: BTreeMap::new(),
        }
    }

    /// Normalize extensions to lower-case without a leading dot
    pub fn normalized(mut self) -> Self {
        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Exclude the output artifact so re-runs never pack it
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.excluded_names.insert(name.into());
        self
    }

    pub fn extend_excluded<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_names.extend(names.into_iter().map(Into::into));
    }

    pub fn extend_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions.extend(
            extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty()),
        );
    }

    pub fn extend_filenames<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_filenames.extend(names.into_iter().map(Into::into));
    }

    /// Register a truncation rule, replacing any previous rule for `name`
    pub fn set_truncation(&mut self, name: impl Into<String>, rule: Truncation) {
        self.truncation.insert(name.into(), rule);
    }

    /// True iff `name` is in the excluded set
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_names.contains(name)
    }

    /// True iff the file is an allowed filename or has an allowed extension
    pub fn is_includable(&self, file_name: &str) -> bool {
        if self.allowed_filenames.contains(file_name) {
            return true;
        }
        match extension_of(file_name) {
            Some(ext) if !ext.is_empty() => {
                self.allowed_extensions.contains(&ext.to_lowercase())
            }
            _ => false,
        }
    }

    /// Truncation rule registered for `file_name`, if any
    pub fn truncation_for(&self, file_name: &str) -> Option<&Truncation> {
        self.truncation.get(file_name)
    }
}

/// Extension as `Path` sees it: `.env` has none, `foo.` has an empty one
fn extension_of(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|ext| ext.to_str())
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
