/*!
 * Content loading: read a file as text, apply truncation, never fail
 */

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::filter::Truncation;

/// Placeholder for files that are not valid UTF-8
pub const BINARY_PLACEHOLDER: &str = "[Binary or non-UTF-8 content not included]";

/// What happened while loading a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus {
    /// Whole file embedded
    Full,
    /// A truncation rule cut lines out
    Truncated,
    /// Not valid UTF-8, placeholder embedded
    Binary,
    /// Read failed, placeholder embedded
    Unreadable,
}

/// Text to embed for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedText {
    pub text: String,
    pub status: ContentStatus,
}

impl LoadedText {
    fn new(text: String, status: ContentStatus) -> Self {
        Self { text, status }
    }
}

/// Read `path` as text, applying `rule` if one is registered.
///
/// Every failure degrades to a placeholder string; this never returns an
/// error so a single bad file cannot stop the walk.
pub fn load_text(path: &Path, rule: Option<&Truncation>) -> LoadedText {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            return LoadedText::new(
                format!("[Error reading file: {}]", e),
                ContentStatus::Unreadable,
            );
        }
    };

    let Some(rule) = rule else {
        return match String::from_utf8(bytes) {
            Ok(text) => LoadedText::new(normalize_newlines(text), ContentStatus::Full),
            Err(_) => {
                warn!(path = %path.display(), "skipping non-UTF-8 content");
                LoadedText::new(BINARY_PLACEHOLDER.to_string(), ContentStatus::Binary)
            }
        };
    };

    // Truncated files are decoded lossily
    let content = normalize_newlines(String::from_utf8_lossy(&bytes).into_owned());
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let loaded = match *rule {
        Truncation::Head { lines } => truncate_head(content, lines),
        Truncation::HeadTail { head, tail } => truncate_head_tail(content, head, tail, &file_name),
    };
    if loaded.status == ContentStatus::Truncated {
        debug!(path = %path.display(), rule = ?rule, "truncated file content");
    }
    loaded
}

/// Keep the first `limit` lines, marking the cut when one was made
pub fn truncate_head(content: String, limit: usize) -> LoadedText {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= limit {
        return LoadedText::new(content, ContentStatus::Full);
    }

    let mut text = lines[..limit].join("\n");
    text.push_str(&format!(
        "\n\n[... truncated: only first {} lines included ...]\n",
        limit
    ));
    LoadedText::new(text, ContentStatus::Truncated)
}

/// Keep the first `head` and last `tail` lines with a marker in between
pub fn truncate_head_tail(content: String, head: usize, tail: usize, file_name: &str) -> LoadedText {
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();
    if total <= head.saturating_add(tail) {
        return LoadedText::new(content, ContentStatus::Full);
    }

    let head_text = lines[..head].join("\n");
    let tail_text = lines[total - tail..].join("\n");
    let text = format!(
        "{}\n\n[... truncated: showing first {} and last {} lines of {} (total {} lines) ...]\n\n{}",
        head_text, head, tail, file_name, total, tail_text
    );
    LoadedText::new(text, ContentStatus::Truncated)
}

/// Convert `\r\n` and lone `\r` to `\n`
fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn numbered_lines(count: usize) -> String {
        (1..=count).map(|i| format!("line {}\n", i)).collect()
    }

    #[test]
    fn test_full_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.js");
        fs::write(&path, "const a = 1;\nconsole.log(a);\n").unwrap();

        let loaded = load_text(&path, None);
        assert_eq!(loaded.status, ContentStatus::Full);
        assert_eq!(loaded.text, "const a = 1;\nconsole.log(a);\n");
    }

    #[test]
    fn test_line_endings_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("win.txt");
        fs::write(&path, "one\r\ntwo\rthree\n").unwrap();

        assert_eq!(load_text(&path, None).text, "one\ntwo\nthree\n");
    }

    #[test]
    fn test_head_rule_cuts_long_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("moves-data.js");
        fs::write(&path, numbered_lines(250)).unwrap();

        let loaded = load_text(&path, Some(&Truncation::Head { lines: 100 }));
        assert_eq!(loaded.status, ContentStatus::Truncated);

        let lines: Vec<&str> = loaded.text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 101);
        assert_eq!(lines[0], "line 1");
        assert_eq!(lines[99], "line 100");
        assert_eq!(lines[100], "[... truncated: only first 100 lines included ...]");
        assert!(!loaded.text.contains("line 101"));
    }

    #[test]
    fn test_head_rule_leaves_short_file_unchanged() {
        let content = numbered_lines(100);
        let loaded = truncate_head(content.clone(), 100);
        assert_eq!(loaded.status, ContentStatus::Full);
        assert_eq!(loaded.text, content);
    }

    #[test]
    fn test_head_tail_rule() {
        let loaded = truncate_head_tail(numbered_lines(50), 3, 2, "pokedex-data.js");
        assert_eq!(loaded.status, ContentStatus::Truncated);
        assert_eq!(
            loaded.text,
            "line 1\nline 2\nline 3\n\n\
             [... truncated: showing first 3 and last 2 lines of pokedex-data.js (total 50 lines) ...]\n\n\
             line 49\nline 50"
        );
    }

    #[test]
    fn test_head_tail_rule_leaves_short_file_unchanged() {
        let content = numbered_lines(5);
        let loaded = truncate_head_tail(content.clone(), 3, 2, "small.js");
        assert_eq!(loaded.status, ContentStatus::Full);
        assert_eq!(loaded.text, content);
    }

    #[test]
    fn test_head_tail_with_empty_tail() {
        let loaded = truncate_head_tail(numbered_lines(10), 2, 0, "f.js");
        assert_eq!(loaded.status, ContentStatus::Truncated);
        assert!(loaded.text.starts_with("line 1\nline 2\n\n[... truncated"));
        assert!(loaded.text.ends_with("(total 10 lines) ...]\n\n"));
        assert!(!loaded.text.contains("line 10"));
    }

    #[test]
    fn test_binary_placeholder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x41]).unwrap();

        let loaded = load_text(&path, None);
        assert_eq!(loaded.status, ContentStatus::Binary);
        assert_eq!(loaded.text, BINARY_PLACEHOLDER);
    }

    #[test]
    fn test_truncated_files_decode_lossily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.js");
        fs::write(&path, b"ok\n\xff\n").unwrap();

        let loaded = load_text(&path, Some(&Truncation::Head { lines: 10 }));
        assert_eq!(loaded.status, ContentStatus::Full);
        assert_eq!(loaded.text, "ok\n\u{FFFD}\n");
    }

    #[test]
    fn test_read_error_placeholder() {
        let dir = tempdir().unwrap();

        let loaded = load_text(&dir.path().join("missing.txt"), None);
        assert_eq!(loaded.status, ContentStatus::Unreadable);
        assert!(loaded.text.starts_with("[Error reading file: "));
        assert!(loaded.text.ends_with(']'));
    }
}
