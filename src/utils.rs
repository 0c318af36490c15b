/*!
 * Utility functions for pkm-manifest
 */

use std::path::Path;

use walkdir::WalkDir;

use crate::filter::FilterConfig;

/// Count the files a walk will pack, for progress tracking.
///
/// Unreadable entries are skipped rather than reported; the real walk
/// decides what is fatal.
pub fn count_files(dir: &Path, filter: &FilterConfig) -> u64 {
    WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !filter.is_excluded(&entry.file_name().to_string_lossy()))
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && filter.is_includable(&entry.file_name().to_string_lossy())
        })
        .count() as u64
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
