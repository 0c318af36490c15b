/*!
 * Reporting functionality for pkm-manifest
 *
 * Renders a summary of the packed tree with the tabled library.
 */

use std::collections::BTreeMap;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::loader::ContentStatus;
use crate::utils::format_file_size;

/// Information about a file in the report
#[derive(Debug, Clone)]
pub struct FileReportInfo {
    /// Number of lines embedded
    pub lines: usize,
    /// Number of characters embedded
    pub chars: usize,
    /// How the content was loaded
    pub status: ContentStatus,
}

/// Statistics for one packing run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Output file path
    pub output_file: String,
    /// Size of the written document in bytes
    pub output_size: u64,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Number of directories walked
    pub directories_scanned: usize,
    /// Number of files packed
    pub files_processed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Files cut by a truncation rule
    pub truncated_files: usize,
    /// Files replaced by a placeholder
    pub placeholder_files: usize,
    /// Details for each file
    pub file_details: BTreeMap<String, FileReportInfo>,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for packing results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) {
        println!("\n{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "Output File",
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "Output Size",
                value: format_file_size(report.output_size),
            },
            SummaryRow {
                key: "Process Time",
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "Directories",
                value: format_number(report.directories_scanned),
            },
            SummaryRow {
                key: "Files Packed",
                value: format_number(report.files_processed),
            },
            SummaryRow {
                key: "Total Lines",
                value: format_number(report.total_lines),
            },
            SummaryRow {
                key: "Truncated Files",
                value: format_number(report.truncated_files),
            },
            SummaryRow {
                key: "Placeholders",
                value: format_number(report.placeholder_files),
            },
            SummaryRow {
                key: "Total Chars",
                value: format_number(report.total_chars),
            },
        ];

        styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Chars")]
            chars: String,

            #[tabled(rename = "Note")]
            note: &'static str,
        }

        // Largest first, path order for ties
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(pa, a), (pb, b)| b.chars.cmp(&a.chars).then_with(|| pa.cmp(pb)));

        let rows: Vec<FileRow> = files
            .into_iter()
            .take(10)
            .map(|(path, info)| FileRow {
                path: format_path(path, 60),
                lines: format_number(info.lines),
                chars: format_number(info.chars),
                note: match info.status {
                    ContentStatus::Full => "",
                    ContentStatus::Truncated => "truncated",
                    ContentStatus::Binary => "binary",
                    ContentStatus::Unreadable => "unreadable",
                },
            })
            .collect();

        styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &ScanReport) -> String {
        let files_title = if report.file_details.len() > 10 {
            "TOP 10 LARGEST FILES"
        } else {
            "PACKED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title,
            self.create_files_table(report),
            "PACKING COMPLETE",
            self.create_summary_table(report)
        )
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

/// Format a number with human-readable units
pub fn format_number(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Keep the trailing path segments that fit in `max_len` characters
pub fn format_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let mut kept = Vec::new();
    let mut len = 3;
    for part in path.split('/').rev() {
        let part_len = part.chars().count() + 1;
        if len + part_len > max_len {
            break;
        }
        kept.push(part);
        len += part_len;
    }

    if kept.is_empty() {
        let tail: String = path
            .chars()
            .rev()
            .take(max_len.saturating_sub(3))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        return format!("...{}", tail);
    }

    kept.reverse();
    format!(".../{}", kept.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ScanReport {
        let mut file_details = BTreeMap::new();
        file_details.insert(
            "src/main.js".to_string(),
            FileReportInfo {
                lines: 12,
                chars: 300,
                status: ContentStatus::Full,
            },
        );
        file_details.insert(
            "data/moves-data.js".to_string(),
            FileReportInfo {
                lines: 101,
                chars: 4200,
                status: ContentStatus::Truncated,
            },
        );
        ScanReport {
            output_file: "pkm_summary.xml".to_string(),
            output_size: 5000,
            duration: Duration::from_millis(12),
            directories_scanned: 3,
            files_processed: 2,
            total_lines: 113,
            total_chars: 4500,
            truncated_files: 1,
            placeholder_files: 0,
            file_details,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(2_000_000), "2.0M");
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path("src/main.js", 60), "src/main.js");
        assert_eq!(format_path("aaaa/bbbb/cccc/file.js", 16), ".../cccc/file.js");
        assert_eq!(format_path("averyveryverylongname.js", 10), "...name.js");
    }

    #[test]
    fn test_console_report() {
        let text = Reporter::new(ReportFormat::ConsoleTable).generate_report(&sample_report());

        assert!(text.starts_with("PACKED FILES"));
        assert!(text.contains("PACKING COMPLETE"));
        assert!(text.contains("data/moves-data.js"));
        assert!(text.contains("truncated"));
        assert!(text.contains("4.88 KB"));
        assert!(text.contains("Total Chars"));
        assert!(!text.contains("Tokens"));
        // largest file listed first
        let moves = text.find("moves-data.js").unwrap();
        let main = text.find("src/main.js").unwrap();
        assert!(moves < main);
    }
}
