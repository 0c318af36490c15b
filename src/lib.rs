/*!
 * pkm-manifest - Pack a filtered project tree into a single XML document
 *
 * The walk keeps source and config files that pass the filter policy,
 * embeds their (optionally truncated, always sanitized) text as CDATA,
 * and writes the whole tree once as pretty-printed XML.
 */

pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod report;
pub mod sanitize;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Config, DirErrorPolicy};
pub use error::{PackError, Result};
pub use filter::{FilterConfig, Truncation};
pub use loader::{load_text, ContentStatus, LoadedText};
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use sanitize::sanitize_for_xml;
pub use scanner::{Scanner, ScannerStatistics};
pub use types::{DirectoryNode, FileNode, Node};
pub use utils::{count_files, format_file_size};
pub use writer::{render_document, XmlWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
