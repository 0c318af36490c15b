/*!
 * Configuration handling for pkm-manifest
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use crate::error::Result;
use crate::filter::{FilterConfig, Truncation, DEFAULT_OUTPUT_NAME};

/// What to do when a directory below the root cannot be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirErrorPolicy {
    /// Stop the run with an error (default)
    Abort,
    /// Log a warning and leave the directory out
    Skip,
}

impl Default for DirErrorPolicy {
    fn default() -> Self {
        Self::Abort
    }
}

/// Command-line arguments for pkm-manifest
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "pkm-manifest",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pack a filtered project tree into a single XML document",
    long_about = "Walks a project directory, keeps the source and config files that pass the filter, and writes them into one pretty-printed XML document with every file body embedded as CDATA."
)]
pub struct Args {
    /// Project root to pack
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output XML file; a bare file name is placed inside the project root
    #[clap(short, long, default_value = DEFAULT_OUTPUT_NAME)]
    pub output: String,

    /// JSON file with filter configuration (missing fields use the defaults)
    #[clap(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Comma-separated list of extra names to exclude
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Comma-separated list of extra file extensions to include
    #[clap(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Comma-separated list of extra exact file names to include
    #[clap(long, value_delimiter = ',')]
    pub filenames: Vec<String>,

    /// Keep only the first lines of a file, e.g. `moves-data.js=100`
    #[clap(long = "head", value_name = "NAME=LINES", value_parser = parse_head_rule)]
    pub head: Vec<(String, Truncation)>,

    /// Keep the first and last lines of a file, e.g. `log.txt=50:20`
    #[clap(long = "head-tail", value_name = "NAME=HEAD:TAIL", value_parser = parse_head_tail_rule)]
    pub head_tail: Vec<(String, Truncation)>,

    /// What to do when a subdirectory cannot be listed
    #[clap(long, value_enum, default_value_t = DirErrorPolicy::default())]
    pub on_dir_error: DirErrorPolicy,

    /// Suppress the progress bar and the final report
    #[clap(short, long)]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Project root to pack
    pub target_dir: PathBuf,

    /// Output XML file path
    pub output_file: PathBuf,

    /// Filter policy and truncation rules
    pub filter: FilterConfig,

    /// Handling of unreadable subdirectories
    pub dir_error_policy: DirErrorPolicy,

    /// Suppress progress and report output
    pub quiet: bool,
}

impl Config {
    /// Default configuration for `target_dir`, writing `pkm_summary.xml` inside it
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        let target_dir = target_dir.into();
        let mut config = Self {
            output_file: target_dir.join(DEFAULT_OUTPUT_NAME),
            target_dir,
            filter: FilterConfig::default(),
            dir_error_policy: DirErrorPolicy::default(),
            quiet: false,
        };
        config.exclude_output_name();
        config
    }

    /// Replace the filter, keeping the output file excluded
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter.normalized();
        self.exclude_output_name();
        self
    }

    /// Write to `output`, resolved against the target directory when it is a bare name
    pub fn with_output(mut self, output: impl AsRef<Path>) -> Self {
        self.output_file = resolve_output_path(&self.target_dir, output.as_ref());
        self.exclude_output_name();
        self
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let mut filter = match &args.config {
            Some(path) => load_filter_file(Path::new(path))?,
            None => FilterConfig::default(),
        };
        filter.extend_excluded(args.exclude);
        filter.extend_extensions(args.extensions);
        filter.extend_filenames(args.filenames);
        for (name, rule) in args.head.into_iter().chain(args.head_tail) {
            filter.set_truncation(name, rule);
        }

        let mut config = Self::new(&args.directory_path)
            .with_filter(filter)
            .with_output(&args.output);
        config.dir_error_policy = args.on_dir_error;
        config.quiet = args.quiet;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        // Check if output file directory exists
        if let Some(parent) = self.output_file.parent() {
            crate::ensure!(
                parent.as_os_str().is_empty() || parent.is_dir(),
                PathNotFound,
                "Output directory not found: {}",
                parent.display()
            );
        }

        crate::ensure!(
            !self.output_file.is_dir(),
            InvalidArgument,
            "Output path is a directory: {}",
            self.output_file.display()
        );

        Ok(())
    }

    fn exclude_output_name(&mut self) {
        if let Some(name) = self.output_file.file_name() {
            self.filter
                .excluded_names
                .insert(name.to_string_lossy().to_string());
        }
    }
}

/// A bare file name lands in the project root; anything with a directory
/// component or an absolute path is kept as given.
pub fn resolve_output_path(target_dir: &Path, output: &Path) -> PathBuf {
    let bare = output
        .parent()
        .map_or(true, |parent| parent.as_os_str().is_empty());
    if !output.is_absolute() && bare {
        target_dir.join(output)
    } else {
        output.to_path_buf()
    }
}

/// Read a JSON filter configuration
pub fn load_filter_file(path: &Path) -> Result<FilterConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|e| crate::error!(Config, "failed to read {}: {}", path.display(), e))?;
    let filter: FilterConfig = serde_json::from_str(&raw)?;
    Ok(filter.normalized())
}

/// Parse `NAME=LINES`
pub fn parse_head_rule(value: &str) -> std::result::Result<(String, Truncation), String> {
    let (name, lines) = split_rule(value)?;
    let lines = lines
        .parse::<usize>()
        .map_err(|e| format!("invalid line count `{}`: {}", lines, e))?;
    Ok((name.to_string(), Truncation::Head { lines }))
}

/// Parse `NAME=HEAD:TAIL`
pub fn parse_head_tail_rule(value: &str) -> std::result::Result<(String, Truncation), String> {
    let (name, counts) = split_rule(value)?;
    let (head, tail) = counts
        .split_once(':')
        .ok_or_else(|| format!("expected HEAD:TAIL, got `{}`", counts))?;
    let head = head
        .parse::<usize>()
        .map_err(|e| format!("invalid head count `{}`: {}", head, e))?;
    let tail = tail
        .parse::<usize>()
        .map_err(|e| format!("invalid tail count `{}`: {}", tail, e))?;
    Ok((name.to_string(), Truncation::HeadTail { head, tail }))
}

fn split_rule(value: &str) -> std::result::Result<(&str, &str), String> {
    match value.rsplit_once('=') {
        Some((name, rest)) if !name.is_empty() => Ok((name, rest)),
        _ => Err(format!("expected NAME=VALUE, got `{}`", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackError;
    use tempfile::tempdir;

    #[test]
    fn test_output_file_resolution() {
        let root = PathBuf::from("/tmp/project");
        let test_cases = vec![
            ("pkm_summary.xml", root.join("pkm_summary.xml")),
            ("out/file.xml", PathBuf::from("out/file.xml")),
            ("/tmp/output.xml", PathBuf::from("/tmp/output.xml")),
        ];

        for (input, expected) in test_cases {
            assert_eq!(resolve_output_path(&root, Path::new(input)), expected);
        }
    }

    #[test]
    fn test_rule_parsers() {
        assert_eq!(
            parse_head_rule("moves-data.js=100").unwrap(),
            (
                "moves-data.js".to_string(),
                Truncation::Head { lines: 100 }
            )
        );
        assert_eq!(
            parse_head_tail_rule("log.txt=50:20").unwrap(),
            (
                "log.txt".to_string(),
                Truncation::HeadTail { head: 50, tail: 20 }
            )
        );
        assert!(parse_head_rule("moves-data.js").is_err());
        assert!(parse_head_rule("=10").is_err());
        assert!(parse_head_rule("a.js=ten").is_err());
        assert!(parse_head_tail_rule("a.js=10").is_err());
        assert!(parse_head_tail_rule("a.js=10:x").is_err());
    }

    #[test]
    fn test_from_args() {
        let dir = tempdir().unwrap();
        let args = Args::parse_from([
            "pkm-manifest",
            dir.path().to_str().unwrap(),
            "--output",
            "bundle.xml",
            "--exclude",
            "fixtures,tmp",
            "--extensions",
            ".RS",
            "--head",
            "big.js=10",
            "--head-tail",
            "huge.js=5:5",
            "--on-dir-error",
            "skip",
        ]);
        let config = Config::from_args(args).unwrap();

        assert_eq!(config.output_file, dir.path().join("bundle.xml"));
        assert!(config.filter.is_excluded("bundle.xml"));
        assert!(config.filter.is_excluded("fixtures"));
        assert!(config.filter.is_excluded("tmp"));
        assert!(config.filter.is_includable("main.rs"));
        assert_eq!(
            config.filter.truncation_for("big.js"),
            Some(&Truncation::Head { lines: 10 })
        );
        assert_eq!(
            config.filter.truncation_for("huge.js"),
            Some(&Truncation::HeadTail { head: 5, tail: 5 })
        );
        assert_eq!(config.dir_error_policy, DirErrorPolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(
            &path,
            r#"{ "allowed_extensions": [".RS"], "excluded_names": ["target"] }"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "pkm-manifest",
            dir.path().to_str().unwrap(),
            "--config",
            path.to_str().unwrap(),
        ]);
        let config = Config::from_args(args).unwrap();

        assert!(config.filter.is_includable("lib.rs"));
        assert!(!config.filter.is_includable("index.js"));
        assert!(config.filter.is_excluded("target"));
        assert!(config.filter.is_excluded(DEFAULT_OUTPUT_NAME));
        assert!(!config.filter.is_excluded("node_modules"));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let err = load_filter_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PackError::Config(_)));
    }

    #[test]
    fn test_validate_missing_target() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().join("missing"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PackError::PathNotFound(_)));
    }
}
