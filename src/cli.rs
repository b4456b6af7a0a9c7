use clap::Parser;
use ppd::env::Value;
use ppd::output::OutputFormat;
use std::path::PathBuf;

/// Command-line interface for the ppd preprocessor
#[derive(Parser, Debug)]
#[command(
    name = "ppd",
    about = "Comment-driven conditional compilation for any text file",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Files or directories to transform
    #[arg(help = "Files or directories to transform")]
    pub files: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    /// Define a symbol (NAME or NAME=VALUE)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]", help = "Define a symbol")]
    pub defines: Vec<String>,

    /// Remove a symbol
    #[arg(short = 'U', long = "undefine", value_name = "NAME", help = "Remove a symbol")]
    pub undefines: Vec<String>,

    /// Import process environment variables as symbols
    #[arg(long, help = "Import process environment variables as symbols")]
    pub env: bool,

    /// Blank removed lines instead of dropping them
    #[arg(long, help = "Keep line numbers by blanking removed lines")]
    pub preserve_line_numbers: bool,

    /// File patterns to transform
    #[arg(long, help = "File patterns to transform (comma-separated)")]
    pub include: Vec<String>,

    /// File patterns to leave alone
    #[arg(long, help = "File patterns to skip (comma-separated)")]
    pub exclude: Vec<String>,

    /// Rewrite files in place
    #[arg(short, long, conflicts_with = "output_dir", help = "Rewrite files in place")]
    pub in_place: bool,

    /// Write results under this directory
    #[arg(short, long, value_name = "DIR", help = "Write results under this directory")]
    pub output_dir: Option<PathBuf>,

    /// Transform without writing anything
    #[arg(long, help = "Validate directives without writing output")]
    pub check: bool,

    /// Report format
    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Report format")]
    pub format: OutputFormat,

    /// List available directive families and exit
    #[arg(long, help = "List available directive families and exit")]
    pub list_directives: bool,

    /// Show configuration and exit
    #[arg(long, help = "Show effective configuration and exit")]
    pub show_config: bool,

    /// Enable verbose output
    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

impl Cli {
    /// Parse `-D` arguments; a bare name defines `true`
    pub fn get_defines(&self) -> Vec<(String, Value)> {
        self.parse_defines().filter(|(_, value)| value.is_defined()).collect()
    }

    /// Names to remove: `-U NAME` and `-D NAME=undefined`
    pub fn get_undefines(&self) -> Vec<String> {
        let mut names = split_list(&self.undefines);
        names.extend(
            self.parse_defines()
                .filter(|(_, value)| !value.is_defined())
                .map(|(name, _)| name),
        );
        names
    }

    fn parse_defines(&self) -> impl Iterator<Item = (String, Value)> + '_ {
        self.defines.iter().filter_map(|s| {
            let (name, value) = match s.split_once('=') {
                Some((name, value)) => (name.trim(), Value::parse(value.trim())),
                None => (s.trim(), Value::Bool(true)),
            };
            if name.is_empty() {
                None
            } else {
                Some((name.to_string(), value))
            }
        })
    }

    /// Parse include patterns from comma-separated strings
    pub fn get_include(&self) -> Vec<String> {
        split_list(&self.include)
    }

    /// Parse exclude patterns from comma-separated strings
    pub fn get_exclude(&self) -> Vec<String> {
        split_list(&self.exclude)
    }

    /// Get files to process, defaulting to current directory if none specified
    pub fn get_files(&self) -> Vec<PathBuf> {
        if self.files.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.files.clone()
        }
    }
}

fn split_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Provide a default implementation for testing
impl Default for Cli {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            config: None,
            defines: Vec::new(),
            undefines: Vec::new(),
            env: false,
            preserve_line_numbers: false,
            include: Vec::new(),
            exclude: Vec::new(),
            in_place: false,
            output_dir: None,
            check: false,
            format: OutputFormat::Human,
            list_directives: false,
            show_config: false,
            verbose: false,
        }
    }
}
