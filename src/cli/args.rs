//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// appmake - build automation for web apps
///
/// Cleans, compiles stylesheets and templates, bundles modules and
/// minifies scripts in parallel with a persistent content-addressed cache.
#[derive(Parser, Debug)]
#[command(name = "appmake")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Action to run
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path (default: nearest appmake.toml)
    #[arg(short, long, global = true, env = "APPMAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,
}

/// Available actions
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove configured build outputs
    Clean,

    /// Compile stylesheets, bundle modules and compile templates
    Build,

    /// Clean, then build
    Rebuild,

    /// Compile LESS stylesheets to CSS
    Less,

    /// Compile templates to AMD-wrapped JavaScript
    Templates,

    /// Run the module bundler
    Bundle,

    /// Minify files in parallel, reusing cached outputs
    Optimize(OptimizeArgs),

    /// Create an appmake.toml template
    Init(InitArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the optimize command; each overrides `[optimize]`
#[derive(Parser, Debug, Default)]
pub struct OptimizeArgs {
    /// Directory to scan for files
    #[arg(short, long, conflicts_with = "files")]
    pub dir: Option<PathBuf>,

    /// Files to optimize
    pub files: Vec<PathBuf>,

    /// Exclude pattern (regular expression, repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Maximum concurrent optimizer processes
    #[arg(short = 'j', long)]
    pub parallel: Option<usize>,

    /// Cache directory
    #[arg(long, conflicts_with = "no_cache")]
    pub cache_dir: Option<PathBuf>,

    /// Disable the cache for this run
    #[arg(long)]
    pub no_cache: bool,

    /// Optimizer binary
    #[arg(long)]
    pub optimizer: Option<String>,

    /// Echo optimizer stdout
    #[arg(long)]
    pub show_stdout: bool,

    /// Echo optimizer stderr
    #[arg(long)]
    pub show_stderr: bool,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing appmake.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// JSON lines
    Json,
}
