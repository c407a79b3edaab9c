//! Configuration schema for appmake
//!
//! Configuration is stored in the project's `appmake.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Paths removed by `clean`
    pub clean: CleanConfig,

    /// Stylesheet compilation
    pub less: LessConfig,

    /// Template compilation
    pub templates: TemplatesConfig,

    /// Module bundling
    pub bundle: BundleConfig,

    /// Parallel minification with caching
    pub optimize: OptimizeConfig,
}

/// Clean settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Files or directories to remove
    pub paths: Vec<PathBuf>,

    /// Delete files by name pattern under some directories
    pub find: Option<CleanFind>,
}

/// Pattern deletion for `[clean]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanFind {
    /// Directories searched recursively
    pub dirs: Vec<PathBuf>,

    /// Regular expression matched against file names, e.g. `\.css$`
    pub name: String,
}

/// LESS to CSS compilation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LessConfig {
    /// Explicit list of `.less` files
    pub files: Vec<PathBuf>,

    /// Directory scanned for `.less` files
    pub dir: Option<PathBuf>,

    /// Compiler binary
    pub cmd: String,

    /// Compiler arguments placed before `<src> <dest>`
    pub args: Vec<String>,
}

impl LessConfig {
    /// Whether the project configured any stylesheet inputs
    pub fn is_configured(&self) -> bool {
        !self.files.is_empty() || self.dir.is_some()
    }
}

impl Default for LessConfig {
    fn default() -> Self {
        Self {
            files: vec![],
            dir: None,
            cmd: "node_modules/less/bin/lessc".to_string(),
            args: vec![
                "--compress".to_string(),
                "--strict-math=on".to_string(),
                "--strict-units=on".to_string(),
            ],
        }
    }
}

/// Template compiler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Compiler binary
    pub cmd: String,

    /// Template source directory
    pub from: Option<PathBuf>,

    /// Compiled output directory
    pub to: Option<PathBuf>,
}

impl TemplatesConfig {
    pub fn is_configured(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            cmd: "node_modules/jade-amd/bin/jade-amd".to_string(),
            from: None,
            to: None,
        }
    }
}

/// Module bundler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Bundler binary
    pub cmd: String,

    /// Bundler build file, passed as `-o <build_file>`
    pub build_file: Option<PathBuf>,

    /// Bundler output directory
    pub dir: Option<PathBuf>,

    /// Run the optimize batch over `dir` after bundling
    pub optimize_parallel: bool,
}

impl BundleConfig {
    pub fn is_configured(&self) -> bool {
        self.build_file.is_some()
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            cmd: "node_modules/.bin/r.js".to_string(),
            build_file: None,
            dir: None,
            optimize_parallel: false,
        }
    }
}

/// Parallel optimization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Directory scanned for files to optimize
    pub dir: Option<PathBuf>,

    /// Explicit list of files (ignored when `dir` is set)
    pub files: Vec<PathBuf>,

    /// Regular expressions; a path matching any of them is skipped
    pub exclude: Vec<String>,

    /// File extension picked up when scanning `dir`
    pub extension: String,

    /// Maximum concurrently running optimizer processes (default: CPU count)
    pub parallel: Option<usize>,

    /// Progress refresh interval in milliseconds
    pub poll_interval_ms: u64,

    /// Cache directory; caching is disabled when unset
    pub cache_dir: Option<PathBuf>,

    /// Optimizer binary
    pub optimizer: String,

    /// Optimizer arguments
    pub optimizer_args: Vec<String>,

    /// Flag preceding the output path
    pub output_flag: String,

    /// Echo optimizer stdout
    pub show_stdout: bool,

    /// Echo optimizer stderr
    pub show_stderr: bool,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            dir: None,
            files: vec![],
            exclude: vec![],
            extension: "js".to_string(),
            parallel: None,
            poll_interval_ms: 1,
            cache_dir: None,
            optimizer: "node_modules/.bin/uglifyjs".to_string(),
            optimizer_args: vec!["-c".to_string(), "-m".to_string()],
            output_flag: "-o".to_string(),
            show_stdout: false,
            show_stderr: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[optimize]"));
        assert!(toml.contains("[less]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.optimize.optimizer, "node_modules/.bin/uglifyjs");
        assert_eq!(config.optimize.optimizer_args, vec!["-c", "-m"]);
        assert!(config.optimize.cache_dir.is_none());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [optimize]
            dir = "build/js"
            exclude = ["vendor/"]
            parallel = 4
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.optimize.dir, Some(PathBuf::from("build/js")));
        assert_eq!(config.optimize.parallel, Some(4));
        assert_eq!(config.optimize.extension, "js"); // default preserved
        assert!(!config.bundle.is_configured());
    }

    #[test]
    fn clean_find_deserializes() {
        let toml = r#"
            [clean]
            find = { dirs = ["public/css"], name = '\.css$' }
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let find = config.clean.find.unwrap();
        assert_eq!(find.dirs, vec![PathBuf::from("public/css")]);
        assert_eq!(find.name, r"\.css$");
        assert!(config.clean.paths.is_empty());
    }
}
