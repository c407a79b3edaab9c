//! Parallel, cached file optimization
//!
//! Minifies a set of files by running an external optimizer on each one,
//! at most `parallel` at a time, and skips files whose input and optimizer
//! invocation are unchanged since a previous run.
//!
//! # Flow
//!
//! | Step | Component |
//! |------|-----------|
//! | Pick files | [`files::resolve`] |
//! | Load index | [`CacheStore::load`] |
//! | Dispatch, bound, collect | [`Scheduler`] |
//! | Hash, hit or run, replace | [`transform`] |
//! | Save index | [`CacheStore::flush`] |

pub mod cache;
pub mod files;
pub mod scheduler;
pub mod stats;
pub mod transform;

pub use cache::{content_hash, CacheStore};
pub use files::FileSource;
pub use scheduler::{JobReport, JobState, ProgressObserver, Scheduler};
pub use stats::Stats;
pub use transform::{CommandTransformer, TransformCommand, Transformer};

use crate::config::OptimizeConfig;
use crate::error::{AppmakeError, AppmakeResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Validated options for one optimize batch
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub source: FileSource,
    pub exclude: Vec<Regex>,
    pub extension: String,
    pub parallel: usize,
    pub poll_interval: Duration,
    pub cache_dir: Option<PathBuf>,
    pub command: TransformCommand,
    pub show_stdout: bool,
    pub show_stderr: bool,
}

impl OptimizeOptions {
    /// Validate `config`, resolving relative paths against `base`
    pub fn from_config(config: &OptimizeConfig, base: &Path) -> AppmakeResult<Self> {
        let dir = config.dir.as_ref().map(|d| base.join(d));
        let files: Vec<PathBuf> = config.files.iter().map(|f| base.join(f)).collect();
        let source = FileSource::from_options(dir.as_deref(), &files)?;

        let parallel = match config.parallel {
            Some(0) => {
                return Err(AppmakeError::OptionInvalid {
                    option: "optimize.parallel".to_string(),
                    reason: "must be greater than zero".to_string(),
                })
            }
            Some(n) => n,
            None => default_parallelism(),
        };

        if config.optimizer.trim().is_empty() {
            return Err(AppmakeError::OptionInvalid {
                option: "optimize.optimizer".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            source,
            exclude: files::compile_excludes(&config.exclude)?,
            extension: config.extension.trim_start_matches('.').to_string(),
            parallel,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            cache_dir: config.cache_dir.as_ref().map(|d| base.join(d)),
            command: TransformCommand::new(
                config.optimizer.clone(),
                config.optimizer_args.clone(),
                config.output_flag.clone(),
            ),
            show_stdout: config.show_stdout,
            show_stderr: config.show_stderr,
        })
    }

    /// Resolve the candidate file list
    pub fn resolve_files(&self) -> AppmakeResult<Vec<PathBuf>> {
        files::resolve(&self.source, &self.extension, &self.exclude)
    }
}

/// Host core count, falling back to one
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Optimize `files` with the external optimizer described by `options`
pub async fn optimize_files(
    options: &OptimizeOptions,
    files: Vec<PathBuf>,
    observer: &mut dyn ProgressObserver,
) -> AppmakeResult<Stats> {
    let transformer: Arc<dyn Transformer> =
        Arc::new(CommandTransformer::new(options.command.clone()));
    run_batch(options, transformer, files, observer).await
}

/// Run one batch through `transformer`, with the cache if one is configured
pub async fn run_batch(
    options: &OptimizeOptions,
    transformer: Arc<dyn Transformer>,
    files: Vec<PathBuf>,
    observer: &mut dyn ProgressObserver,
) -> AppmakeResult<Stats> {
    let scheduler = Scheduler::new(transformer, options.parallel)
        .with_output(options.show_stdout, options.show_stderr);

    match options.cache_dir {
        Some(ref dir) => {
            let mut store = CacheStore::load(dir).await;
            scheduler.with_cache(&mut store).run(files, observer).await
        }
        None => {
            info!("Caching of output files disabled because `cache_dir` is not set");
            scheduler.run(files, observer).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn options_require_files_or_dir() {
        let err = OptimizeOptions::from_config(&OptimizeConfig::default(), Path::new("."))
            .unwrap_err();
        assert!(matches!(err, AppmakeError::ConfigMissing(_)));
    }

    #[test]
    fn options_reject_zero_parallelism() {
        let config = OptimizeConfig {
            dir: Some(PathBuf::from("build")),
            parallel: Some(0),
            ..OptimizeConfig::default()
        };
        let err = OptimizeOptions::from_config(&config, Path::new(".")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn options_resolve_paths_against_base() {
        let config = OptimizeConfig {
            dir: Some(PathBuf::from("build/js")),
            cache_dir: Some(PathBuf::from(".cache")),
            extension: ".js".to_string(),
            ..OptimizeConfig::default()
        };
        let options = OptimizeOptions::from_config(&config, Path::new("/srv/app")).unwrap();

        assert_eq!(options.source, FileSource::Dir(PathBuf::from("/srv/app/build/js")));
        assert_eq!(options.cache_dir, Some(PathBuf::from("/srv/app/.cache")));
        assert_eq!(options.extension, "js");
        assert!(options.parallel >= 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn optimize_files_with_shell_optimizer() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.js"), "var a = 1;").unwrap();
        std::fs::write(temp.path().join("b.js"), "var b = 2;").unwrap();

        let config = OptimizeConfig {
            dir: Some(PathBuf::from(".")),
            cache_dir: Some(PathBuf::from(".cache")),
            optimizer: "sh".to_string(),
            optimizer_args: vec![
                "-c".to_string(),
                "tr -d ' ' < \"$0\" > \"$1\"".to_string(),
                "{input}".to_string(),
                "{output}".to_string(),
            ],
            parallel: Some(2),
            ..OptimizeConfig::default()
        };
        let options = OptimizeOptions::from_config(&config, temp.path()).unwrap();
        let files = options.resolve_files().unwrap();

        let stats = optimize_files(&options, files, &mut ()).await.unwrap();

        assert_eq!(stats.optimized, 2);
        assert_eq!(std::fs::read_to_string(temp.path().join("a.js")).unwrap(), "vara=1;");
        assert!(temp.path().join(".cache").join(cache::INDEX_FILE_NAME).exists());
    }
}
