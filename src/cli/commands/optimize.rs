//! Optimize command - parallel, cached minification

use crate::cli::args::OptimizeArgs;
use crate::config::{Config, OptimizeConfig};
use crate::error::{AppmakeError, AppmakeResult};
use crate::optimize::{self, OptimizeOptions, Stats};
use crate::ui::{self, BatchProgress, UiContext};
use std::path::Path;
use tracing::debug;

/// Execute the optimize command
pub async fn execute(args: OptimizeArgs, config: &Config, base: &Path) -> AppmakeResult<()> {
    let ctx = UiContext::detect();
    let cwd = std::env::current_dir()
        .map_err(|e| AppmakeError::io("getting current directory", e))?;
    let merged = apply_overrides(&config.optimize, args, &cwd);
    let options = OptimizeOptions::from_config(&merged, base)?;

    run(&ctx, &options).await?;
    Ok(())
}

/// Layer command-line overrides on top of `[optimize]`.
///
/// Paths from the command line are anchored at `cwd`; paths from the
/// config file stay relative to the project directory.
pub fn apply_overrides(config: &OptimizeConfig, args: OptimizeArgs, cwd: &Path) -> OptimizeConfig {
    let mut merged = config.clone();

    if let Some(dir) = args.dir {
        merged.dir = Some(cwd.join(dir));
        merged.files.clear();
    } else if !args.files.is_empty() {
        merged.dir = None;
        merged.files = args.files.iter().map(|f| cwd.join(f)).collect();
    }
    if !args.exclude.is_empty() {
        merged.exclude = args.exclude;
    }
    if args.parallel.is_some() {
        merged.parallel = args.parallel;
    }
    if args.no_cache {
        merged.cache_dir = None;
    } else if let Some(cache_dir) = args.cache_dir {
        merged.cache_dir = Some(cwd.join(cache_dir));
    }
    if let Some(optimizer) = args.optimizer {
        merged.optimizer = optimizer;
    }
    merged.show_stdout |= args.show_stdout;
    merged.show_stderr |= args.show_stderr;

    merged
}

/// Resolve files, run the batch with progress output, and print statistics
pub async fn run(ctx: &UiContext, options: &OptimizeOptions) -> AppmakeResult<Stats> {
    ui::header(ctx, "start optimization in parallel");

    if !options.exclude.is_empty() {
        let patterns: Vec<&str> = options.exclude.iter().map(|re| re.as_str()).collect();
        ui::content(ctx, &format!("exclude patterns: {}", patterns.join(" ")));
    }

    let files = options.resolve_files()?;
    for file in &files {
        debug!("Candidate: {}", file.display());
    }
    ui::content(
        ctx,
        &format!("process {} files with {} parallel jobs", files.len(), options.parallel),
    );
    if options.cache_dir.is_none() {
        ui::step_info(ctx, "caching of output files disabled because `cache_dir` is not set");
    }

    let mut progress = BatchProgress::new(ctx, files.len(), options.poll_interval);
    let result = optimize::optimize_files(options, files, &mut progress).await;
    progress.finish();

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            ui::step_error(ctx, "optimization aborted, cache index not saved");
            return Err(e);
        }
    };
    ui::content(ctx, &format!("statistic:\n{}", stats.to_json()));
    ui::step_ok(
        ctx,
        &format!(
            "{} files optimized, {} from cache",
            stats.optimized, stats.from_cache
        ),
    );
    Ok(stats)
}
