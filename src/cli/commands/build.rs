//! Build commands - clean, less, templates, bundle, build, rebuild

use crate::config::Config;
use crate::error::{AppmakeError, AppmakeResult};
use crate::optimize::OptimizeOptions;
use crate::tasks::{self, bundle, less, templates};
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the clean command
pub async fn clean(config: &Config, base: &Path) -> AppmakeResult<()> {
    let ctx = UiContext::detect();
    let mut targets: Vec<String> = config
        .clean
        .paths
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    if let Some(find) = &config.clean.find {
        for dir in &find.dirs {
            targets.push(format!("{} (/{}/)", dir.display(), find.name));
        }
    }
    ui::header(&ctx, &format!("clean {}", targets.join(" ")));

    let removed = tasks::clean::clean(&config.clean, base).await?;
    ui::step_ok(&ctx, &format!("removed {} paths", removed.len()));
    Ok(())
}

/// Execute the less command
pub async fn compile_less(config: &Config, base: &Path) -> AppmakeResult<()> {
    let ctx = UiContext::detect();
    ui::header(&ctx, "compile less files to css");

    let jobs = less::compile(&config.less, base).await?;
    ui::step_ok(&ctx, &format!("compiled {} stylesheets", jobs.len()));
    Ok(())
}

/// Execute the templates command
pub async fn compile_templates(config: &Config, base: &Path) -> AppmakeResult<()> {
    let ctx = UiContext::detect();
    ui::header(
        &ctx,
        &format!(
            "compile templates ({}) to amd wrapped js",
            config
                .templates
                .from
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ),
    );

    templates::compile(&config.templates, base).await?;
    ui::step_ok(&ctx, "templates compiled");
    Ok(())
}

/// Execute the bundle command, optionally followed by the parallel optimizer
pub async fn bundle_modules(config: &Config, base: &Path) -> AppmakeResult<()> {
    let ctx = UiContext::detect();

    // Validate the optimize pass before spending time in the bundler
    let optimize = if config.bundle.optimize_parallel {
        let merged = bundle::optimize_config(&config.bundle, &config.optimize)?;
        Some(OptimizeOptions::from_config(&merged, base)?)
    } else {
        None
    };

    ui::header(&ctx, "run module bundler");
    bundle::bundle(&config.bundle, base).await?;
    ui::step_ok(&ctx, "bundler done");

    if let Some(options) = optimize {
        super::optimize::run(&ctx, &options).await?;
    }
    Ok(())
}

/// Execute the build command: every configured step, in order
pub async fn build(config: &Config, base: &Path) -> AppmakeResult<()> {
    let ctx = UiContext::detect();
    match build_steps(config, base).await {
        Ok(()) => {
            ui::outro_success(&ctx, "build complete");
            Ok(())
        }
        Err(e) if e.is_configuration() => Err(e),
        Err(e) => {
            ui::outro_error(&ctx, "build failed");
            Err(e)
        }
    }
}

async fn build_steps(config: &Config, base: &Path) -> AppmakeResult<()> {
    let mut ran = 0;

    if config.less.is_configured() {
        compile_less(config, base).await?;
        ran += 1;
    }
    if config.bundle.is_configured() {
        bundle_modules(config, base).await?;
        ran += 1;
    }
    if config.templates.is_configured() {
        compile_templates(config, base).await?;
        ran += 1;
    }

    if ran == 0 {
        return Err(AppmakeError::ConfigMissing(
            "nothing to build: configure [less], [bundle] or [templates]".to_string(),
        ));
    }
    Ok(())
}

/// Execute the rebuild command
pub async fn rebuild(config: &Config, base: &Path) -> AppmakeResult<()> {
    clean(config, base).await?;
    build(config, base).await
}
