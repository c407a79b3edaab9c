//! Init command - create a project appmake.toml

use crate::cli::args::InitArgs;
use crate::config::CONFIG_FILE_NAME;
use crate::error::{AppmakeError, AppmakeResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;

/// Template for the project config
const INIT_TEMPLATE: &str = r#"# appmake project configuration
# Relative paths are resolved against the directory holding this file.

[clean]
# paths = ["public/build", "public/css/main.css"]
# find = { dirs = ["public/css"], name = "\\.css$" }

[less]
# dir = "public/css"
# cmd = "node_modules/less/bin/lessc"
# args = ["--compress", "--strict-math=on", "--strict-units=on"]

[templates]
# from = "views/client"
# to = "public/build/templates"

[bundle]
# build_file = "build.js"
# dir = "public/build"
# optimize_parallel = true   # minify `dir` with [optimize] after bundling

[optimize]
# dir = "public/build"
# exclude = ["vendor/", "\\.min\\.js$"]
# parallel = 8               # default: CPU count
# cache_dir = ".appmake-cache"
# optimizer = "node_modules/.bin/uglifyjs"
# optimizer_args = ["-c", "-m"]
# show_stderr = true
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> AppmakeResult<()> {
    let ctx = UiContext::detect();

    let target_dir = match args.path {
        Some(ref p) => p.clone(),
        None => std::env::current_dir()
            .map_err(|e| AppmakeError::io("getting current directory", e))?,
    };

    let config_path = target_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        return Err(AppmakeError::User(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }

    ensure_dir(&target_dir).await?;

    fs::write(&config_path, INIT_TEMPLATE)
        .await
        .map_err(|e| AppmakeError::io(format!("writing {}", config_path.display()), e))?;

    ui::step_ok(&ctx, &format!("Created {}", config_path.display()));

    Ok(())
}

async fn ensure_dir(dir: &Path) -> AppmakeResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| AppmakeError::io(format!("creating directory {}", dir.display()), e))?;
    }
    Ok(())
}
