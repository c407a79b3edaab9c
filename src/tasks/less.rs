//! LESS → CSS compilation

use crate::config::LessConfig;
use crate::error::{AppmakeError, AppmakeResult};
use crate::optimize::files::{self, FileSource};
use crate::tasks::exec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

/// One stylesheet to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessJob {
    pub src: PathBuf,
    pub dest: PathBuf,
}

impl LessJob {
    fn argv(&self, args: &[String]) -> Vec<OsString> {
        let mut argv: Vec<OsString> = args.iter().map(OsString::from).collect();
        argv.push(self.src.clone().into_os_string());
        argv.push(self.dest.clone().into_os_string());
        argv
    }
}

/// Sorted list of stylesheets and their `.css` destinations
pub fn plan(config: &LessConfig, base: &Path) -> AppmakeResult<Vec<LessJob>> {
    let dir = config.dir.as_ref().map(|d| base.join(d));
    let listed: Vec<PathBuf> = config.files.iter().map(|f| base.join(f)).collect();
    let source = FileSource::from_options(dir.as_deref(), &listed).map_err(|_| {
        AppmakeError::ConfigMissing("`less.files` or `less.dir` is not set".to_string())
    })?;

    let mut sources = files::resolve(&source, "less", &[])?;
    sources.sort();

    Ok(sources
        .into_iter()
        .map(|src| LessJob {
            dest: src.with_extension("css"),
            src,
        })
        .collect())
}

/// Compile every stylesheet, one at a time
pub async fn compile(config: &LessConfig, base: &Path) -> AppmakeResult<Vec<LessJob>> {
    let jobs = plan(config, base)?;
    for job in &jobs {
        info!("Compiling {} -> {}", job.src.display(), job.dest.display());
        exec(&config.cmd, job.argv(&config.args)).await?;
    }
    Ok(jobs)
}
