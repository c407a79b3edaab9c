//! Module bundling
//!
//! Runs the bundler on its build file. With `optimize_parallel` the
//! bundler's own minification is expected to be off and the output
//! directory goes through the parallel optimizer instead.

use crate::config::{BundleConfig, OptimizeConfig};
use crate::error::{AppmakeError, AppmakeResult};
use crate::tasks::exec;
use std::ffi::OsString;
use std::path::Path;

/// Bundler arguments: `-o <build_file>`
pub fn argv(config: &BundleConfig, base: &Path) -> AppmakeResult<Vec<OsString>> {
    let build_file = config
        .build_file
        .as_ref()
        .ok_or_else(|| AppmakeError::ConfigMissing("`bundle.build_file` is not set".to_string()))?;
    Ok(vec![
        OsString::from("-o"),
        base.join(build_file).into_os_string(),
    ])
}

/// Run the bundler
pub async fn bundle(config: &BundleConfig, base: &Path) -> AppmakeResult<()> {
    exec(&config.cmd, argv(config, base)?).await
}

/// Optimize settings for the post-bundle pass: `[optimize]` aimed at `bundle.dir`
pub fn optimize_config(bundle: &BundleConfig, optimize: &OptimizeConfig) -> AppmakeResult<OptimizeConfig> {
    let dir = bundle.dir.clone().ok_or_else(|| {
        AppmakeError::ConfigMissing(
            "`bundle.dir` is required when `bundle.optimize_parallel` is set".to_string(),
        )
    })?;
    Ok(OptimizeConfig {
        dir: Some(dir),
        files: vec![],
        ..optimize.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn argv_passes_build_file() {
        let config = BundleConfig {
            build_file: Some(PathBuf::from("build.js")),
            ..BundleConfig::default()
        };
        assert_eq!(argv(&config, Path::new("/app")).unwrap(), vec!["-o", "/app/build.js"]);
    }

    #[test]
    fn optimize_config_targets_bundle_dir() {
        let bundle = BundleConfig {
            build_file: Some(PathBuf::from("build.js")),
            dir: Some(PathBuf::from("public/build")),
            optimize_parallel: true,
            ..BundleConfig::default()
        };
        let optimize = OptimizeConfig {
            files: vec![PathBuf::from("other.js")],
            cache_dir: Some(PathBuf::from(".cache")),
            ..OptimizeConfig::default()
        };

        let merged = optimize_config(&bundle, &optimize).unwrap();
        assert_eq!(merged.dir, Some(PathBuf::from("public/build")));
        assert!(merged.files.is_empty());
        assert_eq!(merged.cache_dir, Some(PathBuf::from(".cache")));
    }

    #[test]
    fn optimize_config_needs_dir() {
        let err = optimize_config(&BundleConfig::default(), &OptimizeConfig::default()).unwrap_err();
        assert!(err.is_configuration());
    }
}
