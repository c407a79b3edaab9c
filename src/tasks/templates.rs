//! Template compilation to AMD-wrapped JavaScript

use crate::config::TemplatesConfig;
use crate::error::{AppmakeError, AppmakeResult};
use crate::tasks::exec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

fn required(value: Option<&PathBuf>, option: &str) -> AppmakeResult<PathBuf> {
    value
        .cloned()
        .ok_or_else(|| AppmakeError::ConfigMissing(format!("`templates.{}` is not set", option)))
}

/// Compiler arguments: `--from <from> --to <to>`
pub fn argv(config: &TemplatesConfig, base: &Path) -> AppmakeResult<Vec<OsString>> {
    let from = base.join(required(config.from.as_ref(), "from")?);
    let to = base.join(required(config.to.as_ref(), "to")?);
    Ok(vec![
        OsString::from("--from"),
        from.into_os_string(),
        OsString::from("--to"),
        to.into_os_string(),
    ])
}

/// Run the template compiler
pub async fn compile(config: &TemplatesConfig, base: &Path) -> AppmakeResult<()> {
    exec(&config.cmd, argv(config, base)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_has_from_and_to() {
        let config = TemplatesConfig {
            from: Some(PathBuf::from("views")),
            to: Some(PathBuf::from("build/views")),
            ..TemplatesConfig::default()
        };
        let argv = argv(&config, Path::new("/app")).unwrap();
        assert_eq!(argv, vec!["--from", "/app/views", "--to", "/app/build/views"]);
    }

    #[test]
    fn missing_to_is_error() {
        let config = TemplatesConfig {
            from: Some(PathBuf::from("views")),
            ..TemplatesConfig::default()
        };
        let err = argv(&config, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("templates.to"));
    }
}
