//! Remove build outputs

use crate::config::{CleanConfig, CleanFind};
use crate::error::{AppmakeError, AppmakeResult};
use crate::optimize::files::scan_dir;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Remove every configured path and every file `find` matches; returns what
/// was removed
pub async fn clean(config: &CleanConfig, base: &Path) -> AppmakeResult<Vec<PathBuf>> {
    if config.paths.is_empty() && config.find.is_none() {
        return Err(AppmakeError::ConfigMissing(
            "no `clean.paths` or `clean.find` to clean".to_string(),
        ));
    }

    let mut removed = Vec::new();
    for path in &config.paths {
        let path = base.join(path);
        let metadata = match fs::symlink_metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Nothing to clean at {}", path.display());
                continue;
            }
            Err(e) => return Err(AppmakeError::io(format!("inspecting {}", path.display()), e)),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        result.map_err(|e| AppmakeError::io(format!("removing {}", path.display()), e))?;

        debug!("Removed {}", path.display());
        removed.push(path);
    }

    if let Some(find) = &config.find {
        for path in find_matches(find, base)? {
            fs::remove_file(&path)
                .await
                .map_err(|e| AppmakeError::io(format!("removing {}", path.display()), e))?;
            debug!("Removed {}", path.display());
            removed.push(path);
        }
    }

    Ok(removed)
}

/// Files under `find.dirs` whose name matches `find.name`
pub fn find_matches(find: &CleanFind, base: &Path) -> AppmakeResult<Vec<PathBuf>> {
    if find.dirs.is_empty() {
        return Err(AppmakeError::ConfigMissing("`clean.find.dirs` is empty".to_string()));
    }
    let name = Regex::new(&find.name).map_err(|e| AppmakeError::OptionInvalid {
        option: "clean.find.name".to_string(),
        reason: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for dir in &find.dirs {
        let dir = base.join(dir);
        if !dir.is_dir() {
            debug!("Nothing to clean under {}", dir.display());
            continue;
        }
        matches.extend(scan_dir(&dir)?.into_iter().filter(|path| {
            path.file_name()
                .is_some_and(|n| name.is_match(&n.to_string_lossy()))
        }));
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn removes_files_and_dirs_and_skips_missing() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("build").join("js")).unwrap();
        std::fs::write(temp.path().join("build").join("js").join("a.js"), "").unwrap();
        std::fs::write(temp.path().join("bundle.css"), "").unwrap();

        let config = CleanConfig {
            paths: vec![
                PathBuf::from("build"),
                PathBuf::from("bundle.css"),
                PathBuf::from("missing"),
            ],
            find: None,
        };
        let removed = clean(&config, temp.path()).await.unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!temp.path().join("build").exists());
        assert!(!temp.path().join("bundle.css").exists());
    }

    #[tokio::test]
    async fn find_removes_matching_names_only() {
        let temp = TempDir::new().unwrap();
        let css = temp.path().join("public").join("css");
        std::fs::create_dir_all(css.join("themes")).unwrap();
        std::fs::write(css.join("main.less"), "").unwrap();
        std::fs::write(css.join("main.css"), "").unwrap();
        std::fs::write(css.join("themes").join("dark.css"), "").unwrap();

        let config = CleanConfig {
            paths: vec![],
            find: Some(CleanFind {
                dirs: vec![PathBuf::from("public/css"), PathBuf::from("missing")],
                name: r"\.css$".to_string(),
            }),
        };
        let removed = clean(&config, temp.path()).await.unwrap();

        assert_eq!(removed, vec![css.join("main.css"), css.join("themes").join("dark.css")]);
        assert!(css.join("main.less").exists());
        assert!(!css.join("main.css").exists());
    }

    #[test]
    fn find_rejects_bad_pattern() {
        let find = CleanFind {
            dirs: vec![PathBuf::from(".")],
            name: "(".to_string(),
        };
        let err = find_matches(&find, Path::new(".")).unwrap_err();
        assert!(matches!(err, AppmakeError::OptionInvalid { .. }));
    }

    #[tokio::test]
    async fn empty_paths_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let err = clean(&CleanConfig::default(), temp.path()).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
