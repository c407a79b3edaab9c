//! File set resolution
//!
//! Expands a directory root or an explicit list into the concrete list of
//! files to optimize, keeping only the target extension and dropping every
//! path an exclude pattern matches.

use crate::error::{AppmakeError, AppmakeResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Where the candidate files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Scan a directory tree
    Dir(PathBuf),
    /// Use these files as given
    Files(Vec<PathBuf>),
}

impl FileSource {
    /// Pick the source from the optional `dir` / `files` options; `dir` wins
    pub fn from_options(dir: Option<&Path>, files: &[PathBuf]) -> AppmakeResult<Self> {
        match dir {
            Some(dir) => Ok(Self::Dir(dir.to_path_buf())),
            None if !files.is_empty() => Ok(Self::Files(files.to_vec())),
            None => Err(AppmakeError::ConfigMissing(
                "`files` or `dir` for optimization is not set".to_string(),
            )),
        }
    }
}

/// Compile exclude patterns
pub fn compile_excludes(patterns: &[String]) -> AppmakeResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| AppmakeError::InvalidExcludePattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Whether any pattern matches anywhere in `path`
pub fn is_excluded(path: &Path, excludes: &[Regex]) -> bool {
    let text = path_for_matching(path);
    excludes.iter().any(|re| re.is_match(&text))
}

fn path_for_matching(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// Resolve `source` into the ordered candidate list
pub fn resolve(
    source: &FileSource,
    extension: &str,
    excludes: &[Regex],
) -> AppmakeResult<Vec<PathBuf>> {
    let candidates = match source {
        FileSource::Dir(dir) => scan_dir(dir)?,
        FileSource::Files(files) => files.clone(),
    };

    let resolved: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|p| has_extension(p, extension))
        .filter(|p| {
            let excluded = is_excluded(p, excludes);
            if excluded {
                debug!("Excluded: {}", p.display());
            }
            !excluded
        })
        .collect();

    debug!("Resolved {} files", resolved.len());
    Ok(resolved)
}

/// Every regular file under `dir`, sorted by name
pub(crate) fn scan_dir(dir: &Path) -> AppmakeResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppmakeError::PathNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let context = format!("scanning {}", dir.display());
            match e.into_io_error() {
                Some(source) => AppmakeError::io(context, source),
                None => AppmakeError::User(format!("{}: filesystem loop", context)),
            }
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
