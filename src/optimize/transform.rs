//! Per-file transformation
//!
//! A job hashes its input, short-circuits on a cache hit by copying the
//! stored blob over the file, and otherwise runs the optimizer against a
//! temporary output path. Blob writes and the final rename are applied by
//! the scheduler once the job reports back (see [`finish_job`]).

use crate::error::{AppmakeError, AppmakeResult};
use crate::optimize::cache::{blob_exists, blob_in, content_hash, CacheStore};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

/// Suffix appended to an input path to build its temporary output path
pub const TEMP_SUFFIX: &str = "_tmp_";

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Optimizer invocation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformCommand {
    pub program: String,
    pub args: Vec<String>,
    pub output_flag: String,
}

impl TransformCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, output_flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            output_flag: output_flag.into(),
        }
    }

    /// Stable encoding of the invocation, mixed into every content hash
    pub fn fingerprint(&self) -> String {
        serde_json::json!([self.program, self.args, self.output_flag]).to_string()
    }

    fn is_template(&self) -> bool {
        self.args
            .iter()
            .any(|a| a.contains(INPUT_PLACEHOLDER) || a.contains(OUTPUT_PLACEHOLDER))
    }

    /// Arguments for one file.
    ///
    /// Plain form is `<input> <args...> <output_flag> <output>`; when any
    /// argument mentions `{input}` or `{output}` the arguments are used as
    /// a template and nothing is added.
    pub fn argv(&self, input: &Path, output: &Path) -> Vec<OsString> {
        if self.is_template() {
            let input = input.to_string_lossy();
            let output = output.to_string_lossy();
            return self
                .args
                .iter()
                .map(|a| {
                    OsString::from(
                        a.replace(INPUT_PLACEHOLDER, &input)
                            .replace(OUTPUT_PLACEHOLDER, &output),
                    )
                })
                .collect();
        }

        let mut argv = Vec::with_capacity(self.args.len() + 3);
        argv.push(input.as_os_str().to_os_string());
        argv.extend(self.args.iter().map(OsString::from));
        if !self.output_flag.is_empty() {
            argv.push(OsString::from(&self.output_flag));
        }
        argv.push(output.as_os_str().to_os_string());
        argv
    }

    /// Human-readable command line, for logs and errors
    pub fn display(&self, input: &Path, output: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(
            self.argv(input, output)
                .iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

/// Captured output of a successful transformation
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Something that turns one input file into an output file
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Write the transformed `input` to `output`
    async fn transform(&self, input: &Path, output: &Path) -> AppmakeResult<TransformOutput>;

    /// Encoding of everything that affects the output besides the input bytes
    fn fingerprint(&self) -> String;
}

/// Transformer that spawns an external optimizer process
pub struct CommandTransformer {
    command: TransformCommand,
}

impl CommandTransformer {
    pub fn new(command: TransformCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Transformer for CommandTransformer {
    async fn transform(&self, input: &Path, output: &Path) -> AppmakeResult<TransformOutput> {
        let command_line = self.command.display(input, output);
        debug!("Executing: {}", command_line);

        let result = Command::new(&self.command.program)
            .args(self.command.argv(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AppmakeError::command_failed(command_line, e))?;

        let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&result.stderr).into_owned();

        if result.status.success() {
            Ok(TransformOutput { stdout, stderr })
        } else {
            Err(AppmakeError::TransformFailed {
                path: input.to_path_buf(),
                code: result.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            })
        }
    }

    fn fingerprint(&self) -> String {
        self.command.fingerprint()
    }
}

/// One file of a batch
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    /// Cache key; `None` when caching is disabled
    pub key: Option<String>,
    pub temp_output: PathBuf,
}

impl CandidateFile {
    pub fn new(path: PathBuf, key: Option<String>) -> Self {
        let temp_output = temp_output_path(&path);
        Self {
            path,
            key,
            temp_output,
        }
    }
}

/// `<path>_tmp_`, next to the input so the final rename stays on one filesystem
pub fn temp_output_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// What a job needs to know about the cache, captured at dispatch time
#[derive(Debug, Clone)]
pub struct CacheProbe {
    /// Hash recorded for this file's key on a previous run
    pub recorded: Option<String>,
    /// Directory holding content-addressed blobs
    pub blob_dir: PathBuf,
}

impl CacheProbe {
    /// Blob to restore when `hash` matches the recorded hash and its blob exists
    pub async fn hit(&self, hash: &str) -> Option<PathBuf> {
        if self.recorded.as_deref() != Some(hash) {
            return None;
        }
        blob_exists(&self.blob_dir, hash)
            .await
            .then(|| blob_in(&self.blob_dir, hash))
    }
}

/// How a job finished
#[derive(Debug)]
pub enum JobOutcome {
    /// Served from cache; the file already holds the stored output
    Cached,
    /// Optimizer ran; output waits at the candidate's temporary path
    Transformed {
        hash: Option<String>,
        output: TransformOutput,
    },
}

/// Run the job for one file
pub async fn run_job(
    transformer: Arc<dyn Transformer>,
    file: CandidateFile,
    probe: Option<CacheProbe>,
) -> AppmakeResult<JobOutcome> {
    let hash = if probe.is_some() {
        let contents = fs::read(&file.path)
            .await
            .map_err(|e| AppmakeError::io(format!("reading {}", file.path.display()), e))?;
        Some(content_hash(&contents, &transformer.fingerprint()))
    } else {
        None
    };

    if let (Some(probe), Some(hash)) = (&probe, &hash) {
        if let Some(blob) = probe.hit(hash).await {
            fs::copy(&blob, &file.path).await.map_err(|e| {
                AppmakeError::io(format!("restoring {} from cache", file.path.display()), e)
            })?;
            debug!("Skip optimization for {} due to cache", file.path.display());
            return Ok(JobOutcome::Cached);
        }
    }

    let output = transformer.transform(&file.path, &file.temp_output).await?;
    Ok(JobOutcome::Transformed { hash, output })
}

/// Apply a transformed job's result: store the blob, then replace the input
pub async fn finish_job(
    file: &CandidateFile,
    hash: Option<&str>,
    cache: Option<&mut CacheStore>,
) -> AppmakeResult<()> {
    if let (Some(store), Some(key), Some(hash)) = (cache, file.key.as_deref(), hash) {
        let bytes = fs::read(&file.temp_output).await.map_err(|e| {
            AppmakeError::io(format!("reading {}", file.temp_output.display()), e)
        })?;
        store.put(key, hash, &bytes).await?;
    }

    fs::rename(&file.temp_output, &file.path)
        .await
        .map_err(|e| AppmakeError::AtomicReplace {
            path: file.path.clone(),
            source: e,
        })
}
