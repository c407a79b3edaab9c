//! Build actions that wrap external tools
//!
//! Each action shells out to a tool the project installs itself (LESS
//! compiler, template compiler, module bundler) and fails on a non-zero
//! exit code. The parallel optimizer lives in [`crate::optimize`].

pub mod bundle;
pub mod clean;
pub mod less;
pub mod templates;

use crate::error::{AppmakeError, AppmakeResult};
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Render a command line for display
pub fn describe<I, S>(program: &str, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut parts = vec![program.to_string()];
    parts.extend(
        args.into_iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned()),
    );
    parts.join(" ")
}

/// Run `program` with inherited stdio, failing on a non-zero exit
pub async fn exec<I, S>(program: &str, args: I) -> AppmakeResult<()>
where
    I: IntoIterator<Item = S> + Clone,
    S: AsRef<OsStr>,
{
    let command = describe(program, args.clone());
    debug!("Executing: {}", command);

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| AppmakeError::command_failed(command.clone(), e))?;

    if status.success() {
        return Ok(());
    }

    match status.code() {
        Some(code) => Err(AppmakeError::CommandExit { command, code }),
        None => Err(AppmakeError::ProcessSignaled(command)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_joins_arguments() {
        assert_eq!(
            describe("node_modules/.bin/r.js", ["-o", "build.js"]),
            "node_modules/.bin/r.js -o build.js"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exec_reports_exit_code() {
        let err = exec("sh", ["-c", "exit 7"]).await.unwrap_err();
        match err {
            AppmakeError::CommandExit { code, command } => {
                assert_eq!(code, 7);
                assert_eq!(command, "sh -c exit 7");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exec_succeeds() {
        exec("sh", ["-c", "true"]).await.unwrap();
    }
}
