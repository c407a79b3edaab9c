//! UI module for consistent CLI output
//!
//! Uses `cliclack` for step output in interactive terminals, with automatic
//! fallback to plain `[OK]`/`[FAIL]` lines in CI/non-interactive
//! environments. Batch progress is an `indicatif` bar.
//!
//! # Example
//!
//! ```rust,ignore
//! use appmake::ui::{self, BatchProgress, UiContext};
//!
//! let ctx = UiContext::detect();
//!
//! ui::header(&ctx, "optimize 12 files");
//! let mut progress = BatchProgress::new(&ctx, 12, Duration::from_millis(100));
//! // ... run the batch with &mut progress as observer ...
//! progress.finish();
//! ui::step_ok(&ctx, "optimized 12 files");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{content, header, outro_error, outro_success, step_error, step_info, step_ok};
pub use progress::BatchProgress;
