//! appmake - build automation for web apps
//!
//! Runs the usual front-end build actions by shelling out to project tools,
//! and minifies scripts in parallel with a persistent content-addressed
//! cache that skips unchanged inputs across runs.

pub mod cli;
pub mod config;
pub mod error;
pub mod optimize;
pub mod tasks;
pub mod ui;

pub use error::{AppmakeError, AppmakeResult};
