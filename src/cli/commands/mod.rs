//! CLI command implementations

pub mod build;
pub mod config;
pub mod init;
pub mod optimize;

pub use build::{
    build, bundle_modules as bundle, clean, compile_less as less, compile_templates as templates,
    rebuild,
};
pub use config::execute as config;
pub use init::execute as init;
pub use optimize::execute as optimize;
