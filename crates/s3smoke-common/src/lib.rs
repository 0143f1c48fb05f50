//! s3smoke common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Ambient plumbing shared by the s3smoke workspace members. Right now that is
//! the logging setup: every binary in the workspace builds a [`LogConfig`] and
//! hands it to [`init_logging`] once at startup.
//!
//! # Example
//!
//! ```no_run
//! use s3smoke_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! let config = LogConfig::builder().level(LogLevel::Debug).build();
//! let _guard = init_logging(&config).ok();
//! ```

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LoggingGuard};
