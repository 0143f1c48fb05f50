//! s3smoke library
//!
//! Smoke test for S3-compatible object storage (MinIO and friends).
//!
//! # Overview
//!
//! The `s3smoke` binary walks an endpoint through nine dependent steps:
//!
//! 1. List Buckets
//! 2. Create Bucket
//! 3. Upload Object (stops the run when it fails)
//! 4. List Objects
//! 5. Download Object (content must match the upload byte for byte)
//! 6. Get Object Metadata
//! 7. Copy Object
//! 8. Delete Objects
//! 9. Delete Bucket
//!
//! Each step is recorded as passed or failed, a summary is printed, and the
//! process exits with `0` only when every recorded step passed.
//!
//! The storage client sits behind the [`storage::ObjectStore`] trait;
//! [`storage::S3Store`] is the `aws-sdk-s3` implementation used by the binary.

pub mod config;
pub mod error;
pub mod harness;
pub mod report;
pub mod storage;

// Re-export commonly used types
pub use config::HarnessConfig;
pub use error::{CliError, Result};
pub use harness::{RunReport, Runner, Step, StepResult, TestObject};
pub use storage::{ObjectStore, S3Store};

use clap::Parser;

/// s3smoke - S3 compatibility smoke test
///
/// Connection settings are taken from the positional arguments when endpoint,
/// access key and secret key are all given; otherwise from MINIO_ENDPOINT,
/// MINIO_ACCESS_KEY, MINIO_SECRET_KEY and MINIO_TEST_BUCKET.
#[derive(Parser, Debug)]
#[command(name = "s3smoke")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// S3 endpoint URL (e.g. http://localhost:9000)
    #[arg(allow_hyphen_values = true)]
    pub endpoint: Option<String>,

    /// Access key
    #[arg(allow_hyphen_values = true)]
    pub access_key: Option<String>,

    /// Secret key
    #[arg(allow_hyphen_values = true)]
    pub secret_key: Option<String>,

    /// Bucket to create, exercise and delete
    #[arg(allow_hyphen_values = true)]
    pub bucket: Option<String>,

    /// Extra positional arguments are ignored
    #[arg(hide = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,

    /// Signing region
    #[arg(long, env = "MINIO_REGION", default_value = config::DEFAULT_REGION)]
    pub region: String,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
