//! Connection settings for a smoke-test run
//!
//! Settings come from one of two places, never a mix: the positional
//! arguments when endpoint, access key and secret key are all present, or the
//! `MINIO_*` environment variables otherwise.

use crate::error::{CliError, Result};
use crate::Cli;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Bucket used when none is given.
pub const DEFAULT_BUCKET: &str = "sdk-test-bucket-go";

/// Region used for request signing when none is given.
pub const DEFAULT_REGION: &str = "us-east-1";

pub const ENV_ENDPOINT: &str = "MINIO_ENDPOINT";
pub const ENV_ACCESS_KEY: &str = "MINIO_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "MINIO_SECRET_KEY";
pub const ENV_BUCKET: &str = "MINIO_TEST_BUCKET";

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

impl HarnessConfig {
    /// Resolve settings from parsed arguments and the process environment
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve settings from parsed arguments and an environment lookup
    ///
    /// Empty values count as missing. Fails with [`CliError::MissingConfig`]
    /// naming every required value that could not be found.
    pub fn resolve(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let positional = [&cli.endpoint, &cli.access_key, &cli.secret_key]
            .iter()
            .all(|arg| present(arg.as_deref()).is_some());

        let (endpoint, access_key, secret_key, bucket) = if positional {
            (
                cli.endpoint.clone(),
                cli.access_key.clone(),
                cli.secret_key.clone(),
                cli.bucket.clone(),
            )
        } else {
            tracing::debug!("Positional arguments incomplete, reading MINIO_* environment");
            (
                env(ENV_ENDPOINT),
                env(ENV_ACCESS_KEY),
                env(ENV_SECRET_KEY),
                env(ENV_BUCKET),
            )
        };

        let endpoint = present(endpoint.as_deref());
        let access_key = present(access_key.as_deref());
        let secret_key = present(secret_key.as_deref());

        let mut missing = Vec::new();
        if endpoint.is_none() {
            missing.push("endpoint");
        }
        if access_key.is_none() {
            missing.push("access key");
        }
        if secret_key.is_none() {
            missing.push("secret key");
        }

        match (endpoint, access_key, secret_key) {
            (Some(endpoint), Some(access_key), Some(secret_key)) => Ok(Self {
                endpoint: endpoint.to_string(),
                access_key: access_key.to_string(),
                secret_key: secret_key.to_string(),
                bucket: present(bucket.as_deref())
                    .unwrap_or(DEFAULT_BUCKET)
                    .to_string(),
                region: cli.region.clone(),
            }),
            _ => Err(CliError::MissingConfig(missing)),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
