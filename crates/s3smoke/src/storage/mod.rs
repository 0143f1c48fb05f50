//! Object storage collaborator
//!
//! The harness talks to storage only through [`ObjectStore`]. [`S3Store`] is
//! the production implementation on top of `aws-sdk-s3`; tests substitute an
//! in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod s3;

pub use s3::S3Store;

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error codes S3-compatible servers return when the bucket is already there.
const BUCKET_ALREADY_OWNED_CODES: [&str; 2] = ["BucketAlreadyOwnedByYou", "BucketAlreadyExists"];

/// Failure reported by an [`ObjectStore`] operation
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request failed in transport or was rejected by the service
    #[error("{message}")]
    Service {
        /// S3 error code, when the service returned one
        code: Option<String>,
        message: String,
    },

    /// The response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),

    /// The request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl StoreError {
    pub fn service(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// S3 error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Whether a failed bucket creation means the bucket already exists
///
/// The error code is checked first; servers that only put the code in the
/// message text are matched by substring.
pub fn is_bucket_already_owned(err: &StoreError) -> bool {
    if let Some(code) = err.code() {
        if BUCKET_ALREADY_OWNED_CODES.contains(&code) {
            return true;
        }
    }

    let message = err.to_string();
    BUCKET_ALREADY_OWNED_CODES
        .iter()
        .any(|code| message.contains(code))
}

/// Object metadata as returned by a HEAD request; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Operations the smoke test needs from an S3-compatible store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Names of all buckets visible to the caller
    async fn list_buckets(&self) -> StoreResult<Vec<String>>;

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<()>;

    /// Keys of the first page of a ListObjectsV2 listing
    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<String>>;

    /// Full object body
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Vec<u8>>;

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectMetadata>;

    /// Server-side copy within `bucket`
    async fn copy_object(&self, bucket: &str, source_key: &str, dest_key: &str) -> StoreResult<()>;

    /// Bulk delete in a single request
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<()>;

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()>;
}
