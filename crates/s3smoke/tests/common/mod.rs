//! Shared test utilities for s3smoke integration tests
//!
//! [`MemoryStore`] is an in-memory [`ObjectStore`] that behaves like a small
//! S3 server (bucket ownership, NoSuchBucket, BucketNotEmpty) and records every
//! call so tests can assert which steps reached the store.

#![allow(dead_code)]

pub mod minio;

use async_trait::async_trait;
use chrono::Utc;
use s3smoke::storage::{ObjectMetadata, ObjectStore, StoreError, StoreResult};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// Store operations, one per trait method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListBuckets,
    CreateBucket,
    PutObject,
    ListObjects,
    GetObject,
    HeadObject,
    CopyObject,
    DeleteObjects,
    DeleteBucket,
}

pub const ALL_OPS: [Op; 9] = [
    Op::ListBuckets,
    Op::CreateBucket,
    Op::PutObject,
    Op::ListObjects,
    Op::GetObject,
    Op::HeadObject,
    Op::CopyObject,
    Op::DeleteObjects,
    Op::DeleteBucket,
];

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, BTreeMap<String, StoredObject>>,
    calls: Vec<Op>,
    copies: Vec<(String, String)>,
    deleted: Vec<String>,
}

/// In-memory S3 double
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing: HashSet<Op>,
    unreachable: bool,
    corrupt_downloads: bool,
    minimal_metadata: bool,
    uncoded_conflicts: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` fail with an `InternalError` service error
    pub fn failing(mut self, op: Op) -> Self {
        self.failing.insert(op);
        self
    }

    /// Fail every call the way a refused connection does
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Flip the first byte of every downloaded body
    pub fn corrupting_downloads(mut self) -> Self {
        self.corrupt_downloads = true;
        self
    }

    /// HEAD responses carry only the content length
    pub fn with_minimal_metadata(mut self) -> Self {
        self.minimal_metadata = true;
        self
    }

    /// Bucket-exists conflicts carry no error code, only the message text
    pub fn with_uncoded_conflicts(mut self) -> Self {
        self.uncoded_conflicts = true;
        self
    }

    /// Pre-create a bucket owned by the caller
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.lock().buckets.entry(bucket.to_string()).or_default();
        self
    }

    /// Pre-populate an object
    pub fn with_object(self, bucket: &str, key: &str, body: &[u8]) -> Self {
        self.lock().buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: "application/octet-stream".to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Op> {
        self.lock().calls.clone()
    }

    pub fn copies(&self) -> Vec<(String, String)> {
        self.lock().copies.clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.lock().buckets.contains_key(bucket)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|o| o.body.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and return the injected failure, if any
    fn enter(&self, op: Op) -> StoreResult<std::sync::MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(op);

        if self.unreachable {
            return Err(StoreError::service(
                None,
                "dispatch failure: io error: Connection refused (os error 111)",
            ));
        }
        if self.failing.contains(&op) {
            return Err(StoreError::service(
                Some("InternalError"),
                format!("{:?}: We encountered an internal error, please try again.", op),
            ));
        }
        Ok(state)
    }
}

fn no_such_bucket(bucket: &str) -> StoreError {
    StoreError::service(
        Some("NoSuchBucket"),
        format!("NoSuchBucket: The specified bucket does not exist ({})", bucket),
    )
}

fn no_such_key(key: &str) -> StoreError {
    StoreError::service(
        Some("NoSuchKey"),
        format!("NoSuchKey: The specified key does not exist ({})", key),
    )
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let state = self.enter(Op::ListBuckets)?;
        Ok(state.buckets.keys().cloned().collect())
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        let mut state = self.enter(Op::CreateBucket)?;
        if state.buckets.contains_key(bucket) {
            if self.uncoded_conflicts {
                return Err(StoreError::service(
                    None,
                    "service error: unhandled error (BucketAlreadyExists): The requested bucket name is not available.",
                ));
            }
            return Err(StoreError::service(
                Some("BucketAlreadyOwnedByYou"),
                "BucketAlreadyOwnedByYou: Your previous request to create the named bucket succeeded and you already own it.",
            ));
        }
        state.buckets.insert(bucket.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<()> {
        let mut state = self.enter(Op::PutObject)?;
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<String>> {
        let state = self.enter(Op::ListObjects)?;
        let objects = state.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        Ok(objects.keys().cloned().collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Vec<u8>> {
        let state = self.enter(Op::GetObject)?;
        let object = state
            .buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?
            .get(key)
            .ok_or_else(|| no_such_key(key))?;

        let mut body = object.body.clone();
        if self.corrupt_downloads {
            if let Some(first) = body.first_mut() {
                *first ^= 0x01;
            }
        }
        Ok(body)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectMetadata> {
        let state = self.enter(Op::HeadObject)?;
        let object = state
            .buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?
            .get(key)
            .ok_or_else(|| no_such_key(key))?;

        let content_length = Some(object.body.len() as i64);
        if self.minimal_metadata {
            return Ok(ObjectMetadata {
                content_length,
                ..Default::default()
            });
        }

        Ok(ObjectMetadata {
            content_type: Some(object.content_type.clone()),
            content_length,
            last_modified: Some(Utc::now()),
            etag: Some(format!("\"{:032x}\"", object.body.len())),
        })
    }

    async fn copy_object(&self, bucket: &str, source_key: &str, dest_key: &str) -> StoreResult<()> {
        let mut state = self.enter(Op::CopyObject)?;
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        let source = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| no_such_key(source_key))?;
        objects.insert(dest_key.to_string(), source);
        state
            .copies
            .push((source_key.to_string(), dest_key.to_string()));
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<()> {
        let mut state = self.enter(Op::DeleteObjects)?;
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        for key in keys {
            objects.remove(key);
        }
        state.deleted.extend(keys.iter().cloned());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        let mut state = self.enter(Op::DeleteBucket)?;
        let empty = state
            .buckets
            .get(bucket)
            .map(|objects| objects.is_empty())
            .ok_or_else(|| no_such_bucket(bucket))?;
        if !empty {
            return Err(StoreError::service(
                Some("BucketNotEmpty"),
                "BucketNotEmpty: The bucket you tried to delete is not empty",
            ));
        }
        state.buckets.remove(bucket);
        Ok(())
    }
}
