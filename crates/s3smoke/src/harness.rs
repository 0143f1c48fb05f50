//! Test sequencing and result bookkeeping
//!
//! [`Runner`] walks the fixed [`Step`] sequence against an [`ObjectStore`],
//! records one [`StepResult`] per attempted step and hands the log back as a
//! [`RunReport`]. Steps never propagate failures; the only control-flow
//! decision is to stop after a failed upload, in which case the remaining
//! steps are absent from the report rather than recorded as failed.

use chrono::{DateTime, Local, SecondsFormat};
use colored::Colorize;
use tracing::{debug, info, warn};

use crate::report;
use crate::storage::{is_bucket_already_owned, ObjectStore};

const UPLOAD_CONTENT_TYPE: &str = "text/plain";

/// The nine smoke-test steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ListBuckets,
    CreateBucket,
    UploadObject,
    ListObjects,
    DownloadObject,
    GetObjectMetadata,
    CopyObject,
    DeleteObjects,
    DeleteBucket,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::ListBuckets,
        Step::CreateBucket,
        Step::UploadObject,
        Step::ListObjects,
        Step::DownloadObject,
        Step::GetObjectMetadata,
        Step::CopyObject,
        Step::DeleteObjects,
        Step::DeleteBucket,
    ];

    /// Name used in reports
    pub fn name(self) -> &'static str {
        match self {
            Step::ListBuckets => "List Buckets",
            Step::CreateBucket => "Create Bucket",
            Step::UploadObject => "Upload Object",
            Step::ListObjects => "List Objects",
            Step::DownloadObject => "Download Object",
            Step::GetObjectMetadata => "Get Object Metadata",
            Step::CopyObject => "Copy Object",
            Step::DeleteObjects => "Delete Objects",
            Step::DeleteBucket => "Delete Bucket",
        }
    }

    /// 1-based position in the sequence
    pub fn number(self) -> usize {
        self as usize + 1
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one attempted step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub step: Step,
    pub passed: bool,
}

impl StepResult {
    pub fn new(step: Step, passed: bool) -> Self {
        Self { step, passed }
    }

    pub fn name(&self) -> &'static str {
        self.step.name()
    }
}

/// Ordered log of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    results: Vec<StepResult>,
}

impl RunReport {
    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    /// Process exit code: 0 when every recorded step passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

impl From<Vec<StepResult>> for RunReport {
    fn from(results: Vec<StepResult>) -> Self {
        Self { results }
    }
}

/// The object uploaded in step 3 and checked by the later steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestObject {
    pub key: String,
    pub content: String,
}

impl TestObject {
    /// Time-stamped key and content for a run started at `now`
    pub fn at(now: DateTime<Local>) -> Self {
        Self {
            key: format!("test-file-{}.txt", now.format("%Y%m%d-%H%M%S")),
            content: format!(
                "Hello from MinIO! Tested at {}",
                now.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        }
    }

    pub fn now() -> Self {
        Self::at(Local::now())
    }

    /// Destination key of the copy step
    pub fn copy_key(&self) -> String {
        format!("{}.copy", self.key)
    }
}

/// Drives the step sequence against one bucket
pub struct Runner<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    bucket: String,
    results: Vec<StepResult>,
}

impl<'a, S: ObjectStore + ?Sized> Runner<'a, S> {
    pub fn new(store: &'a S, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            results: Vec::with_capacity(Step::ALL.len()),
        }
    }

    /// Run all steps with a freshly generated test object
    pub async fn run(self) -> RunReport {
        self.run_with(TestObject::now()).await
    }

    /// Run all steps with the given test object
    pub async fn run_with(mut self, object: TestObject) -> RunReport {
        info!(bucket = %self.bucket, key = %object.key, "Starting smoke test");

        self.list_buckets().await;
        self.create_bucket().await;

        if !self.upload_object(&object).await {
            println!("\nSkipping remaining tests due to upload failure.");
            warn!("Upload failed, remaining steps skipped");
            return self.finish();
        }

        let copy_key = object.copy_key();
        self.list_objects().await;
        self.download_object(&object).await;
        self.head_object(&object.key).await;
        self.copy_object(&object.key, &copy_key).await;
        self.delete_objects(&[object.key.clone(), copy_key]).await;
        self.delete_bucket().await;

        self.finish()
    }

    fn finish(self) -> RunReport {
        RunReport::from(self.results)
    }

    fn record(&mut self, step: Step, passed: bool) -> bool {
        debug!(step = step.name(), passed, "Step finished");
        self.results.push(StepResult::new(step, passed));
        passed
    }

    fn fail(&mut self, step: Step, err: impl std::fmt::Display) -> bool {
        println!("{} {}\n", "✗ Failed:".red(), err);
        self.record(step, false)
    }

    fn succeed(&mut self, step: Step, message: impl std::fmt::Display) -> bool {
        println!("{} {}\n", "✓".green(), message);
        self.record(step, true)
    }

    async fn list_buckets(&mut self) -> bool {
        let step = Step::ListBuckets;
        println!("Test {}: {}", step.number(), step);

        match self.store.list_buckets().await {
            Ok(buckets) => self.succeed(step, report::bucket_listing_line(&buckets)),
            Err(e) => self.fail(step, e),
        }
    }

    async fn create_bucket(&mut self) -> bool {
        let step = Step::CreateBucket;
        println!("Test {}: {} '{}'", step.number(), step, self.bucket);

        match self.store.create_bucket(&self.bucket).await {
            Ok(()) => {
                let message = format!("Success! Created bucket '{}'", self.bucket);
                self.succeed(step, message)
            }
            Err(e) if is_bucket_already_owned(&e) => {
                let message = format!("Bucket '{}' already exists (owned by you)", self.bucket);
                self.succeed(step, message)
            }
            Err(e) => self.fail(step, e),
        }
    }

    async fn upload_object(&mut self, object: &TestObject) -> bool {
        let step = Step::UploadObject;
        println!("Test {}: {}", step.number(), step);

        let body = object.content.as_bytes().to_vec();
        match self
            .store
            .put_object(&self.bucket, &object.key, body, UPLOAD_CONTENT_TYPE)
            .await
        {
            Ok(()) => self.succeed(step, format!("Success! Uploaded object '{}'", object.key)),
            Err(e) => self.fail(step, e),
        }
    }

    async fn list_objects(&mut self) -> bool {
        let step = Step::ListObjects;
        println!("Test {}: {} in Bucket '{}'", step.number(), step, self.bucket);

        match self.store.list_objects(&self.bucket).await {
            Ok(keys) => {
                let listing = report::object_listing_lines(&keys).join("\n");
                self.succeed(step, format!("Success! {}", listing))
            }
            Err(e) => self.fail(step, e),
        }
    }

    async fn download_object(&mut self, object: &TestObject) -> bool {
        let step = Step::DownloadObject;
        println!("Test {}: {} '{}'", step.number(), step, object.key);

        let data = match self.store.get_object(&self.bucket, &object.key).await {
            Ok(data) => data,
            Err(e) => return self.fail(step, e),
        };

        if data != object.content.as_bytes() {
            println!("{}", "✗ Content mismatch!".red());
            println!("  Expected: {}", object.content);
            println!("  Got: {}\n", String::from_utf8_lossy(&data));
            return self.record(step, false);
        }

        self.succeed(
            step,
            format!("Success! Downloaded and verified content:\n  Content: {}", object.content),
        )
    }

    async fn head_object(&mut self, key: &str) -> bool {
        let step = Step::GetObjectMetadata;
        println!("Test {}: {} '{}'", step.number(), step, key);

        match self.store.head_object(&self.bucket, key).await {
            Ok(metadata) => {
                let mut message = String::from("Success! Object metadata:");
                for line in report::metadata_lines(&metadata) {
                    message.push('\n');
                    message.push_str(&line);
                }
                self.succeed(step, message)
            }
            Err(e) => self.fail(step, e),
        }
    }

    async fn copy_object(&mut self, source_key: &str, dest_key: &str) -> bool {
        let step = Step::CopyObject;
        println!("Test {}: {}", step.number(), step);

        match self.store.copy_object(&self.bucket, source_key, dest_key).await {
            Ok(()) => self.succeed(
                step,
                format!("Success! Copied '{}' to '{}'", source_key, dest_key),
            ),
            Err(e) => self.fail(step, e),
        }
    }

    async fn delete_objects(&mut self, keys: &[String]) -> bool {
        let step = Step::DeleteObjects;
        println!("Test {}: {}", step.number(), step);

        match self.store.delete_objects(&self.bucket, keys).await {
            Ok(()) => self.succeed(step, "Success! Deleted test objects"),
            Err(e) => self.fail(step, e),
        }
    }

    async fn delete_bucket(&mut self) -> bool {
        let step = Step::DeleteBucket;
        println!("Test {}: {} '{}'", step.number(), step, self.bucket);

        match self.store.delete_bucket(&self.bucket).await {
            Ok(()) => {
                let message = format!("Success! Deleted bucket '{}'", self.bucket);
                self.succeed(step, message)
            }
            Err(e) => self.fail(step, e),
        }
    }
}
