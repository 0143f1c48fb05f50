use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier},
    Client,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{ObjectMetadata, ObjectStore, StoreError, StoreResult};
use crate::config::{HarnessConfig, DEFAULT_REGION};
use crate::error::{CliError, Result};

/// [`ObjectStore`] backed by the AWS SDK, configured for S3-compatible servers
///
/// Requests use static credentials and path-style addressing, which MinIO
/// requires.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    region: String,
}

impl S3Store {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| CliError::client_init(format!("invalid endpoint '{}': {}", config.endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(CliError::client_init(format!(
                "unsupported endpoint scheme '{}', expected http or https",
                endpoint.scheme()
            )));
        }
        if endpoint.host_str().is_none() {
            return Err(CliError::client_init(format!(
                "endpoint '{}' has no host",
                config.endpoint
            )));
        }

        debug!(endpoint = %config.endpoint, region = %config.region, "Initializing S3 client");

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "s3smoke-static",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .build();

        info!(endpoint = %config.endpoint, "S3 client initialized");

        Ok(Self {
            client: Client::from_conf(s3_config),
            region: config.region.clone(),
        })
    }
}

fn service_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    StoreError::Service {
        code,
        message: DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self))]
    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(service_error)?;

        Ok(response
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    #[instrument(skip(self))]
    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        // us-east-1 is the implicit location; naming it explicitly is rejected
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request.send().await.map_err(service_error)?;

        info!("Created bucket {}", bucket);
        Ok(())
    }

    #[instrument(skip(self, body))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<()> {
        debug!("Uploading {} bytes to s3://{}/{}", body.len(), bucket, key);

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(service_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<String>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(service_error)?;

        if response.is_truncated().unwrap_or(false) {
            debug!("Listing of s3://{} truncated to the first page", bucket);
        }

        Ok(response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_string))
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(service_error)?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Body(DisplayErrorContext(&e).to_string()))?
            .into_bytes()
            .to_vec();

        debug!("Downloaded {} bytes from s3://{}/{}", data.len(), bucket, key);
        Ok(data)
    }

    #[instrument(skip(self))]
    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectMetadata> {
        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(service_error)?;

        Ok(ObjectMetadata {
            content_type: response.content_type().map(str::to_string),
            content_length: response.content_length(),
            last_modified: response
                .last_modified()
                .and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
            etag: response.e_tag().map(str::to_string),
        })
    }

    #[instrument(skip(self))]
    async fn copy_object(&self, bucket: &str, source_key: &str, dest_key: &str) -> StoreResult<()> {
        let copy_source = format!("{}/{}", bucket, source_key);

        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(&copy_source)
            .key(dest_key)
            .send()
            .await
            .map_err(service_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<()> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;

        let response = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(service_error)?;

        for failure in response.errors() {
            warn!(
                key = failure.key().unwrap_or_default(),
                code = failure.code().unwrap_or_default(),
                "Object not deleted: {}",
                failure.message().unwrap_or_default()
            );
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(service_error)?;

        info!("Deleted bucket {}", bucket);
        Ok(())
    }
}
