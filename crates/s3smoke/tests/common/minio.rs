//! MinIO test container
//!
//! Requires a running Docker daemon; tests using it are `#[ignore]`d by
//! default.

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use s3smoke::HarnessConfig;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tracing::{debug, info};

pub const MINIO_ACCESS_KEY: &str = "minioadmin";
pub const MINIO_SECRET_KEY: &str = "minioadmin";

/// A MinIO server running in Docker for the lifetime of this value
pub struct TestMinio {
    _container: ContainerAsync<GenericImage>,
    endpoint: String,
}

impl TestMinio {
    pub async fn start() -> Result<Self> {
        info!("Starting MinIO test container...");

        let container = GenericImage::new("minio/minio", "latest")
            .with_exposed_port(9000.tcp())
            .with_wait_for(WaitFor::message_on_stdout("MinIO Object Storage Server"))
            .with_env_var("MINIO_ROOT_USER", MINIO_ACCESS_KEY)
            .with_env_var("MINIO_ROOT_PASSWORD", MINIO_SECRET_KEY)
            .with_cmd(vec!["server", "/data"])
            .start()
            .await
            .context("Failed to start MinIO container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get MinIO host")?;
        let port = container
            .get_host_port_ipv4(9000.tcp())
            .await
            .context("Failed to get MinIO port")?;

        let endpoint = format!("http://{}:{}", host, port);
        debug!("MinIO endpoint: {}", endpoint);

        Ok(Self {
            _container: container,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Harness settings pointing at this container
    pub fn harness_config(&self, bucket: &str) -> HarnessConfig {
        HarnessConfig {
            endpoint: self.endpoint.clone(),
            access_key: MINIO_ACCESS_KEY.to_string(),
            secret_key: MINIO_SECRET_KEY.to_string(),
            bucket: bucket.to_string(),
            region: "us-east-1".to_string(),
        }
    }

    /// Independent SDK client for arranging and checking container state
    pub async fn sdk_client(&self) -> S3Client {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(&self.endpoint)
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(aws_credential_types::Credentials::new(
                MINIO_ACCESS_KEY,
                MINIO_SECRET_KEY,
                None,
                None,
                "static",
            ))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();
        S3Client::from_conf(s3_config)
    }
}
