//! Results upload seam. Only a logging no-op exists today.

use async_trait::async_trait;

use benchkit_core::error::Result;

#[async_trait]
pub trait ResultsUploader: Send + Sync {
    async fn upload(&self, json_payload: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpResultsUploader;

#[async_trait]
impl ResultsUploader for NoOpResultsUploader {
    async fn upload(&self, json_payload: &str) -> Result<()> {
        tracing::info!(payload_bytes = json_payload.len(), "upload stub invoked");
        Ok(())
    }
}
