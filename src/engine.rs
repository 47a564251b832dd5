use anyhow::Result;
use async_trait::async_trait;

/// Inference seam between the HTTP handler and the model backend.
///
/// Returns the raw class logits `[non-toxic, toxic]`; softmax normalization
/// happens during response assembly.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn score(&self, text: &str) -> Result<[f32; 2]>;
}
