use async_trait::async_trait;
use futures::stream::BoxStream;

use super::types::{ChatMessage, ModelDetails};
use crate::utils::Result;

/// One reply in progress: text fragments in arrival order, consumed once.
/// A host failure mid-reply surfaces as an `Err` item and ends the stream.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Everything the client needs from a model host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelHost: Send + Sync {
    /// Identifiers of the installed models
    async fn list(&self) -> Result<Vec<String>>;

    /// Context-aware chat over the full message history
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<FragmentStream>;

    /// Context-free completion of a single prompt
    async fn generate(&self, model: &str, prompt: &str) -> Result<FragmentStream>;

    /// Inspect an installed model
    async fn show(&self, model: &str) -> Result<ModelDetails>;
}
