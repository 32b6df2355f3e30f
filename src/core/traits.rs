use async_trait::async_trait;

use super::types::{GenerationChunk, GenerationRequest, GenerationResult};

/// Receives streamed fragments in arrival order.
pub type ChunkSink<'a> = &'a mut (dyn FnMut(&GenerationChunk) + Send);

/// Anything that can turn a [`GenerationRequest`] into text.
///
/// Implementations never fail with `Err`: failures are reported through
/// [`GenerationResult::error`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult;
}
