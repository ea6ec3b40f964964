//! Chunk content extraction

use crate::retrieval::Chunk;

/// Take the `content` of each chunk, in the order the service returned
/// them. Scores, highlights and document IDs are dropped.
pub fn extract(chunks: &[Chunk]) -> Vec<String> {
    chunks.iter().map(|chunk| chunk.content.clone()).collect()
}
