//! ModelProvider trait definition.
//!
//! The one abstraction the context assembler calls out through. The
//! adapter is opaque beyond this contract: it takes the ordered prompt
//! payload and either returns reply text or fails. Latency and quota
//! are the adapter's concern; the core tolerates arbitrary latency by
//! wrapping calls in its own deadline.

use banterline_types::error::ModelError;
use banterline_types::turn::PromptTurn;

/// A generative-text backend.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// The HTTP implementation lives in `banterline-infra`.
pub trait ModelProvider: Send + Sync {
    /// Human-readable adapter name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a reply for the ordered conversation payload.
    fn generate(
        &self,
        turns: &[PromptTurn],
    ) -> impl std::future::Future<Output = Result<String, ModelError>> + Send;
}
