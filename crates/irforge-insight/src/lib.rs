//! AI insights for recognized nodes, with graceful degradation.
//!
//! The generator calls an external OpenAI-compatible classifier to suggest a
//! component type for a node, biased by the local quick-suggestion heuristic.
//! It never fails outward: a missing provider, a network error, or a
//! malformed reply all degrade to a heuristic fallback insight, so the
//! recognition pipeline always sees an insight.

mod generator;
mod provider;

pub use generator::{InsightGenerator, FALLBACK_REASONING, PAGE_REASONING};
pub use provider::{
    CompletionProvider, LlmResolver, OpenAiProvider, ProviderError, ProviderResult, Turn,
};
