//! Layered recognition pipeline turning design-tool trees into IRF trees.
//!
//! The pipeline is a priority-ordered chain of strategies evaluated per node:
//!
//! 1. Known componentId → component-specific recognizer
//! 2. Narrow name-based guess ("page")
//! 3. Structural pattern recognizer (placeholder, never exercised)
//! 4. Native-type fallback (FRAME/TEXT/RECTANGLE/...)
//! 5. Unrecognized → insight for observability, subtree dropped
//!
//! First match wins. A component recognizer that is invoked but declines is
//! terminal: the node is dropped without trying later strategies (see
//! [`DECLINE_IS_TERMINAL`]).
//!
//! Recognition is parent-context-sensitive: every recursive call receives the
//! current node's resolved type as its children's `parent_type`, because
//! several heuristics (section vs. group) are not purely local.

mod context;
mod dispatch;
mod error;
mod intent;
mod native;
mod recognizer;
mod suggest;

pub use context::{RecognizerContext, BUILTIN_COMPONENT_MAP};
pub use dispatch::{
    Dispatcher, InsightSource, RecognizeOptions, StrategyOutcome, DECLINE_IS_TERMINAL,
    SOURCE_COMPONENT, SOURCE_NAME_HEURISTIC, SOURCE_NATIVE,
};
pub use error::{RecognizeError, RecognizeResult};
pub use intent::{map_design_intent, parse_padding_shorthand};
pub use recognizer::{
    ComponentRecognizer, EditorialCardRecognizer, ListItemRecognizer, ListRecognizer,
    RecognizerRegistry,
};
pub use suggest::quick_suggest;

#[cfg(test)]
pub(crate) mod test_support;
