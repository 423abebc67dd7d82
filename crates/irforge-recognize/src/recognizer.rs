//! Component-specific recognizers, keyed by resolved IRF type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use irforge_core::{DesignNode, IrfNode};
use serde_json::json;
use tracing::debug;

use crate::dispatch::{Dispatcher, RecognizeOptions, SOURCE_COMPONENT};
use crate::error::RecognizeResult;
use crate::intent::map_design_intent;

/// Recognition logic for one known component type.
///
/// Contract: `Ok(None)` means decline — the recognizer was invoked but does
/// not accept the node. Under the dispatcher's terminal-decline policy the
/// node is then dropped without trying later strategies.
pub trait ComponentRecognizer: Send + Sync {
    /// The resolved IRF type this recognizer handles.
    fn component_type(&self) -> &'static str;

    /// Attempt to recognize the node. The dispatcher is available for
    /// recursing into children.
    fn recognize<'a>(
        &'a self,
        node: &'a DesignNode,
        dispatcher: &'a Dispatcher,
        options: &'a RecognizeOptions,
        parent_type: &'a str,
    ) -> BoxFuture<'a, RecognizeResult<Option<IrfNode>>>;
}

/// Registry of component recognizers, keyed by resolved type.
#[derive(Clone)]
pub struct RecognizerRegistry {
    recognizers: HashMap<&'static str, Arc<dyn ComponentRecognizer>>,
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RecognizerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            recognizers: HashMap::new(),
        }
    }

    /// The registry with all built-in recognizers installed.
    pub fn builtin() -> Self {
        Self::new()
            .with(Arc::new(EditorialCardRecognizer))
            .with(Arc::new(ListRecognizer))
            .with(Arc::new(ListItemRecognizer))
    }

    /// Register a recognizer, replacing any existing one for the same type.
    pub fn register(&mut self, recognizer: Arc<dyn ComponentRecognizer>) {
        self.recognizers
            .insert(recognizer.component_type(), recognizer);
    }

    /// Register a recognizer (builder pattern).
    pub fn with(mut self, recognizer: Arc<dyn ComponentRecognizer>) -> Self {
        self.register(recognizer);
        self
    }

    /// Look up the recognizer for a resolved type.
    pub fn get(&self, component_type: &str) -> Option<&Arc<dyn ComponentRecognizer>> {
        self.recognizers.get(component_type)
    }

    /// All registered component types.
    pub fn component_types(&self) -> Vec<&'static str> {
        self.recognizers.keys().copied().collect()
    }
}

impl fmt::Debug for RecognizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizerRegistry")
            .field("types", &self.component_types())
            .finish()
    }
}

// =============================================================================
// editorial-card
// =============================================================================

/// Recognizer for the editorial card component.
///
/// Props are extracted by substring-matching componentProperty keys, which are
/// loosely named in the source tool ("Card Title", "Title#341:2", ...).
/// Output children are reordered: recognized children whose insight suggested
/// "image" first, then a synthesized headline and text from the extracted
/// props.
pub struct EditorialCardRecognizer;

impl ComponentRecognizer for EditorialCardRecognizer {
    fn component_type(&self) -> &'static str {
        "editorial-card"
    }

    fn recognize<'a>(
        &'a self,
        node: &'a DesignNode,
        dispatcher: &'a Dispatcher,
        options: &'a RecognizeOptions,
        _parent_type: &'a str,
    ) -> BoxFuture<'a, RecognizeResult<Option<IrfNode>>> {
        async move {
            let mut title: Option<String> = None;
            let mut paragraph: Option<String> = None;
            let mut show_paragraph: Option<bool> = None;

            for (key, value) in &node.component_properties {
                if key.contains("Show") && key.contains("Paragraph") {
                    show_paragraph = value.as_bool();
                } else if key.contains("Title") {
                    title = value.as_str().map(str::to_string);
                } else if key.contains("Paragraph") {
                    paragraph = value.as_str().map(str::to_string);
                }
            }

            // Children recursed under the card's own type, AI off: a card
            // yields exactly one insight, on the wrapping node.
            let recognized = dispatcher
                .recognize_children(&node.children, &options.without_insights(), "editorial-card")
                .await?;

            let mut children: Vec<IrfNode> = recognized
                .into_iter()
                .filter(|child| {
                    child
                        .insight
                        .as_ref()
                        .is_some_and(|insight| insight.suggested_type == "image")
                })
                .collect();

            if let Some(title) = &title {
                children.push(
                    IrfNode::new("headline", "Headline", &node.id, SOURCE_COMPONENT)
                        .with_prop("text", json!(title)),
                );
            }
            if show_paragraph.unwrap_or(true) {
                if let Some(paragraph) = &paragraph {
                    children.push(
                        IrfNode::new("text", "Paragraph", &node.id, SOURCE_COMPONENT)
                            .with_prop("text", json!(paragraph)),
                    );
                }
            }

            debug!(node_id = %node.id, children = children.len(), "editorial_card_recognized");

            let mut out = IrfNode::new("editorial-card", &node.name, &node.id, SOURCE_COMPONENT);
            if let Some(title) = title {
                out.props.insert("title".to_string(), json!(title));
            }
            if let Some(paragraph) = paragraph {
                out.props.insert("paragraph".to_string(), json!(paragraph));
            }
            out.design = map_design_intent(node, dispatcher.ctx());
            if !children.is_empty() {
                out.children = Some(children);
            }
            Ok(Some(out))
        }
        .boxed()
    }
}

// =============================================================================
// list
// =============================================================================

/// Recognizer for list containers. Matches only component instances; any
/// other raw type declines. Children are recursed under the *unchanged*
/// parent type, so list entries keep their surrounding context.
pub struct ListRecognizer;

impl ComponentRecognizer for ListRecognizer {
    fn component_type(&self) -> &'static str {
        "list"
    }

    fn recognize<'a>(
        &'a self,
        node: &'a DesignNode,
        dispatcher: &'a Dispatcher,
        options: &'a RecognizeOptions,
        parent_type: &'a str,
    ) -> BoxFuture<'a, RecognizeResult<Option<IrfNode>>> {
        async move {
            if node.node_type != "INSTANCE" {
                return Ok(None);
            }

            let children = dispatcher
                .recognize_children(&node.children, options, parent_type)
                .await?;

            let mut out = IrfNode::new("list", &node.name, &node.id, SOURCE_COMPONENT);
            out.design = map_design_intent(node, dispatcher.ctx());
            if !children.is_empty() {
                out.children = Some(children);
            }
            Ok(Some(out))
        }
        .boxed()
    }
}

// =============================================================================
// list-item
// =============================================================================

/// Recognizer for list items. Matches only component instances and flattens:
/// the subtree structure is ignored in favor of a depth-first search for the
/// "Item" and "Paragraph" TEXT leaves, first match in document order. Emits a
/// flat node with no children.
pub struct ListItemRecognizer;

impl ComponentRecognizer for ListItemRecognizer {
    fn component_type(&self) -> &'static str {
        "list-item"
    }

    fn recognize<'a>(
        &'a self,
        node: &'a DesignNode,
        dispatcher: &'a Dispatcher,
        _options: &'a RecognizeOptions,
        _parent_type: &'a str,
    ) -> BoxFuture<'a, RecognizeResult<Option<IrfNode>>> {
        async move {
            if node.node_type != "INSTANCE" {
                return Ok(None);
            }

            let title = node.find_text_leaf("Item").and_then(|n| n.text.clone());
            let paragraph = node
                .find_text_leaf("Paragraph")
                .and_then(|n| n.text.clone());

            let mut out = IrfNode::new("list-item", &node.name, &node.id, SOURCE_COMPONENT);
            if let Some(title) = title {
                out.props.insert("title".to_string(), json!(title));
            }
            if let Some(paragraph) = paragraph {
                out.props.insert("paragraph".to_string(), json!(paragraph));
            }
            out.design = map_design_intent(node, dispatcher.ctx());
            Ok(Some(out))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dispatcher_with;
    use irforge_core::GlobalStyles;

    fn instance(id: &str, name: &str, component_id: &str) -> DesignNode {
        let mut node = DesignNode::new(id, name, "INSTANCE");
        node.component_id = Some(component_id.to_string());
        node
    }

    fn text_leaf(id: &str, name: &str, payload: &str) -> DesignNode {
        let mut node = DesignNode::new(id, name, "TEXT");
        node.text = Some(payload.to_string());
        node
    }

    #[tokio::test]
    async fn editorial_card_extracts_props_by_key_substring() {
        let (dispatcher, _insights) = dispatcher_with(GlobalStyles::default());
        let mut card = instance("1", "Card", "2031:412");
        card.component_properties
            .insert("Card Title#41:2".to_string(), json!("Breaking"));
        card.component_properties
            .insert("Paragraph#41:3".to_string(), json!("Long form copy."));

        let out = dispatcher
            .recognize(&card, &RecognizeOptions::default(), "page")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out.node_type, "editorial-card");
        assert_eq!(out.props["title"], "Breaking");
        assert_eq!(out.props["paragraph"], "Long form copy.");

        let children = out.children.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].node_type, "headline");
        assert_eq!(children[0].props["text"], "Breaking");
        assert_eq!(children[1].node_type, "text");
        assert_eq!(children[1].props["text"], "Long form copy.");
    }

    #[tokio::test]
    async fn editorial_card_honors_show_paragraph_flag() {
        let (dispatcher, _insights) = dispatcher_with(GlobalStyles::default());
        let mut card = instance("1", "Card", "2031:412");
        card.component_properties
            .insert("Title".to_string(), json!("Breaking"));
        card.component_properties
            .insert("Paragraph".to_string(), json!("Hidden copy"));
        card.component_properties
            .insert("Show Paragraph".to_string(), json!(false));

        let out = dispatcher
            .recognize(&card, &RecognizeOptions::default(), "page")
            .await
            .unwrap()
            .unwrap();

        let children = out.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].node_type, "headline");
        // The paragraph prop itself is still extracted.
        assert_eq!(out.props["paragraph"], "Hidden copy");
    }

    #[tokio::test]
    async fn editorial_card_with_no_props_has_no_children() {
        let (dispatcher, _insights) = dispatcher_with(GlobalStyles::default());
        let card = instance("1", "Card", "2031:412");

        let out = dispatcher
            .recognize(&card, &RecognizeOptions::default(), "page")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out.node_type, "editorial-card");
        assert!(out.children.is_none());
        assert!(out.props.is_empty());
    }

    #[tokio::test]
    async fn list_passes_parent_type_through_unchanged() {
        let (dispatcher, _insights) = dispatcher_with(GlobalStyles::default());
        let mut list = instance("1", "Items", "2031:544");
        list.children = vec![DesignNode::new("2", "Row", "FRAME")];

        let out = dispatcher
            .recognize(&list, &RecognizeOptions::default(), "page")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out.node_type, "list");
        // The FRAME child saw "page" (the list's own parent type), not
        // "list", so it resolved to a section.
        assert_eq!(out.children.as_ref().unwrap()[0].node_type, "section");
    }

    #[tokio::test]
    async fn list_item_flattens_to_dfs_text_leaves() {
        let (dispatcher, _insights) = dispatcher_with(GlobalStyles::default());
        let mut item = instance("1", "Entry", "2031:545");
        let mut wrapper = DesignNode::new("2", "Content", "FRAME");
        wrapper.children = vec![
            text_leaf("3", "Item", "First title"),
            text_leaf("4", "Paragraph", "Body"),
        ];
        item.children = vec![wrapper, text_leaf("5", "Item", "Second title")];

        let out = dispatcher
            .recognize(&item, &RecognizeOptions::default(), "page")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out.node_type, "list-item");
        // First match in document order wins; the subtree is flattened away.
        assert_eq!(out.props["title"], "First title");
        assert_eq!(out.props["paragraph"], "Body");
        assert!(out.children.is_none());
    }

    #[tokio::test]
    async fn list_item_declines_non_instance() {
        let (dispatcher, _insights) = dispatcher_with(GlobalStyles::default());
        let mut node = DesignNode::new("1", "Entry", "FRAME");
        node.component_id = Some("2031:545".to_string());

        let out = dispatcher
            .recognize(&node, &RecognizeOptions::default(), "page")
            .await
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn builtin_registry_contents() {
        let registry = RecognizerRegistry::builtin();
        assert!(registry.get("editorial-card").is_some());
        assert!(registry.get("list").is_some());
        assert!(registry.get("list-item").is_some());
        assert!(registry.get("page").is_none());
    }
}
