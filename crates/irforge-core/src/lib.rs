//! Core domain types shared across the entire irforge workspace.
//!
//! Two tree shapes live here: [`DesignNode`], the simplified node tree that a
//! design tool exports, and [`IrfNode`], the closed-vocabulary semantic tree
//! (IRF) that the recognition pipeline produces. Everything in between —
//! resolved design intent, AI insights, transformation results — is also
//! defined here so the recognizer, insight, and engine crates agree on one
//! vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// Closed IRF Type Vocabulary
// =============================================================================

/// Version tag stamped on every produced layout.
pub const IRF_VERSION: &str = "1.0";

/// The closed set of semantic types an IRF node may carry.
///
/// Recognizers must only ever emit types from this list; an AI insight's
/// `suggested_type` is free-form and may fall outside it.
pub const IRF_TYPES: [&str; 12] = [
    "page",
    "section",
    "group",
    "headline",
    "text",
    "image",
    "button",
    "list",
    "list-item",
    "editorial-card",
    "divider",
    "shape",
];

/// Check whether a type string belongs to the closed IRF vocabulary.
pub fn is_irf_type(candidate: &str) -> bool {
    IRF_TYPES.contains(&candidate)
}

// =============================================================================
// Input: Design Tree
// =============================================================================

/// A single node in the simplified design-tool tree.
///
/// `node_type` is the tool's free-form raw tag ("FRAME", "TEXT", ...).
/// `text_style`, `layout` and `fills` are *references* into the document's
/// [`GlobalStyles`] tables; `width`/`height` are inline literals read directly
/// off the node. Children are ordered and the tree is acyclic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub component_properties: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DesignNode>,
}

impl DesignNode {
    /// Create a bare node with the given identity and raw type tag.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            ..Default::default()
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DesignNode::subtree_size)
            .sum::<usize>()
    }

    /// Depth-first search (document order) for a descendant TEXT leaf with the
    /// exact given name and a non-empty text payload. Does not match `self`.
    pub fn find_text_leaf(&self, name: &str) -> Option<&DesignNode> {
        for child in &self.children {
            if child.node_type == "TEXT"
                && child.name == name
                && child.text.as_deref().is_some_and(|t| !t.is_empty())
            {
                return Some(child);
            }
            if let Some(found) = child.find_text_leaf(name) {
                return Some(found);
            }
        }
        None
    }
}

/// A validated design document: the root node list plus the global style
/// tables the node style references resolve against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignDocument {
    pub id: String,
    pub name: String,
    pub nodes: Vec<DesignNode>,
    pub styles: GlobalStyles,
    /// Opaque design variables handed through to the layout unchanged.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub global_vars: Value,
}

impl DesignDocument {
    /// Total node count across all root subtrees.
    pub fn total_nodes(&self) -> usize {
        self.nodes.iter().map(DesignNode::subtree_size).sum()
    }
}

// =============================================================================
// Global Style Tables
// =============================================================================

/// Lookup tables that style references on [`DesignNode`] resolve against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalStyles {
    pub text_styles: HashMap<String, TextStyleDef>,
    pub layout_styles: HashMap<String, LayoutStyleDef>,
    pub fill_styles: HashMap<String, Vec<FillDef>>,
}

/// A text style definition. `fill` is itself a reference into the fill-style
/// table; the first resolved entry provides the text color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyleDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// A layout style definition. Padding uses CSS shorthand syntax and is parsed
/// by the design-intent mapper, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutStyleDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
}

/// The kind of paint a fill carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillKind {
    Solid,
    Image,
}

/// One entry in a fill-style list: a solid color or an image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillDef {
    pub kind: FillKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl FillDef {
    /// A solid color fill.
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            kind: FillKind::Solid,
            color: Some(color.into()),
            image_ref: None,
        }
    }

    /// An image fill referencing an external asset.
    pub fn image(image_ref: impl Into<String>) -> Self {
        Self {
            kind: FillKind::Image,
            color: None,
            image_ref: Some(image_ref.into()),
        }
    }
}

// =============================================================================
// Design Intent
// =============================================================================

/// Resolved, structured styling decoupled from raw style references.
///
/// Every branch is optional; an intent whose branches are all absent must
/// collapse to `None` via [`DesignIntent::normalized`], never travel as an
/// all-empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<Appearance>,
}

impl DesignIntent {
    /// True when no branch is populated.
    pub fn is_empty(&self) -> bool {
        self.typography.is_none() && self.layout.is_none() && self.appearance.is_none()
    }

    /// Collapse an empty intent to `None`.
    pub fn normalized(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Typography branch of a design intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Layout branch of a design intent. Padding is fully expanded to four sides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Four-sided padding, expanded from CSS shorthand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Appearance branch of a design intent.
///
/// `background` may legitimately be `None` while the branch is still present:
/// a node can carry a fill reference whose first entry resolves to no color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
}

/// Background value: a flat color or a structured image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Background {
    Color(String),
    Image {
        #[serde(rename = "imageRef")]
        image_ref: String,
    },
}

// =============================================================================
// AI Insight
// =============================================================================

/// Structural complexity of a node, derived from its child count.
///
/// Always computed locally; classifier output never influences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Derive complexity from a node's direct child count.
    pub fn from_child_count(count: usize) -> Self {
        match count {
            0 => Complexity::Simple,
            1..=3 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }
}

/// Advisory classification attached to a recognized node.
///
/// `suggested_type` is free-form and may fall outside [`IRF_TYPES`]; it never
/// overrides a recognizer's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    pub confidence: f64,
    pub suggested_type: String,
    pub reasoning: String,
    pub complexity: Complexity,
}

// =============================================================================
// Output: IRF Tree
// =============================================================================

/// Provenance metadata carried by every IRF node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrfMeta {
    /// Which recognition path produced the node.
    pub source: String,
    /// Id of the design node this IRF node was derived from.
    pub original_id: String,
}

/// A node in the produced IRF tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrfNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<IrfNode>>,
    /// Named slot groups. Reserved for downstream collaborators; this core
    /// never populates it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<BTreeMap<String, Vec<IrfNode>>>,
    pub meta: IrfMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<AiInsight>,
}

impl IrfNode {
    /// Create a node with empty props and no children.
    pub fn new(
        node_type: impl Into<String>,
        name: impl Into<String>,
        original_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            node_type: node_type.into(),
            name: name.into(),
            props: Map::new(),
            design: None,
            children: None,
            slots: None,
            meta: IrfMeta {
                source: source.into(),
                original_id: original_id.into(),
            },
            insight: None,
        }
    }

    /// Set a prop value (builder style).
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }
}

/// A versioned IRF layout: recognized root nodes plus passthrough globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrfLayout {
    pub version: String,
    pub name: String,
    pub nodes: Vec<IrfNode>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub global_vars: Value,
}

// =============================================================================
// Transformation Result
// =============================================================================

/// Counters and provenance for one transformation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationMetadata {
    /// Total input nodes, counted recursively over all root subtrees.
    pub total_nodes: usize,
    /// Recognized root nodes. Root level only, not recursive over the output.
    pub recognized_roots: usize,
    /// Unix timestamp in milliseconds when the result was assembled.
    pub generated_at_ms: u64,
    /// Id of the source document.
    pub source_id: String,
}

/// Outcome of one top-level transformation call. Created once, cached, and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationResult {
    pub success: bool,
    pub layout: IrfLayout,
    pub metadata: TransformationMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn closed_vocabulary_membership() {
        assert!(is_irf_type("section"));
        assert!(is_irf_type("editorial-card"));
        assert!(!is_irf_type("hero"));
        assert!(!is_irf_type(""));
    }

    #[test]
    fn complexity_thresholds() {
        assert_eq!(Complexity::from_child_count(0), Complexity::Simple);
        assert_eq!(Complexity::from_child_count(1), Complexity::Moderate);
        assert_eq!(Complexity::from_child_count(3), Complexity::Moderate);
        assert_eq!(Complexity::from_child_count(4), Complexity::Complex);
    }

    #[test]
    fn empty_intent_collapses_to_none() {
        let intent = DesignIntent::default();
        assert!(intent.is_empty());
        assert_eq!(intent.normalized(), None);

        let populated = DesignIntent {
            typography: Some(Typography {
                font_size: Some(32.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(populated.clone().normalized().is_some());
    }

    #[test]
    fn subtree_size_counts_self_and_descendants() {
        let mut root = DesignNode::new("1", "Root", "FRAME");
        let mut child = DesignNode::new("2", "Child", "FRAME");
        child.children.push(DesignNode::new("3", "Leaf", "TEXT"));
        root.children.push(child);
        root.children.push(DesignNode::new("4", "Leaf2", "TEXT"));

        assert_eq!(root.subtree_size(), 4);
    }

    #[test]
    fn find_text_leaf_takes_first_in_document_order() {
        let mut root = DesignNode::new("1", "Card", "INSTANCE");
        let mut wrapper = DesignNode::new("2", "Wrapper", "FRAME");
        let mut first = DesignNode::new("3", "Item", "TEXT");
        first.text = Some("first".to_string());
        wrapper.children.push(first);
        root.children.push(wrapper);
        let mut second = DesignNode::new("4", "Item", "TEXT");
        second.text = Some("second".to_string());
        root.children.push(second);

        let found = root.find_text_leaf("Item").unwrap();
        assert_eq!(found.text.as_deref(), Some("first"));
        // Empty text never matches.
        assert!(root.find_text_leaf("Paragraph").is_none());
    }

    #[test]
    fn design_node_deserializes_from_camel_case() {
        let node: DesignNode = serde_json::from_value(json!({
            "id": "1",
            "name": "Hero",
            "type": "FRAME",
            "componentId": "c:1",
            "textStyle": "s1",
            "borderRadius": 8.0,
            "children": [{"id": "2", "name": "Title", "type": "TEXT", "text": "Hi"}]
        }))
        .unwrap();

        assert_eq!(node.node_type, "FRAME");
        assert_eq!(node.component_id.as_deref(), Some("c:1"));
        assert_eq!(node.text_style.as_deref(), Some("s1"));
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].text.as_deref(), Some("Hi"));
    }

    #[test]
    fn irf_node_serializes_sparse() {
        let node = IrfNode::new("headline", "Title", "2", "native-recognizer")
            .with_prop("text", json!("Welcome"));
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["type"], "headline");
        assert_eq!(value["props"]["text"], "Welcome");
        // Absent optionals must not appear at all.
        assert!(value.get("design").is_none());
        assert!(value.get("children").is_none());
        assert!(value.get("insight").is_none());
    }
}
