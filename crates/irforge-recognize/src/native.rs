//! Native-type fallback: maps design-tool built-in node kinds to IRF types.

use irforge_core::{DesignNode, IrfNode};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::dispatch::{Dispatcher, RecognizeOptions, StrategyOutcome, SOURCE_NATIVE};
use crate::error::RecognizeResult;
use crate::intent::map_design_intent;

impl Dispatcher {
    /// Strategy 4: resolve a node by its raw native type.
    ///
    /// | Raw type | Resolution |
    /// |---|---|
    /// | TEXT | fontSize > 24 → headline, else text |
    /// | FRAME / GROUP | parent "page" → section, else group |
    /// | IMAGE / IMAGE-SVG | image |
    /// | RECTANGLE | 0 < height ≤ 2 → divider, else shape |
    /// | INSTANCE | never assigned a type; always dropped here |
    pub(crate) async fn native_fallback(
        &self,
        node: &DesignNode,
        options: &RecognizeOptions,
        parent_type: &str,
    ) -> RecognizeResult<StrategyOutcome> {
        let design = map_design_intent(node, self.ctx());

        let resolved: Option<(&str, Map<String, Value>)> = match node.node_type.as_str() {
            "TEXT" => {
                let font_size = design
                    .as_ref()
                    .and_then(|d| d.typography.as_ref())
                    .and_then(|t| t.font_size);
                let node_type = if font_size.is_some_and(|size| size > 24.0) {
                    "headline"
                } else {
                    "text"
                };
                let mut props = Map::new();
                props.insert(
                    "text".to_string(),
                    json!(node.text.clone().unwrap_or_default()),
                );
                Some((node_type, props))
            }
            "FRAME" | "GROUP" => {
                let node_type = if parent_type == "page" {
                    "section"
                } else {
                    "group"
                };
                Some((node_type, Map::new()))
            }
            // Visual source lives in design.appearance, so props stay empty.
            "IMAGE" | "IMAGE-SVG" => Some(("image", Map::new())),
            "RECTANGLE" => {
                let height = node.height.unwrap_or(0.0);
                let node_type = if height > 0.0 && height <= 2.0 {
                    "divider"
                } else {
                    "shape"
                };
                Some((node_type, Map::new()))
            }
            "INSTANCE" => {
                // Props and design are computed, but no type is ever
                // assigned: an INSTANCE without a componentId mapping is
                // dropped. Surfaced at warn so the gap is visible.
                let _props = instance_props(node);
                warn!(
                    node_id = %node.id,
                    name = %node.name,
                    "instance_without_mapping_dropped"
                );
                None
            }
            _ => None,
        };

        let Some((node_type, props)) = resolved else {
            return Ok(StrategyOutcome::NotApplicable);
        };

        debug!(node_id = %node.id, raw_type = %node.node_type, node_type, "native_recognized");

        let mut out = IrfNode::new(node_type, &node.name, &node.id, SOURCE_NATIVE);
        out.props = props;
        out.design = design;

        let children = self
            .recognize_children(&node.children, options, node_type)
            .await?;
        if !children.is_empty() {
            out.children = Some(children);
        }

        if options.ai_insights {
            out.insight = Some(
                self.insights()
                    .insight_for(node, self.ctx(), Some(node_type))
                    .await,
            );
        }

        Ok(StrategyOutcome::Matched(out))
    }
}

/// Pass componentProperties through as a prop bag, values untouched.
fn instance_props(node: &DesignNode) -> Map<String, Value> {
    node.component_properties
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
