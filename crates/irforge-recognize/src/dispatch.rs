//! Recognition dispatcher: the five-strategy chain of responsibility.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use irforge_core::{AiInsight, DesignNode, IrfNode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::RecognizerContext;
use crate::error::RecognizeResult;
use crate::intent::map_design_intent;
use crate::recognizer::RecognizerRegistry;

/// Provenance tag for nodes produced by component-specific recognizers.
pub const SOURCE_COMPONENT: &str = "component-recognizer";
/// Provenance tag for nodes produced by the narrow name-based guess.
pub const SOURCE_NAME_HEURISTIC: &str = "name-heuristic";
/// Provenance tag for nodes produced by the native-type fallback.
pub const SOURCE_NATIVE: &str = "native-recognizer";

/// Policy: a component recognizer that is invoked but declines ends the chain
/// for that node instead of falling through to later strategies.
///
/// Kept as a named constant so the terminal-on-decline semantics can be
/// revisited without hunting through the dispatcher.
pub const DECLINE_IS_TERMINAL: bool = true;

/// Per-run options threaded through the whole recursive pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognizeOptions {
    /// Whether recognized nodes get an AI insight attached. Forced off for
    /// one nested call when a wrapping node will request its own insight.
    pub ai_insights: bool,
    /// Opt hidden layers (names starting with "." or containing "hidden")
    /// back in at the root level. Filtering is on by default.
    pub include_hidden: bool,
    /// Cap on simultaneous classifier calls per run.
    pub max_concurrent_insights: usize,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            ai_insights: true,
            include_hidden: false,
            max_concurrent_insights: 8,
        }
    }
}

impl RecognizeOptions {
    /// Copy of these options with AI insights forced off.
    pub fn without_insights(&self) -> Self {
        Self {
            ai_insights: false,
            ..self.clone()
        }
    }
}

/// Outcome of one strategy in the chain.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// The strategy produced a node; the chain stops.
    Matched(IrfNode),
    /// A recognizer was invoked and declined. Terminal under
    /// [`DECLINE_IS_TERMINAL`].
    Declined,
    /// The strategy does not apply to this node; try the next one.
    NotApplicable,
}

/// Seam to the AI insights generator.
///
/// Implementations never fail: degradation to a heuristic fallback happens
/// behind this boundary, so the dispatcher sees an insight unconditionally.
#[async_trait]
pub trait InsightSource: Send + Sync {
    /// Produce an insight for a node, optionally biased by the type the
    /// recognition pipeline already resolved.
    async fn insight_for(
        &self,
        node: &DesignNode,
        ctx: &RecognizerContext,
        hint: Option<&str>,
    ) -> AiInsight;
}

/// Recursive per-node recognition orchestrator.
///
/// Built once per run from the immutable context, the recognizer registry,
/// and the insight source; shared read-only across the whole pass.
pub struct Dispatcher {
    ctx: RecognizerContext,
    registry: RecognizerRegistry,
    insights: Arc<dyn InsightSource>,
}

impl Dispatcher {
    pub fn new(
        ctx: RecognizerContext,
        registry: RecognizerRegistry,
        insights: Arc<dyn InsightSource>,
    ) -> Self {
        Self {
            ctx,
            registry,
            insights,
        }
    }

    /// The shared recognition context.
    pub fn ctx(&self) -> &RecognizerContext {
        &self.ctx
    }

    pub(crate) fn insights(&self) -> &dyn InsightSource {
        self.insights.as_ref()
    }

    /// Recognize one node. `Ok(None)` means the node and its subtree are
    /// omitted from the output; it is not an error.
    ///
    /// `parent_type` is the resolved type of the node's parent (roots are
    /// recursed under "page"); several heuristics depend on it.
    pub fn recognize<'a>(
        &'a self,
        node: &'a DesignNode,
        options: &'a RecognizeOptions,
        parent_type: &'a str,
    ) -> BoxFuture<'a, RecognizeResult<Option<IrfNode>>> {
        async move {
            // Strategy 1: known componentId.
            match self.by_component_id(node, options, parent_type).await? {
                StrategyOutcome::Matched(out) => return Ok(Some(out)),
                StrategyOutcome::Declined => {
                    if DECLINE_IS_TERMINAL {
                        debug!(node_id = %node.id, "component_recognizer_declined");
                        return Ok(None);
                    }
                }
                StrategyOutcome::NotApplicable => {}
            }

            // Strategy 2: narrow name-based guess.
            if let StrategyOutcome::Matched(out) = self.by_name(node, options).await? {
                return Ok(Some(out));
            }

            // Strategy 3: structural pattern recognizer (placeholder).
            if let StrategyOutcome::Matched(out) = self.by_structure(node) {
                return Ok(Some(out));
            }

            // Strategy 4: native-type fallback.
            if let StrategyOutcome::Matched(out) =
                self.native_fallback(node, options, parent_type).await?
            {
                return Ok(Some(out));
            }

            // Strategy 5: unrecognized. The insight is generated purely for
            // observability; the subtree is dropped either way.
            if options.ai_insights {
                let insight = self.insights.insight_for(node, &self.ctx, None).await;
                debug!(
                    node_id = %node.id,
                    suggested = %insight.suggested_type,
                    confidence = insight.confidence,
                    "unrecognized_node_insight"
                );
            }
            debug!(node_id = %node.id, raw_type = %node.node_type, "node_dropped");
            Ok(None)
        }
        .boxed()
    }

    /// Recognize a node's children with concurrent fan-out.
    ///
    /// Results come back index-aligned, so output order always equals input
    /// document order after `None`-filtering, regardless of completion order.
    pub async fn recognize_children(
        &self,
        children: &[DesignNode],
        options: &RecognizeOptions,
        parent_type: &str,
    ) -> RecognizeResult<Vec<IrfNode>> {
        let tasks: Vec<_> = children
            .iter()
            .map(|child| self.recognize(child, options, parent_type))
            .collect();

        let mut out = Vec::with_capacity(children.len());
        for result in future::join_all(tasks).await {
            if let Some(node) = result? {
                out.push(node);
            }
        }
        Ok(out)
    }

    async fn by_component_id(
        &self,
        node: &DesignNode,
        options: &RecognizeOptions,
        parent_type: &str,
    ) -> RecognizeResult<StrategyOutcome> {
        let Some(component_id) = node.component_id.as_deref() else {
            return Ok(StrategyOutcome::NotApplicable);
        };
        let Some(mapped) = self.ctx.component_type(component_id) else {
            return Ok(StrategyOutcome::NotApplicable);
        };
        let Some(recognizer) = self.registry.get(mapped) else {
            return Ok(StrategyOutcome::NotApplicable);
        };

        debug!(node_id = %node.id, component_id, mapped, "component_recognizer_start");

        // AI is forced off for the nested call; the wrapping node requests a
        // single insight for itself below.
        let nested = options.without_insights();
        match recognizer
            .recognize(node, self, &nested, parent_type)
            .await?
        {
            Some(mut out) => {
                if options.ai_insights {
                    out.insight = Some(
                        self.insights
                            .insight_for(node, &self.ctx, Some(mapped))
                            .await,
                    );
                }
                Ok(StrategyOutcome::Matched(out))
            }
            None => Ok(StrategyOutcome::Declined),
        }
    }

    /// Minimal substring rule: only "name contains 'page'" maps to "page".
    /// Deliberately narrow to avoid false positives from noisy layer names.
    async fn by_name(
        &self,
        node: &DesignNode,
        options: &RecognizeOptions,
    ) -> RecognizeResult<StrategyOutcome> {
        if !node.name.to_lowercase().contains("page") {
            return Ok(StrategyOutcome::NotApplicable);
        }

        let mut out = IrfNode::new("page", &node.name, &node.id, SOURCE_NAME_HEURISTIC);
        out.design = map_design_intent(node, &self.ctx);
        let children = self.recognize_children(&node.children, options, "page").await?;
        if !children.is_empty() {
            out.children = Some(children);
        }
        if options.ai_insights {
            out.insight = Some(self.insights.insight_for(node, &self.ctx, Some("page")).await);
        }
        Ok(StrategyOutcome::Matched(out))
    }

    /// Placeholder for structural pattern recognition (repeating sibling
    /// shapes, grid detection). Not wired to any heuristic yet.
    fn by_structure(&self, _node: &DesignNode) -> StrategyOutcome {
        StrategyOutcome::NotApplicable
    }
}
