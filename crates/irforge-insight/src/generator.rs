//! Insight generation: classifier call, defensive parse, degradation.

use std::sync::Arc;

use async_trait::async_trait;
use irforge_core::{AiInsight, Complexity, DesignNode};
use irforge_recognize::{map_design_intent, quick_suggest, InsightSource, RecognizerContext};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::provider::{CompletionProvider, Turn};

/// Fixed reasoning attached by the PAGE short-circuit.
pub const PAGE_REASONING: &str = "Node is a page; no classification needed.";

/// Reasoning attached to degraded (heuristic) insights.
pub const FALLBACK_REASONING: &str =
    "Classifier unavailable; suggestion derived from local heuristics.";

const DEFAULT_REASONING: &str = "Classifier reply was incomplete.";

/// Confidence substituted when the classifier reply omits or mangles it.
const DEGRADED_CONFIDENCE: f64 = 0.5;

type JitterFn = Box<dyn Fn() -> f64 + Send + Sync>;

/// Generates advisory insights for recognized nodes.
///
/// A generator without a provider (or with a failing one) still produces
/// insights: it degrades to the quick-suggestion heuristic with a fabricated
/// confidence in [0.6, 1.0) — explicitly not a measured value. One attempt
/// per node, no retries, errors never propagate.
pub struct InsightGenerator {
    provider: Option<Arc<dyn CompletionProvider>>,
    model: String,
    jitter: JitterFn,
}

impl InsightGenerator {
    /// Generator backed by a live classifier.
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            model: model.into(),
            jitter: Box::new(|| 0.6 + rand::random::<f64>() * 0.4),
        }
    }

    /// Generator with no classifier at all; every insight is a fallback.
    pub fn offline() -> Self {
        Self {
            provider: None,
            model: String::new(),
            jitter: Box::new(|| 0.6 + rand::random::<f64>() * 0.4),
        }
    }

    /// Replace the fallback-confidence source. Tests inject a constant here
    /// to make degraded output deterministic.
    pub fn with_jitter(mut self, jitter: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    /// Produce an insight for a node. Never fails.
    pub async fn generate(
        &self,
        node: &DesignNode,
        ctx: &RecognizerContext,
        hint: Option<&str>,
    ) -> AiInsight {
        // Complexity is always computed locally from child count, never
        // taken from the model.
        let complexity = Complexity::from_child_count(node.children.len());

        // PAGE short-circuit: no network call, full confidence.
        if node.node_type == "PAGE" || hint == Some("page") {
            return AiInsight {
                confidence: 1.0,
                suggested_type: "page".to_string(),
                reasoning: PAGE_REASONING.to_string(),
                complexity,
            };
        }

        let suggestion = quick_suggest(node, ctx);

        let Some(provider) = &self.provider else {
            return self.fallback(suggestion, hint, complexity);
        };

        let turns = build_prompt(node, ctx, suggestion);
        match provider.complete(&self.model, &turns).await {
            Ok(content) => {
                let reply = parse_reply(&content);
                AiInsight {
                    confidence: reply
                        .confidence
                        .unwrap_or(DEGRADED_CONFIDENCE)
                        .clamp(0.0, 1.0),
                    suggested_type: reply
                        .component_name
                        .or_else(|| hint.map(str::to_string))
                        .unwrap_or_else(|| "section".to_string()),
                    reasoning: reply
                        .reasoning
                        .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
                    complexity,
                }
            }
            Err(err) => {
                warn!(node_id = %node.id, error = %err, "insight_degraded");
                self.fallback(suggestion, hint, complexity)
            }
        }
    }

    fn fallback(
        &self,
        suggestion: Option<&'static str>,
        hint: Option<&str>,
        complexity: Complexity,
    ) -> AiInsight {
        AiInsight {
            confidence: (self.jitter)(),
            suggested_type: suggestion
                .map(str::to_string)
                .or_else(|| hint.map(str::to_string))
                .unwrap_or_else(|| "section".to_string()),
            reasoning: FALLBACK_REASONING.to_string(),
            complexity,
        }
    }
}

#[async_trait]
impl InsightSource for InsightGenerator {
    async fn insight_for(
        &self,
        node: &DesignNode,
        ctx: &RecognizerContext,
        hint: Option<&str>,
    ) -> AiInsight {
        self.generate(node, ctx, hint).await
    }
}

/// Build the classifier prompt: a fixed instruction turn plus a compact
/// per-node summary biased by the quick suggestion.
fn build_prompt(
    node: &DesignNode,
    ctx: &RecognizerContext,
    suggestion: Option<&'static str>,
) -> Vec<Turn> {
    let catalog: Vec<&str> = ctx.valid_types().collect();

    let system = format!(
        r#"You classify design-tool nodes into semantic component types.

Valid component types: {}.

Respond ONLY with a raw JSON object matching:
{{"componentName": "string", "confidence": 0.0, "reasoning": "string"}}

Do not include explanations, markdown, or code blocks."#,
        catalog.join(", ")
    );

    let summary = json!({
        "name": node.name,
        "rawType": node.node_type,
        "text": node.text,
        "childCount": node.children.len(),
        "design": map_design_intent(node, ctx),
        "localGuess": suggestion.unwrap_or("analyze further"),
    });

    debug!(node_id = %node.id, guess = suggestion.unwrap_or("none"), "classifier_prompt_built");

    vec![
        Turn::system(system),
        Turn::user(
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string()),
        ),
    ]
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifierReply {
    #[serde(default)]
    component_name: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Parse a classifier reply, tolerating code fences and missing fields.
fn parse_reply(content: &str) -> ClassifierReply {
    let cleaned = content
        .trim()
        .trim_matches('`')
        .trim_start_matches("json")
        .trim_start_matches("JSON")
        .trim_matches(['`', ' ', '\n', '\r'])
        .trim();

    serde_json::from_str(cleaned).unwrap_or_default()
}
