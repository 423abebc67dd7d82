//! Shared fixtures for the recognition test suite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use irforge_core::{AiInsight, Complexity, DesignNode, FillDef, GlobalStyles, TextStyleDef};

use crate::context::RecognizerContext;
use crate::dispatch::{Dispatcher, InsightSource};
use crate::recognizer::RecognizerRegistry;
use crate::suggest::quick_suggest;

pub(crate) fn ctx_with_styles(styles: GlobalStyles) -> RecognizerContext {
    RecognizerContext::build(styles, &HashMap::new())
}

/// A text style "s1" (32px, bold, centered, dark fill) plus its fill table.
pub(crate) fn styled_document_styles() -> GlobalStyles {
    let mut styles = GlobalStyles::default();
    styles.text_styles.insert(
        "s1".to_string(),
        TextStyleDef {
            font_size: Some(32.0),
            font_weight: Some(700),
            text_align: Some("CENTER".to_string()),
            fill: Some("fill1".to_string()),
            ..Default::default()
        },
    );
    styles
        .fill_styles
        .insert("fill1".to_string(), vec![FillDef::solid("#111111")]);
    styles
}

/// A single text style "s1" with just a font size.
pub(crate) fn styles_with_text_size(font_size: f64) -> GlobalStyles {
    let mut styles = GlobalStyles::default();
    styles.text_styles.insert(
        "s1".to_string(),
        TextStyleDef {
            font_size: Some(font_size),
            ..Default::default()
        },
    );
    styles
}

/// Deterministic insight source with a call counter; suggested type follows
/// the hint, then the quick suggestion, then "section".
pub(crate) struct StaticInsights {
    calls: AtomicUsize,
}

impl StaticInsights {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightSource for StaticInsights {
    async fn insight_for(
        &self,
        node: &DesignNode,
        ctx: &RecognizerContext,
        hint: Option<&str>,
    ) -> AiInsight {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let suggested = hint
            .map(str::to_string)
            .or_else(|| quick_suggest(node, ctx).map(str::to_string))
            .unwrap_or_else(|| "section".to_string());
        AiInsight {
            confidence: 0.9,
            suggested_type: suggested,
            reasoning: "static test insight".to_string(),
            complexity: Complexity::from_child_count(node.children.len()),
        }
    }
}

/// A dispatcher over the built-in registry and a counting insight source.
pub(crate) fn dispatcher_with(styles: GlobalStyles) -> (Dispatcher, Arc<StaticInsights>) {
    let insights = StaticInsights::new();
    let dispatcher = Dispatcher::new(
        ctx_with_styles(styles),
        RecognizerRegistry::builtin(),
        insights.clone(),
    );
    (dispatcher, insights)
}
