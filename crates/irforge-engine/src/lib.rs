//! Top-level orchestrator that wires the recognition pipeline, the insight
//! generator, and the result cache together.
//!
//! One [`IrfEngine`] instance carries its own component-mapping registry and
//! cache; multiple engines with different configurations can coexist in one
//! process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use irforge_core::{
    now_ms, AiInsight, DesignDocument, DesignNode, GlobalStyles, IrfLayout, TransformationMetadata,
    TransformationResult, IRF_VERSION,
};
use irforge_insight::InsightGenerator;
use irforge_recognize::{
    Dispatcher, InsightSource, RecognizeError, RecognizeOptions, RecognizerContext,
    RecognizerRegistry,
};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors escaping the per-node boundary. Per-node recognition failures do
/// *not* surface here; they are collected into
/// [`TransformationResult::errors`] while siblings continue.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input could not be fingerprinted for the cache.
    #[error("transformation failed: could not fingerprint input: {0}")]
    Fingerprint(#[from] serde_json::Error),

    /// A custom mapping points outside the closed type vocabulary.
    #[error("invalid component mapping: '{irf_type}' is not an IRF type")]
    InvalidMapping { irf_type: String },

    /// The built-in self-test did not produce the expected tree.
    #[error("self-test failed: {message}")]
    SelfTest { message: String },

    /// A recognition failure outside the per-node boundary.
    #[error("transformation failed: {0}")]
    Recognition(#[from] RecognizeError),
}

/// Snapshot of the in-memory result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
}

/// Configuration for building an [`IrfEngine`].
pub struct EngineConfig {
    /// Instance-level componentId → IRF type mappings, merged over the
    /// built-ins at context build time.
    pub custom_mappings: HashMap<String, String>,
    /// Component recognizer registry.
    pub registry: RecognizerRegistry,
    /// Insight source; wrap a live [`InsightGenerator`] or any test double.
    pub insights: Arc<dyn InsightSource>,
}

impl EngineConfig {
    /// Configuration with built-in recognizers and a classifier-less insight
    /// generator. Everything degrades to heuristics; useful for tests and
    /// environments without an LLM endpoint.
    pub fn offline() -> Self {
        Self {
            custom_mappings: HashMap::new(),
            registry: RecognizerRegistry::builtin(),
            insights: Arc::new(InsightGenerator::offline()),
        }
    }
}

/// Caps simultaneous classifier calls for one transformation run.
struct LimitedInsights {
    inner: Arc<dyn InsightSource>,
    permits: Arc<Semaphore>,
}

#[async_trait]
impl InsightSource for LimitedInsights {
    async fn insight_for(
        &self,
        node: &DesignNode,
        ctx: &RecognizerContext,
        hint: Option<&str>,
    ) -> AiInsight {
        // The semaphore is never closed; a failed acquire just means we
        // proceed without the cap rather than losing the insight.
        let _permit = self.permits.acquire().await.ok();
        self.inner.insight_for(node, ctx, hint).await
    }
}

/// The design-tree → IRF transformation engine.
pub struct IrfEngine {
    custom_mappings: HashMap<String, String>,
    registry: RecognizerRegistry,
    insights: Arc<dyn InsightSource>,
    cache: Mutex<HashMap<String, TransformationResult>>,
}

impl IrfEngine {
    /// Build an engine from the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            custom_mappings: config.custom_mappings,
            registry: config.registry,
            insights: config.insights,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Engine with built-in recognizers and no classifier.
    pub fn offline() -> Self {
        Self::new(EngineConfig::offline())
    }

    /// Transform a validated design document into an IRF layout.
    ///
    /// Root nodes are recognized under the default parent type "page".
    /// Hidden-layer filtering applies at the root level only. Per-root
    /// failures are collected into the result's error list while remaining
    /// roots continue; `success` is true exactly when that list is empty.
    /// Results are cached by a content hash of document plus options.
    pub async fn transform(
        &self,
        document: &DesignDocument,
        options: &RecognizeOptions,
    ) -> EngineResult<TransformationResult> {
        let key = cache_key(document, options)?;
        if let Some(hit) = self.cache_get(&key) {
            debug!(document_id = %document.id, "transform_cache_hit");
            return Ok(hit);
        }

        info!(
            document_id = %document.id,
            roots = document.nodes.len(),
            "transform_start"
        );

        let ctx = RecognizerContext::build(document.styles.clone(), &self.custom_mappings);
        let insights: Arc<dyn InsightSource> = Arc::new(LimitedInsights {
            inner: self.insights.clone(),
            permits: Arc::new(Semaphore::new(options.max_concurrent_insights.max(1))),
        });
        let dispatcher = Dispatcher::new(ctx, self.registry.clone(), insights);

        let mut nodes = Vec::new();
        let mut errors = Vec::new();
        for root in &document.nodes {
            if !options.include_hidden && is_hidden_name(&root.name) {
                debug!(node_id = %root.id, name = %root.name, "hidden_root_skipped");
                continue;
            }
            match dispatcher.recognize(root, options, "page").await {
                Ok(Some(node)) => nodes.push(node),
                Ok(None) => {}
                Err(err) => {
                    warn!(node_id = %root.id, error = %err, "root_recognition_failed");
                    errors.push(format!("node {}: {}", root.id, err));
                }
            }
        }

        let result = TransformationResult {
            success: errors.is_empty(),
            metadata: TransformationMetadata {
                total_nodes: document.total_nodes(),
                recognized_roots: nodes.len(),
                generated_at_ms: now_ms(),
                source_id: document.id.clone(),
            },
            layout: IrfLayout {
                version: IRF_VERSION.to_string(),
                name: document.name.clone(),
                nodes,
                global_vars: document.global_vars.clone(),
            },
            errors,
        };

        info!(
            document_id = %document.id,
            recognized_roots = result.metadata.recognized_roots,
            errors = result.errors.len(),
            "transform_complete"
        );

        self.cache_put(key, result.clone());
        Ok(result)
    }

    /// Register an instance-level componentId → IRF type mapping. Takes
    /// effect on the next run; the context of an in-flight run is immutable.
    pub fn add_component_mapping(
        &mut self,
        component_id: impl Into<String>,
        irf_type: impl Into<String>,
    ) -> EngineResult<()> {
        let irf_type = irf_type.into();
        if !irforge_core::is_irf_type(&irf_type) {
            return Err(EngineError::InvalidMapping { irf_type });
        }
        self.custom_mappings.insert(component_id.into(), irf_type);
        Ok(())
    }

    /// The instance-level custom mappings.
    pub fn component_mappings(&self) -> &HashMap<String, String> {
        &self.custom_mappings
    }

    /// Drop all cached results.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Inspect the in-memory cache.
    pub fn cache_stats(&self) -> CacheStats {
        let entries = self.cache.lock().map(|c| c.len()).unwrap_or(0);
        CacheStats { entries }
    }

    /// Run one synthetic FRAME node through the pipeline and assert it
    /// resolves to "section".
    pub async fn self_test(&self) -> EngineResult<()> {
        let document = DesignDocument {
            id: "irforge-self-test".to_string(),
            name: "Self Test".to_string(),
            nodes: vec![DesignNode::new("probe", "Probe Frame", "FRAME")],
            styles: GlobalStyles::default(),
            global_vars: serde_json::Value::Null,
        };
        let options = RecognizeOptions {
            ai_insights: false,
            ..Default::default()
        };

        let result = self.transform(&document, &options).await?;
        match result.layout.nodes.first() {
            Some(node) if node.node_type == "section" => Ok(()),
            Some(node) => Err(EngineError::SelfTest {
                message: format!("expected 'section', got '{}'", node.node_type),
            }),
            None => Err(EngineError::SelfTest {
                message: "probe frame was not recognized".to_string(),
            }),
        }
    }

    fn cache_get(&self, key: &str) -> Option<TransformationResult> {
        self.cache.lock().ok().and_then(|c| c.get(key).cloned())
    }

    fn cache_put(&self, key: String, result: TransformationResult) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, result);
        }
    }
}

/// Root-level hidden-layer predicate: names starting with "." or containing
/// "hidden" (case-insensitive).
fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.to_lowercase().contains("hidden")
}

/// Content hash of document plus options.
fn cache_key(
    document: &DesignDocument,
    options: &RecognizeOptions,
) -> Result<String, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&serde_json::to_vec(document)?);
    hasher.update(&serde_json::to_vec(options)?);
    Ok(hasher.finalize().to_hex().to_string())
}
