//! Shared read-only recognition context, built once per run.

use std::collections::{BTreeSet, HashMap};

use irforge_core::{FillDef, GlobalStyles, LayoutStyleDef, TextStyleDef, IRF_TYPES};

/// Built-in componentId → IRF type mappings shipped with the engine.
///
/// Instance-level custom mappings are merged on top and win on conflict.
pub const BUILTIN_COMPONENT_MAP: [(&str, &str); 3] = [
    ("2031:412", "editorial-card"),
    ("2031:544", "list"),
    ("2031:545", "list-item"),
];

/// Immutable context shared read-only across one whole recursive pass:
/// the merged componentId map, the closed output type set, and the global
/// style lookup tables.
#[derive(Debug, Clone)]
pub struct RecognizerContext {
    component_map: HashMap<String, String>,
    valid_types: BTreeSet<String>,
    styles: GlobalStyles,
}

impl RecognizerContext {
    /// Build the context. Merges built-in componentId mappings with custom
    /// per-instance mappings (custom wins) and copies the closed type set.
    /// Always succeeds.
    pub fn build(styles: GlobalStyles, custom_mappings: &HashMap<String, String>) -> Self {
        let mut component_map: HashMap<String, String> = BUILTIN_COMPONENT_MAP
            .iter()
            .map(|(id, ty)| (id.to_string(), ty.to_string()))
            .collect();
        for (id, ty) in custom_mappings {
            component_map.insert(id.clone(), ty.clone());
        }

        Self {
            component_map,
            valid_types: IRF_TYPES.iter().map(|t| t.to_string()).collect(),
            styles,
        }
    }

    /// Look up the IRF type mapped to a componentId, if any.
    pub fn component_type(&self, component_id: &str) -> Option<&str> {
        self.component_map.get(component_id).map(String::as_str)
    }

    /// Check membership in the closed output type set.
    pub fn is_valid_type(&self, node_type: &str) -> bool {
        self.valid_types.contains(node_type)
    }

    /// The closed output type set, in stable order.
    pub fn valid_types(&self) -> impl Iterator<Item = &str> {
        self.valid_types.iter().map(String::as_str)
    }

    /// The global style tables.
    pub fn styles(&self) -> &GlobalStyles {
        &self.styles
    }

    /// Resolve a text-style reference.
    pub fn text_style(&self, reference: &str) -> Option<&TextStyleDef> {
        self.styles.text_styles.get(reference)
    }

    /// Resolve a layout-style reference.
    pub fn layout_style(&self, reference: &str) -> Option<&LayoutStyleDef> {
        self.styles.layout_styles.get(reference)
    }

    /// Resolve a fill-style reference to its ordered fill list.
    pub fn fills(&self, reference: &str) -> Option<&[FillDef]> {
        self.styles.fill_styles.get(reference).map(Vec::as_slice)
    }
}
