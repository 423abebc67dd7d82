//! Quick-suggestion heuristic: a cheap, local, rule-based type guess.
//!
//! Used to bias the AI classifier prompt and as the degradation target when
//! the classifier is absent or failing. Pure and synchronous; ordered rules,
//! first match wins.

use irforge_core::{DesignNode, FillKind};

use crate::context::RecognizerContext;

const IMAGE_KEYWORDS: [&str; 4] = ["image", "photo", "picture", "img"];
const BUTTON_KEYWORDS: [&str; 4] = ["button", "btn", "cta", "action"];
const HEADLINE_KEYWORDS: [&str; 3] = ["title", "heading", "headline"];
const SECTION_KEYWORDS: [&str; 4] = ["section", "container", "wrapper", "area"];

/// Guess an IRF type for a node without any network call.
///
/// Returns `None` when no rule fires, meaning "analyze further" — the node
/// has no cheap local classification.
pub fn quick_suggest(node: &DesignNode, ctx: &RecognizerContext) -> Option<&'static str> {
    let name = node.name.to_lowercase();

    if node.node_type == "PAGE" {
        return Some("page");
    }

    if has_image_fill(node, ctx) || contains_any(&name, &IMAGE_KEYWORDS) {
        return Some("image");
    }

    if contains_any(&name, &BUTTON_KEYWORDS) {
        return Some("button");
    }

    if node.node_type == "TEXT" {
        if let Some(text) = node.text.as_deref() {
            let style = node.text_style.as_deref().and_then(|r| ctx.text_style(r));
            let large = style
                .and_then(|s| s.font_size)
                .is_some_and(|size| size >= 24.0);
            let bold = style
                .and_then(|s| s.font_weight)
                .is_some_and(|weight| weight >= 600);
            let short = text.chars().count() < 50;
            let named_headline = contains_any(&name, &HEADLINE_KEYWORDS);

            return if large || bold || short || named_headline {
                Some("headline")
            } else {
                Some("text")
            };
        }
    }

    if contains_any(&name, &SECTION_KEYWORDS) {
        return Some("section");
    }

    None
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn has_image_fill(node: &DesignNode, ctx: &RecognizerContext) -> bool {
    node.fills
        .as_deref()
        .and_then(|reference| ctx.fills(reference))
        .is_some_and(|fills| fills.iter().any(|f| f.kind == FillKind::Image))
}
