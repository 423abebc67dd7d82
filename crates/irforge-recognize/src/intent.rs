//! Design-intent mapping: raw style references → structured styling data.
//!
//! Pure and deterministic. Three independent branches (typography, layout,
//! appearance), each populated only when at least one of its inputs is
//! present; an intent with no populated branch collapses to `None`, never to
//! an empty object.

use irforge_core::{
    Appearance, Background, DesignIntent, DesignNode, FillKind, LayoutIntent, Padding, Typography,
};

use crate::context::RecognizerContext;

/// Resolve a node's style references into a structured [`DesignIntent`].
///
/// Returns `None` when nothing resolves: a node with no style references and
/// no inline dimensions has no intent at all.
pub fn map_design_intent(node: &DesignNode, ctx: &RecognizerContext) -> Option<DesignIntent> {
    DesignIntent {
        typography: map_typography(node, ctx),
        layout: map_layout(node, ctx),
        appearance: map_appearance(node, ctx),
    }
    .normalized()
}

fn map_typography(node: &DesignNode, ctx: &RecognizerContext) -> Option<Typography> {
    let style = ctx.text_style(node.text_style.as_deref()?)?;

    // Color is the first entry of the style's resolved fill list.
    let color = style
        .fill
        .as_deref()
        .and_then(|reference| ctx.fills(reference))
        .and_then(|fills| fills.first())
        .and_then(|fill| fill.color.clone());

    Some(Typography {
        font_size: style.font_size,
        font_weight: style.font_weight,
        font_family: style.font_family.clone(),
        text_align: style.text_align.as_deref().map(str::to_lowercase),
        line_height: style.line_height,
        color,
    })
}

fn map_layout(node: &DesignNode, ctx: &RecognizerContext) -> Option<LayoutIntent> {
    let style = node.layout.as_deref().and_then(|r| ctx.layout_style(r));
    let gap = style.and_then(|s| s.gap);
    let padding = style
        .and_then(|s| s.padding.as_deref())
        .and_then(parse_padding_shorthand);

    // Width/height are inline literals on the node, never table lookups.
    let layout = LayoutIntent {
        gap,
        padding,
        width: node.width,
        height: node.height,
    };

    if gap.is_none() && padding.is_none() && node.width.is_none() && node.height.is_none() {
        None
    } else {
        Some(layout)
    }
}

fn map_appearance(node: &DesignNode, ctx: &RecognizerContext) -> Option<Appearance> {
    let fills = node.fills.as_deref().and_then(|r| ctx.fills(r))?;
    if fills.is_empty() {
        return None;
    }

    // An image fill anywhere in the list wins; otherwise the first fill's
    // color is the background. The branch stays present even when that color
    // is missing.
    let background = match fills.iter().find(|f| f.kind == FillKind::Image) {
        Some(image_fill) => image_fill
            .image_ref
            .clone()
            .map(|image_ref| Background::Image { image_ref }),
        None => fills
            .first()
            .and_then(|f| f.color.clone())
            .map(Background::Color),
    };

    Some(Appearance { background })
}

/// Parse a CSS padding shorthand ("8", "8 16", "8 16 4", "8 16 4 2") into
/// explicit four-sided padding, mirroring sides the way CSS does.
/// Returns `None` for empty or non-numeric input.
pub fn parse_padding_shorthand(raw: &str) -> Option<Padding> {
    let values: Vec<f64> = raw
        .split_whitespace()
        .map(|part| part.trim_end_matches("px").parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    match values.as_slice() {
        [all] => Some(Padding {
            top: *all,
            right: *all,
            bottom: *all,
            left: *all,
        }),
        [vertical, horizontal] => Some(Padding {
            top: *vertical,
            right: *horizontal,
            bottom: *vertical,
            left: *horizontal,
        }),
        [top, horizontal, bottom] => Some(Padding {
            top: *top,
            right: *horizontal,
            bottom: *bottom,
            left: *horizontal,
        }),
        [top, right, bottom, left] => Some(Padding {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx_with_styles, styled_document_styles};
    use irforge_core::{FillDef, GlobalStyles, LayoutStyleDef, TextStyleDef};
    use std::collections::HashMap;

    #[test]
    fn padding_shorthand_all_forms() {
        let p = parse_padding_shorthand("8").unwrap();
        assert_eq!((p.top, p.right, p.bottom, p.left), (8.0, 8.0, 8.0, 8.0));

        let p = parse_padding_shorthand("8 16").unwrap();
        assert_eq!((p.top, p.right, p.bottom, p.left), (8.0, 16.0, 8.0, 16.0));

        let p = parse_padding_shorthand("8 16 4").unwrap();
        assert_eq!((p.top, p.right, p.bottom, p.left), (8.0, 16.0, 4.0, 16.0));

        let p = parse_padding_shorthand("8 16 4 2").unwrap();
        assert_eq!((p.top, p.right, p.bottom, p.left), (8.0, 16.0, 4.0, 2.0));

        assert!(parse_padding_shorthand("").is_none());
        assert!(parse_padding_shorthand("a b").is_none());
        assert!(parse_padding_shorthand("1 2 3 4 5").is_none());
    }

    #[test]
    fn padding_accepts_px_suffix() {
        let p = parse_padding_shorthand("8px 16px").unwrap();
        assert_eq!((p.top, p.right), (8.0, 16.0));
    }

    #[test]
    fn bare_node_has_no_intent() {
        let ctx = ctx_with_styles(GlobalStyles::default());
        let node = DesignNode::new("1", "Plain", "FRAME");
        assert_eq!(map_design_intent(&node, &ctx), None);
    }

    #[test]
    fn typography_resolves_through_style_and_fill_tables() {
        let ctx = ctx_with_styles(styled_document_styles());
        let mut node = DesignNode::new("1", "Title", "TEXT");
        node.text_style = Some("s1".to_string());

        let intent = map_design_intent(&node, &ctx).unwrap();
        let typo = intent.typography.unwrap();
        assert_eq!(typo.font_size, Some(32.0));
        assert_eq!(typo.font_weight, Some(700));
        assert_eq!(typo.text_align.as_deref(), Some("center"));
        assert_eq!(typo.color.as_deref(), Some("#111111"));
        assert!(intent.layout.is_none());
    }

    #[test]
    fn unresolvable_reference_leaves_branch_absent() {
        let ctx = ctx_with_styles(GlobalStyles::default());
        let mut node = DesignNode::new("1", "Title", "TEXT");
        node.text_style = Some("missing".to_string());
        assert_eq!(map_design_intent(&node, &ctx), None);
    }

    #[test]
    fn layout_reads_inline_dimensions() {
        let mut styles = GlobalStyles::default();
        styles.layout_styles.insert(
            "l1".to_string(),
            LayoutStyleDef {
                gap: Some(12.0),
                padding: Some("8 16".to_string()),
            },
        );
        let ctx = ctx_with_styles(styles);

        let mut node = DesignNode::new("1", "Frame", "FRAME");
        node.layout = Some("l1".to_string());
        node.width = Some(320.0);

        let layout = map_design_intent(&node, &ctx).unwrap().layout.unwrap();
        assert_eq!(layout.gap, Some(12.0));
        assert_eq!(layout.padding.unwrap().right, 16.0);
        assert_eq!(layout.width, Some(320.0));
        assert_eq!(layout.height, None);
    }

    #[test]
    fn appearance_prefers_image_fill() {
        let mut styles = GlobalStyles::default();
        styles.fill_styles.insert(
            "f1".to_string(),
            vec![FillDef::solid("#ffffff"), FillDef::image("asset-9")],
        );
        let ctx = ctx_with_styles(styles);

        let mut node = DesignNode::new("1", "Hero", "FRAME");
        node.fills = Some("f1".to_string());

        let appearance = map_design_intent(&node, &ctx).unwrap().appearance.unwrap();
        assert_eq!(
            appearance.background,
            Some(Background::Image {
                image_ref: "asset-9".to_string()
            })
        );
    }

    #[test]
    fn appearance_branch_present_with_undefined_color() {
        let mut styles = GlobalStyles::default();
        // A solid fill with no color: the branch exists, the value does not.
        styles.fill_styles.insert(
            "f1".to_string(),
            vec![FillDef {
                kind: FillKind::Solid,
                color: None,
                image_ref: None,
            }],
        );
        let ctx = ctx_with_styles(styles);

        let mut node = DesignNode::new("1", "Hero", "FRAME");
        node.fills = Some("f1".to_string());

        let intent = map_design_intent(&node, &ctx).unwrap();
        let appearance = intent.appearance.unwrap();
        assert_eq!(appearance.background, None);
    }

    #[test]
    fn typography_without_fill_table_entry_has_no_color() {
        let mut styles = GlobalStyles::default();
        styles.text_styles.insert(
            "s1".to_string(),
            TextStyleDef {
                font_size: Some(14.0),
                fill: Some("missing".to_string()),
                ..Default::default()
            },
        );
        let ctx = RecognizerContext::build(styles, &HashMap::new());

        let mut node = DesignNode::new("1", "Body", "TEXT");
        node.text_style = Some("s1".to_string());

        let typo = map_design_intent(&node, &ctx).unwrap().typography.unwrap();
        assert_eq!(typo.font_size, Some(14.0));
        assert_eq!(typo.color, None);
    }
}
