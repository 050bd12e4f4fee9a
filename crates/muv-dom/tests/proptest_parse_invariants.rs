//! Property tests for the markup parser: total on arbitrary input, text
//! preservation, and structural sanity on generated trees.

use muv_dom::{MarkupNode, parse_fragment};
use proptest::prelude::*;

proptest! {
    // The parser must degrade to tolerance, never panic, whatever the input.
    #[test]
    fn parse_is_total(input in ".*") {
        let _ = parse_fragment(&input);
    }

    #[test]
    fn plain_text_passes_through(text in "[a-zA-Z0-9 .,!?]{1,60}") {
        let nodes = parse_fragment(&text);
        prop_assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            MarkupNode::Text(t) => prop_assert_eq!(t, &text),
            MarkupNode::Element { .. } => prop_assert!(false, "text input parsed as element"),
        }
    }

    #[test]
    fn nested_divs_preserve_depth(depth in 1usize..20) {
        let mut markup = String::new();
        for _ in 0..depth {
            markup.push_str("<div>");
        }
        markup.push_str("leaf");
        for _ in 0..depth {
            markup.push_str("</div>");
        }

        let nodes = parse_fragment(&markup);
        prop_assert_eq!(nodes.len(), 1);
        let mut cursor = &nodes[0];
        for _ in 0..depth - 1 {
            match cursor {
                MarkupNode::Element { tag, children, .. } => {
                    prop_assert_eq!(tag.as_str(), "div");
                    prop_assert_eq!(children.len(), 1);
                    cursor = &children[0];
                }
                MarkupNode::Text(_) => prop_assert!(false, "text before expected depth"),
            }
        }
        match cursor {
            MarkupNode::Element { children, .. } => match &children[0] {
                MarkupNode::Text(t) => prop_assert_eq!(t.as_str(), "leaf"),
                MarkupNode::Element { .. } => prop_assert!(false, "leaf text missing"),
            },
            MarkupNode::Text(_) => prop_assert!(false, "unexpected text node"),
        }
    }

    #[test]
    fn attribute_values_survive_quoting(value in "[a-zA-Z0-9_-]{0,30}") {
        let markup = format!("<div data-model=\"{value}\"></div>");
        let nodes = parse_fragment(&markup);
        prop_assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            MarkupNode::Element { attrs, .. } => {
                let got = attrs.iter().find(|(k, _)| k.as_str() == "data-model");
                prop_assert_eq!(got.map(|(_, v)| v.as_str()), Some(value.as_str()));
            }
            MarkupNode::Text(_) => prop_assert!(false, "element expected"),
        }
    }
}
