//! Task-list rewriting.
//!
//! Turns list items whose text starts with `[x]`, `[X]` or `[ ]` into
//! checkbox glyph items. comrak's own tasklist extension stays disabled so
//! the markers reach this step as plain text.

use std::sync::LazyLock;

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use regex::Regex;

use super::AstTransform;

/// Glyph for a checked item.
pub const CHECKED_GLYPH: char = '☑';
/// Glyph for an open item.
pub const UNCHECKED_GLYPH: char = '☐';
/// Class attached to rewritten items.
pub const TASK_ITEM_CLASS: &str = "task-list-item";

// Only the state letter is case-insensitive; `.` stops at the first newline.
static TASK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[([xX ])\]\s+(.*)").expect("task marker pattern is valid")
});

/// Rewrites task-list items in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskListRewriter;

impl AstTransform for TaskListRewriter {
    fn name(&self) -> &'static str {
        "tasklist"
    }

    fn apply<'a>(&self, root: &'a AstNode<'a>) {
        rewrite_items(root);
    }
}

/// Parsed task marker of a list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMarker {
    pub checked: bool,
    pub content: String,
}

impl TaskMarker {
    /// Match the concatenated markup of a list item (see [`item_html`]).
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TASK_MARKER.captures(text)?;
        let state = caps.get(1)?.as_str();
        let content = caps.get(2).map_or("", |m| m.as_str());
        Some(Self {
            checked: state.eq_ignore_ascii_case("x"),
            content: content.to_string(),
        })
    }

    pub const fn glyph(&self) -> char {
        if self.checked {
            CHECKED_GLYPH
        } else {
            UNCHECKED_GLYPH
        }
    }

    /// Rendered markup: glyph, one space, remainder.
    pub fn label(&self) -> String {
        format!("{} {}", self.glyph(), self.content)
    }

    fn to_html(&self) -> String {
        format!(
            "<li class=\"{TASK_ITEM_CLASS}\">{}</li>\n",
            self.label()
        )
    }
}

fn rewrite_items<'a>(node: &'a AstNode<'a>) {
    let is_item = matches!(node.data.borrow().value, NodeValue::Item(_));
    if is_item && rewrite_item(node) {
        return;
    }
    for child in node.children() {
        rewrite_items(child);
    }
}

/// Returns true if the item was rewritten.
fn rewrite_item<'a>(item: &'a AstNode<'a>) -> bool {
    let markup = item_html(item);
    let Some(marker) = TaskMarker::parse(&markup) else {
        return false;
    };

    let children: Vec<_> = item.children().collect();
    for child in children {
        child.detach();
    }

    // comrak has no generic attributes, so the item becomes a raw block
    // carrying its own <li> with the class.
    item.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
        block_type: 6,
        literal: marker.to_html(),
    });
    true
}

/// Concatenated descendant text of a list item, ready to embed in HTML.
///
/// Text and code literals are escaped. Inline HTML is kept as written so
/// tags like `<i>` still apply inside a rewritten task.
pub fn item_html<'a>(item: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in item.children() {
        collect_text(child, &mut text);
    }
    text
}

fn collect_text<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(&escape_html(t)),
        NodeValue::Code(code) => text.push_str(&escape_html(&code.literal)),
        NodeValue::HtmlInline(html) => text.push_str(html),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        NodeValue::HtmlBlock(_) => {}
        NodeValue::CodeBlock(block) => {
            start_block(text);
            text.push_str(&escape_html(&block.literal));
        }
        NodeValue::Paragraph | NodeValue::Heading(_) => {
            start_block(text);
            for child in node.children() {
                collect_text(child, text);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, text);
            }
        }
    }
}

/// Blocks after the first are separated by a newline.
fn start_block(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use comrak::{Arena, Options, parse_document};
    use proptest::prelude::*;

    fn first_item_value<'a>(root: &'a AstNode<'a>) -> Option<NodeValue> {
        root.descendants()
            .find(|n| {
                matches!(
                    n.data.borrow().value,
                    NodeValue::Item(_) | NodeValue::HtmlBlock(_)
                )
            })
            .map(|n| n.data.borrow().value.clone())
    }

    #[test]
    fn test_parse_checked_lowercase() {
        let marker = TaskMarker::parse("[x] Done").unwrap();
        assert!(marker.checked);
        assert_eq!(marker.content, "Done");
        assert_eq!(marker.label(), "☑ Done");
    }

    #[test]
    fn test_parse_checked_uppercase() {
        let marker = TaskMarker::parse("[X] Done").unwrap();
        assert_eq!(marker.label(), "☑ Done");
    }

    #[test]
    fn test_parse_unchecked() {
        let marker = TaskMarker::parse("[ ] Todo").unwrap();
        assert!(!marker.checked);
        assert_eq!(marker.label(), "☐ Todo");
    }

    #[test]
    fn test_parse_allows_leading_whitespace() {
        let marker = TaskMarker::parse("  \t[x] Indented").unwrap();
        assert_eq!(marker.content, "Indented");
    }

    #[test]
    fn test_parse_rejects_other_letters() {
        assert!(TaskMarker::parse("[y] Nope").is_none());
        assert!(TaskMarker::parse("[xx] Nope").is_none());
    }

    #[test]
    fn test_parse_requires_whitespace_after_marker() {
        assert!(TaskMarker::parse("[x]Done").is_none());
        assert!(TaskMarker::parse("[ ]").is_none());
    }

    #[test]
    fn test_parse_rejects_marker_mid_text() {
        assert!(TaskMarker::parse("see [x] later").is_none());
    }

    #[test]
    fn test_parse_captures_first_line_only() {
        let marker = TaskMarker::parse("[x] first\nsecond").unwrap();
        assert_eq!(marker.content, "first");
    }

    #[test]
    fn test_parse_accepts_newline_as_separator() {
        let marker = TaskMarker::parse("[ ]\nnext line").unwrap();
        assert_eq!(marker.content, "next line");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"a < b & "c" > d"#),
            "a &lt; b &amp; &quot;c&quot; &gt; d"
        );
    }

    #[test]
    fn test_rewrite_replaces_item_with_task_block() {
        let arena = Arena::new();
        let root = parse_document(&arena, "- [x] Done", &Options::default());
        TaskListRewriter.apply(root);

        match first_item_value(root) {
            Some(NodeValue::HtmlBlock(block)) => {
                assert_eq!(
                    block.literal,
                    "<li class=\"task-list-item\">☑ Done</li>\n"
                );
            }
            other => panic!("expected rewritten item, got {other:?}"),
        }
    }

    #[test]
    fn test_rewritten_item_has_no_children() {
        let arena = Arena::new();
        let root = parse_document(&arena, "- [ ] Todo *soon*", &Options::default());
        TaskListRewriter.apply(root);

        let block = root
            .descendants()
            .find(|n| matches!(n.data.borrow().value, NodeValue::HtmlBlock(_)))
            .expect("rewritten item");
        assert_eq!(block.children().count(), 0);
        assert!(
            !root
                .descendants()
                .any(|n| matches!(n.data.borrow().value, NodeValue::Emph))
        );
    }

    #[test]
    fn test_non_matching_item_is_untouched() {
        let arena = Arena::new();
        let root = parse_document(&arena, "- plain `code` item", &Options::default());
        TaskListRewriter.apply(root);

        assert!(matches!(first_item_value(root), Some(NodeValue::Item(_))));
        assert!(
            root.descendants()
                .any(|n| matches!(n.data.borrow().value, NodeValue::Code(_)))
        );
    }

    #[test]
    fn test_item_html_includes_inline_code_and_breaks() {
        let arena = Arena::new();
        let root = parse_document(&arena, "- [x] run `cargo`\n  again", &Options::default());
        let item = root
            .descendants()
            .find(|n| matches!(n.data.borrow().value, NodeValue::Item(_)))
            .unwrap();
        assert_eq!(item_html(item), "[x] run cargo\nagain");
    }

    fn rewritten_literals(markdown: &str) -> Vec<String> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &Options::default());
        TaskListRewriter.apply(root);
        root.descendants()
            .filter_map(|n| match &n.data.borrow().value {
                NodeValue::HtmlBlock(b) => Some(b.literal.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_task_text_is_escaped() {
        assert_eq!(
            rewritten_literals("- [ ] check a < b & `x > y`\n"),
            vec!["<li class=\"task-list-item\">☐ check a &lt; b &amp; x &gt; y</li>\n"]
        );
    }

    #[test]
    fn test_task_keeps_inline_html() {
        assert_eq!(
            rewritten_literals("- [x] a <i>c</i>\n"),
            vec!["<li class=\"task-list-item\">☑ a <i>c</i></li>\n"]
        );
    }

    fn format_tree<'a>(root: &'a AstNode<'a>) -> String {
        let mut html = Vec::new();
        comrak::format_html(root, &Options::default(), &mut html).unwrap();
        String::from_utf8(html).unwrap()
    }

    #[test]
    fn test_rewriter_without_markers_is_a_no_op() {
        let source = "- plain `code` item\n    - nested [link](x.md)\n    - see [x] later\n\n\
                      1. first\n2. [y] not a marker\n\n- [x]\n";
        let arena = Arena::new();
        let root = parse_document(&arena, source, &Options::default());

        let before = format_tree(root);
        TaskListRewriter.apply(root);
        let once = format_tree(root);
        TaskListRewriter.apply(root);
        let twice = format_tree(root);

        assert_eq!(before, once);
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn prop_items_without_markers_are_untouched(
            items in proptest::collection::vec("[a-zA-Z0-9 `*_.,]{1,24}", 1..6)
        ) {
            let source: String = items
                .iter()
                .map(|item| format!("- {item}\n"))
                .collect();
            let arena = Arena::new();
            let root = parse_document(&arena, &source, &Options::default());

            let before = format_tree(root);
            TaskListRewriter.apply(root);
            let once = format_tree(root);
            TaskListRewriter.apply(root);

            prop_assert_eq!(&before, &once);
            prop_assert_eq!(&once, &format_tree(root));
        }
    }

    #[test]
    fn test_bare_marker_item_is_untouched() {
        let arena = Arena::new();
        let root = parse_document(&arena, "- [x]", &Options::default());
        TaskListRewriter.apply(root);
        assert!(matches!(first_item_value(root), Some(NodeValue::Item(_))));
    }

    #[test]
    fn test_nested_items_of_rewritten_parent_are_dropped() {
        let arena = Arena::new();
        let root = parse_document(
            &arena,
            "- [x] parent\n  - [ ] child\n",
            &Options::default(),
        );
        TaskListRewriter.apply(root);

        let blocks: Vec<String> = root
            .descendants()
            .filter_map(|n| match &n.data.borrow().value {
                NodeValue::HtmlBlock(b) => Some(b.literal.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(blocks, vec!["<li class=\"task-list-item\">☑ parent</li>\n"]);
    }

    #[test]
    fn test_nested_task_inside_plain_item_is_rewritten() {
        let arena = Arena::new();
        let root = parse_document(&arena, "- parent\n  - [ ] child\n", &Options::default());
        TaskListRewriter.apply(root);

        let literals: Vec<String> = root
            .descendants()
            .filter_map(|n| match &n.data.borrow().value {
                NodeValue::HtmlBlock(b) => Some(b.literal.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(literals, vec!["<li class=\"task-list-item\">☐ child</li>\n"]);
    }
}
