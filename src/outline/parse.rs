//! Line-level TaskPaper parsing and rendering.

use super::node::{Node, NodeKind, SourceLine, Tag};
use super::{NodeId, Outline};
use regex_lite::Regex;
use std::sync::LazyLock;

/// `@name` or `@name(value)`, only at the start of the text or after whitespace
/// so that addresses like `me@example.com` are not read as tags.
static TAG_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)@([A-Za-z0-9_\-]+)(?:\(([^)]*)\))?").ok());

/// Parse the content of one line (indentation already removed).
pub(crate) fn parse_line(content: &str) -> (NodeKind, String, Vec<Tag>) {
    let mut tags: Vec<Tag> = Vec::new();
    let mut text = String::with_capacity(content.len());
    let mut last = 0;

    let captures = TAG_RE.as_ref().map(|re| re.captures_iter(content));
    for caps in captures.into_iter().flatten() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        text.push_str(&content[last..whole.start()]);
        last = whole.end();

        let name = name.as_str();
        let value = caps.get(2).map(|v| v.as_str().to_string());
        // First occurrence wins; tag names are unique per node.
        if !tags.iter().any(|t| t.name == name) {
            tags.push(Tag::new(name, value));
        }
    }
    text.push_str(&content[last..]);

    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(rest) = text.strip_prefix("- ") {
        (NodeKind::Task, rest.to_string(), tags)
    } else if text == "-" {
        (NodeKind::Task, String::new(), tags)
    } else if let Some(title) = text.strip_suffix(':') {
        (NodeKind::Project, title.to_string(), tags)
    } else {
        (NodeKind::Note, text, tags)
    }
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == '\t').count()
}

/// Build an outline from TaskPaper text.
pub(crate) fn parse_outline(text: &str) -> Outline {
    let mut outline = Outline::new();
    outline.trailing_newline = text.is_empty() || text.ends_with('\n');

    let lines: Vec<&str> = text.lines().collect();

    // Blank lines sit at the depth of the next non-blank line, so deleting a
    // subtree never takes the separator that follows it.
    let mut depths = vec![0usize; lines.len()];
    let mut next_depth = 0;
    for (i, line) in lines.iter().enumerate().rev() {
        if !line.trim().is_empty() {
            next_depth = indent_of(line);
        }
        depths[i] = next_depth;
    }

    let mut stack: Vec<NodeId> = Vec::new();
    for (line, wanted) in lines.iter().zip(depths) {
        let depth = wanted.min(stack.len());
        stack.truncate(depth);
        let parent = stack.last().copied();

        let blank = line.trim().is_empty();
        let mut node = if blank {
            Node::new(NodeKind::Note, String::new(), Vec::new())
        } else {
            let (kind, title, tags) = parse_line(line.trim_start());
            Node::new(kind, title, tags)
        };
        node.source = Some(SourceLine {
            depth,
            text: (*line).to_string(),
        });

        let id = outline.push(parent, node);
        if !blank {
            stack.push(id);
        }
    }

    outline
}

/// Render a node line without consulting its source text.
pub(crate) fn render_line(node: &Node, depth: usize) -> String {
    let mut line = "\t".repeat(depth);
    match node.kind {
        NodeKind::Task => {
            line.push_str("- ");
            line.push_str(&node.title);
        }
        NodeKind::Project => {
            line.push_str(&node.title);
            line.push(':');
        }
        NodeKind::Note => line.push_str(&node.title),
    }
    for tag in &node.tags {
        if !line.is_empty() && !line.ends_with(['\t', ' ']) {
            line.push(' ');
        }
        line.push_str(&tag.to_string());
    }
    line
}
