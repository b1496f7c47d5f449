//! TaskPaper outline documents.
//!
//! An [`Outline`] is an arena of [`Node`]s addressed by [`NodeId`]. Nodes are
//! never freed while the outline lives; deleting a node detaches it (and its
//! subtree) from its parent so handles collected earlier stay valid and can be
//! checked with [`Outline::is_attached`].
//!
//! Selection methods return materialized `Vec<NodeId>` snapshots, so callers can
//! delete or retag matched nodes while walking the result without skipping or
//! revisiting siblings.
//!
//! Untouched nodes render back to their original source line byte-for-byte.

mod node;
mod parse;

pub use node::{Node, NodeId, NodeKind, PathSegment, Tag};

use parse::{parse_outline, render_line};
use std::fmt;

/// A parsed TaskPaper document.
#[derive(Debug, Clone)]
pub struct Outline {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    pub(crate) trailing_newline: bool,
}

impl Default for Outline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Outline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            trailing_newline: true,
        }
    }

    /// Parse TaskPaper text. Parsing never fails; unrecognized lines become notes.
    ///
    /// Depth is the number of leading tabs. Space indentation is not nesting:
    /// such lines parse at the top level and are re-rendered there once modified.
    pub fn parse(text: &str) -> Self {
        parse_outline(text)
    }

    pub(crate) fn push(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        self.nodes.push(node);
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    // --- access ---

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Top-level nodes in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Indexed access by top-level position.
    pub fn root(&self, index: usize) -> Option<NodeId> {
        self.roots.get(index).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes[id.0].attached
    }

    /// All attached nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
            Some(id)
        })
    }

    /// Nodes matching `pred`, in document order.
    pub fn select<F>(&self, mut pred: F) -> Vec<NodeId>
    where
        F: FnMut(&Node) -> bool,
    {
        self.iter().filter(|id| pred(&self.nodes[id.0])).collect()
    }

    /// Nodes carrying `tag`, in document order.
    pub fn tagged(&self, tag: &str) -> Vec<NodeId> {
        self.select(|n| n.has_tag(tag))
    }

    /// `id` followed by all of its descendants, in document order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.nodes[id.0].has_tag(tag)
    }

    pub fn tag_value(&self, id: NodeId, tag: &str) -> Option<&str> {
        self.nodes[id.0].tag_value(tag)
    }

    // --- tag mutation ---

    /// Add `tag`, replacing its value if already present.
    pub fn add_tag(&mut self, id: NodeId, tag: &str, value: Option<&str>) {
        self.nodes[id.0].set_tag(tag, value.map(str::to_string));
    }

    pub fn drop_tag(&mut self, id: NodeId, tag: &str) -> Option<Tag> {
        self.nodes[id.0].remove_tag(tag)
    }

    /// Replace `from` with a valueless `to`. Returns false if `from` was absent.
    pub fn retag(&mut self, id: NodeId, from: &str, to: &str) -> bool {
        if self.drop_tag(id, from).is_none() {
            return false;
        }
        self.add_tag(id, to, None);
        true
    }

    // --- structure ---

    /// Append a new node as the last child of `parent` (or as a new root).
    pub fn append_child(&mut self, parent: Option<NodeId>, kind: NodeKind, title: &str) -> NodeId {
        self.push(parent, Node::new(kind, title.to_string(), Vec::new()))
    }

    /// Insert a new top-level node at `index`.
    pub fn insert_root(&mut self, index: usize, kind: NodeKind, title: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, title.to_string(), Vec::new()));
        let index = index.min(self.roots.len());
        self.roots.insert(index, id);
        id
    }

    /// Detach `id` and its subtree from the document.
    pub fn delete(&mut self, id: NodeId) {
        if !self.nodes[id.0].attached {
            return;
        }
        match self.nodes[id.0].parent {
            Some(parent) => self.nodes[parent.0].children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        for member in self.subtree(id) {
            self.nodes[member.0].attached = false;
        }
        self.nodes[id.0].parent = None;
    }

    /// Titles from the top level down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<PathSegment> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            path.push(node.segment());
            cursor = node.parent;
        }
        path.reverse();
        path
    }

    fn find_child(&self, parent: Option<NodeId>, title: &str) -> Option<NodeId> {
        let siblings = match parent {
            Some(p) => &self.nodes[p.0].children,
            None => &self.roots,
        };
        siblings.iter().copied().find(|c| {
            let node = &self.nodes[c.0];
            !node.is_blank() && node.title == title
        })
    }

    /// Locate the node at `path` without creating anything.
    pub fn find_path(&self, path: &[PathSegment]) -> Option<NodeId> {
        let mut parent = None;
        for segment in path {
            parent = Some(self.find_child(parent, &segment.title)?);
        }
        parent
    }

    /// Locate the node at `path`, creating any missing nodes along the way.
    ///
    /// Returns `None` only for an empty path.
    pub fn add_path(&mut self, path: &[PathSegment]) -> Option<NodeId> {
        let mut parent: Option<NodeId> = None;
        for segment in path {
            let next = match self.find_child(parent, &segment.title) {
                Some(existing) => existing,
                None => self.append_child(parent, segment.kind, &segment.title),
            };
            parent = Some(next);
        }
        parent
    }

    /// Copy the subtree rooted at `src_id` in `src` onto the same path in `self`.
    ///
    /// Existing nodes are reused; tags from the source are added (source values
    /// win). The source outline is never modified. Returns the node in `self`
    /// corresponding to `src_id`.
    pub fn merge_from(&mut self, src: &Outline, src_id: NodeId) -> Option<NodeId> {
        let target = self.add_path(&src.path(src_id))?;
        self.merge_children(src, src_id, target);
        Some(target)
    }

    fn merge_children(&mut self, src: &Outline, src_id: NodeId, target: NodeId) {
        let src_node = src.node(src_id);
        for tag in &src_node.tags {
            self.nodes[target.0].set_tag(&tag.name, tag.value.clone());
        }
        for &child in &src_node.children {
            let child_node = src.node(child);
            if child_node.is_blank() {
                continue;
            }
            let dest = match self.find_child(Some(target), &child_node.title) {
                Some(existing) => existing,
                None => self.append_child(Some(target), child_node.kind, &child_node.title),
            };
            self.merge_children(src, child, dest);
        }
    }

    // --- rendering ---

    /// Serialize the whole document.
    pub fn render(&self) -> String {
        self.render_where(|_| true)
    }

    /// Render only nodes matching `pred`, together with their ancestors.
    pub fn render_filtered<F>(&self, mut pred: F) -> String
    where
        F: FnMut(&Node) -> bool,
    {
        let mut keep = vec![false; self.nodes.len()];
        for id in self.iter() {
            if pred(&self.nodes[id.0]) {
                let mut cursor = Some(id);
                while let Some(current) = cursor {
                    if keep[current.0] {
                        break;
                    }
                    keep[current.0] = true;
                    cursor = self.nodes[current.0].parent;
                }
            }
        }
        let mut out = self.render_where(|id| keep[id.0]);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    fn render_where<F>(&self, keep: F) -> String
    where
        F: Fn(NodeId) -> bool,
    {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(root, 0, &keep, &mut out);
        }
        if !self.trailing_newline && out.ends_with('\n') {
            out.pop();
        }
        out
    }

    fn render_node<F>(&self, id: NodeId, depth: usize, keep: &F, out: &mut String)
    where
        F: Fn(NodeId) -> bool,
    {
        if !keep(id) {
            return;
        }
        let node = &self.nodes[id.0];
        match node.source {
            Some(ref source) if source.depth == depth => out.push_str(&source.text),
            _ => out.push_str(&render_line(node, depth)),
        }
        out.push('\n');
        for &child in &node.children {
            self.render_node(child, depth + 1, keep, out);
        }
    }
}
