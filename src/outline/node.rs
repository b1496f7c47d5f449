//! Node types for the outline arena.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node inside an [`Outline`](super::Outline).
///
/// Handles are only meaningful for the outline that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// What a line of the outline represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// `Title:`
    Project,
    /// `- title`
    Task,
    /// Free text (including blank lines).
    Note,
}

/// A single `@name` or `@name(value)` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(ref value) => write!(f, "@{}({})", self.name, value),
            None => write!(f, "@{}", self.name),
        }
    }
}

/// One step of a structural path: the title of a node, plus the kind used
/// when the node has to be created.
///
/// Two segments are equal when their titles are equal; the kind is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSegment {
    pub kind: NodeKind,
    pub title: String,
}

impl PathSegment {
    pub fn new(kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
        }
    }

    pub fn project(title: impl Into<String>) -> Self {
        Self::new(NodeKind::Project, title)
    }

    pub fn task(title: impl Into<String>) -> Self {
        Self::new(NodeKind::Task, title)
    }
}

impl PartialEq for PathSegment {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for PathSegment {}

/// A node stored in the outline arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) title: String,
    pub(crate) tags: Vec<Tag>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) attached: bool,
    /// Original source line, kept until the node is modified.
    pub(crate) source: Option<SourceLine>,
}

/// The verbatim line a node was parsed from, with the depth it was parsed at.
#[derive(Debug, Clone)]
pub(crate) struct SourceLine {
    pub(crate) depth: usize,
    pub(crate) text: String,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, title: String, tags: Vec<Tag>) -> Self {
        Self {
            kind,
            title,
            tags,
            children: Vec::new(),
            parent: None,
            attached: true,
            source: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Value of a tag. `None` when the tag is absent or has no value.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .and_then(|t| t.value.as_deref())
    }

    pub fn is_blank(&self) -> bool {
        self.kind == NodeKind::Note && self.title.is_empty() && self.tags.is_empty()
    }

    pub(crate) fn segment(&self) -> PathSegment {
        PathSegment::new(self.kind, self.title.clone())
    }

    /// Insert a tag or replace the value of an existing one.
    pub(crate) fn set_tag(&mut self, name: &str, value: Option<String>) -> bool {
        if let Some(tag) = self.tags.iter_mut().find(|t| t.name == name) {
            if tag.value == value {
                return false;
            }
            tag.value = value;
        } else {
            self.tags.push(Tag::new(name, value));
        }
        self.source = None;
        true
    }

    pub(crate) fn remove_tag(&mut self, name: &str) -> Option<Tag> {
        let pos = self.tags.iter().position(|t| t.name == name)?;
        self.source = None;
        Some(self.tags.remove(pos))
    }
}
