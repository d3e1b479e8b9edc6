//! Data model shared by every stream component.
//!
//! Comments form a two-level tree: a top-level [`CommentNode`] carries its
//! replies inline as [`ChildRef`]s. Replies are never virtualized on their own,
//! so every index the core hands out refers to a top-level position.

/// A reply attached to a top-level comment.
///
/// `seen` is tri-state: `Some(false)` is "known unseen", `Some(true)` is
/// "seen", and `None` means the flag does not apply to this viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    pub id: String,
    pub seen: Option<bool>,
}

impl ChildRef {
    pub fn new(id: impl Into<String>, seen: Option<bool>) -> Self {
        Self { id: id.into(), seen }
    }

    /// Returns `true` only for an explicit `Some(false)`.
    pub fn is_unseen(&self) -> bool {
        self.seen == Some(false)
    }
}

/// A top-level comment as handed to the core by the upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub id: String,
    pub seen: Option<bool>,
    /// Replies in upstream order.
    pub children: Vec<ChildRef>,
}

impl CommentNode {
    pub fn new(id: impl Into<String>, seen: Option<bool>) -> Self {
        Self { id: id.into(), seen, children: Vec::new() }
    }

    /// Appends a reply; builder form used by the store and by tests.
    pub fn with_child(mut self, id: impl Into<String>, seen: Option<bool>) -> Self {
        self.children.push(ChildRef::new(id, seen));
        self
    }

    /// Returns `true` only for an explicit `Some(false)` on the node itself.
    pub fn is_unseen(&self) -> bool {
        self.seen == Some(false)
    }

    /// Matches `id` against this node or any of its replies.
    ///
    /// This is how a focus pointer naming a reply is resolved to the
    /// top-level index that anchors it.
    pub fn contains(&self, id: &str) -> bool {
        self.id == id || self.children.iter().any(|c| c.id == id)
    }
}

/// Where inside a top-level node the unseen item was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnseenHit {
    /// The top-level comment itself is unseen.
    Root,
    /// The node is seen (or not applicable) but one of its replies is unseen.
    Child {
        /// Position of the first unseen reply in `CommentNode::children`.
        child_index: usize,
        child_id: String,
    },
}

/// A located unseen comment, anchored at a top-level visible index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnseenPointer {
    /// Id of the top-level node that anchors the hit.
    pub node_id: String,
    /// Index of that node in the rendered (deferred-filtered) sequence.
    pub visible_index: usize,
    pub hit: UnseenHit,
}

impl UnseenPointer {
    /// `true` when the top-level comment itself is the unseen item.
    pub fn is_root(&self) -> bool {
        matches!(self.hit, UnseenHit::Root)
    }

    /// Id of the exact unseen comment: the node itself, or the unseen reply.
    pub fn target_id(&self) -> &str {
        match &self.hit {
            UnseenHit::Root => &self.node_id,
            UnseenHit::Child { child_id, .. } => child_id,
        }
    }
}

/// Ordering requested from the upstream store.
///
/// The core never sorts; this only travels to the store's page query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Renderable content of a single comment, owned by the upstream store.
///
/// The core never inspects this; the host's renderer looks it up by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody {
    pub id: String,
    /// `None` for top-level comments; the top-level ancestor for replies.
    pub root_id: Option<String>,
    pub author: String,
    pub body: String,
    pub created_at: i64, // Unix timestamp seconds
}
