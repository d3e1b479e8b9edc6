//! Deferred-insert queue for the oldest-first view.
//!
//! In oldest-first order a freshly posted comment belongs at the very end of
//! the stream, which may be many pages away. Instead of splicing it in, its id
//! is withheld here: the main rendered sequence excludes it and a separate
//! block shows exactly the withheld items.
//!
//! The queue only accepts ids while active; in the default view it stays empty.

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::debug;

use crate::types::CommentNode;

#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    active: bool,
    /// Ids in arrival order.
    order: Vec<String>,
    members: HashSet<String>,
}

impl DeferredQueue {
    /// Creates an empty queue; `active` is true only in the alternate view.
    pub fn new(active: bool) -> Self {
        Self { active, order: Vec::new(), members: HashSet::new() }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Withheld ids in arrival order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Withholds newly arrived ids. Returns how many were added.
    ///
    /// Ignored entirely while the queue is inactive; ids already withheld are
    /// not added twice.
    pub fn defer<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.active {
            debug!("deferred queue inactive, arrivals go straight into the stream");
            return 0;
        }
        let mut added = 0;
        for id in ids {
            let id = id.into();
            if self.members.insert(id.clone()) {
                self.order.push(id);
                added += 1;
            }
        }
        if added > 0 {
            debug!(added, total = self.order.len(), "deferred new arrivals");
        }
        added
    }

    /// Drops every withheld id without releasing them anywhere.
    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Empties the queue and returns the ids that were withheld.
    pub fn release(&mut self) -> Vec<String> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }

    /// The main rendered sequence: `sequence` minus every withheld item.
    ///
    /// Borrows `sequence` untouched when nothing is withheld.
    pub fn shown<'a>(&self, sequence: &'a [CommentNode]) -> Cow<'a, [CommentNode]> {
        if self.order.is_empty() {
            return Cow::Borrowed(sequence);
        }
        Cow::Owned(
            sequence
                .iter()
                .filter(|node| !self.members.contains(&node.id))
                .cloned()
                .collect(),
        )
    }

    /// The complementary view: exactly the withheld items, in sequence order.
    pub fn deferred_view<'a>(&self, sequence: &'a [CommentNode]) -> Vec<&'a CommentNode> {
        sequence
            .iter()
            .filter(|node| self.members.contains(&node.id))
            .collect()
    }
}
