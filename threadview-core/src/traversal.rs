//! Unseen traversal: finds the next one or two unread comments after a focus.
//!
//! The search is a pure function of `(sequence, focus)`. It scans top-level
//! nodes from the focus position onward and classifies each node once as a
//! root hit, a child hit, or nothing, so the index of a hit never has to be
//! re-derived by a second pass over the sequence.
//!
//! # Scan rules
//!
//! 1. The focus id is resolved against node ids and reply ids; a miss starts
//!    the scan at index 0.
//! 2. The first hit is the first node at or after the start that is itself
//!    unseen or has an unseen reply. The node's own flag is checked first.
//! 3. The second hit is searched from two positions past the first hit, so the
//!    node directly after the first hit is never reported as the second one.
//!
//! Calling [`scan`] repeatedly with the same inputs yields the same result.

use tracing::debug;

use crate::types::{ChildRef, CommentNode, UnseenHit, UnseenPointer};

/// Result of one traversal: zero, one, or two pointers in scan order.
///
/// `second` is only ever set when `first` is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnseenScan {
    pub first: Option<UnseenPointer>,
    pub second: Option<UnseenPointer>,
}

impl UnseenScan {
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Pointers found, first before second.
    pub fn pointers(&self) -> impl Iterator<Item = &UnseenPointer> {
        self.first.iter().chain(self.second.iter())
    }
}

/// Classifies a single node.
///
/// A node whose own flag is unseen is always a [`UnseenHit::Root`], even if
/// some of its replies are unseen too.
pub fn classify(node: &CommentNode) -> Option<UnseenHit> {
    if node.is_unseen() {
        return Some(UnseenHit::Root);
    }
    node.children
        .iter()
        .position(ChildRef::is_unseen)
        .map(|child_index| UnseenHit::Child {
            child_index,
            child_id: node.children[child_index].id.clone(),
        })
}

/// Resolves a focus id to the index of the top-level node anchoring it.
///
/// Returns `None` for an absent focus or an id not present in `sequence`.
pub fn focus_index(sequence: &[CommentNode], focus: Option<&str>) -> Option<usize> {
    let focus = focus?;
    sequence.iter().position(|node| node.contains(focus))
}

/// Scans `sequence` for the next two unseen comments after `focus`.
pub fn scan(sequence: &[CommentNode], focus: Option<&str>) -> UnseenScan {
    let start = match focus_index(sequence, focus) {
        Some(idx) => idx,
        None => {
            if focus.is_some() {
                debug!(?focus, "focus not in sequence, scanning from start");
            }
            0
        }
    };

    let Some((first_offset, first_hit)) = find_from(sequence, start) else {
        return UnseenScan::default();
    };
    let first = pointer_at(sequence, first_offset, first_hit);

    // The node right after the first hit is skipped.
    let second = find_from(sequence, first_offset + 2)
        .map(|(offset, hit)| pointer_at(sequence, offset, hit));

    UnseenScan { first: Some(first), second }
}

/// First `(index, hit)` at or after `from`.
fn find_from(sequence: &[CommentNode], from: usize) -> Option<(usize, UnseenHit)> {
    sequence
        .iter()
        .enumerate()
        .skip(from)
        .find_map(|(idx, node)| classify(node).map(|hit| (idx, hit)))
}

fn pointer_at(sequence: &[CommentNode], index: usize, hit: UnseenHit) -> UnseenPointer {
    UnseenPointer {
        node_id: sequence[index].id.clone(),
        visible_index: index,
        hit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prefers_root_over_child() {
        let node = CommentNode::new("p", Some(false)).with_child("c", Some(false));
        assert_eq!(classify(&node), Some(UnseenHit::Root));
    }

    #[test]
    fn classify_ignores_not_applicable_flags() {
        let node = CommentNode::new("p", None).with_child("c", None);
        assert_eq!(classify(&node), None);
    }

    #[test]
    fn find_from_past_end_is_none() {
        let seq = vec![CommentNode::new("a", Some(false))];
        assert_eq!(find_from(&seq, 5), None);
    }
}
