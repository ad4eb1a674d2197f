// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack diffing shared by pointer crossing and focus transitions.
//!
//! Both crossing and focus maintain a root→leaf stack of nodes and, when the
//! stack changes, notify exactly the nodes whose membership or leaf-ness
//! changed. [`diff`] computes that minimal set of transitions.

/// One side of a stack transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The node at the given index of the old stack is being left.
    Leave,
    /// The node at the given index of the new stack is being entered.
    Enter,
}

/// Diff two root→leaf stacks and visit the transitions.
///
/// Nodes in the shared prefix of both stacks are not visited, with one
/// exception: when the innermost shared node changes between being the leaf
/// of one stack and an obscured ancestor of the other, it is left and
/// re-entered so the host sees its directness change.
///
/// Leaves are visited first, innermost outward; then enters, outermost
/// inward. The `bool` passed alongside each index is the obscured flag: true
/// when the node is an ancestor in its stack rather than the leaf.
///
/// ```
/// use overstory_router::stack::{diff, Transition};
///
/// let old = ["root", "panel", "button"];
/// let new = ["root", "panel", "field"];
/// let mut log = Vec::new();
/// diff(&old, &new, |t, i, obscured| log.push((t, i, obscured)));
/// assert_eq!(
///     log,
///     [(Transition::Leave, 2, false), (Transition::Enter, 2, false)],
/// );
/// ```
pub fn diff<K: PartialEq>(old: &[K], new: &[K], mut visit: impl FnMut(Transition, usize, bool)) {
    let shared = old.iter().zip(new.iter()).take_while(|(a, b)| a == b).count();
    // The innermost shared node flips between leaf and ancestor when exactly
    // one of the stacks ends at it. It then needs a leave/enter pair even
    // though it stays on the stack.
    let flip = shared > 0 && ((shared == old.len()) != (shared == new.len()));
    let start = if flip { shared - 1 } else { shared };
    for j in (start..old.len()).rev() {
        visit(Transition::Leave, j, j + 1 != old.len());
    }
    for j in start..new.len() {
        visit(Transition::Enter, j, j + 1 != new.len());
    }
}
