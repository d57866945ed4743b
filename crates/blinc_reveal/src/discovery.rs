//! Child discovery for staggered reveals
//!
//! Walks a container depth-first in document order and snapshots its visible
//! leaves. Containers are always descended into, whatever their own
//! visibility; only leaves are filtered. The result is an owned list, so
//! visibility changes made afterwards (including the ones the reveal itself
//! makes) cannot affect it.

use rustc_hash::FxHashSet;

use crate::host::ElementTree;

/// Ordered visible leaves below `root`
///
/// Returns an empty list when `root` is a leaf or no leaf below it is
/// visible. Element trees are expected to be acyclic; an element reached a
/// second time is skipped.
pub fn collect_visible<T: ElementTree + ?Sized>(tree: &T, root: T::Element) -> Vec<T::Element> {
    let mut visited = FxHashSet::default();
    let mut out = Vec::new();
    visited.insert(root);
    if let Some(children) = tree.children(root) {
        walk(tree, children, &mut visited, &mut out);
    }
    out
}

fn walk<T: ElementTree + ?Sized>(
    tree: &T,
    children: Vec<T::Element>,
    visited: &mut FxHashSet<T::Element>,
    out: &mut Vec<T::Element>,
) {
    for child in children {
        if !visited.insert(child) {
            tracing::warn!("child discovery: {:?} reached twice, skipping", child);
            continue;
        }

        match tree.children(child) {
            Some(grandchildren) => walk(tree, grandchildren, visited, out),
            None if tree.visibility(child).is_visible() => out.push(child),
            None => {}
        }
    }
}
