//! Node lookup by offset.

use analyzer::{NodeId, SyntaxKind, SyntaxTree};

/// Smallest node with `start <= pos <= end`.
///
/// When two siblings touch at `pos` (`a|b`), the left one wins, which is the node the
/// user was typing. Falls back to the root when no child matches; `None` for an empty tree.
pub fn exact_node_at(tree: &SyntaxTree, pos: u32) -> Option<NodeId> {
    descend(tree, |span| span.touches(pos))
}

/// Smallest node with `start <= pos < end`.
pub fn loose_node_at(tree: &SyntaxTree, pos: u32) -> Option<NodeId> {
    descend(tree, |span| span.contains(pos))
}

fn descend(tree: &SyntaxTree, accepts: impl Fn(analyzer::Span) -> bool) -> Option<NodeId> {
    let mut current = tree.root()?;
    while let Some(child) = tree
        .children(current)
        .iter()
        .copied()
        .find(|child| accepts(tree.span(*child)))
    {
        current = child;
    }
    Some(current)
}

/// Closest ancestor of `node` (including itself) of the given kind.
pub fn enclosing(tree: &SyntaxTree, node: NodeId, kind: SyntaxKind) -> Option<NodeId> {
    tree.ancestors(node).find(|id| tree.kind(*id) == kind)
}

/// Closest ancestor of `node` (including itself) whose kind is one of `kinds`.
pub(crate) fn enclosing_any(tree: &SyntaxTree, node: NodeId, kinds: &[SyntaxKind]) -> Option<NodeId> {
    tree.ancestors(node).find(|id| kinds.contains(&tree.kind(*id)))
}

/// Last node that ends at or before `pos` among the children of `parent`.
pub(crate) fn child_before(tree: &SyntaxTree, parent: NodeId, pos: u32) -> Option<NodeId> {
    tree.children(parent)
        .iter()
        .copied()
        .take_while(|child| tree.span(*child).end <= pos)
        .last()
}
