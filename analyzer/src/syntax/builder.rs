use super::{Node, NodeId, SyntaxKind, SyntaxTree};
use crate::Span;

/// Builds a [`SyntaxTree`] in document order.
///
/// Nodes are opened with [`TreeBuilder::start_node`] and closed with
/// [`TreeBuilder::finish_node`]; leaves use [`TreeBuilder::leaf`]. Each node is attached to
/// the innermost open node.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind, span: impl Into<Span>) -> NodeId {
        let id = self.push(kind, span.into());
        self.open.push(id);
        id
    }

    pub fn finish_node(&mut self) {
        let closed = self.open.pop();
        assert!(closed.is_some(), "TreeBuilder: finish_node without open node");
    }

    pub fn leaf(&mut self, kind: SyntaxKind, span: impl Into<Span>) -> NodeId {
        self.push(kind, span.into())
    }

    pub fn finish(self) -> SyntaxTree {
        assert!(
            self.open.is_empty(),
            "TreeBuilder: {} node(s) left open",
            self.open.len()
        );
        SyntaxTree::from_nodes(self.nodes)
    }

    fn push(&mut self, kind: SyntaxKind, span: Span) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        let parent = self.open.last().copied();

        match parent {
            Some(parent) => {
                let parent_node = &self.nodes[parent.index()];
                assert!(
                    parent_node.span.contains_span(span),
                    "TreeBuilder invariant violated: {kind:?} {span:?} escapes parent {:?} {:?}",
                    parent_node.kind,
                    parent_node.span
                );
                if let Some(last) = parent_node.children.last() {
                    let last_span = self.nodes[last.index()].span;
                    assert!(
                        last_span.end <= span.start,
                        "TreeBuilder invariant violated: {kind:?} {span:?} overlaps previous sibling {last_span:?}"
                    );
                }
                self.nodes[parent.index()].children.push(id);
            }
            None => assert!(
                self.nodes.is_empty(),
                "TreeBuilder invariant violated: second root {kind:?}"
            ),
        }

        self.nodes.push(Node {
            kind,
            span,
            parent,
            children: Vec::new(),
        });
        id
    }
}
