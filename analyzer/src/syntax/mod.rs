//! Syntax tree handed over by the engine's parser.
//!
//! The tree is an arena of [`Node`]s. Every node knows its kind, span, parent and
//! ordered children; token text is recovered by slicing the document text with the span.
//! Children are ordered by position and never overlap.

mod builder;

pub use builder::TreeBuilder;

use crate::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Closed set of node kinds the completion pipeline cares about.
///
/// Shapes relied upon downstream (children in order):
/// - `ClassDeclaration`: name `Identifier`, `HeritageClause`*, `ClassBody`
/// - `TryStatement`: try `Block`, `CatchClause`?, finally `Block`?
/// - `IfStatement`: condition, then-statement, else-statement?
/// - `SwitchStatement`: discriminant expression, `CaseBlock`
/// - `CaseClause`: test expression, statements*
/// - `PropertyAccessExpression`: receiver expression, name `Identifier`
/// - `VariableDeclaration`: name (`Identifier` or binding pattern), `TypeReference`?, initializer?
/// - `JsxOpeningElement` / `JsxSelfClosingElement`: tag name, `JsxAttributes`
/// - `JsxAttribute`: name `Identifier`, initializer?
/// - `ObjectLiteralExpression`: `PropertyAssignment` / `ShorthandPropertyAssignment` /
///   `MethodDeclaration` members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    Block,
    Identifier,
    StringLiteral,
    NumericLiteral,
    ExpressionStatement,
    VariableStatement,
    VariableDeclaration,
    ObjectBindingPattern,
    PropertyAccessExpression,
    CallExpression,
    NewExpression,
    ArrowFunction,
    FunctionDeclaration,
    Parameter,
    ReturnStatement,
    ObjectLiteralExpression,
    PropertyAssignment,
    ShorthandPropertyAssignment,
    MethodDeclaration,
    ArrayLiteralExpression,
    ClassDeclaration,
    ClassBody,
    HeritageClause,
    IfStatement,
    TryStatement,
    CatchClause,
    SwitchStatement,
    CaseBlock,
    CaseClause,
    DefaultClause,
    ImportDeclaration,
    ImportClause,
    NamedImports,
    ImportSpecifier,
    NamespaceImport,
    ExportDeclaration,
    ExportSpecifier,
    TypeReference,
    Decorator,
    JsxElement,
    JsxSelfClosingElement,
    JsxOpeningElement,
    JsxClosingElement,
    JsxAttributes,
    JsxAttribute,
    JsxExpression,
    JsxText,
    Error,
}

impl SyntaxKind {
    pub fn is_jsx_tag(self) -> bool {
        matches!(
            self,
            SyntaxKind::JsxOpeningElement | SyntaxKind::JsxSelfClosingElement
        )
    }

    pub fn is_import_or_export(self) -> bool {
        matches!(
            self,
            SyntaxKind::ImportDeclaration
                | SyntaxKind::ImportClause
                | SyntaxKind::NamedImports
                | SyntaxKind::ImportSpecifier
                | SyntaxKind::NamespaceImport
                | SyntaxKind::ExportDeclaration
                | SyntaxKind::ExportSpecifier
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: SyntaxKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed syntax tree. The first node, if any, is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Panics when `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.kind(*child) == kind)
    }

    /// `id` itself followed by its parents up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent(*current))
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|sibling| *sibling == id)?;
        idx.checked_sub(1).map(|prev| siblings[prev])
    }

    pub fn text<'a>(&self, id: NodeId, source: &'a str) -> &'a str {
        self.span(id).slice(source)
    }

    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}
