//! Per-request context shared by every enrichment stage.
//! All coordinates are UTF-8 byte offsets into the document text.

use analyzer::semantic::TypeChecker;
use analyzer::{Document, NodeId, Span, SyntaxKind, SyntaxTree};

use crate::completion::RequestId;
use crate::config::Settings;
use crate::position;
use crate::semantic::TypeQueries;
use crate::service::{FormattingOptions, SharedCaches};

/// Lexical facts about the cursor, computed once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CursorContext {
    /// Smallest node with `start <= offset <= end`.
    pub(crate) node_at_cursor: Option<NodeId>,
    /// Smallest node containing `offset - 1`.
    pub(crate) node_left_of_cursor: Option<NodeId>,
    /// Identifier characters typed before the cursor.
    pub(crate) prefix: String,
    /// Whole word around the cursor.
    pub(crate) replace_span: Span,
    /// First character after the word.
    pub(crate) next_char: Option<char>,
    /// Whether snippet insert text is acceptable here.
    pub(crate) snippet_position: bool,
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl CursorContext {
    pub(crate) fn detect(document: &Document, offset: u32) -> Self {
        let text = document.text.as_str();
        let offset = clamp_to_char_boundary(text, offset);
        let tree = &document.tree;

        let word_start = text[..offset as usize]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_identifier_char(*c))
            .last()
            .map(|(idx, _)| idx as u32)
            .unwrap_or(offset);
        let word_end = text[offset as usize..]
            .char_indices()
            .find(|(_, c)| !is_identifier_char(*c))
            .map(|(idx, _)| offset + idx as u32)
            .unwrap_or(text.len() as u32);

        let node_at_cursor = position::exact_node_at(tree, offset);
        let node_left_of_cursor = offset
            .checked_sub(1)
            .and_then(|left| position::loose_node_at(tree, left));
        let next_char = text[word_end as usize..].chars().next();

        Self {
            node_at_cursor,
            node_left_of_cursor,
            prefix: text[word_start as usize..offset as usize].to_string(),
            replace_span: Span::new(word_start, word_end),
            next_char,
            snippet_position: is_snippet_position(tree, node_at_cursor, next_char),
        }
    }
}

fn clamp_to_char_boundary(text: &str, offset: u32) -> u32 {
    let mut offset = (offset as usize).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset as u32
}

/// Snippets are unwelcome where only a bare name fits, or when a call or type argument
/// list already follows the word.
fn is_snippet_position(tree: &SyntaxTree, node: Option<NodeId>, next_char: Option<char>) -> bool {
    if matches!(next_char, Some('(' | '<')) {
        return false;
    }
    let Some(node) = node else {
        return true;
    };

    let mut child: Option<NodeId> = None;
    for id in tree.ancestors(node) {
        let kind = tree.kind(id);
        match kind {
            SyntaxKind::JsxExpression
            | SyntaxKind::Block
            | SyntaxKind::ArrowFunction
            | SyntaxKind::ClassBody => return true,
            SyntaxKind::TypeReference
            | SyntaxKind::JsxAttributes
            | SyntaxKind::JsxClosingElement => return false,
            _ if kind.is_import_or_export() => return false,
            _ if kind.is_jsx_tag() && child.is_some() && tree.children(id).first() == child.as_ref() => {
                return false;
            }
            _ => {}
        }
        child = Some(id);
    }
    true
}

/// Everything a stage may read. Stages never mutate it.
pub(crate) struct RequestContext<'a> {
    pub(crate) request_id: RequestId,
    pub(crate) document: &'a Document,
    pub(crate) position: u32,
    pub(crate) settings: &'a Settings,
    pub(crate) semantic: TypeQueries<'a>,
    pub(crate) caches: &'a SharedCaches,
    pub(crate) formatting: FormattingOptions,
    pub(crate) trigger_character: Option<char>,
    pub(crate) cursor: CursorContext,
    pub(crate) is_member_completion: bool,
}

/// Inputs for [`RequestContext::new`] that come from the engine payload and host request.
pub(crate) struct ContextInputs<'a> {
    pub(crate) request_id: RequestId,
    pub(crate) document: &'a Document,
    pub(crate) position: u32,
    pub(crate) settings: &'a Settings,
    pub(crate) checker: &'a dyn TypeChecker,
    pub(crate) caches: &'a SharedCaches,
    pub(crate) formatting: FormattingOptions,
    pub(crate) trigger_character: Option<char>,
    pub(crate) is_member_completion: bool,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(inputs: ContextInputs<'a>) -> Self {
        Self {
            cursor: CursorContext::detect(inputs.document, inputs.position),
            request_id: inputs.request_id,
            document: inputs.document,
            position: inputs.position,
            settings: inputs.settings,
            semantic: TypeQueries::new(inputs.checker),
            caches: inputs.caches,
            formatting: inputs.formatting,
            trigger_character: inputs.trigger_character,
            is_member_completion: inputs.is_member_completion,
        }
    }

    pub(crate) fn source(&self) -> &'a str {
        &self.document.text
    }

    pub(crate) fn tree(&self) -> &'a SyntaxTree {
        &self.document.tree
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.cursor.prefix
    }

    /// Node the stages analyze.
    ///
    /// Requests triggered by punctuation (`.`, `"`, `<`, ...) are analyzed one character
    /// behind the caret, where the trigger character sits.
    pub(crate) fn anchor(&self) -> Option<NodeId> {
        let punctuation = self
            .trigger_character
            .is_some_and(|c| c.is_ascii_punctuation());
        if punctuation {
            self.cursor.node_left_of_cursor.or(self.cursor.node_at_cursor)
        } else {
            self.cursor.node_at_cursor
        }
    }

    /// Ancestors of the anchor node, innermost first.
    pub(crate) fn ancestors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.anchor()
            .into_iter()
            .flat_map(|node| self.tree().ancestors(node))
    }

    pub(crate) fn enclosing(&self, kind: SyntaxKind) -> Option<NodeId> {
        position::enclosing(self.tree(), self.anchor()?, kind)
    }

    /// Innermost ancestor of the anchor whose kind is one of `kinds`.
    pub(crate) fn enclosing_any(&self, kinds: &[SyntaxKind]) -> Option<NodeId> {
        position::enclosing_any(self.tree(), self.anchor()?, kinds)
    }

    /// Receiver expression of the member access being completed (`recv.na|`).
    pub(crate) fn member_receiver(&self) -> Option<NodeId> {
        let tree = self.tree();
        self.ancestors()
            .filter(|id| tree.kind(*id) == SyntaxKind::PropertyAccessExpression)
            .find_map(|access| {
                let receiver = *tree.children(access).first()?;
                (tree.span(receiver).end < self.position).then_some(receiver)
            })
    }

    /// The tag-name node when the cursor is on the name of a JSX opening or
    /// self-closing tag.
    pub(crate) fn jsx_tag_name(&self) -> Option<NodeId> {
        let tree = self.tree();
        let node = self.anchor()?;
        let parent = tree.parent(node)?;
        let is_name = tree.kind(parent).is_jsx_tag() && tree.children(parent).first() == Some(&node);
        is_name.then_some(node)
    }
}
