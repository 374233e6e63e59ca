use analyzer::{NodeId, SyntaxKind};

use super::{StageError, StageOutcome};
use crate::completion::sort_text::{boost, is_boosted};
use crate::completion::{CompletionEntry, CompletionKind};
use crate::context::RequestContext;
use crate::position;

/// Statement directly before the word being typed, in the innermost statement list.
fn previous_statement(ctx: &RequestContext<'_>) -> Option<NodeId> {
    let tree = ctx.tree();
    let word_start = ctx.cursor.replace_span.start;
    let container = ctx.enclosing_any(&[SyntaxKind::Block, SyntaxKind::SourceFile])?;
    position::child_before(tree, container, word_start)
}

/// Inside `class Name ... {`, after the name.
fn in_class_header(ctx: &RequestContext<'_>) -> bool {
    let tree = ctx.tree();
    let Some(class) = ctx.enclosing(SyntaxKind::ClassDeclaration) else {
        return false;
    };
    let after_name = tree
        .child_of_kind(class, SyntaxKind::Identifier)
        .is_none_or(|name| tree.span(name).end < ctx.cursor.replace_span.start);
    let before_body = tree
        .child_of_kind(class, SyntaxKind::ClassBody)
        .is_none_or(|body| ctx.position <= tree.span(body).start);
    after_name && before_body
}

fn expected_keywords(ctx: &RequestContext<'_>) -> Vec<&'static str> {
    if in_class_header(ctx) {
        return vec!["extends", "implements"];
    }
    let tree = ctx.tree();
    let Some(previous) = previous_statement(ctx) else {
        return Vec::new();
    };
    match tree.kind(previous) {
        SyntaxKind::TryStatement => {
            let children = tree.children(previous);
            let has_catch = tree
                .child_of_kind(previous, SyntaxKind::CatchClause)
                .is_some();
            // try block, catch clause, finally block
            let has_finally = children.len() > usize::from(has_catch) + 1;
            match (has_catch, has_finally) {
                (_, true) => Vec::new(),
                (true, false) => vec!["finally"],
                (false, false) => vec!["catch", "finally"],
            }
        }
        SyntaxKind::IfStatement if tree.children(previous).len() < 3 => vec!["else"],
        _ => Vec::new(),
    }
}

pub(super) fn keyword_boost(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if ctx.is_member_completion {
        return Ok(StageOutcome::NoChange);
    }
    let expected = expected_keywords(ctx);
    if expected.is_empty() {
        return Ok(StageOutcome::NoChange);
    }
    let mut changed = false;
    let mut out = entries.to_vec();
    for entry in &mut out {
        if entry.kind == CompletionKind::Keyword
            && expected.contains(&entry.name.as_str())
            && !is_boosted(&entry.sort_text)
        {
            entry.sort_text = boost(&entry.sort_text);
            changed = true;
        }
    }
    Ok(StageOutcome::entries_if(changed, out))
}

/// Keywords that are always followed by something else.
const SPACED_KEYWORDS: &[&str] = &[
    "abstract",
    "as",
    "async",
    "await",
    "case",
    "class",
    "const",
    "declare",
    "delete",
    "enum",
    "export",
    "extends",
    "implements",
    "import",
    "in",
    "infer",
    "instanceof",
    "interface",
    "is",
    "keyof",
    "let",
    "namespace",
    "new",
    "of",
    "readonly",
    "satisfies",
    "throw",
    "type",
    "typeof",
    "unique",
    "var",
    "void",
    "yield",
];

pub(super) fn keyword_space(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if ctx.cursor.next_char.is_some_and(char::is_whitespace) {
        return Ok(StageOutcome::NoChange);
    }
    let mut changed = false;
    let mut out = entries.to_vec();
    for entry in &mut out {
        if entry.kind != CompletionKind::Keyword
            || entry.is_snippet
            || entry.insert_text.is_some()
            || !SPACED_KEYWORDS.contains(&entry.name.as_str())
        {
            continue;
        }
        entry.insert_text = Some(format!("{} ", entry.name));
        changed = true;
    }
    Ok(StageOutcome::entries_if(changed, out))
}
