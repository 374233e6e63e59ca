//! Call snippets: `name(${1:a}, ${2:b})`.

use analyzer::SyntaxKind;
use analyzer::semantic::{Param, Signature, Ty};

use super::object_literal::in_property_name_position;
use super::snippet::{escape, placeholder, placeholder_list};
use super::{StageError, StageOutcome, entry_type};
use crate::completion::CompletionEntry;
use crate::config::{MethodSnippetInsertText, MethodSnippetSkip};
use crate::context::RequestContext;

/// Parameters that receive a placeholder, after dropping trailing `void` parameters.
pub(super) fn snippet_params(params: &[Param], skip: MethodSnippetSkip) -> (Vec<&Param>, bool) {
    let mut end = params.len();
    while end > 0 && (params[end - 1].ty.is_void() || params[end - 1].ty.is_promise_of_void()) {
        end -= 1;
    }
    let params = &params[..end];
    let kept = params
        .iter()
        .filter(|param| match skip {
            MethodSnippetSkip::NoSkip => true,
            MethodSnippetSkip::OnlyRest => !param.rest,
            MethodSnippetSkip::OptionalAndRest => !param.rest && !param.optional,
            MethodSnippetSkip::All => false,
        })
        .collect();
    (kept, !params.is_empty())
}

/// Snippet for calling `name` with `signature`.
pub(super) fn call_snippet(
    name: &str,
    signature: &Signature,
    skip: MethodSnippetSkip,
    insert_text: MethodSnippetInsertText,
) -> String {
    let (params, has_params) = snippet_params(&signature.params, skip);
    let name = escape(name);
    if params.is_empty() {
        return if has_params {
            format!("{name}($0)")
        } else {
            format!("{name}()")
        };
    }
    let texts: Vec<String> = params
        .iter()
        .map(|param| match insert_text {
            MethodSnippetInsertText::AlwaysName => param.name.clone(),
            MethodSnippetInsertText::AlwaysDeclaration => param.to_string(),
        })
        .collect();
    format!(
        "{name}({})",
        placeholder_list(texts.iter().map(String::as_str))
    )
}

/// `new Foo|` completes constructors rather than calls.
fn after_new(ctx: &RequestContext<'_>) -> bool {
    let tree = ctx.tree();
    ctx.enclosing(SyntaxKind::NewExpression)
        .and_then(|new| tree.children(new).first().copied())
        .is_some_and(|callee| tree.span(callee).touches(ctx.position))
}

/// The one signature a snippet can be built from. Unions and overloads are ambiguous.
fn single_signature(ty: &Ty, ctx: &RequestContext<'_>, construct: bool) -> Option<Signature> {
    if ctx.semantic.is_union(ty) {
        return None;
    }
    let mut signatures = if construct {
        ctx.semantic.construct_signatures(ty)
    } else {
        ctx.semantic.call_signatures(ty)
    };
    if signatures.len() == 1 {
        signatures.pop()
    } else {
        None
    }
}

pub(super) fn method_snippets(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    // Property names of object literals get declaration stubs instead.
    if !ctx.cursor.snippet_position || in_property_name_position(ctx) {
        return Ok(StageOutcome::NoChange);
    }
    let construct = after_new(ctx);
    let settings = ctx.settings.method_snippets;

    let mut changed = false;
    let mut out = entries.to_vec();
    for entry in &mut out {
        if entry.is_snippet || !entry.kind.may_be_callable() {
            continue;
        }
        let Some(signature) =
            entry_type(entry, ctx).and_then(|ty| single_signature(&ty, ctx, construct))
        else {
            continue;
        };
        let snippet = call_snippet(
            entry.insert_text_or_name(),
            &signature,
            settings.skip,
            settings.insert_text,
        );
        entry.set_snippet(snippet);
        changed = true;
    }
    Ok(StageOutcome::entries_if(changed, out))
}

const ARRAY_CALLBACK_METHODS: &[&str] = &[
    "every",
    "filter",
    "find",
    "findIndex",
    "findLast",
    "findLastIndex",
    "flatMap",
    "forEach",
    "map",
    "some",
];

/// `users` -> `user`, `entries` -> `entry`. `None` when the name is not a plural.
fn singularize(name: &str) -> Option<String> {
    if let Some(stem) = name.strip_suffix("ies") {
        return (!stem.is_empty()).then(|| format!("{stem}y"));
    }
    for suffix in ["sses", "shes", "ches", "xes"] {
        if name.ends_with(suffix) {
            return Some(name[..name.len() - 2].to_string());
        }
    }
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => Some(stem.to_string()),
        _ => None,
    }
}

/// Name of the receiver variable or property (`users` in `state.users.ma|`).
fn receiver_name<'a>(ctx: &RequestContext<'a>, receiver: analyzer::NodeId) -> Option<&'a str> {
    let tree = ctx.tree();
    let name_node = match tree.kind(receiver) {
        SyntaxKind::Identifier => receiver,
        SyntaxKind::PropertyAccessExpression => *tree.children(receiver).last()?,
        _ => return None,
    };
    Some(tree.text(name_node, ctx.source()))
}

pub(super) fn array_method_snippets(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if !ctx.is_member_completion || !ctx.cursor.snippet_position {
        return Ok(StageOutcome::NoChange);
    }
    let Some(receiver) = ctx.member_receiver() else {
        return Ok(StageOutcome::NoChange);
    };
    let is_array = ctx
        .semantic
        .type_of_node(receiver)
        .is_some_and(|ty| matches!(ty, Ty::Array(_)));
    if !is_array {
        return Ok(StageOutcome::NoChange);
    }
    let item = receiver_name(ctx, receiver)
        .and_then(singularize)
        .unwrap_or_else(|| "item".to_string());

    let mut changed = false;
    let mut out = entries.to_vec();
    for entry in &mut out {
        let name = entry.insert_text_or_name().to_string();
        if entry.is_snippet || !ARRAY_CALLBACK_METHODS.contains(&name.as_str()) {
            continue;
        }
        entry.set_snippet(format!("{}(({}) => $2)", escape(&name), placeholder(1, &item)));
        changed = true;
    }
    Ok(StageOutcome::entries_if(changed, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(params: Vec<Param>) -> Signature {
        Signature::new(params, Ty::Void)
    }

    #[test]
    fn skip_modes() {
        let signature = sig(vec![
            Param::new("a", Ty::String),
            Param::new("b", Ty::Number).optional(),
            Param::new("rest", Ty::array(Ty::Boolean)).rest(),
        ]);
        let snippet = |skip| call_snippet("f", &signature, skip, MethodSnippetInsertText::AlwaysName);
        assert_eq!(snippet(MethodSnippetSkip::NoSkip), "f(${1:a}, ${2:b}, ${3:rest})");
        assert_eq!(snippet(MethodSnippetSkip::OnlyRest), "f(${1:a}, ${2:b})");
        assert_eq!(snippet(MethodSnippetSkip::OptionalAndRest), "f(${1:a})");
        assert_eq!(snippet(MethodSnippetSkip::All), "f($0)");
    }

    #[test]
    fn empty_and_void_parameter_lists() {
        let insert = MethodSnippetInsertText::AlwaysName;
        assert_eq!(
            call_snippet("f", &sig(vec![]), MethodSnippetSkip::NoSkip, insert),
            "f()"
        );
        let trailing_void = sig(vec![
            Param::new("a", Ty::String),
            Param::new("done", Ty::Void),
            Param::new("later", Ty::promise(Ty::Void)),
        ]);
        assert_eq!(
            call_snippet("f", &trailing_void, MethodSnippetSkip::NoSkip, insert),
            "f(${1:a})"
        );
        let only_void = sig(vec![Param::new("done", Ty::Void)]);
        assert_eq!(
            call_snippet("f", &only_void, MethodSnippetSkip::NoSkip, insert),
            "f()"
        );
    }

    #[test]
    fn declaration_placeholders_are_escaped() {
        let signature = sig(vec![Param::new("$event", Ty::object(vec![])).optional()]);
        assert_eq!(
            call_snippet(
                "on$",
                &signature,
                MethodSnippetSkip::NoSkip,
                MethodSnippetInsertText::AlwaysDeclaration
            ),
            "on\\$(${1:\\$event?: { \\}})"
        );
    }

    #[test]
    fn singular_receiver_names() {
        assert_eq!(singularize("users").as_deref(), Some("user"));
        assert_eq!(singularize("entries").as_deref(), Some("entry"));
        assert_eq!(singularize("boxes").as_deref(), Some("box"));
        assert_eq!(singularize("classes").as_deref(), Some("class"));
        assert_eq!(singularize("data"), None);
    }
}
