use analyzer::semantic::Ty;
use analyzer::{NodeId, SyntaxKind};

use super::{StageError, StageOutcome};
use crate::completion::{CompletionEntry, CompletionKind};
use crate::context::RequestContext;

/// Value tested by a sibling `case` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CaseValue {
    String(String),
    EnumMember { enum_name: String, member: String },
}

fn unquote(text: &str) -> &str {
    let quoted = text.len() >= 2
        && ["\"", "'", "`"]
            .iter()
            .any(|q| text.starts_with(q) && text.ends_with(q));
    if quoted { &text[1..text.len() - 1] } else { text }
}

fn case_value(expr: NodeId, ctx: &RequestContext<'_>) -> Option<CaseValue> {
    match ctx.semantic.type_of_node(expr) {
        Some(Ty::StringLiteral(value)) => Some(CaseValue::String(value)),
        Some(Ty::EnumMember { enum_name, member }) => {
            Some(CaseValue::EnumMember { enum_name, member })
        }
        _ if ctx.tree().kind(expr) == SyntaxKind::StringLiteral => Some(CaseValue::String(
            unquote(ctx.tree().text(expr, ctx.source())).to_string(),
        )),
        _ => None,
    }
}

/// Discriminants whose every member is a literal (optionally nullable).
fn is_literal_domain(ty: &Ty) -> bool {
    let members = ty.members();
    members.iter().any(Ty::is_literal)
        && members
            .iter()
            .all(|member| member.is_literal() || matches!(member, Ty::Null | Ty::Undefined))
}

fn is_covered(entry: &CompletionEntry, covered: &[CaseValue]) -> bool {
    let name = entry.insert_text_or_name();
    covered.iter().any(|value| match value {
        CaseValue::String(value) => entry.kind == CompletionKind::String && unquote(name) == value,
        CaseValue::EnumMember { enum_name, member } => {
            (entry.kind == CompletionKind::EnumMember && name == member)
                || name
                    .strip_prefix(enum_name.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
                    .is_some_and(|rest| rest == member)
        }
    })
}

pub(super) fn exclude_covered(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let Some(clause) = ctx.enclosing(SyntaxKind::CaseClause) else {
        return Ok(StageOutcome::NoChange);
    };
    let tree = ctx.tree();
    let in_test = tree
        .children(clause)
        .first()
        .is_none_or(|test| tree.span(*test).touches(ctx.position));
    if !in_test {
        return Ok(StageOutcome::NoChange);
    }

    let case_block = tree
        .parent(clause)
        .filter(|parent| tree.kind(*parent) == SyntaxKind::CaseBlock)
        .ok_or(StageError::UnexpectedTree("case clause outside a case block"))?;
    let discriminant = tree
        .parent(case_block)
        .filter(|parent| tree.kind(*parent) == SyntaxKind::SwitchStatement)
        .and_then(|switch| tree.children(switch).first().copied())
        .ok_or(StageError::UnexpectedTree("case block without a switch discriminant"))?;

    let Some(discriminant_ty) = ctx.semantic.type_of_node(discriminant) else {
        return Ok(StageOutcome::NoChange);
    };
    if !is_literal_domain(&discriminant_ty) {
        return Ok(StageOutcome::NoChange);
    }

    let covered: Vec<CaseValue> = tree
        .children(case_block)
        .iter()
        .copied()
        .filter(|sibling| *sibling != clause && tree.kind(*sibling) == SyntaxKind::CaseClause)
        .filter_map(|sibling| tree.children(sibling).first().copied())
        .filter_map(|test| case_value(test, ctx))
        .collect();
    if covered.is_empty() {
        return Ok(StageOutcome::NoChange);
    }

    Ok(StageOutcome::retain(entries, |entry| !is_covered(entry, &covered)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_domains() {
        assert!(is_literal_domain(&Ty::Union(vec![
            Ty::string_literal("a"),
            Ty::string_literal("b"),
            Ty::Undefined,
        ])));
        assert!(is_literal_domain(&Ty::enum_member("Color", "Red")));
        assert!(!is_literal_domain(&Ty::String));
        assert!(!is_literal_domain(&Ty::Union(vec![Ty::string_literal("a"), Ty::Number])));
    }

    #[test]
    fn unquotes_string_literal_text() {
        assert_eq!(unquote("\"on\""), "on");
        assert_eq!(unquote("'off'"), "off");
        assert_eq!(unquote("\""), "\"");
    }
}
