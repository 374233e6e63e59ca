//! Property stubs inside object literals: `name: [$1]`, `name: {$1}`, `name(a) {}`.

use analyzer::semantic::{Signature, Ty};
use analyzer::{NodeId, SyntaxKind};

use super::method_snippets::snippet_params;
use super::snippet::{choice, escape, placeholder_list};
use super::{StageError, StageOutcome, entry_type};
use crate::completion::{CompletionEntry, CompletionKind};
use crate::config::{KeepOriginal, MethodSnippetSkip};
use crate::context::RequestContext;
use crate::service::QuotePreference;

/// Whether the cursor is where a property name of an object literal goes.
pub(super) fn in_property_name_position(ctx: &RequestContext<'_>) -> bool {
    let tree = ctx.tree();
    let Some(node) = ctx.anchor() else {
        return false;
    };
    let is_literal = |id: NodeId| tree.kind(id) == SyntaxKind::ObjectLiteralExpression;
    match tree.kind(node) {
        SyntaxKind::ObjectLiteralExpression => true,
        SyntaxKind::Identifier => match tree.parent(node) {
            Some(parent) if is_literal(parent) => true,
            Some(parent)
                if matches!(
                    tree.kind(parent),
                    SyntaxKind::ShorthandPropertyAssignment | SyntaxKind::PropertyAssignment
                ) =>
            {
                tree.children(parent).first() == Some(&node)
                    && tree.parent(parent).is_some_and(is_literal)
            }
            _ => false,
        },
        _ => false,
    }
}

/// `T | undefined` of an optional property is completed like `T`.
fn strip_nullish(ty: Ty) -> Ty {
    match ty {
        Ty::Union(members) => {
            let mut kept: Vec<Ty> = members
                .into_iter()
                .filter(|member| !matches!(member, Ty::Undefined | Ty::Null))
                .collect();
            if kept.len() == 1 {
                kept.pop().unwrap_or(Ty::Never)
            } else {
                Ty::Union(kept)
            }
        }
        other => other,
    }
}

struct Variant {
    insert_text: String,
    detail: &'static str,
}

fn method_variant(name: &str, signature: &Signature) -> Variant {
    let (params, _) = snippet_params(&signature.params, MethodSnippetSkip::NoSkip);
    let params = placeholder_list(params.iter().map(|param| param.name.as_str()));
    Variant {
        insert_text: format!("{}({params}) {{\n\t$0\n}}", escape(name)),
        detail: "(…) {}",
    }
}

fn variant_for(name: &str, ty: &Ty, more_variants: bool, quote: char) -> Option<Variant> {
    let property = |value: String, detail| Variant {
        insert_text: format!("{}: {value}", escape(name)),
        detail,
    };
    if let [signature] = ty.call_signatures() {
        return Some(method_variant(name, signature));
    }
    match ty {
        Ty::Array(_) => return Some(property("[$1]".into(), ": []")),
        Ty::Object(obj) if obj.call_signatures.is_empty() => {
            return Some(property("{$1}".into(), ": {}"));
        }
        _ => {}
    }
    if !more_variants {
        return None;
    }
    let literals: Option<Vec<&str>> = ty
        .members()
        .iter()
        .map(|member| match member {
            Ty::StringLiteral(value) => Some(value.as_str()),
            _ => None,
        })
        .collect();
    match ty {
        Ty::String => Some(property(format!("{quote}$1{quote}"), ": \"\"")),
        Ty::Boolean => Some(property(choice(1, ["true", "false"]), ": boolean")),
        Ty::Union(_) if literals.is_some() => {
            let literals = literals.unwrap_or_default();
            Some(property(format!("{quote}{}{quote}", choice(1, literals)), ": \"…\""))
        }
        Ty::Any | Ty::Unknown | Ty::Never => None,
        _ => Some(property("$1".into(), ": …")),
    }
}

pub(super) fn object_literal_completions(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if !ctx.cursor.snippet_position || !in_property_name_position(ctx) {
        return Ok(StageOutcome::NoChange);
    }
    let settings = ctx.settings.object_literal_completions;
    let quote = match ctx.formatting.quote_preference {
        QuotePreference::Double => '"',
        QuotePreference::Single => '\'',
    };

    let mut changed = false;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let is_member = matches!(entry.kind, CompletionKind::Property | CompletionKind::Method);
        let variant = if is_member && !entry.is_snippet {
            entry_type(entry, ctx).and_then(|ty| {
                let ty = strip_nullish(ty);
                // The engine spells `boolean` out as `true | false`.
                let ty = if ty.is_union() && ctx.semantic.widen_literal(&ty) == Ty::Boolean {
                    Ty::Boolean
                } else {
                    ty
                };
                variant_for(entry.insert_text_or_name(), &ty, settings.more_variants, quote)
            })
        } else {
            None
        };
        let Some(variant) = variant else {
            out.push(entry.clone());
            continue;
        };

        changed = true;
        let mut stub = entry.clone().with_snippet(variant.insert_text);
        stub.label_details_mut().detail = Some(variant.detail.to_string());
        match settings.keep_original {
            KeepOriginal::Above => out.extend([entry.clone(), stub]),
            KeepOriginal::Below => out.extend([stub, entry.clone()]),
            KeepOriginal::Remove => out.push(stub),
        }
    }
    Ok(StageOutcome::entries_if(changed, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer::semantic::{Param, PropertySig};

    fn insert(ty: Ty, more: bool) -> Option<String> {
        variant_for("opt", &ty, more, '"').map(|variant| variant.insert_text)
    }

    #[test]
    fn base_variants() {
        assert_eq!(insert(Ty::array(Ty::String), false).as_deref(), Some("opt: [$1]"));
        assert_eq!(
            insert(Ty::object(vec![PropertySig::new("a", Ty::Number)]), false).as_deref(),
            Some("opt: {$1}")
        );
        assert_eq!(
            insert(
                Ty::function(vec![Param::new("event", Ty::Named("Event".into()))], Ty::Void),
                false
            )
            .as_deref(),
            Some("opt(${1:event}) {\n\t$0\n}")
        );
        assert_eq!(insert(Ty::String, false), None);
    }

    #[test]
    fn more_variants() {
        assert_eq!(insert(Ty::String, true).as_deref(), Some("opt: \"$1\""));
        assert_eq!(
            insert(Ty::Boolean, true).as_deref(),
            Some("opt: ${1|true,false|}")
        );
        assert_eq!(
            insert(
                Ty::Union(vec![Ty::string_literal("on"), Ty::string_literal("off")]),
                true
            )
            .as_deref(),
            Some("opt: \"${1|on,off|}\"")
        );
        assert_eq!(insert(Ty::Number, true).as_deref(), Some("opt: $1"));
        assert_eq!(insert(Ty::Any, true), None);
    }

    #[test]
    fn optional_properties_drop_undefined() {
        assert_eq!(
            strip_nullish(Ty::Union(vec![Ty::array(Ty::Number), Ty::Undefined])),
            Ty::array(Ty::Number)
        );
    }
}
