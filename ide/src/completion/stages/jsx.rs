use analyzer::semantic::Ty;
use analyzer::{NodeId, SyntaxKind};

use super::snippet::escape;
use super::{StageError, StageOutcome, declaration_file, entry_type};
use crate::completion::matchers::NameMatcher;
use crate::completion::{CompletionEntry, CompletionKind};
use crate::config::{JsxAttributeRule, KeepOriginal};
use crate::context::RequestContext;
use crate::service::ComponentKey;

fn in_tag_name_position(ctx: &RequestContext<'_>) -> bool {
    if !ctx.document.script_kind.supports_jsx() {
        return false;
    }
    let word_start = ctx.cursor.replace_span.start as usize;
    ctx.jsx_tag_name().is_some() || ctx.source()[..word_start].ends_with('<')
}

/// Whether a value of type `ty` can be used as `<Name />`.
fn is_component_type(ty: &Ty) -> bool {
    match ty {
        Ty::Any | Ty::Unknown => true,
        Ty::Object(obj) => {
            !obj.construct_signatures.is_empty()
                || obj
                    .call_signatures
                    .iter()
                    .any(|signature| is_element_type(&signature.ret))
                // Namespace objects such as `UI` in `<UI.Button />`.
                || (obj.call_signatures.is_empty() && !obj.properties.is_empty())
        }
        Ty::Union(members) => members.iter().all(is_component_type),
        _ => false,
    }
}

fn is_element_type(ty: &Ty) -> bool {
    match ty {
        Ty::Any | Ty::Null | Ty::Undefined => true,
        Ty::Named(name) => {
            name.starts_with("JSX.") || name.ends_with("Element") || name.ends_with("ReactNode")
        }
        Ty::Union(members) => members.iter().all(is_element_type),
        _ => false,
    }
}

fn can_be_element(entry: &CompletionEntry, ctx: &RequestContext<'_>) -> bool {
    let starts_lowercase = entry
        .name
        .chars()
        .next()
        .is_some_and(|c| c.is_lowercase());
    match entry.kind {
        CompletionKind::Keyword
        | CompletionKind::Interface
        | CompletionKind::TypeAlias
        | CompletionKind::TypeParameter
        | CompletionKind::PrimitiveType
        | CompletionKind::Enum
        | CompletionKind::EnumMember => false,
        CompletionKind::Module | CompletionKind::ExternalModuleName => true,
        // Intrinsic elements (`div`, `span`) are members of `JSX.IntrinsicElements`.
        CompletionKind::Property => true,
        _ if starts_lowercase => false,
        _ => is_cached_component(entry, ctx),
    }
}

fn is_cached_component(entry: &CompletionEntry, ctx: &RequestContext<'_>) -> bool {
    let decl_file = declaration_file(entry, ctx).unwrap_or(ctx.document.file_name.as_str());
    let version = if decl_file == ctx.document.file_name {
        ctx.document.version
    } else {
        0
    };
    let key = ComponentKey::new(decl_file, &entry.name, version);
    if let Some(hit) = ctx.caches.jsx_component(&key) {
        return hit;
    }
    let is_component = entry_type(entry, ctx).is_none_or(|ty| is_component_type(&ty));
    ctx.caches.remember_jsx_component(key, is_component);
    is_component
}

pub(super) fn jsx_elements(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if !in_tag_name_position(ctx) {
        return Ok(StageOutcome::NoChange);
    }
    Ok(StageOutcome::retain(entries, |entry| can_be_element(entry, ctx)))
}

/// Specificity tiers, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Specificity {
    ExactTagExactAttr,
    ExactTagGlobAttr,
    AnyTagExactAttr,
    AnyTagGlobAttr,
}

struct AttributeRule<'a> {
    /// Keys without a tag part match every tag.
    tag: NameMatcher,
    attribute: NameMatcher,
    specificity: Specificity,
    rule: &'a JsxAttributeRule,
}

impl<'a> AttributeRule<'a> {
    fn parse(key: &str, rule: &'a JsxAttributeRule) -> Result<Self, StageError> {
        let (tag, attribute) = key.split_once('#').unwrap_or(("*", key));
        let tag = NameMatcher::compile(tag)?;
        let attribute = NameMatcher::compile(attribute)?;
        let exact_tag = !tag.is_wildcard();
        let specificity = match (exact_tag, attribute.is_wildcard()) {
            (true, false) => Specificity::ExactTagExactAttr,
            (true, true) => Specificity::ExactTagGlobAttr,
            (false, false) => Specificity::AnyTagExactAttr,
            (false, true) => Specificity::AnyTagGlobAttr,
        };
        Ok(Self {
            tag,
            attribute,
            specificity,
            rule,
        })
    }

    fn matches(&self, tag: &str, attribute: &str) -> bool {
        self.tag.is_match(tag) && self.attribute.is_match(attribute)
    }
}

/// The enclosing tag when the cursor sits in its attribute list.
fn attribute_list_tag(ctx: &RequestContext<'_>) -> Option<NodeId> {
    let tree = ctx.tree();
    for id in ctx.ancestors() {
        match tree.kind(id) {
            SyntaxKind::JsxExpression => return None,
            SyntaxKind::JsxAttributes => {
                let tag = tree.parent(id)?;
                return tree.kind(tag).is_jsx_tag().then_some(tag);
            }
            _ => {}
        }
    }
    None
}

pub(super) fn jsx_attributes(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let Some(tag) = attribute_list_tag(ctx) else {
        return Ok(StageOutcome::NoChange);
    };
    let tree = ctx.tree();
    let tag_name = tree
        .children(tag)
        .first()
        .map(|name| tree.text(*name, ctx.source()))
        .ok_or(StageError::UnexpectedTree("JSX tag without a name"))?;

    let mut rules = ctx
        .settings
        .jsx_completions_map
        .iter()
        .map(|(key, rule)| AttributeRule::parse(key, rule))
        .collect::<Result<Vec<_>, _>>()?;
    rules.sort_by_key(|rule| rule.specificity);

    let mut changed = false;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let attribute = entry.name.as_str();
        let Some(rule) = rules.iter().find(|rule| rule.matches(tag_name, attribute)) else {
            out.push(entry.clone());
            continue;
        };
        match rule.rule {
            JsxAttributeRule::Hide(false) => changed = true,
            JsxAttributeRule::Hide(true) => out.push(entry.clone()),
            JsxAttributeRule::Patch(patch) => {
                changed = true;
                let patched = entry
                    .clone()
                    .with_snippet(format!("{}{}", escape(attribute), patch.insert_text));
                match patch.keep_original {
                    KeepOriginal::Above => out.extend([entry.clone(), patched]),
                    KeepOriginal::Below => out.extend([patched, entry.clone()]),
                    KeepOriginal::Remove => out.push(patched),
                }
            }
        }
    }
    Ok(StageOutcome::entries_if(changed, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer::semantic::Param;

    #[test]
    fn component_types() {
        assert!(is_component_type(&Ty::function(
            vec![Param::new("props", Ty::object(vec![]))],
            Ty::Named("JSX.Element".into()),
        )));
        assert!(is_component_type(&Ty::function(
            vec![],
            Ty::Union(vec![Ty::Named("JSX.Element".into()), Ty::Null]),
        )));
        assert!(!is_component_type(&Ty::function(vec![], Ty::Number)));
        assert!(!is_component_type(&Ty::String));
    }

    #[test]
    fn attribute_rule_specificity() {
        let hide = JsxAttributeRule::Hide(false);
        let parse = |key| AttributeRule::parse(key, &hide).unwrap().specificity;
        assert_eq!(parse("div#className"), Specificity::ExactTagExactAttr);
        assert_eq!(parse("div#on*"), Specificity::ExactTagGlobAttr);
        assert_eq!(parse("*#className"), Specificity::AnyTagExactAttr);
        assert_eq!(parse("className"), Specificity::AnyTagExactAttr);
        assert_eq!(parse("*#aria-*"), Specificity::AnyTagGlobAttr);
    }
}
