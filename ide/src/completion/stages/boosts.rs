use std::collections::HashMap;

use analyzer::SyntaxKind;
use analyzer::semantic::{Ty, ty_accepts};

use super::{StageError, StageOutcome, declaration_file, entry_type};
use crate::completion::sort_text::refine;
use crate::completion::{CompletionEntry, CompletionKind};
use crate::config::ImportedInfoDisplay;
use crate::context::RequestContext;

pub(super) fn function_kind(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let mut changed = false;
    let mut out = entries.to_vec();
    for entry in &mut out {
        let convertible = entry.kind.is_variable_like()
            || matches!(
                entry.kind,
                CompletionKind::Property | CompletionKind::Alias | CompletionKind::Getter
            );
        if !convertible {
            continue;
        }
        let Some(ty) = entry_type(entry, ctx) else {
            continue;
        };
        if ctx.semantic.is_union(&ty) || ctx.semantic.call_signatures(&ty).is_empty() {
            continue;
        }
        entry.kind = if entry.kind == CompletionKind::Property || ctx.is_member_completion {
            CompletionKind::Method
        } else {
            CompletionKind::Function
        };
        changed = true;
    }
    Ok(StageOutcome::entries_if(changed, out))
}

/// Members every function value has.
const FUNCTION_PROTOTYPE_MEMBERS: &[&str] = &[
    "apply",
    "arguments",
    "bind",
    "call",
    "caller",
    "length",
    "name",
    "prototype",
    "toString",
    "Symbol",
];

const PROTOTYPE_MARK: &str = "·";
const OWN_MEMBER_MARK: &str = "☆";

pub(super) fn highlight_non_function_methods(
    entries: &[CompletionEntry],
    _ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let has = |name: &str| entries.iter().any(|entry| entry.name == name);
    if !(has("bind") && has("call") && has("caller")) {
        return Ok(StageOutcome::NoChange);
    }
    let out = entries
        .iter()
        .cloned()
        .map(|mut entry| {
            let marker = if FUNCTION_PROTOTYPE_MEMBERS.contains(&entry.name.as_str()) {
                PROTOTYPE_MARK
            } else {
                OWN_MEMBER_MARK
            };
            entry.decorate(marker);
            entry
        })
        .collect();
    Ok(StageOutcome::entries(out))
}

/// Statement containers that bound the search for a contextual type.
const CONTEXT_BOUNDARIES: &[SyntaxKind] = &[
    SyntaxKind::Block,
    SyntaxKind::ClassBody,
    SyntaxKind::SourceFile,
    SyntaxKind::CaseClause,
];

pub(super) fn contextual_type_boost(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let tree = ctx.tree();
    let expected = ctx
        .ancestors()
        .take_while(|id| !CONTEXT_BOUNDARIES.contains(&tree.kind(*id)))
        .find_map(|id| ctx.semantic.contextual_type(id));
    let Some(expected) = expected else {
        return Ok(StageOutcome::NoChange);
    };
    if matches!(expected, Ty::Any | Ty::Unknown) {
        return Ok(StageOutcome::NoChange);
    }

    let mut any_match = false;
    let mut out = entries.to_vec();
    for entry in &mut out {
        let matches = entry.kind != CompletionKind::Keyword
            && entry_type(entry, ctx).is_some_and(|actual| ty_accepts(&expected, &actual));
        any_match |= matches;
        entry.sort_text = refine(&entry.sort_text, if matches { 0 } else { 1 });
    }
    Ok(StageOutcome::entries_if(any_match, out))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Locality {
    CurrentFile = 0,
    Project = 1,
    Dependency = 2,
}

fn is_dependency_file(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "node_modules")
}

pub(super) fn locality_bonus(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let current_file = ctx.document.file_name.as_str();
    // Dependency-ness of a declaration does not change within one list.
    let mut dependency_cache: HashMap<(&str, &str), bool> = HashMap::new();
    let mut localities = Vec::with_capacity(entries.len());
    for entry in entries {
        let locality = match declaration_file(entry, ctx) {
            Some(file) if file == current_file => Locality::CurrentFile,
            Some(file) => {
                let is_dependency = *dependency_cache
                    .entry((file, entry.name.as_str()))
                    .or_insert_with(|| is_dependency_file(file));
                if is_dependency {
                    Locality::Dependency
                } else {
                    Locality::Project
                }
            }
            None => Locality::Project,
        };
        localities.push(locality);
    }

    if localities.iter().all(|locality| *locality == Locality::Project) {
        return Ok(StageOutcome::NoChange);
    }
    let out = entries
        .iter()
        .zip(localities)
        .map(|(entry, locality)| {
            let mut entry = entry.clone();
            entry.sort_text = refine(&entry.sort_text, locality as u16);
            entry
        })
        .collect();
    Ok(StageOutcome::entries(out))
}

pub(super) fn fix_properties_sorting(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if !ctx.is_member_completion {
        return Ok(StageOutcome::NoChange);
    }
    let Some(receiver_ty) = ctx
        .member_receiver()
        .and_then(|receiver| ctx.semantic.type_of_node(receiver))
    else {
        return Ok(StageOutcome::NoChange);
    };
    let properties = ctx.semantic.properties_of(&receiver_ty);
    if properties.is_empty() {
        return Ok(StageOutcome::NoChange);
    }

    let unlisted = u16::try_from(properties.len()).unwrap_or(u16::MAX);
    let out = entries
        .iter()
        .cloned()
        .map(|mut entry| {
            let rank = properties
                .iter()
                .position(|prop| prop.name == entry.insert_text_or_name())
                .and_then(|idx| u16::try_from(idx).ok())
                .unwrap_or(unlisted);
            entry.sort_text = refine(&entry.sort_text, rank);
            entry
        })
        .collect();
    Ok(StageOutcome::entries(out))
}

pub(super) fn display_imported_info(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let mut changed = false;
    let mut out = entries.to_vec();
    for entry in out.iter_mut().filter(|entry| entry.is_auto_import()) {
        let Some(module) = entry.source.clone() else {
            continue;
        };
        match ctx.settings.display_imported_info {
            ImportedInfoDisplay::None => return Ok(StageOutcome::NoChange),
            ImportedInfoDisplay::ShortFormat => {
                entry.label_details_mut().description = Some(module);
            }
            ImportedInfoDisplay::LongFormat => {
                entry.source_display = Some(format!("import from \"{module}\""));
            }
        }
        changed = true;
    }
    Ok(StageOutcome::entries_if(changed, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_files() {
        assert!(is_dependency_file("/p/node_modules/react/index.d.ts"));
        assert!(!is_dependency_file("/p/src/node_modules_helper.ts"));
    }
}
