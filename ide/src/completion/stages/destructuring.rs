use analyzer::SyntaxKind;

use super::snippet::placeholder_list;
use super::{StageError, StageOutcome};
use crate::completion::sort_text::boost;
use crate::completion::{
    CompletionEntry, CompletionKind, DeferredMetadata, DeferredMetadataMap,
};
use crate::context::RequestContext;

/// Offers `{ a, b }` while naming a variable whose initializer is an object:
/// `const | = props` becomes `const { ${1:a}, ${2:b} } = props`.
pub(super) fn destructuring_suggestion(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let tree = ctx.tree();
    let Some(declaration) = ctx.enclosing(SyntaxKind::VariableDeclaration) else {
        return Ok(StageOutcome::NoChange);
    };
    let children = tree.children(declaration);
    let (Some(&name), Some(&initializer)) = (children.first(), children.last()) else {
        return Ok(StageOutcome::NoChange);
    };
    let naming = tree.kind(name) == SyntaxKind::Identifier && tree.span(name).touches(ctx.position);
    if !naming || initializer == name || tree.kind(initializer) == SyntaxKind::TypeReference {
        return Ok(StageOutcome::NoChange);
    }

    let Some(ty) = ctx.semantic.type_of_node(initializer) else {
        return Ok(StageOutcome::NoChange);
    };
    if !ctx.semantic.call_signatures(&ty).is_empty() {
        return Ok(StageOutcome::NoChange);
    }
    let properties = ctx.semantic.properties_of(&ty);
    if properties.is_empty() {
        return Ok(StageOutcome::NoChange);
    }

    let names: Vec<&str> = properties.iter().map(|prop| prop.name.as_str()).collect();
    let label = format!("{{ {} }}", names.join(", "));
    if entries.iter().any(|entry| entry.name == label) {
        return Ok(StageOutcome::NoChange);
    }
    let snippet = format!("{{ {} }}", placeholder_list(names.iter().copied()));

    // The rewrite replaces the whole binding name, not just the typed prefix.
    let metadata = DeferredMetadataMap::from([(
        label.clone(),
        DeferredMetadata::default().with_replacement_span(tree.span(name)),
    )]);
    let mut suggestion =
        CompletionEntry::new(label, CompletionKind::Variable, boost("0")).with_snippet(snippet);
    suggestion.label_details_mut().description = Some("destructure".to_string());

    let mut out = Vec::with_capacity(entries.len() + 1);
    out.push(suggestion);
    out.extend_from_slice(entries);
    Ok(StageOutcome::Changed {
        entries: out,
        metadata,
    })
}
