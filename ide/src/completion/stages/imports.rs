use analyzer::{SyntaxKind, TextEdit};

use super::snippet::escape;
use super::{StageError, StageOutcome};
use crate::completion::{
    CompletionEntry, DeferredMetadata, DeferredMetadataMap, DocumentationEdit,
};
use crate::context::RequestContext;
use crate::service::QuotePreference;

/// Whether the document already has `import * as namespace from "module"`.
fn has_namespace_import(ctx: &RequestContext<'_>, namespace: &str, module: &str) -> bool {
    let tree = ctx.tree();
    let source = ctx.source();
    let Some(root) = tree.root() else {
        return false;
    };
    tree.children(root)
        .iter()
        .filter(|id| tree.kind(**id) == SyntaxKind::ImportDeclaration)
        .map(|id| tree.text(*id, source))
        .any(|text| {
            let binds_namespace = text
                .split_once('*')
                .and_then(|(_, rest)| rest.trim_start().strip_prefix("as"))
                .is_some_and(|rest| {
                    rest.trim_start()
                        .split(|c: char| c.is_whitespace())
                        .next()
                        == Some(namespace)
                });
            let from_module = [format!("\"{module}\""), format!("'{module}'")]
                .iter()
                .any(|quoted| text.contains(quoted.as_str()));
            binds_namespace && from_module
        })
}

fn import_statement(ctx: &RequestContext<'_>, namespace: &str, module: &str) -> String {
    let quote = match ctx.formatting.quote_preference {
        QuotePreference::Double => '"',
        QuotePreference::Single => '\'',
    };
    let semicolon = if ctx.formatting.semicolons { ";" } else { "" };
    format!("import * as {namespace} from {quote}{module}{quote}{semicolon}\n")
}

/// Completes auto-imports from configured modules as `namespace.symbol`.
///
/// The engine's named-import action is dropped; the namespace import is deferred to
/// details resolution.
pub(super) fn namespace_import(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let config = &ctx.settings.auto_import.change_to_namespace_import;
    let mut changed = false;
    let mut metadata = DeferredMetadataMap::new();
    let mut out = entries.to_vec();

    for entry in &mut out {
        if !entry.is_auto_import() {
            continue;
        }
        let Some(module) = entry.source.clone() else {
            continue;
        };
        let Some(target) = config.get(&module) else {
            continue;
        };

        let namespace = if entry.is_snippet {
            escape(&target.namespace)
        } else {
            target.namespace.clone()
        };
        entry.insert_text = Some(format!("{namespace}.{}", entry.insert_text_or_name()));
        entry.has_action = false;
        changed = true;

        if target.add_import && !has_namespace_import(ctx, &target.namespace, &module) {
            let statement = import_statement(ctx, &target.namespace, &module);
            let note = format!("Adds `{}`", statement.trim_end());
            let edit = TextEdit::insert(0, statement);
            metadata.insert(
                entry.name.clone(),
                DeferredMetadata::default()
                    .with_edit(edit)
                    .with_documentation(DocumentationEdit::Append(note)),
            );
        }
    }

    if !changed {
        return Ok(StageOutcome::NoChange);
    }
    Ok(StageOutcome::Changed {
        entries: out,
        metadata,
    })
}
