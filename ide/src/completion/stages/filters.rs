use super::{StageError, StageOutcome};
use crate::completion::{CompletionEntry, DeferredMetadata, DeferredMetadataMap};
use crate::completion::matchers::{
    NameMatcher, PatternError, first_char_case_agrees, starts_with_ignore_ascii_case,
};
use crate::config::GlobalLibAction;
use crate::context::RequestContext;

/// One `ignoreAutoImports` item: `module`, `module#symbol` or `module#a,b`.
struct IgnoreRule {
    module: NameMatcher,
    /// Empty means every symbol of the module.
    symbols: Vec<NameMatcher>,
}

impl IgnoreRule {
    fn parse(item: &str) -> Result<Self, PatternError> {
        let (module, symbols) = match item.split_once('#') {
            Some((module, symbols)) => (module, Some(symbols)),
            None => (item, None),
        };
        let symbols = symbols
            .into_iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|symbol| !symbol.is_empty())
            .map(NameMatcher::compile)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            module: NameMatcher::compile(module.trim())?,
            symbols,
        })
    }

    fn ignores(&self, module: &str, symbol: &str) -> bool {
        self.module.is_match(module)
            && (self.symbols.is_empty() || self.symbols.iter().any(|m| m.is_match(symbol)))
    }
}

pub(super) fn ignore_auto_imports(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let rules: Vec<IgnoreRule> = ctx
        .settings
        .ignore_auto_imports
        .iter()
        .filter_map(|item| match IgnoreRule::parse(item) {
            Ok(rule) => Some(rule),
            Err(err) => {
                tracing::warn!(item = %item, error = %err, "skipping ignoreAutoImports item");
                None
            }
        })
        .collect();

    Ok(StageOutcome::retain(entries, |entry| {
        let Some(module) = entry.source.as_deref().filter(|_| entry.is_auto_import()) else {
            return true;
        };
        !rules.iter().any(|rule| rule.ignores(module, &entry.name))
    }))
}

pub(super) fn case_sensitive(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let prefix = ctx.prefix();
    if prefix.is_empty() {
        return Ok(StageOutcome::NoChange);
    }
    Ok(StageOutcome::retain(entries, |entry| {
        first_char_case_agrees(&entry.name, prefix)
    }))
}

pub(super) fn strict_prefix(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let prefix = ctx.prefix();
    if prefix.is_empty() {
        return Ok(StageOutcome::NoChange);
    }
    Ok(StageOutcome::retain(entries, |entry| {
        starts_with_ignore_ascii_case(&entry.name, prefix)
    }))
}

const GLOBAL_LIB_MARK: &str = "🏛 ";
const GLOBAL_LIB_DETAIL: &str = "(global) ";

/// `lib.dom.d.ts`, `lib.es2015.core.d.ts`, ... in any directory.
fn is_default_lib_file(path: &str) -> bool {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file.starts_with("lib.") && file.ends_with(".d.ts")
}

pub(super) fn global_lib(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    let is_global = |entry: &CompletionEntry| {
        entry
            .symbol
            .and_then(|symbol| ctx.semantic.symbol(symbol))
            .is_some_and(|symbol| {
                !symbol.declarations.is_empty()
                    && symbol
                        .declarations
                        .iter()
                        .all(|decl| is_default_lib_file(&decl.file))
            })
    };

    match ctx.settings.global_lib_completions {
        GlobalLibAction::None => Ok(StageOutcome::NoChange),
        GlobalLibAction::Remove => Ok(StageOutcome::retain(entries, |entry| !is_global(entry))),
        GlobalLibAction::Mark => {
            let mut metadata = DeferredMetadataMap::new();
            let entries: Vec<_> = entries
                .iter()
                .cloned()
                .map(|mut entry| {
                    if is_global(&entry) {
                        entry.decorate(GLOBAL_LIB_MARK);
                        metadata.insert(
                            entry.name.clone(),
                            DeferredMetadata::default().with_detail_prefix(GLOBAL_LIB_DETAIL),
                        );
                    }
                    entry
                })
                .collect();
            if metadata.is_empty() {
                return Ok(StageOutcome::NoChange);
            }
            Ok(StageOutcome::Changed { entries, metadata })
        }
    }
}

const USELESS_FUNCTION_PROPS: &[&str] = &["Symbol", "arguments", "caller"];

pub(super) fn remove_useless_function_props(
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if !ctx.is_member_completion || !is_function_member_list(entries, ctx) {
        return Ok(StageOutcome::NoChange);
    }
    Ok(StageOutcome::retain(entries, |entry| {
        !USELESS_FUNCTION_PROPS.contains(&entry.name.as_str())
    }))
}

/// The receiver is callable, or the list carries the `Function.prototype` trio.
fn is_function_member_list(entries: &[CompletionEntry], ctx: &RequestContext<'_>) -> bool {
    let receiver_callable = ctx
        .member_receiver()
        .and_then(|receiver| ctx.semantic.type_of_node(receiver))
        .is_some_and(|ty| !ctx.semantic.call_signatures(&ty).is_empty());
    receiver_callable
        || ["apply", "bind", "call"]
            .iter()
            .all(|name| entries.iter().any(|entry| entry.name == *name))
}
