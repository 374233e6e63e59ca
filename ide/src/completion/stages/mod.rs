//! Built-in enrichment stages, in execution order.
//!
//! A stage reads the current list and the request context and returns a [`StageOutcome`];
//! it never mutates either. Filters keep relative order, boosts only rewrite `sort_text`,
//! synthesis stages rewrite or add entries.

use analyzer::semantic::Ty;

use super::matchers::PatternError;
use super::{CompletionEntry, DeferredMetadataMap};
use crate::config::{GlobalLibAction, KeywordsInsertText, ImportedInfoDisplay, Settings};
use crate::context::RequestContext;

mod boosts;
mod destructuring;
mod filters;
mod imports;
mod jsx;
mod keywords;
mod method_snippets;
mod object_literal;
mod snippet;
mod sorting;
mod switch_case;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StageOutcome {
    NoChange,
    Changed {
        entries: Vec<CompletionEntry>,
        metadata: DeferredMetadataMap,
    },
}

impl StageOutcome {
    pub(crate) fn entries(entries: Vec<CompletionEntry>) -> Self {
        StageOutcome::Changed {
            entries,
            metadata: DeferredMetadataMap::new(),
        }
    }

    /// `Changed` only when `changed` is set.
    pub(crate) fn entries_if(changed: bool, entries: Vec<CompletionEntry>) -> Self {
        if changed {
            Self::entries(entries)
        } else {
            StageOutcome::NoChange
        }
    }

    /// Keeps the entries for which `keep` holds; `NoChange` when nothing is dropped.
    pub(crate) fn retain(
        entries: &[CompletionEntry],
        mut keep: impl FnMut(&CompletionEntry) -> bool,
    ) -> Self {
        let kept: Vec<_> = entries.iter().filter(|entry| keep(entry)).cloned().collect();
        Self::entries_if(kept.len() != entries.len(), kept)
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum StageError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("syntax tree does not have the expected shape: {0}")]
    UnexpectedTree(&'static str),
}

pub(crate) type StageFn =
    fn(&[CompletionEntry], &RequestContext<'_>) -> Result<StageOutcome, StageError>;

pub(crate) struct StageDef {
    pub(crate) name: &'static str,
    pub(crate) enabled: fn(&Settings) -> bool,
    /// Can produce entries when the engine returned none.
    pub(crate) synthesizes_from_empty: bool,
    pub(crate) run: StageFn,
}

const fn stage(name: &'static str, enabled: fn(&Settings) -> bool, run: StageFn) -> StageDef {
    StageDef {
        name,
        enabled,
        synthesizes_from_empty: false,
        run,
    }
}

fn always(_: &Settings) -> bool {
    true
}

pub(crate) static STAGES: &[StageDef] = &[
    // Filters.
    stage(
        "ignore_auto_imports",
        |s| !s.ignore_auto_imports.is_empty(),
        filters::ignore_auto_imports,
    ),
    stage(
        "case_sensitive",
        |s| s.case_sensitive_completions,
        filters::case_sensitive,
    ),
    stage(
        "strict_prefix",
        |s| s.disable_fuzzy_completions,
        filters::strict_prefix,
    ),
    stage(
        "jsx_elements",
        |s| s.jsx_improve_elements_suggestions.enabled,
        jsx::jsx_elements,
    ),
    stage(
        "global_lib",
        |s| s.global_lib_completions != GlobalLibAction::None,
        filters::global_lib,
    ),
    stage(
        "switch_case_exclude_covered",
        |s| s.switch_exclude_covered_cases,
        switch_case::exclude_covered,
    ),
    stage(
        "remove_useless_function_props",
        |s| s.remove_useless_function_props.enable,
        filters::remove_useless_function_props,
    ),
    // Semantic boosts.
    stage(
        "function_kind",
        |s| s.change_kind_to_function,
        boosts::function_kind,
    ),
    stage(
        "highlight_non_function_methods",
        |s| s.highlight_non_function_methods.enable,
        boosts::highlight_non_function_methods,
    ),
    stage("keyword_boost", always, keywords::keyword_boost),
    stage(
        "contextual_type_boost",
        |s| s.contextual_type_boost,
        boosts::contextual_type_boost,
    ),
    stage("locality_bonus", |s| s.locality_bonus, boosts::locality_bonus),
    stage(
        "fix_properties_sorting",
        |s| s.fix_suggestions_sorting,
        boosts::fix_properties_sorting,
    ),
    stage(
        "display_imported_info",
        |s| s.display_imported_info != ImportedInfoDisplay::None,
        boosts::display_imported_info,
    ),
    // Synthesis.
    stage(
        "array_method_snippets",
        |s| s.array_methods_snippets.enable,
        method_snippets::array_method_snippets,
    ),
    stage(
        "method_snippets",
        |s| s.enable_method_snippets,
        method_snippets::method_snippets,
    ),
    stage(
        "object_literal_completions",
        |s| s.object_literal_completions.enable,
        object_literal::object_literal_completions,
    ),
    stage(
        "jsx_attributes",
        |s| !s.jsx_completions_map.is_empty(),
        jsx::jsx_attributes,
    ),
    StageDef {
        name: "destructuring_suggestion",
        enabled: |s| s.destructuring_suggestion.enable,
        synthesizes_from_empty: true,
        run: destructuring::destructuring_suggestion,
    },
    stage(
        "keyword_space",
        |s| s.suggestions.keywords_insert_text == KeywordsInsertText::Space,
        keywords::keyword_space,
    ),
    stage(
        "namespace_import",
        |s| !s.auto_import.change_to_namespace_import.is_empty(),
        imports::namespace_import,
    ),
    stage("sort_normalize", always, sorting::sort_normalize),
];

/// Type of the symbol behind `entry`, if the engine knows it.
pub(crate) fn entry_type(entry: &CompletionEntry, ctx: &RequestContext<'_>) -> Option<Ty> {
    ctx.semantic.type_of_symbol(entry.symbol?)
}

/// File of the first declaration of the symbol behind `entry`.
pub(crate) fn declaration_file<'a>(
    entry: &CompletionEntry,
    ctx: &RequestContext<'a>,
) -> Option<&'a str> {
    ctx.semantic.symbol(entry.symbol?)?.declaration_file()
}
