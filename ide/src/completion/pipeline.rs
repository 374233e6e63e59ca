//! Runs the enrichment stages over one raw list.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::details::merge_into;
use super::rules::apply_rules;
use super::stages::{STAGES, StageDef, StageOutcome};
use super::{CompletionEntry, DeferredMetadataMap, sort_text};
use crate::context::RequestContext;
use crate::service::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PipelineOutput {
    pub(crate) entries: Vec<CompletionEntry>,
    pub(crate) deferred: DeferredMetadataMap,
    pub(crate) cancelled: bool,
}

/// Filters, boosts, synthesis and sort normalization, then user rules, then the final
/// sort keys.
pub(crate) fn run(
    raw: Vec<CompletionEntry>,
    ctx: &RequestContext<'_>,
    cancel: &CancellationToken,
) -> PipelineOutput {
    let _span = tracing::debug_span!(
        "completion",
        request_id = %ctx.request_id,
        offset = ctx.position
    )
    .entered();

    let stages: Vec<&StageDef> = STAGES
        .iter()
        .filter(|stage| (stage.enabled)(ctx.settings))
        .collect();

    if raw.is_empty() && !stages.iter().any(|stage| stage.synthesizes_from_empty) {
        return PipelineOutput {
            entries: raw,
            deferred: DeferredMetadataMap::new(),
            cancelled: false,
        };
    }

    let mut entries = raw;
    let mut deferred = DeferredMetadataMap::new();
    for stage in stages {
        if cancel.is_cancelled() {
            tracing::debug!(stage = stage.name, "completion cancelled");
            return PipelineOutput {
                entries,
                deferred,
                cancelled: true,
            };
        }
        match run_stage(stage, &entries, ctx) {
            Some(StageOutcome::Changed {
                entries: next,
                metadata,
            }) => {
                tracing::trace!(
                    stage = stage.name,
                    before = entries.len(),
                    after = next.len(),
                    "stage changed entries"
                );
                entries = next;
                merge_into(&mut deferred, metadata);
            }
            Some(StageOutcome::NoChange) | None => {}
        }
    }

    if cancel.is_cancelled() {
        return PipelineOutput {
            entries,
            deferred,
            cancelled: true,
        };
    }
    if !ctx.settings.replace_suggestions.is_empty() {
        entries = apply_rules(
            entries,
            &ctx.settings.replace_suggestions,
            ctx.document,
            &mut deferred,
        );
    }
    if ctx.settings.correct_sorting.enable {
        finalize_sort_text(&mut entries);
    }

    deferred.retain(|name, _| entries.iter().any(|entry| entry.name == *name));
    PipelineOutput {
        entries,
        deferred,
        cancelled: false,
    }
}

/// Runs one stage; errors and panics count as "no change".
fn run_stage(
    stage: &StageDef,
    entries: &[CompletionEntry],
    ctx: &RequestContext<'_>,
) -> Option<StageOutcome> {
    match catch_unwind(AssertUnwindSafe(|| (stage.run)(entries, ctx))) {
        Ok(Ok(outcome)) => Some(outcome),
        Ok(Err(err)) => {
            tracing::warn!(stage = stage.name, error = %err, "completion stage failed");
            None
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::error!(stage = stage.name, panic = %message, "completion stage panicked");
            None
        }
    }
}

/// Stable sort by `sort_text`, then make every key unique and increasing.
fn finalize_sort_text(entries: &mut [CompletionEntry]) {
    entries.sort_by(|a, b| a.sort_text.cmp(&b.sort_text));
    sort_text::finalize(entries.iter_mut().map(|entry| &mut entry.sort_text));
}
