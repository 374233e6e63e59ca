use super::{StageError, StageOutcome};
use crate::completion::CompletionEntry;
use crate::context::RequestContext;

/// Stable sort by `sort_text`, so user rules see entries in display order.
pub(super) fn sort_normalize(
    entries: &[CompletionEntry],
    _ctx: &RequestContext<'_>,
) -> Result<StageOutcome, StageError> {
    if entries.is_sorted_by(|a, b| a.sort_text <= b.sort_text) {
        return Ok(StageOutcome::NoChange);
    }
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.sort_text.cmp(&b.sort_text));
    Ok(StageOutcome::entries(sorted))
}
