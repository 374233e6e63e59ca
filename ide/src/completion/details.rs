//! Metadata that is produced while enriching a list but only used when the host asks for
//! the details of one chosen entry.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use analyzer::{Span, TextEdit};
use serde::Serialize;

/// How deferred documentation combines with the engine's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "text", rename_all = "camelCase")]
pub enum DocumentationEdit {
    Replace(String),
    Append(String),
}

/// Per-entry overrides applied on details resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferredMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<DocumentationEdit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_span: Option<Span>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_edits: Vec<TextEdit>,
}

/// Deferred metadata for one request, keyed by final entry name.
pub type DeferredMetadataMap = BTreeMap<String, DeferredMetadata>;

impl DeferredMetadata {
    pub fn with_edit(mut self, edit: TextEdit) -> Self {
        self.additional_edits.push(edit);
        self
    }

    pub fn with_detail_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.detail_prefix = Some(prefix.into());
        self
    }

    pub fn with_documentation(mut self, documentation: DocumentationEdit) -> Self {
        self.documentation = Some(documentation);
        self
    }

    pub fn with_replacement_span(mut self, span: Span) -> Self {
        self.replacement_span = Some(span);
        self
    }

    /// Folds `later` into `self`. Scalar fields from `later` win, edits accumulate.
    pub fn merge(&mut self, later: DeferredMetadata) {
        if later.documentation.is_some() {
            self.documentation = later.documentation;
        }
        if later.detail_prefix.is_some() {
            self.detail_prefix = later.detail_prefix;
        }
        if later.replacement_span.is_some() {
            self.replacement_span = later.replacement_span;
        }
        self.additional_edits.extend(later.additional_edits);
    }

    pub fn apply(self, mut details: EntryDetails) -> EntryDetails {
        match self.documentation {
            Some(DocumentationEdit::Replace(text)) => details.documentation = text,
            Some(DocumentationEdit::Append(text)) => {
                if !details.documentation.is_empty() {
                    details.documentation.push_str("\n\n");
                }
                details.documentation.push_str(&text);
            }
            None => {}
        }
        if let Some(prefix) = self.detail_prefix {
            details.detail = format!("{prefix}{}", details.detail);
        }
        if self.replacement_span.is_some() {
            details.replacement_span = self.replacement_span;
        }
        details.additional_edits.extend(self.additional_edits);
        details
    }
}

pub(crate) fn merge_into(target: &mut DeferredMetadataMap, delta: DeferredMetadataMap) {
    for (name, metadata) in delta {
        target.entry(name).or_default().merge(metadata);
    }
}

/// Engine details for one entry, as returned by a details request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetails {
    pub name: String,
    pub detail: String,
    pub documentation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_span: Option<Span>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_edits: Vec<TextEdit>,
}

impl EntryDetails {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Identifies one completion request served by a `CompletionService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) const DEFAULT_DETAILS_TTL: Duration = Duration::from_secs(300);

/// Deferred metadata of the most recent request only.
///
/// Storing a new request drops the previous one entirely. Entries are handed out once.
#[derive(Debug)]
pub(crate) struct DetailsCache {
    ttl: Duration,
    current: Option<CachedRequest>,
}

#[derive(Debug)]
struct CachedRequest {
    id: RequestId,
    stored_at: Instant,
    entries: DeferredMetadataMap,
}

impl DetailsCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub(crate) fn store(&mut self, id: RequestId, entries: DeferredMetadataMap, now: Instant) {
        self.current = Some(CachedRequest {
            id,
            stored_at: now,
            entries,
        });
    }

    pub(crate) fn take(&mut self, id: RequestId, name: &str, now: Instant) -> Option<DeferredMetadata> {
        let current = self.current.as_mut()?;
        if current.id != id {
            return None;
        }
        if now.saturating_duration_since(current.stored_at) > self.ttl {
            tracing::trace!(request_id = %id, "deferred completion metadata expired");
            self.current = None;
            return None;
        }
        current.entries.remove(name)
    }

    pub(crate) fn clear(&mut self) {
        self.current = None;
    }
}

impl Default for DetailsCache {
    fn default() -> Self {
        Self::new(DEFAULT_DETAILS_TTL)
    }
}
