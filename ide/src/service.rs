//! Host-facing completion service.
//!
//! A host wraps its engine in a [`CompletionSource`] and hands it to a
//! [`CompletionService`], which enriches every raw list and keeps what later requests need
//! (component caches, deferred details).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use analyzer::semantic::TypeChecker;
use analyzer::{Document, RawCompletions, Span};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::completion::pipeline;
use crate::completion::{
    CompletionEntry, DeferredMetadataMap, DetailsCache, EntryDetails, RequestId,
};
use crate::config::{ConfigError, Settings};
use crate::context::{ContextInputs, RequestContext};

/// Produces the engine's raw completions.
pub trait CompletionSource {
    fn completions(
        &self,
        document: &Document,
        offset: u32,
        trigger: &TriggerOptions,
    ) -> Option<RawCompletions>;
}

impl<F> CompletionSource for F
where
    F: Fn(&Document, u32, &TriggerOptions) -> Option<RawCompletions>,
{
    fn completions(
        &self,
        document: &Document,
        offset: u32,
        trigger: &TriggerOptions,
    ) -> Option<RawCompletions> {
        self(document, offset, trigger)
    }
}

/// Middleware over a [`CompletionSource`].
pub trait SourceExt: CompletionSource + Sized {
    /// Rewrites the raw payload before enrichment.
    fn map_raw<F>(self, map: F) -> MapRaw<Self, F>
    where
        F: Fn(RawCompletions, &Document) -> RawCompletions,
    {
        MapRaw { source: self, map }
    }
}

impl<S: CompletionSource> SourceExt for S {}

pub struct MapRaw<S, F> {
    source: S,
    map: F,
}

impl<S, F> CompletionSource for MapRaw<S, F>
where
    S: CompletionSource,
    F: Fn(RawCompletions, &Document) -> RawCompletions,
{
    fn completions(
        &self,
        document: &Document,
        offset: u32,
        trigger: &TriggerOptions,
    ) -> Option<RawCompletions> {
        self.source
            .completions(document, offset, trigger)
            .map(|raw| (self.map)(raw, document))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerOptions {
    pub trigger_character: Option<char>,
    /// Special command token; the request is answered with the raw payload untouched.
    pub command: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuotePreference {
    #[default]
    Double,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingOptions {
    pub quote_preference: QuotePreference,
    pub semicolons: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            quote_preference: QuotePreference::Double,
            semicolons: true,
        }
    }
}

/// Advisory cancellation, checked between stages.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct CompletionRequest<'a> {
    pub document: &'a Document,
    pub offset: u32,
    pub trigger: TriggerOptions,
    pub formatting: FormattingOptions,
    pub checker: &'a dyn TypeChecker,
    pub cancellation: CancellationToken,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(document: &'a Document, offset: u32, checker: &'a dyn TypeChecker) -> Self {
        Self {
            document,
            offset,
            trigger: TriggerOptions::default(),
            formatting: FormattingOptions::default(),
            checker,
            cancellation: CancellationToken::default(),
        }
    }

    pub fn with_trigger(mut self, trigger: TriggerOptions) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_formatting(mut self, formatting: FormattingOptions) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliaryData {
    pub snippet_position: bool,
    pub is_member_completion: bool,
    pub is_new_identifier_location: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_replacement_span: Option<Span>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub request_id: RequestId,
    pub entries: Vec<CompletionEntry>,
    pub deferred: DeferredMetadataMap,
    pub auxiliary: AuxiliaryData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResponse {
    Enriched(CompletionResult),
    Passthrough(RawCompletions),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ComponentKey {
    decl_file: String,
    name: String,
    version: u32,
}

impl ComponentKey {
    pub(crate) fn new(decl_file: &str, name: &str, version: u32) -> Self {
        Self {
            decl_file: decl_file.to_string(),
            name: name.to_string(),
            version,
        }
    }
}

/// Facts reused across requests. Borrows are short; a cache that is already borrowed
/// behaves as empty.
#[derive(Debug, Default)]
pub(crate) struct SharedCaches {
    jsx_components: RefCell<HashMap<ComponentKey, bool>>,
}

impl SharedCaches {
    pub(crate) fn jsx_component(&self, key: &ComponentKey) -> Option<bool> {
        self.jsx_components.try_borrow().ok()?.get(key).copied()
    }

    pub(crate) fn remember_jsx_component(&self, key: ComponentKey, is_component: bool) {
        if let Ok(mut cache) = self.jsx_components.try_borrow_mut() {
            cache.insert(key, is_component);
        }
    }

    fn invalidate_file(&self, file_name: &str) {
        if let Ok(mut cache) = self.jsx_components.try_borrow_mut() {
            let before = cache.len();
            cache.retain(|key, _| key.decl_file != file_name);
            tracing::trace!(
                file = file_name,
                dropped = before - cache.len(),
                "invalidated JSX component cache"
            );
        }
    }
}

pub struct CompletionService<S> {
    source: S,
    settings: Settings,
    caches: SharedCaches,
    details: RefCell<DetailsCache>,
    next_request: Cell<u64>,
}

impl<S: CompletionSource> CompletionService<S> {
    pub fn new(source: S, settings: Settings) -> Self {
        Self {
            source,
            settings,
            caches: SharedCaches::default(),
            details: RefCell::new(DetailsCache::default()),
            next_request: Cell::new(1),
        }
    }

    /// Service configured from a flat host map. An invalid map is logged and the defaults
    /// are used, so a broken configuration never disables completions.
    pub fn from_flat_settings(source: S, flat: &Map<String, Value>) -> Self {
        Self::new(source, Settings::from_flat_or_default(flat))
    }

    /// How long deferred details of the last request stay available.
    pub fn with_details_ttl(mut self, ttl: Duration) -> Self {
        self.details = RefCell::new(DetailsCache::new(ttl));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Replaces the settings from a flat host configuration map.
    pub fn configure(&mut self, flat: &Map<String, Value>) -> Result<(), ConfigError> {
        self.settings = Settings::from_flat(flat)?;
        Ok(())
    }

    /// Drops cached facts derived from `file_name`.
    pub fn document_changed(&self, file_name: &str) {
        self.caches.invalidate_file(file_name);
    }

    pub fn complete(&self, request: CompletionRequest<'_>) -> Option<CompletionResponse> {
        let raw = self
            .source
            .completions(request.document, request.offset, &request.trigger)?;
        if request.trigger.command.is_some() {
            return Some(CompletionResponse::Passthrough(raw));
        }

        let request_id = RequestId(self.next_request.get());
        self.next_request.set(request_id.0.wrapping_add(1));

        let ctx = RequestContext::new(ContextInputs {
            request_id,
            document: request.document,
            position: request.offset,
            settings: &self.settings,
            checker: request.checker,
            caches: &self.caches,
            formatting: request.formatting,
            trigger_character: request.trigger.trigger_character,
            is_member_completion: raw.is_member_completion,
        });
        let entries = raw
            .entries
            .into_iter()
            .map(CompletionEntry::from_raw)
            .collect();
        let output = pipeline::run(entries, &ctx, &request.cancellation);

        match self.details.try_borrow_mut() {
            Ok(mut details) => details.store(request_id, output.deferred.clone(), Instant::now()),
            Err(_) => tracing::warn!(%request_id, "details cache busy; deferred metadata dropped"),
        }

        Some(CompletionResponse::Enriched(CompletionResult {
            request_id,
            entries: output.entries,
            deferred: output.deferred,
            auxiliary: AuxiliaryData {
                snippet_position: ctx.cursor.snippet_position,
                is_member_completion: raw.is_member_completion,
                is_new_identifier_location: raw.is_new_identifier_location,
                optional_replacement_span: raw.optional_replacement_span,
                cancelled: output.cancelled,
            },
        }))
    }

    /// Applies the deferred metadata recorded for `name` by request `request_id`.
    ///
    /// Each entry is handed out once; requests other than the latest have nothing left.
    pub fn resolve_details(
        &self,
        request_id: RequestId,
        name: &str,
        details: EntryDetails,
    ) -> EntryDetails {
        let metadata = self
            .details
            .try_borrow_mut()
            .ok()
            .and_then(|mut cache| cache.take(request_id, name, Instant::now()));
        match metadata {
            Some(metadata) => metadata.apply(details),
            None => details,
        }
    }

    /// Forgets deferred metadata of the last request.
    pub fn clear_details(&self) {
        if let Ok(mut details) = self.details.try_borrow_mut() {
            details.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use analyzer::{RawEntry, TreeBuilder};

    use super::*;

    #[test]
    fn component_cache_is_dropped_per_file() {
        let caches = SharedCaches::default();
        let button = ComponentKey::new("/p/src/Button.tsx", "Button", 3);
        let card = ComponentKey::new("/p/src/Card.tsx", "Card", 0);
        caches.remember_jsx_component(button.clone(), true);
        caches.remember_jsx_component(card.clone(), false);

        caches.invalidate_file("/p/src/Button.tsx");
        assert_eq!(caches.jsx_component(&button), None);
        assert_eq!(caches.jsx_component(&card), Some(false));
    }

    #[test]
    fn map_raw_rewrites_the_engine_payload() {
        let source = |_: &Document, _: u32, _: &TriggerOptions| {
            Some(RawCompletions::new(vec![
                RawEntry::new("kept", "var", "11"),
                RawEntry::new("__internal", "var", "11"),
            ]))
        };
        let source = source.map_raw(|mut raw, _| {
            raw.entries.retain(|entry| !entry.name.starts_with("__"));
            raw
        });

        let document = Document::new("/p/a.ts", "", TreeBuilder::new().finish());
        let raw = source
            .completions(&document, 0, &TriggerOptions::default())
            .unwrap();
        let names: Vec<_> = raw.entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["kept"]);
    }
}
