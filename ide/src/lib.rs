//! Completion enrichment for editor integrations.
//!
//! A [`CompletionService`] takes the raw candidate list produced by a language engine,
//! filters and re-ranks it, rewrites insert text into snippets, applies user rules and
//! hands back a list whose sort keys are unique and increasing.
//!
//! Coordinates are UTF-8 byte offsets (`[start, end)`), matching `analyzer`.

mod completion;
mod config;
mod context;
pub mod position;
mod semantic;
mod service;

pub use analyzer::TextEdit;
pub use completion::{
    CompletionEntry, CompletionKind, DeferredMetadata, DeferredMetadataMap, DocumentationEdit,
    EntryDetails, PatternError, RequestId, RuleError, UnknownKind,
};
pub use config::{
    AutoImportSettings, ConfigError, EnableToggle, EnabledToggle, GlobalLibAction,
    ImportedInfoDisplay, JsxAttributePatch, JsxAttributeRule, KeepOriginal,
    KeywordsInsertText, MethodSnippetInsertText, MethodSnippetSettings, MethodSnippetSkip,
    NamespaceImport, ObjectLiteralSettings, Settings, SuggestionSettings,
};
pub use service::{
    AuxiliaryData, CancellationToken, CompletionRequest, CompletionResponse, CompletionResult,
    CompletionService, CompletionSource, FormattingOptions, MapRaw, QuotePreference,
    SourceExt, TriggerOptions,
};

#[cfg(test)]
mod tests;
