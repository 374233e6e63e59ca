//! Completion enrichment.
//! All coordinates are UTF-8 byte offsets into the document text.
//! Spans are half-open ranges `[start, end)`.

use analyzer::semantic::SymbolId;
use analyzer::{LabelDetails, RawEntry, Span};
use serde::{Deserialize, Serialize};

mod details;
mod matchers;
pub(crate) mod pipeline;
mod rules;
pub(crate) mod sort_text;
pub(crate) mod stages;

pub(crate) use details::DetailsCache;
pub use details::{
    DeferredMetadata, DeferredMetadataMap, DocumentationEdit, EntryDetails, RequestId,
};
pub use matchers::PatternError;
pub use rules::RuleError;

/// One candidate ready for UI rendering.
///
/// `insert_text` defaults to `name` when absent. Stages that decorate `name` keep the
/// undecorated text in `insert_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    pub is_snippet: bool,
    pub kind: CompletionKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind_modifiers: String,
    pub sort_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_details: Option<LabelDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_span: Option<Span>,
    pub has_action: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolId>,
}

impl CompletionEntry {
    pub fn new(name: impl Into<String>, kind: CompletionKind, sort_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insert_text: None,
            is_snippet: false,
            kind,
            kind_modifiers: String::new(),
            sort_text: sort_text.into(),
            source: None,
            source_display: None,
            label_details: None,
            replacement_span: None,
            has_action: false,
            symbol: None,
        }
    }

    pub fn from_raw(raw: RawEntry) -> Self {
        Self {
            kind: CompletionKind::from_engine_tag(&raw.kind),
            name: raw.name,
            insert_text: raw.insert_text,
            is_snippet: raw.is_snippet,
            kind_modifiers: raw.kind_modifiers,
            sort_text: raw.sort_text,
            source: raw.source,
            source_display: raw.source_display,
            label_details: raw.label_details,
            replacement_span: raw.replacement_span,
            has_action: raw.has_action,
            symbol: raw.symbol,
        }
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.set_snippet(snippet);
        self
    }

    /// Text that will be inserted, falling back to `name`.
    pub fn insert_text_or_name(&self) -> &str {
        self.insert_text.as_deref().unwrap_or(&self.name)
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.kind_modifiers
            .split(',')
            .any(|m| m.trim() == modifier)
    }

    /// Entry the engine would auto-import from `source` when accepted.
    pub fn is_auto_import(&self) -> bool {
        self.has_action && self.source.is_some()
    }

    pub(crate) fn set_snippet(&mut self, snippet: impl Into<String>) {
        self.insert_text = Some(snippet.into());
        self.is_snippet = true;
    }

    /// Prefixes `name` with `marker` without changing what gets inserted.
    pub(crate) fn decorate(&mut self, marker: &str) {
        if self.insert_text.is_none() {
            self.insert_text = Some(self.name.clone());
        }
        self.name = format!("{marker}{}", self.name);
    }

    pub(crate) fn label_details_mut(&mut self) -> &mut LabelDetails {
        self.label_details.get_or_insert_with(LabelDetails::default)
    }
}

/// Coarse semantic category of a candidate.
///
/// The engine reports kinds as free-form tags; [`CompletionKind::from_tag`] is the one
/// mapping table between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum CompletionKind {
    Unknown,
    Warning,
    Keyword,
    Script,
    Module,
    ExternalModuleName,
    Directory,
    Class,
    LocalClass,
    Interface,
    TypeAlias,
    Enum,
    EnumMember,
    Variable,
    LocalVariable,
    Const,
    Let,
    Using,
    Function,
    LocalFunction,
    Method,
    Getter,
    Setter,
    Accessor,
    Property,
    Constructor,
    CallSignature,
    ConstructSignature,
    IndexSignature,
    Parameter,
    TypeParameter,
    PrimitiveType,
    Label,
    Alias,
    JsxAttribute,
    String,
    Link,
}

const KIND_TAGS: &[(&str, CompletionKind)] = &[
    ("", CompletionKind::Unknown),
    ("warning", CompletionKind::Warning),
    ("keyword", CompletionKind::Keyword),
    ("script", CompletionKind::Script),
    ("module", CompletionKind::Module),
    ("external module name", CompletionKind::ExternalModuleName),
    ("directory", CompletionKind::Directory),
    ("class", CompletionKind::Class),
    ("local class", CompletionKind::LocalClass),
    ("interface", CompletionKind::Interface),
    ("type", CompletionKind::TypeAlias),
    ("enum", CompletionKind::Enum),
    ("enum member", CompletionKind::EnumMember),
    ("var", CompletionKind::Variable),
    ("local var", CompletionKind::LocalVariable),
    ("const", CompletionKind::Const),
    ("let", CompletionKind::Let),
    ("using", CompletionKind::Using),
    ("function", CompletionKind::Function),
    ("local function", CompletionKind::LocalFunction),
    ("method", CompletionKind::Method),
    ("getter", CompletionKind::Getter),
    ("setter", CompletionKind::Setter),
    ("accessor", CompletionKind::Accessor),
    ("property", CompletionKind::Property),
    ("constructor", CompletionKind::Constructor),
    ("call", CompletionKind::CallSignature),
    ("construct", CompletionKind::ConstructSignature),
    ("index", CompletionKind::IndexSignature),
    ("parameter", CompletionKind::Parameter),
    ("type parameter", CompletionKind::TypeParameter),
    ("primitive type", CompletionKind::PrimitiveType),
    ("label", CompletionKind::Label),
    ("alias", CompletionKind::Alias),
    ("JSX attribute", CompletionKind::JsxAttribute),
    ("string", CompletionKind::String),
    ("link", CompletionKind::Link),
];

/// Tags the engine emits that share a variant with another tag.
const KIND_TAG_ALIASES: &[(&str, CompletionKind)] = &[
    ("await using", CompletionKind::Using),
    ("link name", CompletionKind::Link),
    ("link text", CompletionKind::Link),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized completion kind `{0}`")]
pub struct UnknownKind(pub String);

impl CompletionKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        KIND_TAGS
            .iter()
            .chain(KIND_TAG_ALIASES)
            .find(|(known, _)| *known == tag)
            .map(|(_, kind)| *kind)
    }

    /// Maps an engine tag, asserting in debug builds that the tag is known.
    pub fn from_engine_tag(tag: &str) -> Self {
        match Self::from_tag(tag) {
            Some(kind) => kind,
            None => {
                debug_assert!(false, "unrecognized completion kind tag from engine: {tag:?}");
                tracing::warn!(tag, "unrecognized completion kind tag from engine");
                CompletionKind::Unknown
            }
        }
    }

    pub fn as_tag(self) -> &'static str {
        KIND_TAGS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(tag, _)| *tag)
            .unwrap_or("")
    }

    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            CompletionKind::Function
                | CompletionKind::LocalFunction
                | CompletionKind::Method
                | CompletionKind::Constructor
        )
    }

    pub fn is_variable_like(self) -> bool {
        matches!(
            self,
            CompletionKind::Variable
                | CompletionKind::LocalVariable
                | CompletionKind::Const
                | CompletionKind::Let
                | CompletionKind::Using
                | CompletionKind::Parameter
        )
    }

    /// Kinds that may stand for a callable value.
    pub fn may_be_callable(self) -> bool {
        self.is_function_like()
            || self.is_variable_like()
            || matches!(
                self,
                CompletionKind::Property
                    | CompletionKind::Alias
                    | CompletionKind::Class
                    | CompletionKind::LocalClass
                    | CompletionKind::Getter
            )
    }
}

impl TryFrom<String> for CompletionKind {
    type Error = UnknownKind;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        Self::from_tag(&tag).ok_or(UnknownKind(tag))
    }
}

impl From<CompletionKind> for &'static str {
    fn from(kind: CompletionKind) -> Self {
        kind.as_tag()
    }
}
