//! Raw completion payload produced by the engine, before enrichment.

use serde::{Deserialize, Serialize};

use crate::Span;
use crate::semantic::SymbolId;

/// Short inline suffix/description rendered next to a completion label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One engine completion entry.
///
/// `kind` is the engine's free-form element-kind tag (`"method"`, `"local var"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub kind_modifiers: String,
    pub sort_text: String,
    #[serde(default)]
    pub insert_text: Option<String>,
    #[serde(default)]
    pub is_snippet: bool,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_display: Option<String>,
    #[serde(default)]
    pub label_details: Option<LabelDetails>,
    #[serde(default)]
    pub replacement_span: Option<Span>,
    #[serde(default)]
    pub has_action: bool,
    #[serde(default)]
    pub symbol: Option<SymbolId>,
}

impl RawEntry {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, sort_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            kind_modifiers: String::new(),
            sort_text: sort_text.into(),
            insert_text: None,
            is_snippet: false,
            source: None,
            source_display: None,
            label_details: None,
            replacement_span: None,
            has_action: false,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl Into<String>) -> Self {
        self.kind_modifiers = modifiers.into();
        self
    }

    /// Marks the entry as an auto-import from `module`.
    pub fn auto_import(mut self, module: impl Into<String>) -> Self {
        self.source = Some(module.into());
        self.has_action = true;
        self
    }
}

/// Engine response for one completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCompletions {
    pub entries: Vec<RawEntry>,
    #[serde(default)]
    pub is_member_completion: bool,
    #[serde(default)]
    pub is_new_identifier_location: bool,
    #[serde(default)]
    pub optional_replacement_span: Option<Span>,
}

impl RawCompletions {
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn member(mut self) -> Self {
        self.is_member_completion = true;
        self
    }

    pub fn new_identifier_location(mut self) -> Self {
        self.is_new_identifier_location = true;
        self
    }
}
