//! Completion settings.
//!
//! Hosts hand over a flat `key -> value` map where dotted keys address nested sections
//! (`"methodSnippets.skip": "all"`). [`Settings::from_flat`] expands the dots and
//! deserializes into typed settings; every key is optional and falls back to its default.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration key `{key}` conflicts with a non-object value at `{prefix}`")]
    ConflictingKey { key: String, prefix: String },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub enable_method_snippets: bool,
    pub method_snippets: MethodSnippetSettings,
    pub object_literal_completions: ObjectLiteralSettings,
    pub case_sensitive_completions: bool,
    pub disable_fuzzy_completions: bool,
    pub jsx_improve_elements_suggestions: EnabledToggle,
    /// `tagName#attribute` (either side may use a single `*`) to attribute rewrite.
    pub jsx_completions_map: BTreeMap<String, JsxAttributeRule>,
    /// User rules, kept as raw JSON so one malformed rule cannot reject the whole settings.
    pub replace_suggestions: Vec<Value>,
    pub correct_sorting: EnableToggle,
    /// `module`, `module#symbol` or `module#symbolA,symbolB`; both parts may use one `*`.
    pub ignore_auto_imports: Vec<String>,
    pub global_lib_completions: GlobalLibAction,
    pub remove_useless_function_props: EnableToggle,
    pub highlight_non_function_methods: EnableToggle,
    pub change_kind_to_function: bool,
    pub locality_bonus: bool,
    pub contextual_type_boost: bool,
    pub fix_suggestions_sorting: bool,
    pub switch_exclude_covered_cases: bool,
    pub array_methods_snippets: EnableToggle,
    pub destructuring_suggestion: EnableToggle,
    pub suggestions: SuggestionSettings,
    pub display_imported_info: ImportedInfoDisplay,
    pub auto_import: AutoImportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_method_snippets: true,
            method_snippets: MethodSnippetSettings::default(),
            object_literal_completions: ObjectLiteralSettings::default(),
            case_sensitive_completions: false,
            disable_fuzzy_completions: false,
            jsx_improve_elements_suggestions: EnabledToggle { enabled: false },
            jsx_completions_map: BTreeMap::new(),
            replace_suggestions: Vec::new(),
            correct_sorting: EnableToggle { enable: true },
            ignore_auto_imports: Vec::new(),
            global_lib_completions: GlobalLibAction::None,
            remove_useless_function_props: EnableToggle { enable: false },
            highlight_non_function_methods: EnableToggle { enable: true },
            change_kind_to_function: false,
            locality_bonus: false,
            contextual_type_boost: false,
            fix_suggestions_sorting: false,
            switch_exclude_covered_cases: true,
            array_methods_snippets: EnableToggle { enable: false },
            destructuring_suggestion: EnableToggle { enable: false },
            suggestions: SuggestionSettings::default(),
            display_imported_info: ImportedInfoDisplay::ShortFormat,
            auto_import: AutoImportSettings::default(),
        }
    }
}

impl Settings {
    /// Expands dotted keys and deserializes the result.
    pub fn from_flat(flat: &Map<String, Value>) -> Result<Self, ConfigError> {
        let mut nested = Map::new();
        for (key, value) in flat {
            insert_dotted(&mut nested, key, value.clone())?;
        }
        Ok(serde_json::from_value(Value::Object(nested))?)
    }

    /// Like [`Settings::from_flat`], but logs and falls back to defaults on error.
    pub fn from_flat_or_default(flat: &Map<String, Value>) -> Self {
        Self::from_flat(flat).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring invalid completion settings");
            Self::default()
        })
    }
}

fn insert_dotted(root: &mut Map<String, Value>, key: &str, value: Value) -> Result<(), ConfigError> {
    let mut segments = key.split('.').peekable();
    let mut current = root;
    let mut walked = String::new();

    while let Some(segment) = segments.next() {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);

        if segments.peek().is_none() {
            let leftover = match (current.get_mut(segment), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming);
                    None
                }
                (_, value) => Some(value),
            };
            if let Some(value) = leftover {
                current.insert(segment.to_string(), value);
            }
            return Ok(());
        }

        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            _ => {
                return Err(ConfigError::ConflictingKey {
                    key: key.to_string(),
                    prefix: walked,
                });
            }
        };
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EnableToggle {
    pub enable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EnabledToggle {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MethodSnippetSettings {
    pub skip: MethodSnippetSkip,
    pub insert_text: MethodSnippetInsertText,
}

/// Which parameters get a placeholder in a method-call snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodSnippetSkip {
    NoSkip,
    OnlyRest,
    #[default]
    OptionalAndRest,
    All,
}

/// Placeholder text for each parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodSnippetInsertText {
    #[default]
    AlwaysName,
    AlwaysDeclaration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectLiteralSettings {
    pub enable: bool,
    pub more_variants: bool,
    pub keep_original: KeepOriginal,
}

impl Default for ObjectLiteralSettings {
    fn default() -> Self {
        Self {
            enable: true,
            more_variants: false,
            keep_original: KeepOriginal::Below,
        }
    }
}

/// Where the unmodified entry goes when a rewritten copy is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepOriginal {
    Above,
    Below,
    #[default]
    Remove,
}

/// A `jsxCompletionsMap` value: `false` hides the attribute, an object rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum JsxAttributeRule {
    Hide(bool),
    Patch(JsxAttributePatch),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsxAttributePatch {
    /// Text inserted after the attribute name, e.g. `={$1}`.
    pub insert_text: String,
    #[serde(default)]
    pub keep_original: KeepOriginal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalLibAction {
    #[default]
    None,
    Mark,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestionSettings {
    pub keywords_insert_text: KeywordsInsertText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordsInsertText {
    #[default]
    Space,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportedInfoDisplay {
    None,
    #[default]
    ShortFormat,
    LongFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoImportSettings {
    /// Module specifier to namespace import used instead of named imports.
    pub change_to_namespace_import: BTreeMap<String, NamespaceImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceImport {
    pub namespace: String,
    #[serde(default = "default_true")]
    pub add_import: bool,
}

fn default_true() -> bool {
    true
}
