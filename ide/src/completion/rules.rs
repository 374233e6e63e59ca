//! User rules (`replaceSuggestions`).
//!
//! Rules run in order over the list produced by the built-in stages. Each rule matches
//! entries by name (exact or one `*`), optionally restricted by file and entry fields, and
//! applies exactly one action. An entry touched by a rule is immune to later rules.

use analyzer::{Document, LabelDetails, ScriptKind};
use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use serde_json::Value;

use super::matchers::{NameMatcher, PatternError};
use super::{CompletionEntry, CompletionKind, DeferredMetadataMap};

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("rule {index} has no action")]
    NoAction { index: usize },
    #[error("rule {index} has more than one action: {actions}")]
    ConflictingActions { index: usize, actions: String },
    #[error("rule {index} has an invalid suggestion pattern: {source}")]
    Pattern {
        index: usize,
        #[source]
        source: PatternError,
    },
    #[error("rule {index} has an invalid fileNamePattern: {source}")]
    FileGlob {
        index: usize,
        #[source]
        source: globset::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawRule {
    suggestion: String,
    #[serde(default)]
    file_name_pattern: Option<String>,
    #[serde(default)]
    language_mode: Option<LanguageModes>,
    #[serde(default)]
    filter: EntryFilter,
    #[serde(default)]
    delete: bool,
    #[serde(default)]
    patch: Option<EntryPatch>,
    #[serde(default)]
    move_pos: Option<i64>,
    #[serde(default)]
    duplicate_original: Option<DuplicatePlacement>,
    #[serde(default)]
    process_many: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LanguageModes {
    One(String),
    Many(Vec<String>),
}

impl LanguageModes {
    fn accepts(&self, kind: ScriptKind) -> bool {
        let accepts_one = |mode: &str| {
            mode == kind.as_str()
                || mode
                    == match kind {
                        ScriptKind::Ts => "typescript",
                        ScriptKind::Tsx => "typescriptreact",
                        ScriptKind::Js => "javascript",
                        ScriptKind::Jsx => "javascriptreact",
                    }
        };
        match self {
            LanguageModes::One(mode) => accepts_one(mode),
            LanguageModes::Many(modes) => modes.iter().any(|mode| accepts_one(mode)),
        }
    }
}

/// Field equality checks an entry must pass besides its name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EntryFilter {
    kind: Option<CompletionKind>,
    kind_modifier: Option<String>,
    source_module: Option<String>,
    is_snippet: Option<bool>,
    sort_text: Option<String>,
    insert_text: Option<String>,
}

impl EntryFilter {
    fn accepts(&self, entry: &CompletionEntry) -> bool {
        self.kind.is_none_or(|kind| entry.kind == kind)
            && self
                .kind_modifier
                .as_deref()
                .is_none_or(|modifier| entry.has_modifier(modifier))
            && self
                .source_module
                .as_deref()
                .is_none_or(|module| entry.source.as_deref() == Some(module))
            && self.is_snippet.is_none_or(|flag| entry.is_snippet == flag)
            && self
                .sort_text
                .as_deref()
                .is_none_or(|sort_text| entry.sort_text == sort_text)
            && self
                .insert_text
                .as_deref()
                .is_none_or(|text| entry.insert_text.as_deref() == Some(text))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EntryPatch {
    name: Option<String>,
    insert_text: Option<String>,
    insert_snippet: Option<String>,
    kind: Option<CompletionKind>,
    sort_text: Option<String>,
    source_display: Option<String>,
    label_details: Option<LabelDetails>,
}

impl EntryPatch {
    fn apply(&self, entry: &mut CompletionEntry) {
        if let Some(name) = &self.name {
            entry.name = name.clone();
        }
        if let Some(text) = &self.insert_text {
            entry.insert_text = Some(text.clone());
            entry.is_snippet = false;
        }
        if let Some(snippet) = &self.insert_snippet {
            entry.set_snippet(snippet.clone());
        }
        if let Some(kind) = self.kind {
            entry.kind = kind;
        }
        if let Some(sort_text) = &self.sort_text {
            entry.sort_text = sort_text.clone();
        }
        if let Some(display) = &self.source_display {
            entry.source_display = Some(display.clone());
        }
        if let Some(details) = &self.label_details {
            let target = entry.label_details_mut();
            if details.detail.is_some() {
                target.detail = details.detail.clone();
            }
            if details.description.is_some() {
                target.description = details.description.clone();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DuplicatePlacement {
    Before,
    After,
}

#[derive(Debug, Clone)]
enum RuleAction {
    Delete,
    Patch(EntryPatch),
    Move(i64),
    Duplicate {
        placement: DuplicatePlacement,
        patch: EntryPatch,
    },
}

/// A validated rule.
#[derive(Debug, Clone)]
struct UserRule {
    matcher: NameMatcher,
    file_glob: Option<GlobMatcher>,
    language_mode: Option<LanguageModes>,
    filter: EntryFilter,
    action: RuleAction,
    process_many: bool,
}

impl UserRule {
    fn parse(index: usize, value: &Value) -> Result<Self, RuleError> {
        let raw = RawRule::deserialize(value)
            .map_err(|source| RuleError::Malformed { index, source })?;

        let mut actions = Vec::new();
        if raw.delete {
            actions.push("delete");
        }
        if raw.move_pos.is_some() {
            actions.push("movePos");
        }
        if raw.duplicate_original.is_some() {
            actions.push("duplicateOriginal");
        } else if raw.patch.is_some() {
            actions.push("patch");
        }
        let action = match (actions.as_slice(), raw.duplicate_original) {
            ([], _) => return Err(RuleError::NoAction { index }),
            ([_], Some(placement)) => RuleAction::Duplicate {
                placement,
                patch: raw.patch.unwrap_or_default(),
            },
            (["delete"], None) => RuleAction::Delete,
            (["movePos"], None) => RuleAction::Move(raw.move_pos.unwrap_or_default()),
            ([_], None) => RuleAction::Patch(raw.patch.unwrap_or_default()),
            _ => {
                return Err(RuleError::ConflictingActions {
                    index,
                    actions: actions.join(", "),
                });
            }
        };

        let matcher = NameMatcher::compile(&raw.suggestion)
            .map_err(|source| RuleError::Pattern { index, source })?;
        let file_glob = raw
            .file_name_pattern
            .as_deref()
            .map(|pattern| Glob::new(pattern).map(|glob| glob.compile_matcher()))
            .transpose()
            .map_err(|source| RuleError::FileGlob { index, source })?;

        Ok(Self {
            matcher,
            file_glob,
            language_mode: raw.language_mode,
            filter: raw.filter,
            action,
            process_many: raw.process_many,
        })
    }

    fn applies_to(&self, document: &Document) -> bool {
        self.file_glob
            .as_ref()
            .is_none_or(|glob| glob.is_match(&document.file_name))
            && self
                .language_mode
                .as_ref()
                .is_none_or(|modes| modes.accepts(document.script_kind))
    }

    fn matches(&self, entry: &CompletionEntry) -> bool {
        self.matcher.is_match(&entry.name) && self.filter.accepts(entry)
    }
}

/// Parses `rules`, logging and skipping malformed ones.
fn parse_rules(rules: &[Value]) -> Vec<UserRule> {
    rules
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match UserRule::parse(index, value) {
            Ok(rule) => Some(rule),
            Err(err) => {
                tracing::warn!(error = %err, "skipping completion rule");
                None
            }
        })
        .collect()
}

/// Applies `rules` in order to `entries`.
///
/// Deferred metadata follows entries that a rule renames or duplicates; keys left without
/// an entry are pruned by the caller.
pub(crate) fn apply_rules(
    mut entries: Vec<CompletionEntry>,
    rules: &[Value],
    document: &Document,
    deferred: &mut DeferredMetadataMap,
) -> Vec<CompletionEntry> {
    let mut processed = vec![false; entries.len()];
    for rule in parse_rules(rules) {
        if !rule.applies_to(document) {
            continue;
        }
        apply_rule(&rule, &mut entries, &mut processed, deferred);
    }
    entries
}

/// Copies the metadata recorded under `from` to `to`.
fn carry_metadata(deferred: &mut DeferredMetadataMap, from: &str, to: &str) {
    if from == to {
        return;
    }
    if let Some(metadata) = deferred.get(from).cloned() {
        deferred.entry(to.to_string()).or_default().merge(metadata);
    }
}

fn apply_rule(
    rule: &UserRule,
    entries: &mut Vec<CompletionEntry>,
    processed: &mut Vec<bool>,
    deferred: &mut DeferredMetadataMap,
) {
    let mut deleted = Vec::new();
    let mut idx = 0;
    while idx < entries.len() {
        if processed[idx] || !rule.matches(&entries[idx]) {
            idx += 1;
            continue;
        }
        match &rule.action {
            RuleAction::Delete => {
                processed[idx] = true;
                deleted.push(idx);
                idx += 1;
            }
            RuleAction::Patch(patch) => {
                let original = entries[idx].name.clone();
                patch.apply(&mut entries[idx]);
                carry_metadata(deferred, &original, &entries[idx].name);
                processed[idx] = true;
                idx += 1;
            }
            RuleAction::Duplicate { placement, patch } => {
                let mut copy = entries[idx].clone();
                patch.apply(&mut copy);
                carry_metadata(deferred, &entries[idx].name, &copy.name);
                let at = match placement {
                    DuplicatePlacement::Before => idx,
                    DuplicatePlacement::After => idx + 1,
                };
                entries.insert(at, copy);
                processed.insert(at, true);
                processed[idx] = true;
                processed[idx + 1] = true;
                idx += 2;
            }
            RuleAction::Move(offset) => {
                let last = entries.len() - 1;
                let target = clamp_offset(idx, *offset, last);
                let landing_sort_text = entries[target].sort_text.clone();
                let mut moved = entries.remove(idx);
                processed.remove(idx);
                moved.sort_text = landing_sort_text;
                entries.insert(target, moved);
                processed.insert(target, true);
                if target <= idx {
                    idx += 1;
                }
            }
        }
        if !rule.process_many {
            break;
        }
    }
    for idx in deleted.into_iter().rev() {
        entries.remove(idx);
        processed.remove(idx);
    }
}

fn clamp_offset(idx: usize, offset: i64, last: usize) -> usize {
    let target = i64::try_from(idx).unwrap_or(i64::MAX).saturating_add(offset);
    usize::try_from(target.max(0)).unwrap_or(usize::MAX).min(last)
}
