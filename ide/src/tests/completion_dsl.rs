//! Fixture DSL for completion tests.
//!
//! ```ignore
//! t("if (a) {} el$0")
//!     .open(SyntaxKind::IfStatement, "if (a) {}")
//!     .leaf(SyntaxKind::Block, "{}")
//!     .close()
//!     .open(SyntaxKind::ExpressionStatement, "el")
//!     .leaf(SyntaxKind::Identifier, "el")
//!     .close()
//!     .entry(RawEntry::new("else", "keyword", "15"))
//!     .run()
//! ```
//!
//! The whole text is wrapped in a `SourceFile` node. Needles are searched from the start of
//! the innermost open node, or from the end of the previous sibling.

use std::time::Duration;

use analyzer::semantic::{Program, Symbol, SymbolKind, Ty};
use analyzer::{Document, NodeId, RawCompletions, RawEntry, Span, SyntaxKind, TreeBuilder};
use serde_json::{Map, Value};

use crate::completion::{CompletionEntry, EntryDetails};
use crate::config::Settings;
use crate::service::{
    CancellationToken, CompletionRequest, CompletionResponse, CompletionResult, CompletionService,
    FormattingOptions, TriggerOptions,
};

pub(crate) const FILE: &str = "/p/src/index.ts";

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn t(input_with_cursor: &str) -> Fixture {
    Fixture::new(input_with_cursor, FILE)
}

pub(crate) fn t_in(file_name: &str, input_with_cursor: &str) -> Fixture {
    Fixture::new(input_with_cursor, file_name)
}

pub(crate) struct Fixture {
    text: String,
    cursor: u32,
    file_name: String,
    version: u32,
    builder: TreeBuilder,
    open: Vec<Span>,
    search_from: u32,
    last: Option<NodeId>,
    program: Program,
    raw: RawCompletions,
    settings: Settings,
    formatting: FormattingOptions,
    trigger: TriggerOptions,
    cancelled: bool,
}

impl Fixture {
    fn new(input_with_cursor: &str, file_name: &str) -> Self {
        init_tracing();
        let cursor = input_with_cursor
            .find("$0")
            .expect("fixture must contain $0 marker");
        let text = input_with_cursor.replacen("$0", "", 1);
        assert!(
            !text.contains("$0"),
            "fixture must contain exactly one $0 marker"
        );

        let mut builder = TreeBuilder::new();
        let root = builder.start_node(SyntaxKind::SourceFile, 0..text.len() as u32);
        Self {
            cursor: cursor as u32,
            file_name: file_name.to_string(),
            version: 1,
            builder,
            open: vec![Span::new(0, text.len() as u32)],
            search_from: 0,
            last: Some(root),
            program: Program::new(),
            raw: RawCompletions::default(),
            settings: Settings::default(),
            formatting: FormattingOptions::default(),
            trigger: TriggerOptions::default(),
            cancelled: false,
            text,
        }
    }

    fn locate(&self, needle: &str) -> Span {
        let from = self.search_from as usize;
        let start = self.text[from..]
            .find(needle)
            .map(|idx| (from + idx) as u32)
            .unwrap_or_else(|| panic!("needle {needle:?} not found after byte {from} in {:?}", self.text));
        Span::new(start, start + needle.len() as u32)
    }

    /// Opens a node spanning the next occurrence of `needle`.
    pub(crate) fn open(mut self, kind: SyntaxKind, needle: &str) -> Self {
        let span = self.locate(needle);
        self.last = Some(self.builder.start_node(kind, span));
        self.open.push(span);
        self.search_from = span.start;
        self
    }

    /// Opens a zero-width node right at the cursor.
    pub(crate) fn open_at_cursor(mut self, kind: SyntaxKind) -> Self {
        let span = Span::empty(self.cursor);
        self.last = Some(self.builder.start_node(kind, span));
        self.open.push(span);
        self.search_from = span.start;
        self
    }

    pub(crate) fn leaf(mut self, kind: SyntaxKind, needle: &str) -> Self {
        let span = self.locate(needle);
        self.last = Some(self.builder.leaf(kind, span));
        self.search_from = span.end;
        self
    }

    pub(crate) fn close(mut self) -> Self {
        self.builder.finish_node();
        if let Some(span) = self.open.pop() {
            self.search_from = span.end;
        }
        self
    }

    /// Type of the node created last.
    pub(crate) fn typed(mut self, ty: Ty) -> Self {
        let node = self.last.expect("no node to attach a type to");
        self.program.set_node_type(node, ty);
        self
    }

    /// Contextual type of the node created last.
    pub(crate) fn expects(mut self, ty: Ty) -> Self {
        let node = self.last.expect("no node to attach a contextual type to");
        self.program.set_contextual_type(node, ty);
        self
    }

    pub(crate) fn entry(mut self, entry: RawEntry) -> Self {
        self.raw.entries.push(entry);
        self
    }

    pub(crate) fn entries(mut self, entries: impl IntoIterator<Item = RawEntry>) -> Self {
        self.raw.entries.extend(entries);
        self
    }

    /// Entry backed by a symbol of type `ty`, declared in `/p/src/lib.ts`.
    pub(crate) fn typed_entry(self, entry: RawEntry, ty: Ty) -> Self {
        self.declared_entry(entry, "/p/src/lib.ts", Some(ty))
    }

    pub(crate) fn declared_entry(mut self, entry: RawEntry, file: &str, ty: Option<Ty>) -> Self {
        let symbol = Symbol::new(entry.name.clone(), SymbolKind::Variable).declared_in(file, 0..0);
        let id = self.program.add_symbol(symbol, ty);
        self.raw.entries.push(entry.with_symbol(id));
        self
    }

    pub(crate) fn member(mut self) -> Self {
        self.raw.is_member_completion = true;
        self
    }

    pub(crate) fn settings(mut self, edit: impl FnOnce(&mut Settings)) -> Self {
        edit(&mut self.settings);
        self
    }

    pub(crate) fn flat(mut self, flat: Value) -> Self {
        let Value::Object(map) = flat else {
            panic!("flat settings must be a JSON object");
        };
        self.settings = Settings::from_flat(&map).expect("valid flat settings");
        self
    }

    pub(crate) fn formatting(mut self, formatting: FormattingOptions) -> Self {
        self.formatting = formatting;
        self
    }

    pub(crate) fn command(mut self, command: &str) -> Self {
        self.trigger.command = Some(command.to_string());
        self
    }

    pub(crate) fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub(crate) fn build(mut self) -> Built {
        while self.open.pop().is_some() {
            self.builder.finish_node();
        }
        let document = Document::new(self.file_name, self.text, self.builder.finish())
            .with_version(self.version);
        let raw = self.raw;
        let source = move |_: &Document, _: u32, _: &TriggerOptions| Some(raw.clone());
        Built {
            service: CompletionService::new(Box::new(source) as Box<RawSource>, self.settings),
            document,
            program: self.program,
            cursor: self.cursor,
            formatting: self.formatting,
            trigger: self.trigger,
            cancelled: self.cancelled,
        }
    }

    pub(crate) fn run(self) -> Outcome {
        self.build().complete()
    }
}

pub(crate) type RawSource = dyn Fn(&Document, u32, &TriggerOptions) -> Option<RawCompletions>;

/// A fixture turned into a live service, for tests spanning several requests.
pub(crate) struct Built {
    pub(crate) service: CompletionService<Box<RawSource>>,
    document: Document,
    program: Program,
    cursor: u32,
    formatting: FormattingOptions,
    trigger: TriggerOptions,
    cancelled: bool,
}

impl Built {
    pub(crate) fn respond(&self) -> CompletionResponse {
        let cancellation = CancellationToken::new();
        if self.cancelled {
            cancellation.cancel();
        }
        let request = CompletionRequest::new(&self.document, self.cursor, &self.program)
            .with_trigger(self.trigger.clone())
            .with_formatting(self.formatting)
            .with_cancellation(cancellation);
        self.service
            .complete(request)
            .expect("fixture source always answers")
    }

    pub(crate) fn complete(&self) -> Outcome {
        match self.respond() {
            CompletionResponse::Enriched(result) => Outcome { result },
            CompletionResponse::Passthrough(raw) => {
                panic!("expected an enriched response, got passthrough {raw:?}")
            }
        }
    }

    pub(crate) fn with_details_ttl(mut self, ttl: Duration) -> Self {
        self.service = self.service.with_details_ttl(ttl);
        self
    }

    pub(crate) fn details(&self, outcome: &Outcome, name: &str) -> EntryDetails {
        self.service
            .resolve_details(outcome.result.request_id, name, EntryDetails::new(name))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub(crate) result: CompletionResult,
}

impl Outcome {
    pub(crate) fn entries(&self) -> &[CompletionEntry] {
        &self.result.entries
    }

    pub(crate) fn names(&self) -> Vec<&str> {
        self.result
            .entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect()
    }

    pub(crate) fn sort_texts(&self) -> Vec<&str> {
        self.result
            .entries
            .iter()
            .map(|entry| entry.sort_text.as_str())
            .collect()
    }

    pub(crate) fn entry(&self, name: &str) -> &CompletionEntry {
        self.result
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .unwrap_or_else(|| panic!("missing entry {name}\nactual names: {:?}", self.names()))
    }

    pub(crate) fn insert_text(&self, name: &str) -> &str {
        self.entry(name).insert_text_or_name()
    }

    #[track_caller]
    pub(crate) fn expect_names(self, expected: &[&str]) -> Self {
        pretty_assertions::assert_eq!(self.names(), expected);
        self
    }

    #[track_caller]
    pub(crate) fn expect_missing(self, names: &[&str]) -> Self {
        for name in names {
            assert!(
                !self.names().contains(name),
                "expected no entry {name}\nactual names: {:?}",
                self.names()
            );
        }
        self
    }

    #[track_caller]
    pub(crate) fn expect_snippet(self, name: &str, snippet: &str) -> Self {
        let entry = self.entry(name);
        assert!(entry.is_snippet, "entry {name} is not a snippet: {entry:?}");
        pretty_assertions::assert_eq!(entry.insert_text_or_name(), snippet);
        self
    }

    #[track_caller]
    pub(crate) fn expect_insert(self, name: &str, text: &str) -> Self {
        pretty_assertions::assert_eq!(self.insert_text(name), text);
        self
    }

    #[track_caller]
    pub(crate) fn expect_plain(self, name: &str) -> Self {
        let entry = self.entry(name);
        assert!(!entry.is_snippet, "entry {name} should not be a snippet: {entry:?}");
        self
    }
}

/// Flat settings map from `("key", value)` pairs.
pub(crate) fn flat(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
