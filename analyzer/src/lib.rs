//! Data model of the external analysis engine.
//!
//! The engine parses documents, type-checks them and produces a raw list of completion
//! entries. None of that happens here: this crate only describes what the engine hands
//! over (document snapshot, syntax tree, symbols, types, raw entries) plus an in-memory
//! [`semantic::Program`] that answers type queries for hosts and tests.
//!
//! All spans are UTF-8 byte offsets into the document text, using `[start, end)`.

mod completion;
mod document;
mod span;
pub mod semantic;
pub mod syntax;
mod text_edit;

pub use completion::{LabelDetails, RawCompletions, RawEntry};
pub use document::{Document, ScriptKind};
pub use span::Span;
pub use syntax::{Node, NodeId, SyntaxKind, SyntaxTree, TreeBuilder};
pub use text_edit::TextEdit;
