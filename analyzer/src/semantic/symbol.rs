use serde::{Deserialize, Serialize};

use crate::Span;

/// Opaque handle into the engine's symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Variable,
    Function,
    Class,
    Interface,
    TypeAlias,
    Enum,
    EnumMember,
    Property,
    Method,
    Parameter,
    Alias,
    Module,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub file: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub declarations: Vec<Declaration>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            declarations: Vec::new(),
        }
    }

    pub fn declared_in(mut self, file: impl Into<String>, span: impl Into<Span>) -> Self {
        self.declarations.push(Declaration {
            file: file.into(),
            span: span.into(),
        });
        self
    }

    /// File of the first declaration, if any.
    pub fn declaration_file(&self) -> Option<&str> {
        self.declarations.first().map(|decl| decl.file.as_str())
    }
}
