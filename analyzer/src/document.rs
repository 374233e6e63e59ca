use serde::{Deserialize, Serialize};

use crate::SyntaxTree;

/// Language flavour of a document, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Ts,
    Tsx,
    Js,
    Jsx,
}

impl ScriptKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "tsx" => ScriptKind::Tsx,
            "js" | "mjs" | "cjs" => ScriptKind::Js,
            "jsx" => ScriptKind::Jsx,
            _ => ScriptKind::Ts,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptKind::Ts => "ts",
            ScriptKind::Tsx => "tsx",
            ScriptKind::Js => "js",
            ScriptKind::Jsx => "jsx",
        }
    }

    pub fn supports_jsx(self) -> bool {
        matches!(self, ScriptKind::Tsx | ScriptKind::Jsx)
    }
}

/// Immutable snapshot of one document version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub text: String,
    pub version: u32,
    pub script_kind: ScriptKind,
    pub tree: SyntaxTree,
}

impl Document {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>, tree: SyntaxTree) -> Self {
        let file_name = file_name.into();
        Self {
            script_kind: ScriptKind::from_file_name(&file_name),
            file_name,
            text: text.into(),
            version: 0,
            tree,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_script_kind(mut self, script_kind: ScriptKind) -> Self {
        self.script_kind = script_kind;
        self
    }
}
