use crate::Span;

/// A single text edit in byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextEdit {
    pub range: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        Self {
            range: Span::empty(at),
            new_text: text.into(),
        }
    }
}
