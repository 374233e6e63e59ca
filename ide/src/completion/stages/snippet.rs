//! Snippet text helpers (`$1`, `${1:text}`, `${1|a,b|}`).

/// Escapes text placed inside a `${n:...}` placeholder or as literal snippet text.
pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '$' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_choice(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '$' | '}' | '\\' | ',' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(super) fn placeholder(index: usize, text: &str) -> String {
    format!("${{{index}:{}}}", escape(text))
}

pub(super) fn choice<'a>(index: usize, options: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = format!("${{{index}|");
    for (idx, option) in options.into_iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&escape_choice(option));
    }
    out.push_str("|}");
    out
}

/// `${1:a}, ${2:b}` for the given placeholder texts.
pub(super) fn placeholder_list<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts
        .into_iter()
        .enumerate()
        .map(|(idx, text)| placeholder(idx + 1, text))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_escape_snippet_syntax() {
        assert_eq!(placeholder(1, "a"), "${1:a}");
        assert_eq!(placeholder(2, "$x}"), "${2:\\$x\\}}");
        assert_eq!(placeholder_list(["a", "b"]), "${1:a}, ${2:b}");
        assert_eq!(choice(1, ["true", "false"]), "${1|true,false|}");
        assert_eq!(choice(1, ["a,b"]), "${1|a\\,b|}");
    }
}
