//! Environment placeholder substitution
//!
//! Replaces `$NAME` and `${NAME}` with values from a lookup (normally the
//! process environment). `$$` produces a literal `$`. Names are ASCII
//! identifiers: a letter or underscore followed by letters, digits or
//! underscores.

use thiserror::Error;

/// Placeholder substitution failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    /// Placeholder names a variable the lookup does not know
    #[error("undefined variable '{0}'")]
    Undefined(String),

    /// `$` not followed by `$`, an identifier, or `{identifier}`
    #[error("invalid placeholder at line {line}, col {col}")]
    Invalid { line: usize, col: usize },
}

/// Substitute placeholders from the process environment
pub fn substitute_env(text: &str) -> Result<String, PlaceholderError> {
    substitute(text, |name| std::env::var(name).ok())
}

/// Substitute placeholders using `lookup`
pub fn substitute<F>(text: &str, lookup: F) -> Result<String, PlaceholderError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match identifier_len(braced) {
                Some(len) if braced[len..].starts_with('}') => (&braced[..len], len + 2),
                _ => return Err(invalid_at(text, rest, pos)),
            }
        } else {
            match identifier_len(after) {
                Some(len) => (&after[..len], len),
                None => return Err(invalid_at(text, rest, pos)),
            }
        };

        let value = lookup(name).ok_or_else(|| PlaceholderError::Undefined(name.to_string()))?;
        out.push_str(&value);
        rest = &after[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Length of the identifier at the start of `s`, if any
fn identifier_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    Some(len)
}

/// Build an `Invalid` error for the `$` at `pos` within the remaining slice `rest`
fn invalid_at(text: &str, rest: &str, pos: usize) -> PlaceholderError {
    let offset = text.len() - rest.len() + pos;
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let col = before.rfind('\n').map_or(offset, |nl| offset - nl - 1) + 1;
    PlaceholderError::Invalid { line, col }
}
