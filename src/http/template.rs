//! Closed-map text templating.
//!
//! Placeholders look like `%name%` where `name` is 1–32 identifier
//! characters (`[A-Za-z0-9_]`).  A `%` that does not open a well-formed
//! placeholder (CSS `width: 100%`, for instance) passes through
//! untouched.
//!
//! Rendering is **total or it fails**: every placeholder must have a
//! substitution and every substitution must be consumed by at least one
//! placeholder.  A miss on either side returns a typed error instead of
//! leaking raw `%name%` tokens into the response.

use core::fmt;

/// Longest accepted placeholder name.
const MAX_NAME_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template contains `%name%` but the map has no such key.
    UnresolvedPlaceholder(String),
    /// The map contains a key that no placeholder consumed.
    UnusedSubstitution(&'static str),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedPlaceholder(name) => {
                write!(f, "template placeholder '%{}%' has no substitution", name)
            }
            Self::UnusedSubstitution(key) => {
                write!(f, "substitution '{}' matched no placeholder", key)
            }
        }
    }
}

/// Try to read a placeholder name starting just after an opening `%`.
/// Returns the name slice when the span up to the closing `%` is a valid
/// identifier.
fn placeholder_at(rest: &str) -> Option<&str> {
    let close = rest.find('%')?;
    if close == 0 || close > MAX_NAME_LEN {
        return None;
    }
    let name = &rest[..close];
    if name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        Some(name)
    } else {
        None
    }
}

/// Render `template` against the closed substitution map.
pub fn render(template: &str, subs: &[(&'static str, String)]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + 64);
    let mut used = vec![false; subs.len()];
    let mut rest = template;

    while let Some(open) = rest.find('%') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match placeholder_at(after) {
            Some(name) => {
                let idx = subs
                    .iter()
                    .position(|(k, _)| *k == name)
                    .ok_or_else(|| TemplateError::UnresolvedPlaceholder(name.to_owned()))?;
                out.push_str(&subs[idx].1);
                used[idx] = true;
                rest = &after[name.len() + 1..];
            }
            None => {
                // Literal '%' — CSS, percent signs in text.
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    if let Some(idx) = (0..subs.len()).find(|i| !used[*i]) {
        return Err(TemplateError::UnusedSubstitution(subs[idx].0));
    }

    Ok(out)
}
