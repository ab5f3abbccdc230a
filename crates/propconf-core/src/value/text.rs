//! String-list splitting and joining with backslash escapes.

/// Delimiter set used when neither parse options nor render format name one.
pub const DEFAULT_DELIMITERS: &str = ";";

const ESCAPE: char = '\\';

/// Splits `text` on any character in `delimiters`.
///
/// A backslash makes the next character literal, so `a;b\;c` yields
/// `["a", "b;c"]`. A trailing lone backslash is kept as-is. Empty input
/// yields an empty list, never `[""]`.
pub fn split_list(text: &str, delimiters: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            match chars.next() {
                Some(next) => current.push(next),
                None => current.push(ESCAPE),
            }
        } else if delimiters.contains(c) {
            items.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    items.push(current);
    items
}

/// Joins `items` with the first delimiter, escaping every delimiter and
/// backslash so that [`split_list`] recovers the same elements.
///
/// The one exception is a list holding a single empty string: it joins to
/// empty text, which splits back to an empty list.
pub fn join_list(items: &[String], delimiters: &str) -> String {
    let separator = delimiters.chars().next().unwrap_or(';');
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        for c in item.chars() {
            if c == ESCAPE || delimiters.contains(c) || c == separator {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
    out
}
