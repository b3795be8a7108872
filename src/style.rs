//! Delimiter style engine.
//!
//! Decides how an element's opening and closing markers are rendered. Every
//! function here is pure and total: a value that cannot be written safely in
//! a terser style escalates to [`ElementStyle::Explicit`], which can hold
//! any content.

use crate::element::{Delimiter, ElementStyle};
use crate::grammar::{
    is_bare_word_char, is_bare_word_start, is_token_terminator, ELEMENT_CLOSE, OPENERS,
};
use crate::options::StylePreference;

/// Length of the longest run of `ch` in `value`.
///
/// # Examples
///
/// ```rust
/// use xferlang::style::longest_run;
///
/// assert_eq!(longest_run("a\"\"b\"", '"'), 2);
/// assert_eq!(longest_run("plain", '"'), 0);
/// ```
pub fn longest_run(value: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in value.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// True when `value` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_bare_word(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if is_bare_word_start(first) => chars.all(is_bare_word_char),
        _ => false,
    }
}

/// True when a string can be written compactly without confusing a reader.
///
/// Unsafe content: quotes, angle brackets, control whitespace, or a first
/// character that opens some other element.
pub fn is_compact_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if OPENERS.contains(&first) {
        return false;
    }
    !value
        .chars()
        .any(|c| matches!(c, '"' | '<' | '>' | '\n' | '\r' | '\t'))
}

/// Minimal safe delimiter for a text element.
///
/// The specifier count is one more than the longest run of the specifier in
/// the value, so the closing run can never appear inside the payload.
/// Empty values, values that begin or end with the specifier and values
/// that begin with whitespace or a bracket under a doubled run need the
/// explicit form.
/// Bare words may go without delimiters when `bare_allowed`.
///
/// # Examples
///
/// ```rust
/// use xferlang::style::text_delimiter;
/// use xferlang::ElementStyle;
///
/// let d = text_delimiter("say \"hi\" now", '"', false);
/// assert_eq!((d.count, d.style), (2, ElementStyle::Compact));
///
/// let d = text_delimiter("", '"', false);
/// assert_eq!(d.style, ElementStyle::Explicit);
///
/// let d = text_delimiter("name", '=', true);
/// assert_eq!(d.style, ElementStyle::Implicit);
/// ```
pub fn text_delimiter(value: &str, specifier: char, bare_allowed: bool) -> Delimiter {
    let count = longest_run(value, specifier) + 1;
    let style = if value.is_empty()
        || value.starts_with(specifier)
        || value.ends_with(specifier)
        || (count > 1 && value.starts_with(is_token_terminator))
    {
        ElementStyle::Explicit
    } else if bare_allowed && is_bare_word(value) {
        ElementStyle::Implicit
    } else {
        ElementStyle::Compact
    };
    Delimiter::new(specifier, specifier, count, style)
}

/// Style for a quoted text element, combining the stored style, the minimal
/// safe style and an optional caller preference.
pub fn text_style(
    value: &str,
    minimal: ElementStyle,
    stored: ElementStyle,
    preference: Option<StylePreference>,
) -> ElementStyle {
    if minimal == ElementStyle::Explicit {
        return ElementStyle::Explicit;
    }
    match preference {
        None => minimal.max(stored),
        Some(StylePreference::Explicit) => ElementStyle::Explicit,
        Some(StylePreference::ForceCompact) => minimal.max(ElementStyle::Compact),
        Some(StylePreference::CompactWhenSafe) => {
            if is_compact_safe(value) {
                minimal.max(ElementStyle::Compact)
            } else {
                ElementStyle::Explicit
            }
        }
        Some(StylePreference::MinimalWhenSafe) => {
            if minimal == ElementStyle::Implicit || is_compact_safe(value) {
                minimal
            } else {
                ElementStyle::Explicit
            }
        }
    }
}

/// Style for numbers, booleans, null, characters and dates.
///
/// Only plain integers may be implicit; everything else keeps at least a
/// compact specifier so its kind survives a reparse.
pub fn numeric_style(
    implicit_allowed: bool,
    stored: ElementStyle,
    preference: Option<StylePreference>,
) -> ElementStyle {
    match preference {
        Some(StylePreference::Explicit) => ElementStyle::Explicit,
        Some(StylePreference::ForceCompact) | Some(StylePreference::CompactWhenSafe) => {
            ElementStyle::Compact
        }
        Some(StylePreference::MinimalWhenSafe) if implicit_allowed => ElementStyle::Implicit,
        Some(StylePreference::MinimalWhenSafe) => ElementStyle::Compact,
        None if stored == ElementStyle::Implicit && !implicit_allowed => ElementStyle::Compact,
        None => stored,
    }
}

/// Bracket style for objects, arrays and tuples.
pub fn collection_style(stored: ElementStyle, preference: Option<StylePreference>) -> ElementStyle {
    match preference {
        Some(StylePreference::Explicit) => ElementStyle::Explicit,
        Some(_) => ElementStyle::Compact,
        None if stored == ElementStyle::Explicit => ElementStyle::Explicit,
        None => ElementStyle::Compact,
    }
}

/// Whether explicit text content is padded with one space on each side.
///
/// Content that begins with its specifier would otherwise merge with the
/// opening run, and content that begins with `>` would close it. The parser strips one space from each end of explicit
/// content that both begins and ends with a space, so such content is
/// padded too.
pub fn needs_padding(value: &str, specifier: char) -> bool {
    value.starts_with(specifier)
        || value.starts_with(ELEMENT_CLOSE)
        || value.ends_with(specifier)
        || (value.starts_with(' ') && value.ends_with(' '))
}
