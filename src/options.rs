//! Configuration options for Xfer serialization.
//!
//! - [`XferOptions`]: main configuration struct, built with `with_*` methods
//! - [`Formatting`]: layout flags (indented, spaced, pretty)
//! - [`StylePreference`]: overrides for the delimiter style of scalars and collections
//!
//! ## Examples
//!
//! ```rust
//! use xferlang::{parse, to_string_with_options, Formatting, StylePreference, XferOptions};
//!
//! let doc = parse("{ name \"Alice\" age 30 }").unwrap();
//!
//! let options = XferOptions::new().with_formatting(Formatting::SPACED);
//! assert_eq!(to_string_with_options(&doc, &options), "{ name \"Alice\" age 30 }");
//!
//! let options = XferOptions::new().with_numeric_style(StylePreference::Explicit);
//! assert_eq!(to_string_with_options(&doc, &options), "{name\"Alice\" age<#30#>}");
//! ```

use std::ops::BitOr;

/// Layout flags for serialized output.
///
/// Flags combine with `|`; [`Formatting::PRETTY`] is `INDENTED | SPACED`.
///
/// # Examples
///
/// ```rust
/// use xferlang::Formatting;
///
/// let pretty = Formatting::INDENTED | Formatting::SPACED;
/// assert_eq!(pretty, Formatting::PRETTY);
/// assert!(pretty.is_indented());
/// assert!(!Formatting::NONE.is_spaced());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Formatting {
    indented: bool,
    spaced: bool,
}

impl Formatting {
    pub const NONE: Formatting = Formatting {
        indented: false,
        spaced: false,
    };
    pub const INDENTED: Formatting = Formatting {
        indented: true,
        spaced: false,
    };
    pub const SPACED: Formatting = Formatting {
        indented: false,
        spaced: true,
    };
    pub const PRETTY: Formatting = Formatting {
        indented: true,
        spaced: true,
    };

    /// Children are written one per line at their nesting depth.
    #[must_use]
    pub const fn is_indented(self) -> bool {
        self.indented
    }

    /// Brackets and key/value pairs get breathing room.
    #[must_use]
    pub const fn is_spaced(self) -> bool {
        self.spaced
    }
}

impl BitOr for Formatting {
    type Output = Formatting;

    fn bitor(self, rhs: Self) -> Self::Output {
        Formatting {
            indented: self.indented || rhs.indented,
            spaced: self.spaced || rhs.spaced,
        }
    }
}

/// Caller preference for how an element's delimiters are rendered.
///
/// The style engine treats a preference as an upper bound on terseness: a
/// value that cannot be written safely in the preferred style escalates to
/// the explicit form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StylePreference {
    /// Always use the full `<` ... `>` wrapper.
    Explicit,
    /// Use the compact form whenever it can be parsed back at all.
    ForceCompact,
    /// Use the compact form only when the value has no characters that could confuse a reader.
    CompactWhenSafe,
    /// Use the shortest unambiguous form, including bare values where the kind allows it.
    MinimalWhenSafe,
}

/// Configuration options for Xfer serialization.
///
/// # Examples
///
/// ```rust
/// use xferlang::{Formatting, XferOptions};
///
/// let options = XferOptions::pretty().with_indent(4);
/// assert_eq!(options.indent, 4);
/// assert_eq!(options.formatting, Formatting::PRETTY);
/// ```
#[derive(Clone, Debug)]
pub struct XferOptions {
    pub formatting: Formatting,
    pub indent: usize,
    pub indent_char: char,
    /// Overrides the per-element style of strings and other quoted text.
    pub string_style: Option<StylePreference>,
    /// Overrides the per-element style of numbers, booleans and null.
    pub numeric_style: Option<StylePreference>,
    /// Overrides the bracket style of objects, arrays and tuples.
    pub collection_style: Option<StylePreference>,
}

impl Default for XferOptions {
    fn default() -> Self {
        XferOptions {
            formatting: Formatting::NONE,
            indent: 2,
            indent_char: ' ',
            string_style: None,
            numeric_style: None,
            collection_style: None,
        }
    }
}

impl XferOptions {
    /// Creates default options (no formatting, 2-space indent, element styles as stored).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xferlang::XferOptions;
    ///
    /// let options = XferOptions::new();
    /// assert_eq!(options.indent, 2);
    /// assert!(!options.formatting.is_indented());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for indented, spaced output.
    #[must_use]
    pub fn pretty() -> Self {
        XferOptions {
            formatting: Formatting::PRETTY,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    /// Sets the number of indent characters per nesting level.
    ///
    /// Only affects indented output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the character repeated for indentation (space or tab).
    #[must_use]
    pub fn with_indent_char(mut self, indent_char: char) -> Self {
        self.indent_char = indent_char;
        self
    }

    #[must_use]
    pub fn with_string_style(mut self, preference: StylePreference) -> Self {
        self.string_style = Some(preference);
        self
    }

    #[must_use]
    pub fn with_numeric_style(mut self, preference: StylePreference) -> Self {
        self.numeric_style = Some(preference);
        self
    }

    #[must_use]
    pub fn with_collection_style(mut self, preference: StylePreference) -> Self {
        self.collection_style = Some(preference);
        self
    }
}
