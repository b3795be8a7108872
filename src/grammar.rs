//! The Xfer text format.
//!
//! Every value is an *element*. An element is written in one of three styles:
//!
//! | Style | Shape | Example |
//! |-------|-------|---------|
//! | Implicit | bare value | `42`, `name` |
//! | Compact | specifier run + content (+ closing run for text) | `"Alice"`, `*99.99`, `~true` |
//! | Explicit | `<` + specifier run + content + specifier run + `>` | `<"say "hi"">`, `<#42#>` |
//!
//! # Specifiers
//!
//! | Element | Specifier | Compact | Explicit |
//! |---------|-----------|---------|----------|
//! | Object | `{ }` | `{ a 1 }` | `<{ a 1 }>` |
//! | Array | `[ ]` | `[ 1 2 ]` | `<[ 1 2 ]>` |
//! | Tuple | `( )` | `( 1 "a" )` | `<( 1 "a" )>` |
//! | String | `"` | `"text"` | `<"text">` |
//! | Identifier (key) | `=` | `=two words=` | `<=two words=>` |
//! | Keyword | `:` | `:eq:` | `<:eq:>` |
//! | Character | `\` | `\tab`, `\$41` | `<\$41\>` |
//! | Interpolated | `'` | `'Hi <\$21\>'` | `<'...'>` |
//! | Dynamic | `\|` | `\|HOME\|` | `<\|HOME\|>` |
//! | Integer | `#` | `#42`, `#$FF` | `<#42#>` |
//! | Long | `&` | `&5000000000` | `<&5000000000&>` |
//! | Decimal | `*` | `*99.99` | `<*99.99*>` |
//! | Double | `^` | `^3.14` | `<^3.14^>` |
//! | Boolean | `~` | `~true` | `<~true~>` |
//! | Null | `?` | `?` | `<??>` |
//! | Date/time | `@` | `@2025-08-12T10:15:30Z@` | `<@...@>` |
//! | Metadata / PI | `!` | | `<! xfer "0.11" !>` |
//! | Comment | `/` | | `</ note />` |
//!
//! Text elements (string, identifier, keyword, interpolated, dynamic, date)
//! always close with the same specifier run they opened with. The run is one
//! longer than the longest run of that character inside the content, so the
//! terminator can never occur in the payload:
//!
//! ```text
//! ""say "hi" please""
//! <"""quoted "" twice""">
//! ```
//!
//! Numeric elements (integer, long, decimal, double, boolean, character,
//! null) end at whitespace or a structural character in compact form; a
//! single trailing specifier is accepted and discarded (`*1.5*` is `*1.5`).
//!
//! # Key/value pairs
//!
//! A key is an identifier: a bare word matching `[A-Za-z_][A-Za-z0-9_]*` or
//! an `=`-delimited identifier. The element after it is the value:
//!
//! ```text
//! { name "Alice" age 30 =home town= "Springfield" }
//! ```
//!
//! Inside objects a string may also be used as the key.
//!
//! # Numbers
//!
//! Implicit integers are bare digits with an optional sign. `$` introduces
//! hexadecimal and `%` binary digits: `$FF`, `#%1010`. Bare integers outside
//! the 32-bit range are read as longs.
//!
//! # Explicit padding
//!
//! When text content begins or ends with its own specifier, or both begins and
//! ends with a space, the explicit form is padded with one space on each side.
//! The parser strips that padding from explicit content of two or more
//! characters that begins and ends with a space.
//!
//! # Documents
//!
//! A document is a sequence of top-level elements, optionally preceded by a
//! metadata block. Processing instructions (`<! keyword value !>`) may appear
//! anywhere and bind to the element that follows them.

pub(crate) const ELEMENT_OPEN: char = '<';
pub(crate) const ELEMENT_CLOSE: char = '>';

pub(crate) const OBJECT_OPEN: char = '{';
pub(crate) const OBJECT_CLOSE: char = '}';
pub(crate) const ARRAY_OPEN: char = '[';
pub(crate) const ARRAY_CLOSE: char = ']';
pub(crate) const TUPLE_OPEN: char = '(';
pub(crate) const TUPLE_CLOSE: char = ')';

pub(crate) const STRING: char = '"';
pub(crate) const IDENTIFIER: char = '=';
pub(crate) const KEYWORD: char = ':';
pub(crate) const CHARACTER: char = '\\';
pub(crate) const INTERPOLATED: char = '\'';
pub(crate) const DYNAMIC: char = '|';
pub(crate) const INTEGER: char = '#';
pub(crate) const LONG: char = '&';
pub(crate) const DECIMAL: char = '*';
pub(crate) const DOUBLE: char = '^';
pub(crate) const BOOLEAN: char = '~';
pub(crate) const NULL: char = '?';
pub(crate) const DATE: char = '@';
pub(crate) const METADATA: char = '!';
pub(crate) const COMMENT: char = '/';

pub(crate) const HEX_PREFIX: char = '$';
pub(crate) const BINARY_PREFIX: char = '%';

/// Characters that open some element when they start a token.
pub(crate) const OPENERS: &[char] = &[
    ELEMENT_OPEN,
    OBJECT_OPEN,
    ARRAY_OPEN,
    TUPLE_OPEN,
    STRING,
    IDENTIFIER,
    KEYWORD,
    CHARACTER,
    INTERPOLATED,
    DYNAMIC,
    INTEGER,
    LONG,
    DECIMAL,
    DOUBLE,
    BOOLEAN,
    NULL,
    DATE,
    METADATA,
    COMMENT,
    HEX_PREFIX,
    BINARY_PREFIX,
];

/// Characters that end a compact numeric token.
pub(crate) fn is_token_terminator(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            ELEMENT_OPEN
                | ELEMENT_CLOSE
                | OBJECT_OPEN
                | OBJECT_CLOSE
                | ARRAY_OPEN
                | ARRAY_CLOSE
                | TUPLE_OPEN
                | TUPLE_CLOSE
        )
}

pub(crate) fn is_bare_word_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub(crate) fn is_bare_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Characters that may begin an implicit integer.
pub(crate) fn is_integer_start(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '+' | '-' | HEX_PREFIX | BINARY_PREFIX)
}
