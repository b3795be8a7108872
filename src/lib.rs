//! # xferlang
//!
//! A parser, style-aware serializer and processing-instruction engine for the
//! Xfer data-interchange format.
//!
//! ## What is Xfer?
//!
//! Xfer is a typed text format. Every value carries its type in a specifier
//! character: `"text"`, `#42`, `*1.50`, `^2.5`, `~true`, `?`, `@2024-01-02@`,
//! `\$41`. Collections are `{ }` objects of key/value pairs, `[ ]` arrays of
//! one element kind and `( )` tuples. Content that would clash with its
//! delimiters is written explicitly (`<"a "quoted" word">`) or with a
//! repeated specifier (`""say "hi"""`). Comments are `</ ... />`.
//!
//! `<! ... !>` blocks carry either document metadata or processing
//! instructions that act on the element that follows them:
//!
//! ```rust
//! use xferlang::parse;
//!
//! let doc = parse(r#"
//!     <! xfer "0.11" !>
//!     {
//!         name "web"
//!         <! id "port" !> port 8080
//!         <! if eq ( "prod" "dev" ) !> debug ~true
//!     }
//! "#).unwrap();
//!
//! let service = &doc.root()[0];
//! assert_eq!(service.get("name").and_then(|e| e.as_str()), Some("web"));
//! assert!(service.get("debug").is_none());
//! assert_eq!(doc.find_by_id("port").and_then(|e| e.get("port")).and_then(|e| e.as_i64()), Some(8080));
//! ```
//!
//! ## Key Features
//!
//! - **Style preserving**: every element remembers whether it was written
//!   implicitly, compactly or explicitly, and the serializer keeps that
//!   unless the content forces a safer style
//! - **Processing instructions**: `id`, `tag`, `if`, `defined`, `charDef`,
//!   `dynamicSource`, `document`, `properties`, `include`, `let`, plus your own
//!   handlers through [`ParseContext`]
//! - **Scripting**: a small expression evaluator with registered operators
//!   backs conditional instructions
//! - **Serde bridge**: [`to_element`], [`from_element`] and [`from_str`]
//!   convert between host values and element trees
//! - **Precise errors**: every parse failure carries a line and column
//!
//! ### Documents and elements
//!
//! ```rust
//! use xferlang::{to_string, to_string_pretty, Document, Element, ObjectElement};
//!
//! let mut object = ObjectElement::new();
//! object.add("name", Element::string("Alice")).unwrap();
//! object.add("score", Element::double(9.5)).unwrap();
//! let doc = Document::new(vec![Element::object(object)]).unwrap();
//!
//! assert_eq!(to_string(&doc), "{name\"Alice\" score^9.5}");
//! assert_eq!(to_string_pretty(&doc), "{\n  name \"Alice\"\n  score ^9.5\n}");
//! ```
//!
//! ### Host values
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xferlang::{from_element, from_str, to_element};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//! let element = to_element(&user).unwrap();
//! assert_eq!(element.to_string(), "{id 123 name\"Alice\" active~true}");
//!
//! let back: User = from_element(&element).unwrap();
//! assert_eq!(back, user);
//!
//! let parsed: User = from_str("{ id 7 name \"Bob\" active ~false }").unwrap();
//! assert_eq!(parsed.id, 7);
//! ```
//!
//! ### Dynamic trees with the xfer! macro
//!
//! ```rust
//! use xferlang::xfer;
//!
//! let data = xfer!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//! assert_eq!(data.get("name").and_then(|e| e.as_str()), Some("Alice"));
//! ```
//!
//! ## Logging
//!
//! Parsing emits `tracing` events: `debug` for document boundaries and
//! applied instructions, `trace` for element dispatch and `warn` for
//! instructions that could not act. Warnings are also collected on
//! [`Document::warnings`].

mod chars;
mod context;
mod datetime;
pub mod de;
mod document;
mod dynamic;
mod element;
pub mod error;
mod grammar;
pub mod macros;
mod number;
pub mod options;
mod parser;
pub mod pi;
mod scanner;
pub mod script;
pub mod ser;
pub mod style;
mod value;

pub use chars::CharacterRegistry;
pub use context::ParseContext;
pub use datetime::DateTimeValue;
pub use de::ElementDeserializer;
pub use document::{Document, DocumentProperties};
pub use dynamic::{DynamicSourceHandler, DynamicSourceRegistry, SourceConfig};
pub use element::{
    ArrayElement, Delimiter, Element, ElementKind, ElementStyle, KeyValuePair, Metadata,
    ObjectElement, ProcessingInstruction, FORMAT_VERSION,
};
pub use error::{Error, Result};
pub use number::{Decimal, IntegerValue, LongValue, NumericBase};
pub use options::{Formatting, StylePreference, XferOptions};
pub use pi::{Effect, InstructionHandler, InstructionRegistry};
pub use script::{Operator, OperatorRegistry, ScriptContext, Variables};
pub use ser::{ElementSerializer, Serializer};
pub use value::{Number, Value};

use parser::Parser;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io;

/// Parse Xfer text with a fresh [`ParseContext`].
///
/// # Examples
///
/// ```rust
/// use xferlang::parse;
///
/// let doc = parse("[ 1 2 3 ]").unwrap();
/// assert_eq!(doc.root()[0].as_array().map(|a| a.len()), Some(3));
/// ```
///
/// # Errors
///
/// Returns an error if the text is not valid Xfer or an instruction
/// rejects its value. Syntax errors carry the line and column.
pub fn parse(input: &str) -> Result<Document> {
    let mut context = ParseContext::new();
    parse_with_context(input, &mut context)
}

/// Parse Xfer text with caller-supplied registries.
///
/// Definitions made by `charDef` and `dynamicSource` instructions stay in
/// `context` after the call.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_with_context(input: &str, context: &mut ParseContext) -> Result<Document> {
    Parser::new(input, context).parse_document()
}

/// Parse Xfer text from UTF-8 bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not UTF-8 or the text does not parse.
pub fn from_slice(v: &[u8]) -> Result<Document> {
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    parse(s)
}

/// Parse Xfer text from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use xferlang::from_reader;
/// use std::io::Cursor;
///
/// let doc = from_reader(Cursor::new(b"{ x 1 y 2 }")).unwrap();
/// assert_eq!(doc.root()[0].get("y").and_then(|e| e.as_i64()), Some(2));
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the text does not parse.
pub fn from_reader<R>(mut reader: R) -> Result<Document>
where
    R: io::Read,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    parse(&string)
}

/// Render a document as compact Xfer text.
pub fn to_string(document: &Document) -> String {
    ser::document_to_string(document, &XferOptions::default())
}

/// Render a document indented and spaced.
pub fn to_string_pretty(document: &Document) -> String {
    ser::document_to_string(document, &XferOptions::pretty())
}

/// Render a document with custom options.
///
/// # Examples
///
/// ```rust
/// use xferlang::{parse, to_string_with_options, Formatting, XferOptions};
///
/// let doc = parse("( 1 \"a\" )").unwrap();
/// let options = XferOptions::new().with_formatting(Formatting::SPACED);
/// assert_eq!(to_string_with_options(&doc, &options), "( 1 \"a\" )");
/// ```
pub fn to_string_with_options(document: &Document, options: &XferOptions) -> String {
    ser::document_to_string(document, options)
}

/// Write a document to `writer` as compact Xfer text.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn to_writer<W>(writer: W, document: &Document) -> Result<()>
where
    W: io::Write,
{
    to_writer_with_options(writer, document, &XferOptions::default())
}

/// Write a document to `writer` with custom options.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn to_writer_with_options<W>(mut writer: W, document: &Document, options: &XferOptions) -> Result<()>
where
    W: io::Write,
{
    let text = to_string_with_options(document, options);
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Convert any `T: Serialize` to an [`Element`].
///
/// # Errors
///
/// Returns an error for map keys that are not text, numbers or booleans,
/// and for integers beyond the decimal range.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_element<T>(value: &T) -> Result<Element>
where
    T: ?Sized + Serialize,
{
    ser::to_element(value)
}

/// Deserialize an instance of type `T` from an [`Element`].
///
/// # Errors
///
/// Returns an error if the element's shape does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_element<'de, T>(element: &'de Element) -> Result<T>
where
    T: Deserialize<'de>,
{
    de::from_element(element)
}

/// Parse Xfer text and deserialize its single root element.
///
/// # Examples
///
/// ```rust
/// use xferlang::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{ x 1 y 2 }").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the text does not parse, does not hold exactly one
/// root element, or cannot be deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let document = parse(s)?;
    match document.root() {
        [element] => from_element(element),
        root => Err(Error::custom(format!(
            "expected exactly one root element, found {}",
            root.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_requires_one_root() {
        let err = from_str::<i32>("1 2").unwrap_err();
        assert!(err.to_string().contains("found 2"));
        assert!(from_str::<i32>("").is_err());
        assert_eq!(from_str::<i32>("42").unwrap(), 42);
    }

    #[test]
    fn test_writer_and_slice() {
        let doc = from_slice(b"( ~true ? )").unwrap();
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &doc).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "(~true ?)");
        assert!(from_slice(&[0xff, 0xfe]).is_err());
    }
}
