//! Xfer serialization.
//!
//! Two serializers live here:
//!
//! - [`Serializer`] renders a [`Document`] or an [`Element`] tree as text,
//!   choosing each element's delimiter style from its stored style, the
//!   minimal safe style and the caller's [`XferOptions`].
//! - [`ElementSerializer`] is a `serde::Serializer` that builds an
//!   [`Element`] from any `Serialize` value (see [`crate::to_element`]).
//!
//! ## Layout
//!
//! Without formatting flags the output is as short as the grammar allows:
//! a separating space is only written after an element that does not close
//! itself (a bare or compact element). `SPACED` adds spaces inside brackets
//! and between keys and values; `INDENTED` puts each child on its own line.
//!
//! ```rust
//! use xferlang::{parse, to_string, to_string_pretty};
//!
//! let doc = parse("{ name \"Alice\" tags [ \"a\" \"b\" ] }").unwrap();
//! assert_eq!(to_string(&doc), "{name\"Alice\" tags[\"a\" \"b\"]}");
//! assert_eq!(
//!     to_string_pretty(&doc),
//!     "{\n  name \"Alice\"\n  tags [\n    \"a\"\n    \"b\"\n  ]\n}"
//! );
//! ```

use crate::document::Document;
use crate::element::{
    ArrayElement, Delimiter, Element, ElementKind, ElementStyle, KeyValuePair, ObjectElement,
};
use crate::grammar::{self, ELEMENT_CLOSE, ELEMENT_OPEN, METADATA};
use crate::number::{format_integer, Decimal};
use crate::options::{StylePreference, XferOptions};
use crate::pi::builtin::{ID, TAG};
use crate::style;
use crate::{Error, Result};
use serde::{ser, Serialize};

/// Renders elements and documents as Xfer text.
///
/// ```rust
/// use xferlang::{Element, Serializer, XferOptions};
///
/// let mut serializer = Serializer::new(XferOptions::new());
/// serializer.write_element(&Element::tuple(vec![Element::integer(1), Element::string("x")]));
/// assert_eq!(serializer.into_inner(), "(1 \"x\")");
/// ```
pub struct Serializer {
    output: String,
    options: XferOptions,
    depth: usize,
}

impl Serializer {
    pub fn new(options: XferOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            depth: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes the metadata block, then every root element with its
    /// instructions.
    pub fn write_document(&mut self, document: &Document) {
        let mut first = true;
        if !document.metadata().is_empty() {
            self.write_block(&document.metadata().entries());
            first = false;
        }
        self.write_items(document.root().iter(), false, first);
    }

    /// Writes one element preceded by its bound instructions.
    pub fn write_element(&mut self, element: &Element) {
        self.write_items(std::iter::once(element), false, true);
    }

    /// Writes a run of sibling elements. Returns whether anything was written.
    fn write_items<'e>(
        &mut self,
        items: impl Iterator<Item = &'e Element>,
        nested: bool,
        mut first: bool,
    ) -> bool {
        let mut open_tail = false;
        let mut wrote = false;
        for item in items {
            for block in blocks_for(item) {
                self.separate(nested, first, open_tail);
                self.write_block(&[block]);
                first = false;
                open_tail = false;
            }
            self.separate(nested, first, open_tail);
            open_tail = self.write_value(item);
            first = false;
            wrote = true;
        }
        wrote
    }

    fn separate(&mut self, nested: bool, first: bool, open_tail: bool) {
        let formatting = self.options.formatting;
        if formatting.is_indented() {
            if nested || !first {
                self.newline();
            }
        } else if first {
            if nested && formatting.is_spaced() {
                self.output.push(' ');
            }
        } else if formatting.is_spaced() || open_tail {
            self.output.push(' ');
        }
    }

    fn newline(&mut self) {
        self.output.push('\n');
        let width = self.depth * self.options.indent;
        self.output
            .extend(std::iter::repeat(self.options.indent_char).take(width));
    }

    /// `<! key value ... !>`; always padded so a trailing bare value ends cleanly.
    fn write_block(&mut self, entries: &[(String, Element)]) {
        self.output.push(ELEMENT_OPEN);
        self.output.push(METADATA);
        for (key, value) in entries {
            self.output.push(' ');
            self.write_key(key, None);
            self.output.push(' ');
            self.write_items(std::iter::once(value), false, true);
        }
        self.output.push(' ');
        self.output.push(METADATA);
        self.output.push(ELEMENT_CLOSE);
    }

    /// Writes an element without its instructions. Returns whether the
    /// element's tail needs a separator before the next sibling.
    fn write_value(&mut self, element: &Element) -> bool {
        match element.kind() {
            ElementKind::KeyValuePair(pair) => self.write_pair(pair),
            ElementKind::Object(object) => {
                self.write_collection(element, object.pairs());
                false
            }
            ElementKind::Array(array) => {
                self.write_collection(element, array.iter());
                false
            }
            ElementKind::Tuple(items) => {
                self.write_collection(element, items.iter());
                false
            }
            ElementKind::String(text)
            | ElementKind::Keyword(text)
            | ElementKind::Identifier(text) => {
                let preference = self.options.string_style;
                self.write_text(element, text, preference)
            }
            ElementKind::Dynamic { name, .. } => {
                let preference = self.options.string_style;
                self.write_text(element, name, preference)
            }
            ElementKind::Interpolated(text) => {
                let escaped = escape_interpolated(text);
                let preference = self.options.string_style;
                self.write_text(element, &escaped, preference)
            }
            ElementKind::DateTime(value) => {
                let style = style::numeric_style(false, element.style(), self.options.numeric_style);
                let delimiter = Delimiter::new(grammar::DATE, grammar::DATE, 1, style);
                self.write_delimited(&value.to_string(), delimiter, false);
                style != ElementStyle::Explicit
            }
            _ => self.write_scalar(element),
        }
    }

    fn write_pair(&mut self, pair: &KeyValuePair) -> bool {
        let key_style = match pair.key_element().kind() {
            ElementKind::Identifier(_) => Some(pair.key_element().style()),
            _ => None,
        };
        let bare_key = self.write_key(pair.key(), key_style);
        let value = pair.value();
        let blocks = blocks_for(value);
        let value_style = rendered_style(value, &self.options);
        if self.options.formatting.is_spaced()
            || !bare_key
            || value.is_pair()
            || value_style == ElementStyle::Implicit
            || !blocks.is_empty()
        {
            self.output.push(' ');
        }
        for block in blocks {
            self.write_block(&[block]);
            self.output.push(' ');
        }
        self.write_value(value)
    }

    /// Keys are written as identifiers, bare when possible. Returns whether
    /// the key was written bare.
    fn write_key(&mut self, key: &str, stored: Option<ElementStyle>) -> bool {
        let minimal = style::text_delimiter(key, grammar::IDENTIFIER, true);
        let style = style::text_style(
            key,
            minimal.style,
            stored.unwrap_or(minimal.style),
            None,
        );
        self.write_delimited(key, Delimiter { style, ..minimal }, true);
        style == ElementStyle::Implicit
    }

    fn write_text(
        &mut self,
        element: &Element,
        text: &str,
        preference: Option<StylePreference>,
    ) -> bool {
        let opening = element.delimiter().opening;
        let bare_allowed = matches!(element.kind(), ElementKind::Identifier(_));
        let minimal = style::text_delimiter(text, opening, bare_allowed);
        let style = style::text_style(text, minimal.style, element.style(), preference);
        self.write_delimited(text, Delimiter { style, ..minimal }, true);
        style != ElementStyle::Explicit
    }

    fn write_delimited(&mut self, text: &str, delimiter: Delimiter, padded: bool) {
        let style = delimiter.style;
        self.output.push_str(&delimiter.opening_text(style));
        let pad = padded
            && style == ElementStyle::Explicit
            && style::needs_padding(text, delimiter.opening);
        if pad {
            self.output.push(' ');
        }
        self.output.push_str(text);
        if pad {
            self.output.push(' ');
        }
        self.output.push_str(&delimiter.closing_text(style));
    }

    fn write_scalar(&mut self, element: &Element) -> bool {
        let (text, implicit_allowed) = match element.kind() {
            ElementKind::Integer(value) => (
                format_integer(i128::from(value.value), value.base, value.min_digits),
                true,
            ),
            ElementKind::Long(value) => (
                format_integer(i128::from(value.value), value.base, value.min_digits),
                i32::try_from(value.value).is_err(),
            ),
            ElementKind::Decimal(value) => (value.to_string(), false),
            ElementKind::Double(value) => (value.to_string(), false),
            ElementKind::Boolean(value) => (value.to_string(), false),
            ElementKind::Character(cp) => (format!("{}{:X}", grammar::HEX_PREFIX, cp), false),
            _ => (String::new(), false),
        };
        let style = style::numeric_style(
            implicit_allowed,
            element.style(),
            self.options.numeric_style,
        );
        let specifier = element.delimiter().opening;
        match style {
            ElementStyle::Implicit => self.output.push_str(&text),
            ElementStyle::Compact => {
                self.output.push(specifier);
                self.output.push_str(&text);
            }
            ElementStyle::Explicit => {
                self.output.push(ELEMENT_OPEN);
                self.output.push(specifier);
                self.output.push_str(&text);
                self.output.push(specifier);
                self.output.push(ELEMENT_CLOSE);
            }
        }
        style != ElementStyle::Explicit
    }

    fn write_collection<'e>(
        &mut self,
        element: &Element,
        children: impl Iterator<Item = &'e Element>,
    ) {
        let style = style::collection_style(element.style(), self.options.collection_style);
        let delimiter = element.delimiter();
        if style == ElementStyle::Explicit {
            self.output.push(ELEMENT_OPEN);
        }
        self.output.push(delimiter.opening);
        self.depth += 1;
        let wrote = self.write_items(children, true, true);
        self.depth -= 1;
        if wrote {
            if self.options.formatting.is_indented() {
                self.newline();
            } else if self.options.formatting.is_spaced() {
                self.output.push(' ');
            }
        }
        self.output.push(delimiter.closing);
        if style == ElementStyle::Explicit {
            self.output.push(ELEMENT_CLOSE);
        }
    }
}

/// The style an element will be written with.
fn rendered_style(element: &Element, options: &XferOptions) -> ElementStyle {
    match element.kind() {
        ElementKind::KeyValuePair(_) => ElementStyle::Implicit,
        kind if kind.is_collection() => {
            style::collection_style(element.style(), options.collection_style)
        }
        ElementKind::String(text) | ElementKind::Keyword(text) | ElementKind::Identifier(text) => {
            let minimal = element.minimal_delimiter().style;
            style::text_style(text, minimal, element.style(), options.string_style)
        }
        ElementKind::Dynamic { name, .. } => {
            let minimal = element.minimal_delimiter().style;
            style::text_style(name, minimal, element.style(), options.string_style)
        }
        ElementKind::Interpolated(text) => {
            let escaped = escape_interpolated(text);
            let minimal = style::text_delimiter(&escaped, grammar::INTERPOLATED, false).style;
            style::text_style(&escaped, minimal, element.style(), options.string_style)
        }
        ElementKind::Integer(_) => {
            style::numeric_style(true, element.style(), options.numeric_style)
        }
        ElementKind::Long(value) => style::numeric_style(
            i32::try_from(value.value).is_err(),
            element.style(),
            options.numeric_style,
        ),
        _ => style::numeric_style(false, element.style(), options.numeric_style),
    }
}

/// The instruction blocks written in front of an element.
///
/// Bound `id` and `tag` instructions are rewritten from the element's
/// current id and tag, and added when the element has one but no
/// instruction set it.
fn blocks_for(element: &Element) -> Vec<(String, Element)> {
    let mut blocks = Vec::new();
    let mut wrote_id = false;
    let mut wrote_tag = false;
    for pi in element.instructions() {
        match pi.keyword() {
            ID => {
                if let (Some(id), false) = (element.id(), wrote_id) {
                    blocks.push((ID.to_string(), Element::string(id)));
                }
                wrote_id = true;
            }
            TAG => {
                if let (Some(tag), false) = (element.tag(), wrote_tag) {
                    blocks.push((TAG.to_string(), Element::string(tag)));
                }
                wrote_tag = true;
            }
            keyword => blocks.push((keyword.to_string(), pi.value().clone())),
        }
    }
    if let (Some(id), false) = (element.id(), wrote_id) {
        blocks.push((ID.to_string(), Element::string(id)));
    }
    if let (Some(tag), false) = (element.tag(), wrote_tag) {
        blocks.push((TAG.to_string(), Element::string(tag)));
    }
    blocks
}

/// `<` inside interpolated text would open an embedded element, so it is
/// written as an embedded character element.
fn escape_interpolated(text: &str) -> String {
    text.replace(ELEMENT_OPEN, "<\\$3C\\>")
}

pub(crate) fn element_to_string(element: &Element, options: &XferOptions) -> String {
    let mut serializer = Serializer::new(options.clone());
    serializer.write_element(element);
    serializer.into_inner()
}

pub(crate) fn document_to_string(document: &Document, options: &XferOptions) -> String {
    let mut serializer = Serializer::new(options.clone());
    serializer.write_document(document);
    serializer.into_inner()
}

/// Builds an [`Element`] from a `Serialize` value.
///
/// Structs and maps become objects, sequences become arrays when all items
/// share a kind and tuples otherwise, `None` and unit become null.
pub struct ElementSerializer;

pub struct SerializeSeq {
    items: Vec<Element>,
}

pub struct SerializeVariantSeq {
    variant: &'static str,
    items: Vec<Element>,
}

pub struct SerializeMap {
    object: ObjectElement,
    current_key: Option<String>,
}

pub struct SerializeVariantMap {
    variant: &'static str,
    object: ObjectElement,
}

fn integer_element(value: i128) -> Result<Element> {
    if let Ok(value) = i32::try_from(value) {
        Ok(Element::integer(value))
    } else if let Ok(value) = i64::try_from(value) {
        Ok(Element::long(value))
    } else {
        Ok(Element::decimal(Decimal::new(value, 0)))
    }
}

fn wrap_variant(variant: &'static str, value: Element) -> Result<Element> {
    let mut object = ObjectElement::new();
    object.add(variant, value)?;
    Ok(Element::object(object))
}

fn key_text(key: Element) -> Result<String> {
    match key.kind() {
        ElementKind::String(text) => Ok(text.clone()),
        ElementKind::Character(_) => Ok(key.as_char().map(String::from).unwrap_or_default()),
        ElementKind::Integer(_) | ElementKind::Long(_) | ElementKind::Boolean(_) => {
            Ok(crate::value::Value::from_element(&key).to_string())
        }
        _ => Err(Error::custom(format!(
            "object keys must be strings, found {}",
            key.name()
        ))),
    }
}

pub(crate) fn to_element<T: Serialize + ?Sized>(value: &T) -> Result<Element> {
    value.serialize(ElementSerializer)
}

impl ser::Serializer for ElementSerializer {
    type Ok = Element;
    type Error = Error;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeVariantSeq;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeVariantMap;

    fn serialize_bool(self, v: bool) -> Result<Element> {
        Ok(Element::boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Element> {
        Ok(Element::integer(i32::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Element> {
        Ok(Element::integer(i32::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Element> {
        Ok(Element::integer(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Element> {
        integer_element(i128::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Element> {
        integer_element(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Element> {
        Ok(Element::integer(i32::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Element> {
        Ok(Element::integer(i32::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Element> {
        integer_element(i128::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Element> {
        integer_element(i128::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Element> {
        match i128::try_from(v) {
            Ok(v) => integer_element(v),
            Err(_) => v
                .to_string()
                .parse::<Decimal>()
                .map(Element::decimal),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Element> {
        Ok(Element::double(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Element> {
        Ok(Element::double(v))
    }

    fn serialize_char(self, v: char) -> Result<Element> {
        Ok(Element::character(v))
    }

    fn serialize_str(self, v: &str) -> Result<Element> {
        Ok(Element::string(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Element> {
        let items = v.iter().map(|&b| Element::integer(i32::from(b))).collect();
        Ok(Element::array(ArrayElement::from_items(items)?))
    }

    fn serialize_none(self) -> Result<Element> {
        Ok(Element::null())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Element>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Element> {
        Ok(Element::null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Element> {
        Ok(Element::null())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Element> {
        Ok(Element::string(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Element>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Element>
    where
        T: ?Sized + Serialize,
    {
        wrap_variant(variant, to_element(value)?)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq> {
        Ok(SerializeSeq {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeSeq> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVariantSeq> {
        Ok(SerializeVariantSeq {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            object: ObjectElement::new(),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeVariantMap> {
        Ok(SerializeVariantMap {
            variant,
            object: ObjectElement::new(),
        })
    }
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Element;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(to_element(value)?);
        Ok(())
    }

    fn end(self) -> Result<Element> {
        Ok(Element::sequence(self.items))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Element;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Element> {
        Ok(Element::tuple(self.items))
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Element> {
        Ok(Element::tuple(self.items))
    }
}

impl ser::SerializeTupleVariant for SerializeVariantSeq {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(to_element(value)?);
        Ok(())
    }

    fn end(self) -> Result<Element> {
        wrap_variant(self.variant, Element::tuple(self.items))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Element;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key_text(to_element(key)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.object.add(key, to_element(value)?)
    }

    fn end(self) -> Result<Element> {
        Ok(Element::object(self.object))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.object.add(key, to_element(value)?)
    }

    fn end(self) -> Result<Element> {
        Ok(Element::object(self.object))
    }
}

impl ser::SerializeStructVariant for SerializeVariantMap {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.object.add(key, to_element(value)?)
    }

    fn end(self) -> Result<Element> {
        wrap_variant(self.variant, Element::object(self.object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, Formatting};
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn render(element: &Element) -> String {
        element_to_string(element, &XferOptions::default())
    }

    #[test]
    fn test_minimal_text_forms() {
        assert_eq!(render(&Element::string("hi")), "\"hi\"");
        assert_eq!(render(&Element::string("")), "<\"\">");
        assert_eq!(render(&Element::string("say \"hi\" now")), "\"\"say \"hi\" now\"\"");
        assert_eq!(render(&Element::string("\"quoted\"")), "<\"\" \"quoted\" \"\">");
        assert_eq!(render(&Element::keyword("eq")), ":eq:");
    }

    #[test]
    fn test_scalar_forms() {
        assert_eq!(render(&Element::integer(42)), "42");
        assert_eq!(render(&Element::long(7)), "&7");
        assert_eq!(render(&Element::long(5_000_000_000)), "&5000000000");
        assert_eq!(render(&Element::double(2.5)), "^2.5");
        assert_eq!(render(&Element::boolean(true)), "~true");
        assert_eq!(render(&Element::null()), "?");
        assert_eq!(render(&Element::character('A')), "\\$41");
        assert_eq!(render(&Element::decimal("1.50".parse().unwrap())), "*1.50");
    }

    #[test]
    fn test_keys_and_separators() {
        let doc = parse("{ \"full name\" \"A\" n 1 flag ~true }").unwrap();
        assert_eq!(
            crate::to_string(&doc),
            "{=full name= \"A\" n 1 flag~true}"
        );
    }

    #[test]
    fn test_instructions_precede_targets() {
        let doc = parse("<! id \"main\" !> <! tag \"t\" !> { a 1 }").unwrap();
        assert_eq!(
            crate::to_string(&doc),
            "<! id \"main\" !><! tag \"t\" !>{a 1}"
        );
    }

    #[test]
    fn test_synthesized_id_block() {
        let element = Element::integer(3).with_id("three");
        assert_eq!(render(&element), "<! id \"three\" !>3");
    }

    #[test]
    fn test_interpolated_escapes_open_angle() {
        let element = Element::interpolated("a < b");
        assert_eq!(render(&element), "'a <\\$3C\\> b'");
    }

    #[test]
    fn test_metadata_first() {
        let doc = parse("<! xfer \"0.11\" !> ( 1 )").unwrap();
        let options = XferOptions::new().with_formatting(Formatting::SPACED);
        assert_eq!(
            crate::to_string_with_options(&doc, &options),
            "<! xfer \"0.11\" !> ( 1 )"
        );
    }

    #[test]
    fn test_explicit_collection_style_kept() {
        let doc = parse("<( 1 2 )>").unwrap();
        assert_eq!(crate::to_string(&doc), "<(1 2)>");
    }

    #[derive(Serialize)]
    struct Service {
        name: String,
        port: u16,
        weights: Vec<f64>,
        mixed: (i32, &'static str),
        owner: Option<String>,
    }

    #[test]
    fn test_to_element_shapes() {
        let service = Service {
            name: "api".into(),
            port: 8080,
            weights: vec![0.5, 1.0],
            mixed: (1, "x"),
            owner: None,
        };
        let element = to_element(&service).unwrap();
        let object = element.as_object().unwrap();
        assert_eq!(object.get("port").and_then(|v| v.as_i64()), Some(8080));
        assert!(object.get("weights").unwrap().as_array().is_some());
        assert!(object.get("mixed").unwrap().as_tuple().is_some());
        assert!(object.get("owner").unwrap().is_null());
    }

    #[test]
    fn test_to_element_map_keys_and_large_numbers() {
        let mut map = BTreeMap::new();
        map.insert(1u8, u64::MAX);
        let element = to_element(&map).unwrap();
        let value = element.get("1").unwrap();
        assert!(matches!(value.kind(), ElementKind::Decimal(_)));
        assert!(to_element(&Some(3_000_000_000i64)).unwrap().as_i64().is_some());
    }
}
