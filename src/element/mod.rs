//! The typed element tree.
//!
//! Every node is an [`Element`]: a closed [`ElementKind`] payload plus the
//! presentation state shared by all kinds (its [`Delimiter`]), the `id` and
//! `tag` assigned by processing instructions, and the instructions bound to
//! it as their target.
//!
//! ## Building elements
//!
//! ```rust
//! use xferlang::{Element, ObjectElement};
//!
//! let mut person = ObjectElement::new();
//! person.add("name", Element::string("Alice")).unwrap();
//! person.add("age", Element::integer(30)).unwrap();
//!
//! let element = Element::object(person);
//! assert_eq!(element.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(element.get("age").and_then(|v| v.as_i64()), Some(30));
//! ```
//!
//! ## Equality
//!
//! Two elements are equal when they have the same kind, payload, keys, order,
//! `id` and `tag`. Delimiter style is presentation and is ignored, so a
//! document compares equal to itself after a serialize/parse round trip.

mod collections;
mod metadata;

pub use collections::{ArrayElement, KeyValuePair, ObjectElement};
pub use metadata::{Metadata, ProcessingInstruction, FORMAT_VERSION};

use crate::datetime::DateTimeValue;
use crate::grammar;
use crate::number::{Decimal, IntegerValue, LongValue};
use crate::style;
use std::fmt;

/// How an element's markers are rendered.
///
/// Ordered from least to most verbose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementStyle {
    /// Bare value, no markers.
    Implicit,
    /// Specifier run only.
    Compact,
    /// `<` + specifier run ... specifier run + `>`.
    Explicit,
}

/// Opening and closing specifier of an element and how they are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiter {
    pub opening: char,
    pub closing: char,
    /// Number of specifier characters in each run; always at least 1.
    pub count: usize,
    pub style: ElementStyle,
}

impl Delimiter {
    pub fn new(opening: char, closing: char, count: usize, style: ElementStyle) -> Self {
        Delimiter {
            opening,
            closing,
            count: count.max(1),
            style,
        }
    }

    /// Opening marker text for a given style, e.g. `<""` for an explicit count-2 string.
    pub fn opening_text(&self, style: ElementStyle) -> String {
        let run: String = std::iter::repeat(self.opening).take(self.count).collect();
        match style {
            ElementStyle::Implicit => String::new(),
            ElementStyle::Compact => run,
            ElementStyle::Explicit => format!("{}{}", grammar::ELEMENT_OPEN, run),
        }
    }

    /// Closing marker text for a given style.
    pub fn closing_text(&self, style: ElementStyle) -> String {
        let run: String = std::iter::repeat(self.closing).take(self.count).collect();
        match style {
            ElementStyle::Implicit => String::new(),
            ElementStyle::Compact => run,
            ElementStyle::Explicit => format!("{}{}", run, grammar::ELEMENT_CLOSE),
        }
    }
}

/// The payload of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    String(String),
    /// Key token of a key/value pair.
    Identifier(String),
    /// Symbolic value such as an operator name.
    Keyword(String),
    /// A Unicode scalar value.
    Character(u32),
    /// Text with embedded elements already expanded.
    Interpolated(String),
    /// A named value looked up in the dynamic source registry at parse time.
    Dynamic {
        name: String,
        value: Option<String>,
    },
    Integer(IntegerValue),
    Long(LongValue),
    Decimal(Decimal),
    Double(f64),
    Boolean(bool),
    Null,
    DateTime(DateTimeValue),
    Object(ObjectElement),
    Array(ArrayElement),
    /// Heterogeneous sequence; also used as a property bag.
    Tuple(Vec<Element>),
    KeyValuePair(KeyValuePair),
}

impl ElementKind {
    /// The kind tag, e.g. `"string"` or `"object"`.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::String(_) => "string",
            ElementKind::Identifier(_) => "identifier",
            ElementKind::Keyword(_) => "keyword",
            ElementKind::Character(_) => "character",
            ElementKind::Interpolated(_) => "interpolated",
            ElementKind::Dynamic { .. } => "dynamic",
            ElementKind::Integer(_) => "integer",
            ElementKind::Long(_) => "long",
            ElementKind::Decimal(_) => "decimal",
            ElementKind::Double(_) => "double",
            ElementKind::Boolean(_) => "boolean",
            ElementKind::Null => "null",
            ElementKind::DateTime(_) => "datetime",
            ElementKind::Object(_) => "object",
            ElementKind::Array(_) => "array",
            ElementKind::Tuple(_) => "tuple",
            ElementKind::KeyValuePair(_) => "keyValuePair",
        }
    }

    fn specifiers(&self) -> (char, char) {
        match self {
            ElementKind::String(_) => (grammar::STRING, grammar::STRING),
            ElementKind::Identifier(_) => (grammar::IDENTIFIER, grammar::IDENTIFIER),
            ElementKind::Keyword(_) => (grammar::KEYWORD, grammar::KEYWORD),
            ElementKind::Character(_) => (grammar::CHARACTER, grammar::CHARACTER),
            ElementKind::Interpolated(_) => (grammar::INTERPOLATED, grammar::INTERPOLATED),
            ElementKind::Dynamic { .. } => (grammar::DYNAMIC, grammar::DYNAMIC),
            ElementKind::Integer(_) => (grammar::INTEGER, grammar::INTEGER),
            ElementKind::Long(_) => (grammar::LONG, grammar::LONG),
            ElementKind::Decimal(_) => (grammar::DECIMAL, grammar::DECIMAL),
            ElementKind::Double(_) => (grammar::DOUBLE, grammar::DOUBLE),
            ElementKind::Boolean(_) => (grammar::BOOLEAN, grammar::BOOLEAN),
            ElementKind::Null => (grammar::NULL, grammar::NULL),
            ElementKind::DateTime(_) => (grammar::DATE, grammar::DATE),
            ElementKind::Object(_) => (grammar::OBJECT_OPEN, grammar::OBJECT_CLOSE),
            ElementKind::Array(_) => (grammar::ARRAY_OPEN, grammar::ARRAY_CLOSE),
            ElementKind::Tuple(_) => (grammar::TUPLE_OPEN, grammar::TUPLE_CLOSE),
            ElementKind::KeyValuePair(_) => (' ', ' '),
        }
    }

    /// Delimiter chosen for a freshly built element of this kind.
    fn default_delimiter(&self) -> Delimiter {
        let (opening, closing) = self.specifiers();
        match self {
            ElementKind::String(text)
            | ElementKind::Keyword(text)
            | ElementKind::Interpolated(text)
            | ElementKind::Dynamic { name: text, .. } => {
                style::text_delimiter(text, opening, false)
            }
            ElementKind::Identifier(text) => style::text_delimiter(text, opening, true),
            ElementKind::Integer(_) | ElementKind::KeyValuePair(_) => {
                Delimiter::new(opening, closing, 1, ElementStyle::Implicit)
            }
            _ => Delimiter::new(opening, closing, 1, ElementStyle::Compact),
        }
    }

    pub(crate) fn is_text(&self) -> bool {
        matches!(
            self,
            ElementKind::String(_)
                | ElementKind::Identifier(_)
                | ElementKind::Keyword(_)
                | ElementKind::Interpolated(_)
                | ElementKind::Dynamic { .. }
        )
    }

    pub(crate) fn is_collection(&self) -> bool {
        matches!(
            self,
            ElementKind::Object(_) | ElementKind::Array(_) | ElementKind::Tuple(_)
        )
    }
}

/// A node of the document tree.
#[derive(Clone, Debug)]
pub struct Element {
    kind: ElementKind,
    delimiter: Delimiter,
    id: Option<String>,
    tag: Option<String>,
    instructions: Vec<ProcessingInstruction>,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id && self.tag == other.tag
    }
}

impl Element {
    /// Wraps a payload with the default delimiter for its kind.
    pub fn new(kind: ElementKind) -> Self {
        let delimiter = kind.default_delimiter();
        Element {
            kind,
            delimiter,
            id: None,
            tag: None,
            instructions: Vec::new(),
        }
    }

    /// Wraps a payload keeping the style it was read with.
    pub(crate) fn with_style(kind: ElementKind, style: ElementStyle) -> Self {
        let mut element = Element::new(kind);
        element.delimiter.style = style;
        element
    }

    pub fn string(value: impl Into<String>) -> Self {
        Element::new(ElementKind::String(value.into()))
    }

    pub fn identifier(value: impl Into<String>) -> Self {
        Element::new(ElementKind::Identifier(value.into()))
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        Element::new(ElementKind::Keyword(value.into()))
    }

    /// A character element from a Unicode scalar value.
    pub fn character(ch: char) -> Self {
        Element::new(ElementKind::Character(u32::from(ch)))
    }

    pub fn interpolated(value: impl Into<String>) -> Self {
        Element::new(ElementKind::Interpolated(value.into()))
    }

    pub fn dynamic(name: impl Into<String>, value: Option<String>) -> Self {
        Element::new(ElementKind::Dynamic {
            name: name.into(),
            value,
        })
    }

    pub fn integer(value: i32) -> Self {
        Element::new(ElementKind::Integer(IntegerValue::from(value)))
    }

    pub fn long(value: i64) -> Self {
        Element::new(ElementKind::Long(LongValue::from(value)))
    }

    pub fn decimal(value: Decimal) -> Self {
        Element::new(ElementKind::Decimal(value))
    }

    pub fn double(value: f64) -> Self {
        Element::new(ElementKind::Double(value))
    }

    pub fn boolean(value: bool) -> Self {
        Element::new(ElementKind::Boolean(value))
    }

    pub fn null() -> Self {
        Element::new(ElementKind::Null)
    }

    pub fn datetime(value: DateTimeValue) -> Self {
        Element::new(ElementKind::DateTime(value))
    }

    pub fn object(value: ObjectElement) -> Self {
        Element::new(ElementKind::Object(value))
    }

    pub fn array(value: ArrayElement) -> Self {
        Element::new(ElementKind::Array(value))
    }

    pub fn tuple(items: Vec<Element>) -> Self {
        Element::new(ElementKind::Tuple(items))
    }

    /// An array when all items share a kind, a tuple otherwise.
    pub fn sequence(items: Vec<Element>) -> Self {
        match ArrayElement::try_homogeneous(items) {
            Ok(array) => Element::array(array),
            Err(items) => Element::tuple(items),
        }
    }

    /// A key/value pair with a bare-word (or `=`-delimited) key.
    pub fn pair(key: impl Into<String>, value: Element) -> Self {
        Element::new(ElementKind::KeyValuePair(KeyValuePair::new(key, value)))
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ElementKind {
        &mut self.kind
    }

    pub fn into_kind(self) -> ElementKind {
        self.kind
    }

    /// The kind tag, e.g. `"string"`.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    pub fn style(&self) -> ElementStyle {
        self.delimiter.style
    }

    /// Requests a rendering style. Text elements never drop below the style
    /// their content requires.
    pub fn set_style(&mut self, style: ElementStyle) {
        self.delimiter.style = style;
    }

    #[must_use]
    pub fn with_element_style(mut self, style: ElementStyle) -> Self {
        self.set_style(style);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    /// Processing instructions bound to this element, in source order.
    pub fn instructions(&self) -> &[ProcessingInstruction] {
        &self.instructions
    }

    /// The bound instruction with the given keyword, if any.
    pub fn instruction(&self, keyword: &str) -> Option<&ProcessingInstruction> {
        self.instructions.iter().find(|pi| pi.keyword() == keyword)
    }

    pub fn push_instruction(&mut self, instruction: ProcessingInstruction) {
        self.instructions.push(instruction);
    }

    /// Replaces the text of a text-family element and recomputes its delimiter.
    ///
    /// Returns `false` (and leaves the element alone) for other kinds.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        match &mut self.kind {
            ElementKind::String(value)
            | ElementKind::Identifier(value)
            | ElementKind::Keyword(value)
            | ElementKind::Interpolated(value)
            | ElementKind::Dynamic { name: value, .. } => *value = text,
            _ => return false,
        }
        self.delimiter = self.kind.default_delimiter();
        true
    }

    /// Minimal delimiter for the current payload; for text kinds this
    /// recomputes the specifier count from the content.
    pub fn minimal_delimiter(&self) -> Delimiter {
        self.kind.default_delimiter()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ElementKind::Null)
    }

    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    pub fn is_collection(&self) -> bool {
        self.kind.is_collection()
    }

    pub fn is_pair(&self) -> bool {
        matches!(self.kind, ElementKind::KeyValuePair(_))
    }

    /// Text payload of string, identifier, keyword, interpolated and dynamic elements.
    ///
    /// Dynamic elements yield their resolved value (empty when unresolved).
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::String(value)
            | ElementKind::Identifier(value)
            | ElementKind::Keyword(value)
            | ElementKind::Interpolated(value) => Some(value),
            ElementKind::Dynamic { value, .. } => Some(value.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.kind {
            ElementKind::Integer(value) => Some(i64::from(value.value)),
            ElementKind::Long(value) => Some(value.value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.kind {
            ElementKind::Integer(value) => Some(f64::from(value.value)),
            ElementKind::Long(value) => Some(value.value as f64),
            ElementKind::Decimal(value) => Some(value.to_f64()),
            ElementKind::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ElementKind::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self.kind {
            ElementKind::Character(cp) => char::from_u32(cp),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTimeValue> {
        match &self.kind {
            ElementKind::DateTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectElement> {
        match &self.kind {
            ElementKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectElement> {
        match &mut self.kind {
            ElementKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayElement> {
        match &self.kind {
            ElementKind::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayElement> {
        match &mut self.kind {
            ElementKind::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Element]> {
        match &self.kind {
            ElementKind::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple_mut(&mut self) -> Option<&mut Vec<Element>> {
        match &mut self.kind {
            ElementKind::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&KeyValuePair> {
        match &self.kind {
            ElementKind::KeyValuePair(pair) => Some(pair),
            _ => None,
        }
    }

    /// Direct children: object pairs, array and tuple items, a pair's value.
    pub fn children(&self) -> Vec<&Element> {
        match &self.kind {
            ElementKind::Object(object) => object.pairs().collect(),
            ElementKind::Array(array) => array.iter().collect(),
            ElementKind::Tuple(items) => items.iter().collect(),
            ElementKind::KeyValuePair(pair) => vec![pair.value()],
            _ => Vec::new(),
        }
    }

    pub fn child(&self, index: usize) -> Option<&Element> {
        match &self.kind {
            ElementKind::Object(object) => object.pair_at(index),
            ElementKind::Array(array) => array.get(index),
            ElementKind::Tuple(items) => items.get(index),
            ElementKind::KeyValuePair(pair) if index == 0 => Some(pair.value()),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        match &mut self.kind {
            ElementKind::Object(object) => object.pair_at_mut(index),
            ElementKind::Array(array) => array.get_mut(index),
            ElementKind::Tuple(items) => items.get_mut(index),
            ElementKind::KeyValuePair(pair) if index == 0 => Some(pair.value_mut()),
            _ => None,
        }
    }

    /// Follows a path of child indices from this element.
    pub fn get_path(&self, path: &[usize]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, &index| element.child(index))
    }

    /// Looks up a key: an object member's value, or a pair's value when its key matches.
    pub fn get(&self, key: &str) -> Option<&Element> {
        match &self.kind {
            ElementKind::Object(object) => object.get(key),
            ElementKind::KeyValuePair(pair) if pair.key() == key => Some(pair.value()),
            _ => None,
        }
    }

    /// Visits this element and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element, &[usize])) {
        let mut path = Vec::new();
        self.walk_inner(&mut path, visit);
    }

    fn walk_inner<'a>(
        &'a self,
        path: &mut Vec<usize>,
        visit: &mut dyn FnMut(&'a Element, &[usize]),
    ) {
        visit(self, path);
        for (index, child) in self.children().into_iter().enumerate() {
            path.push(index);
            child.walk_inner(path, visit);
            path.pop();
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::element_to_string(
            self,
            &crate::XferOptions::default(),
        ))
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::string(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::string(value)
    }
}

impl From<i32> for Element {
    fn from(value: i32) -> Self {
        Element::integer(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Element::long(value)
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Element::double(value)
    }
}

impl From<bool> for Element {
    fn from(value: bool) -> Self {
        Element::boolean(value)
    }
}

impl From<char> for Element {
    fn from(value: char) -> Self {
        Element::character(value)
    }
}

impl From<Decimal> for Element {
    fn from(value: Decimal) -> Self {
        Element::decimal(value)
    }
}

impl From<ObjectElement> for Element {
    fn from(value: ObjectElement) -> Self {
        Element::object(value)
    }
}

impl From<ArrayElement> for Element {
    fn from(value: ArrayElement) -> Self {
        Element::array(value)
    }
}
