//! Deserialization from element trees.
//!
//! [`ElementDeserializer`] drives a `serde::Deserialize` implementation from
//! a borrowed [`Element`]. Objects and key/value pairs read as maps, arrays
//! and tuples as sequences, and text as borrowed strings where possible.
//!
//! ```rust
//! use serde::Deserialize;
//! use xferlang::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Endpoint {
//!     host: String,
//!     port: u16,
//!     tags: Vec<String>,
//! }
//!
//! let endpoint: Endpoint = from_str("{ host \"db1\" port 5432 tags [ \"a\" \"b\" ] }").unwrap();
//! assert_eq!(endpoint.port, 5432);
//! assert_eq!(endpoint.tags, vec!["a", "b"]);
//! ```

use crate::element::{Element, ElementKind, KeyValuePair};
use crate::{Error, Result};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;

/// A `serde::Deserializer` over one element.
pub struct ElementDeserializer<'de> {
    element: &'de Element,
}

impl<'de> ElementDeserializer<'de> {
    pub fn new(element: &'de Element) -> Self {
        ElementDeserializer { element }
    }
}

pub(crate) fn from_element<'de, T: de::Deserialize<'de>>(element: &'de Element) -> Result<T> {
    T::deserialize(ElementDeserializer::new(element))
}

impl<'de> de::Deserializer<'de> for ElementDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.element.kind() {
            ElementKind::String(text)
            | ElementKind::Identifier(text)
            | ElementKind::Keyword(text)
            | ElementKind::Interpolated(text) => visitor.visit_borrowed_str(text),
            ElementKind::Dynamic { value, .. } => match value {
                Some(text) => visitor.visit_borrowed_str(text),
                None => visitor.visit_unit(),
            },
            ElementKind::Character(_) => match self.element.as_char() {
                Some(ch) => visitor.visit_char(ch),
                None => Err(Error::invalid_value("character", "not a Unicode scalar value")),
            },
            ElementKind::Integer(value) => visitor.visit_i32(value.value),
            ElementKind::Long(value) => visitor.visit_i64(value.value),
            ElementKind::Decimal(value) => visitor.visit_f64(value.to_f64()),
            ElementKind::Double(value) => visitor.visit_f64(*value),
            ElementKind::Boolean(value) => visitor.visit_bool(*value),
            ElementKind::Null => visitor.visit_unit(),
            ElementKind::DateTime(value) => visitor.visit_string(value.to_string()),
            ElementKind::Object(object) => visitor.visit_map(MapDeserializer::new(
                object.pairs().filter_map(Element::as_pair).collect(),
            )),
            ElementKind::Array(array) => visitor.visit_seq(SeqDeserializer::new(array.as_slice())),
            ElementKind::Tuple(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            ElementKind::KeyValuePair(pair) => visitor.visit_map(MapDeserializer::new(vec![pair])),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.element.kind() {
            ElementKind::Null | ElementKind::Dynamic { value: None, .. } => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(text) = self.element.as_str() {
            return visitor.visit_enum(text.into_deserializer());
        }
        let pair = match self.element.kind() {
            ElementKind::KeyValuePair(pair) => Some(pair),
            ElementKind::Object(object) if object.len() == 1 => {
                object.pairs().next().and_then(Element::as_pair)
            }
            _ => None,
        };
        match pair {
            Some(pair) => visitor.visit_enum(EnumDeserializer { pair }),
            None => Err(Error::type_mismatch("enum variant", self.element.name())),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer<'de> {
    iter: std::slice::Iter<'de, Element>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(items: &'de [Element]) -> Self {
        SeqDeserializer { iter: items.iter() }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(element) => seed.deserialize(ElementDeserializer::new(element)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer<'de> {
    iter: std::vec::IntoIter<&'de KeyValuePair>,
    value: Option<&'de Element>,
}

impl<'de> MapDeserializer<'de> {
    fn new(pairs: Vec<&'de KeyValuePair>) -> Self {
        MapDeserializer {
            iter: pairs.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(pair) => {
                self.value = Some(pair.value());
                seed.deserialize(ElementDeserializer::new(pair.key_element()))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ElementDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer<'de> {
    pair: &'de KeyValuePair,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ElementDeserializer::new(self.pair.key_element()))?;
        Ok((
            variant,
            VariantDeserializer {
                value: self.pair.value(),
            },
        ))
    }
}

struct VariantDeserializer<'de> {
    value: &'de Element,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        if self.value.is_null() {
            Ok(())
        } else {
            Err(Error::type_mismatch("unit variant", self.value.name()))
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ElementDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value.kind() {
            ElementKind::Tuple(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            ElementKind::Array(array) => visitor.visit_seq(SeqDeserializer::new(array.as_slice())),
            _ => Err(Error::type_mismatch("tuple variant", self.value.name())),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value.kind() {
            ElementKind::Object(_) => {
                de::Deserializer::deserialize_any(ElementDeserializer::new(self.value), visitor)
            }
            _ => Err(Error::type_mismatch("struct variant", self.value.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, to_element};
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Point,
        Circle(f64),
        Rect { w: i32, h: i32 },
        Line(i32, i32),
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        retries: u8,
        ratio: f64,
        enabled: bool,
        initial: char,
        owner: Option<String>,
        shapes: Vec<Shape>,
    }

    #[test]
    fn test_struct_from_text() {
        let doc = parse(
            "{ name \"svc\" retries 3 ratio ^0.5 enabled ~true initial \\$41 owner ? \
             shapes ( \"Point\" { Circle ^1.5 } { Rect { w 2 h 3 } } { Line ( 1 2 ) } ) }",
        )
        .unwrap();
        let config: Config = from_element(&doc.root()[0]).unwrap();
        assert_eq!(config.name, "svc");
        assert_eq!(config.initial, 'A');
        assert_eq!(config.owner, None);
        assert_eq!(
            config.shapes,
            vec![
                Shape::Point,
                Shape::Circle(1.5),
                Shape::Rect { w: 2, h: 3 },
                Shape::Line(1, 2)
            ]
        );
    }

    #[test]
    fn test_host_value_through_element() {
        let config = Config {
            name: "api".into(),
            retries: 1,
            ratio: 0.25,
            enabled: false,
            initial: 'z',
            owner: Some("ops".into()),
            shapes: vec![Shape::Rect { w: 1, h: 1 }],
        };
        let element = to_element(&config).unwrap();
        let back: Config = from_element(&element).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_map_and_mismatch() {
        let doc = parse("{ a 1 b 2 }").unwrap();
        let map: HashMap<String, i64> = from_element(&doc.root()[0]).unwrap();
        assert_eq!(map["b"], 2);
        let err = from_element::<Vec<i32>>(&doc.root()[0]).unwrap_err();
        assert!(matches!(err, Error::Custom(_)));
    }
}
