use super::{Element, ElementKind};
use crate::{Error, Result};
use indexmap::IndexMap;

/// A key and its value.
///
/// The key is kept as an element so its delimiter style (bare word,
/// `=`-identifier, keyword or string) survives a round trip.
#[derive(Clone, Debug)]
pub struct KeyValuePair {
    key: Box<Element>,
    value: Box<Element>,
}

impl KeyValuePair {
    /// A pair keyed by an identifier.
    pub fn new(key: impl Into<String>, value: Element) -> Self {
        KeyValuePair {
            key: Box::new(Element::identifier(key)),
            value: Box::new(value),
        }
    }

    /// A pair keyed by an existing identifier, keyword or string element.
    pub fn with_key_element(key: Element, value: Element) -> Result<Self> {
        if key.as_str().is_none() || matches!(key.kind(), ElementKind::Dynamic { .. }) {
            return Err(Error::type_mismatch("identifier", key.name()));
        }
        Ok(KeyValuePair {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn key(&self) -> &str {
        self.key.as_str().unwrap_or_default()
    }

    pub fn key_element(&self) -> &Element {
        &self.key
    }

    pub fn value(&self) -> &Element {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Element {
        &mut self.value
    }

    pub fn set_value(&mut self, value: Element) -> Element {
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_value(self) -> Element {
        *self.value
    }

    pub fn into_parts(self) -> (Element, Element) {
        (*self.key, *self.value)
    }
}

impl PartialEq for KeyValuePair {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.value == other.value
    }
}

/// An ordered set of key/value pairs with unique keys.
///
/// Each entry is stored as a [`KeyValuePair`] element so instructions bound
/// to a pair stay with it.
///
/// # Examples
///
/// ```rust
/// use xferlang::{Element, Error, ObjectElement};
///
/// let mut object = ObjectElement::new();
/// object.add("a", Element::integer(1)).unwrap();
/// object.add("b", Element::integer(2)).unwrap();
///
/// assert!(matches!(object.add("a", Element::integer(3)), Err(Error::DuplicateKey(_))));
///
/// object.insert("a", Element::integer(10));
/// assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(object.get("a").and_then(|v| v.as_i64()), Some(10));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ObjectElement {
    entries: IndexMap<String, Element>,
}

impl ObjectElement {
    pub fn new() -> Self {
        ObjectElement {
            entries: IndexMap::new(),
        }
    }

    /// Adds a new member; an existing key is an error and leaves the object unchanged.
    pub fn add(&mut self, key: impl Into<String>, value: Element) -> Result<()> {
        self.add_pair(Element::pair(key, value))
    }

    /// Adds a key/value pair element.
    pub fn add_pair(&mut self, pair: Element) -> Result<()> {
        let key = match pair.as_pair() {
            Some(kvp) => kvp.key().to_string(),
            None => return Err(Error::type_mismatch("keyValuePair", pair.name())),
        };
        if self.entries.contains_key(&key) {
            return Err(Error::DuplicateKey(key));
        }
        self.entries.insert(key, pair);
        Ok(())
    }

    /// Sets a member's value, keeping its position when the key exists.
    ///
    /// Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Element) -> Option<Element> {
        let key = key.into();
        if let Some(ElementKind::KeyValuePair(pair)) =
            self.entries.get_mut(&key).map(Element::kind_mut)
        {
            return Some(pair.set_value(value));
        }
        let pair = Element::pair(key.clone(), value);
        self.entries.insert(key, pair);
        None
    }

    /// Same as [`ObjectElement::insert`], discarding the previous value.
    pub fn add_or_update(&mut self, key: impl Into<String>, value: Element) {
        self.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.entries
            .get(key)
            .and_then(Element::as_pair)
            .map(KeyValuePair::value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Element> {
        match self.entries.get_mut(key).map(Element::kind_mut) {
            Some(ElementKind::KeyValuePair(pair)) => Some(pair.value_mut()),
            _ => None,
        }
    }

    /// The pair element stored under `key`.
    pub fn get_pair(&self, key: &str) -> Option<&Element> {
        self.entries.get(key)
    }

    /// Removes a member, preserving the order of the rest. Returns its value.
    pub fn remove(&mut self, key: &str) -> Option<Element> {
        self.entries
            .shift_remove(key)
            .and_then(|pair| match pair.into_kind() {
                ElementKind::KeyValuePair(kvp) => Some(kvp.into_value()),
                _ => None,
            })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Members as `(key, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.entries.iter().filter_map(|(key, pair)| {
            pair.as_pair().map(|kvp| (key.as_str(), kvp.value()))
        })
    }

    /// The stored pair elements in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = &Element> {
        self.entries.values()
    }

    pub(crate) fn pair_at(&self, index: usize) -> Option<&Element> {
        self.entries.get_index(index).map(|(_, pair)| pair)
    }

    pub(crate) fn pair_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.entries.get_index_mut(index).map(|(_, pair)| pair)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// IndexMap equality ignores order; member order is part of an object's value.
impl PartialEq for ObjectElement {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

impl IntoIterator for ObjectElement {
    type Item = (String, Element);
    type IntoIter = std::vec::IntoIter<(String, Element)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .filter_map(|(key, pair)| match pair.into_kind() {
                ElementKind::KeyValuePair(kvp) => Some((key, kvp.into_value())),
                _ => None,
            })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// A homogeneous sequence.
///
/// The first element fixes the kind every later element must have.
///
/// # Examples
///
/// ```rust
/// use xferlang::{ArrayElement, Element, Error};
///
/// let mut array = ArrayElement::new();
/// array.push(Element::integer(1)).unwrap();
/// let err = array.push(Element::string("two")).unwrap_err();
/// assert!(matches!(err, Error::ArrayTypeMismatch { .. }));
/// assert_eq!(array.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayElement {
    items: Vec<Element>,
}

impl ArrayElement {
    pub fn new() -> Self {
        ArrayElement { items: Vec::new() }
    }

    /// Builds an array, checking every item against the first.
    pub fn from_items(items: Vec<Element>) -> Result<Self> {
        let mut array = ArrayElement::new();
        for item in items {
            array.push(item)?;
        }
        Ok(array)
    }

    /// Builds an array when every item shares one kind.
    pub(super) fn try_homogeneous(items: Vec<Element>) -> std::result::Result<Self, Vec<Element>> {
        if items.windows(2).all(|pair| pair[0].name() == pair[1].name()) {
            Ok(ArrayElement { items })
        } else {
            Err(items)
        }
    }

    /// Kind tag shared by every item, once the array holds one.
    pub fn element_kind(&self) -> Option<&'static str> {
        self.items.first().map(Element::name)
    }

    /// Appends an item. Identifiers only ever appear as pair keys.
    pub fn push(&mut self, element: Element) -> Result<()> {
        if matches!(element.kind(), ElementKind::Identifier(_)) {
            return Err(Error::type_mismatch("a value element", "identifier"));
        }
        if let Some(expected) = self.element_kind() {
            if expected != element.name() {
                return Err(Error::array_type_mismatch(expected, element.name()));
            }
        }
        self.items.push(element);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.items.get(index)
    }

    /// Mutable access to one item. Replacing it with another kind breaks homogeneity.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.items.get_mut(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Element> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Element> {
        self.items
    }
}

impl<'a> IntoIterator for &'a ArrayElement {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
