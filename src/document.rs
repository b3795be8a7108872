//! A parsed document: metadata, root elements and what the instructions left behind.
//!
//! ```rust
//! use xferlang::parse;
//!
//! let doc = parse(r#"
//!     <! xfer "0.11" !>
//!     <! document { title "Inventory" tags [ "ops" "eu" ] } !>
//!     <! id "primary" !>
//!     { host "db1" port 5432 }
//! "#).unwrap();
//!
//! assert_eq!(doc.metadata().version.as_deref(), Some("0.11"));
//! assert_eq!(doc.document_properties().title.as_deref(), Some("Inventory"));
//! let primary = doc.find_by_id("primary").unwrap();
//! assert_eq!(primary.get("port").and_then(|v| v.as_i64()), Some(5432));
//! ```

use crate::datetime::DateTimeValue;
use crate::element::{Element, ElementKind, Metadata, ProcessingInstruction};
use crate::pi::builtin::{DOCUMENT, PROPERTIES};
use crate::value::Value;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct Document {
    metadata: Metadata,
    root: Vec<Element>,
    instructions: Vec<ProcessingInstruction>,
    includes: Vec<String>,
    warnings: Vec<String>,
    ids: HashMap<String, Vec<usize>>,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && self.root == other.root
    }
}

impl Document {
    /// A document over the given root elements with empty metadata.
    ///
    /// Fails with [`Error::DuplicateId`] when two elements share an id, and
    /// with [`Error::TypeMismatch`] when an identifier appears anywhere but
    /// as a pair key, since it would read back as the start of a pair.
    pub fn new(root: Vec<Element>) -> Result<Self> {
        Document::from_parts(Metadata::default(), root, Vec::new(), Vec::new(), Vec::new())
    }

    pub(crate) fn from_parts(
        metadata: Metadata,
        root: Vec<Element>,
        instructions: Vec<ProcessingInstruction>,
        includes: Vec<String>,
        warnings: Vec<String>,
    ) -> Result<Self> {
        let mut document = Document {
            metadata,
            root,
            instructions,
            includes,
            warnings,
            ids: HashMap::new(),
        };
        document.reindex()?;
        Ok(document)
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn root(&self) -> &[Element] {
        &self.root
    }

    /// Mutable root elements. Call [`Document::reindex`] after changing ids.
    pub fn root_mut(&mut self) -> &mut Vec<Element> {
        &mut self.root
    }

    pub fn into_root(self) -> Vec<Element> {
        self.root
    }

    /// Every instruction read from the document, in source order, including
    /// ones that had no target or whose target was excluded.
    pub fn instructions(&self) -> &[ProcessingInstruction] {
        &self.instructions
    }

    /// The first instruction with the given keyword.
    pub fn instruction(&self, keyword: &str) -> Option<&ProcessingInstruction> {
        self.instructions.iter().find(|pi| pi.keyword() == keyword)
    }

    /// Paths named by `include` instructions. Nothing is loaded.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        let path = self.ids.get(id)?;
        let (first, rest) = path.split_first()?;
        self.root.get(*first)?.get_path(rest)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        let path = self.ids.get(id)?;
        let (first, rest) = path.split_first()?;
        let mut element = self.root.get_mut(*first)?;
        for &index in rest {
            element = element.child_mut(index)?;
        }
        Some(element)
    }

    /// Ids in use.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }

    /// Rebuilds the id index from the tree and checks that identifiers sit
    /// only in key position.
    pub fn reindex(&mut self) -> Result<()> {
        let mut ids: HashMap<String, Vec<usize>> = HashMap::new();
        let mut duplicate = None;
        let mut misplaced = false;
        for (index, element) in self.root.iter().enumerate() {
            element.walk(&mut |node, path| {
                // pair keys are not visited
                if matches!(node.kind(), ElementKind::Identifier(_)) {
                    misplaced = true;
                }
                let Some(id) = node.id() else { return };
                if ids.contains_key(id) {
                    duplicate.get_or_insert_with(|| id.to_string());
                    return;
                }
                let mut full = Vec::with_capacity(path.len() + 1);
                full.push(index);
                full.extend_from_slice(path);
                ids.insert(id.to_string(), full);
            });
        }
        if misplaced {
            return Err(Error::type_mismatch("a value element", "identifier"));
        }
        if let Some(id) = duplicate {
            return Err(Error::DuplicateId(id));
        }
        self.ids = ids;
        Ok(())
    }

    /// Free-form `properties` entries, merged in source order.
    pub fn properties(&self) -> IndexMap<String, String> {
        let mut properties = IndexMap::new();
        for pi in self.instructions.iter().filter(|pi| pi.keyword() == PROPERTIES) {
            if let Some(object) = pi.value().as_object() {
                for (key, value) in object.iter() {
                    properties.insert(key.to_string(), text_of(value));
                }
            }
        }
        properties
    }

    /// The typed view of the `document` instruction.
    pub fn document_properties(&self) -> DocumentProperties {
        self.instruction(DOCUMENT)
            .map(|pi| DocumentProperties::from_element(pi.value()))
            .unwrap_or_default()
    }
}

/// Well-known entries of a `<! document { ... } !>` instruction.
///
/// Unrecognized keys are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
    pub author: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub profile: Option<String>,
    pub environment: Option<String>,
    pub license: Option<String>,
    pub created_at: Option<DateTimeValue>,
    pub updated_at: Option<DateTimeValue>,
    pub extra: IndexMap<String, Element>,
}

impl DocumentProperties {
    fn from_element(element: &Element) -> Self {
        let mut properties = DocumentProperties::default();
        let Some(object) = element.as_object() else {
            return properties;
        };
        for (key, value) in object.iter() {
            match key {
                "title" => properties.title = Some(text_of(value)),
                "description" => properties.description = Some(text_of(value)),
                "version" => properties.version = Some(text_of(value)),
                "id" => properties.id = Some(text_of(value)),
                "author" => properties.author = Some(text_of(value)),
                "authors" => properties.authors = texts_of(value),
                "tags" => properties.tags = texts_of(value),
                "profile" => properties.profile = Some(text_of(value)),
                "environment" => properties.environment = Some(text_of(value)),
                "license" => properties.license = Some(text_of(value)),
                "createdAt" => properties.created_at = date_of(value),
                "updatedAt" => properties.updated_at = date_of(value),
                _ => {
                    properties.extra.insert(key.to_string(), value.clone());
                }
            }
        }
        properties
    }
}

fn text_of(element: &Element) -> String {
    match element.as_str() {
        Some(text) => text.to_string(),
        None => Value::from_element(element).to_string(),
    }
}

fn texts_of(element: &Element) -> Vec<String> {
    if element.is_collection() {
        element.children().into_iter().map(text_of).collect()
    } else {
        vec![text_of(element)]
    }
}

fn date_of(element: &Element) -> Option<DateTimeValue> {
    element
        .as_datetime()
        .cloned()
        .or_else(|| element.as_str().and_then(|text| text.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, ElementStyle, KeyValuePair};

    #[test]
    fn test_identifier_outside_key_position_is_rejected() {
        let tuple = Element::tuple(vec![Element::identifier("x"), Element::integer(1)]);
        assert!(matches!(Document::new(vec![tuple]), Err(Error::TypeMismatch { .. })));
        let pair = Element::pair("a", Element::identifier("b"));
        assert!(matches!(Document::new(vec![pair]), Err(Error::TypeMismatch { .. })));
        assert!(Document::new(vec![Element::identifier("x")]).is_err());

        let mut doc = Document::new(vec![Element::tuple(vec![])]).unwrap();
        doc.root_mut()[0]
            .as_tuple_mut()
            .unwrap()
            .push(Element::identifier("late"));
        assert!(doc.reindex().is_err());
    }

    #[test]
    fn test_identifier_keys_round_trip() {
        let key = Element::identifier("name").with_element_style(ElementStyle::Compact);
        let pair = KeyValuePair::with_key_element(key, Element::keyword("b")).unwrap();
        let tuple = Element::tuple(vec![
            Element::new(ElementKind::KeyValuePair(pair)),
            Element::pair("a", Element::integer(1)),
        ]);
        let doc = Document::new(vec![tuple]).unwrap();
        let text = crate::to_string(&doc);
        assert_eq!(parse(&text).unwrap(), doc, "{}", text);
    }

    #[test]
    fn test_find_by_id_nested() {
        let doc = parse("{ db { <! id \"conn\" !> primary { host \"a\" } } }").unwrap();
        let found = doc.find_by_id("conn").unwrap();
        assert!(found.is_pair());
        assert_eq!(found.get("primary").unwrap().get("host").unwrap().as_str(), Some("a"));
        assert!(doc.find_by_id("missing").is_none());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let err = parse("<! id \"x\" !> 1 <! id \"x\" !> 2").unwrap_err();
        assert_eq!(err, Error::DuplicateId("x".into()));
    }

    #[test]
    fn test_reindex_after_edit() {
        let mut doc = parse("( 1 2 )").unwrap();
        doc.root_mut()[0]
            .as_tuple_mut()
            .unwrap()
            .get_mut(1)
            .unwrap()
            .set_id("second");
        assert!(doc.find_by_id("second").is_none());
        doc.reindex().unwrap();
        assert_eq!(doc.find_by_id("second").and_then(|e| e.as_i64()), Some(2));
        doc.find_by_id_mut("second").unwrap().set_tag("edited");
        assert_eq!(doc.root()[0].child(1).unwrap().tag(), Some("edited"));
    }

    #[test]
    fn test_document_properties() {
        let doc = parse(
            "<! document { title \"T\" authors [ \"a\" \"b\" ] createdAt @2024-01-02@ \
             owner \"ops\" } !> { }",
        )
        .unwrap();
        let props = doc.document_properties();
        assert_eq!(props.title.as_deref(), Some("T"));
        assert_eq!(props.authors, vec!["a", "b"]);
        assert!(props.created_at.is_some());
        assert!(matches!(
            props.extra.get("owner").map(Element::kind),
            Some(ElementKind::String(_))
        ));
    }

    #[test]
    fn test_properties_merge() {
        let doc = parse(
            "<! properties { env \"prod\" port 80 } !> <! properties { env \"dev\" } !> { }",
        )
        .unwrap();
        let properties = doc.properties();
        assert_eq!(properties.get("env").map(String::as_str), Some("dev"));
        assert_eq!(properties.get("port").map(String::as_str), Some("80"));
        assert_eq!(doc.instructions().len(), 2);
    }
}
