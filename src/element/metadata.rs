use super::Element;
use crate::pi::Effect;
use indexmap::IndexMap;

/// Format version written by [`Metadata::new`].
pub const FORMAT_VERSION: &str = "0.11";

const VERSION_KEY: &str = "xfer";
const ENCODING_KEY: &str = "encoding";

/// The document header block, `<! xfer "0.11" ... !>`.
///
/// `xfer` and `encoding` are reserved keys; every other key lands in
/// [`Metadata::extensions`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub extensions: IndexMap<String, Element>,
}

impl Metadata {
    /// Metadata stamped with the current format version and UTF-8 encoding.
    pub fn new() -> Self {
        Metadata {
            version: Some(FORMAT_VERSION.to_string()),
            encoding: Some("UTF-8".to_string()),
            extensions: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.encoding.is_none() && self.extensions.is_empty()
    }

    /// Stores one header entry; reserved keys only accept text values.
    pub fn set(&mut self, key: &str, value: Element) {
        match (key, value.as_str()) {
            (VERSION_KEY, Some(text)) => self.version = Some(text.to_string()),
            (ENCODING_KEY, Some(text)) => self.encoding = Some(text.to_string()),
            _ => {
                self.extensions.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Element> {
        match key {
            VERSION_KEY => self.version.as_deref().map(Element::string),
            ENCODING_KEY => self.encoding.as_deref().map(Element::string),
            _ => self.extensions.get(key).cloned(),
        }
    }

    /// Header entries in output order: version, encoding, then extensions.
    pub fn entries(&self) -> Vec<(String, Element)> {
        let mut entries = Vec::with_capacity(self.extensions.len() + 2);
        if let Some(version) = &self.version {
            entries.push((VERSION_KEY.to_string(), Element::string(version.as_str())));
        }
        if let Some(encoding) = &self.encoding {
            entries.push((ENCODING_KEY.to_string(), Element::string(encoding.as_str())));
        }
        entries.extend(
            self.extensions
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        entries
    }
}

/// A `<! keyword value !>` block.
///
/// Parsed instructions keep the effects their handler produced.
#[derive(Clone, Debug)]
pub struct ProcessingInstruction {
    keyword: String,
    value: Box<Element>,
    effects: Vec<Effect>,
}

impl ProcessingInstruction {
    pub fn new(keyword: impl Into<String>, value: Element) -> Self {
        ProcessingInstruction {
            keyword: keyword.into(),
            value: Box::new(value),
            effects: Vec::new(),
        }
    }

    pub(crate) fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn value(&self) -> &Element {
        &self.value
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

impl PartialEq for ProcessingInstruction {
    fn eq(&self, other: &Self) -> bool {
        self.keyword == other.keyword && self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_keys() {
        let mut metadata = Metadata::default();
        assert!(metadata.is_empty());
        metadata.set("xfer", Element::string("1.0"));
        metadata.set("author", Element::string("Ada"));
        metadata.set("encoding", Element::integer(8));
        assert_eq!(metadata.version.as_deref(), Some("1.0"));
        assert!(metadata.encoding.is_none());
        assert_eq!(metadata.extensions.len(), 2);

        let keys: Vec<_> = metadata.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["xfer", "author", "encoding"]);
    }

    #[test]
    fn test_new_stamps_version() {
        let metadata = Metadata::new();
        assert_eq!(metadata.get("xfer"), Some(Element::string(FORMAT_VERSION)));
        assert_eq!(metadata.get("encoding").unwrap().as_str(), Some("UTF-8"));
    }
}
