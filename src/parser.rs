//! Recursive-descent parser from text to [`Document`].
//!
//! The parser reads one element at a time, dispatching on the first
//! character: `<` opens an explicit element, a metadata or instruction
//! block, or a comment; a specifier opens a compact element; a bare word is
//! a key; digits, signs, `$` and `%` start an implicit integer.
//!
//! Processing instructions are interpreted as soon as their block closes.
//! Context effects (`charDef`, `dynamicSource`, includes, warnings) apply
//! right away; target effects wait for the next element at the same level.

use crate::context::ParseContext;
use crate::document::Document;
use crate::element::{
    ArrayElement, Element, ElementKind, ElementStyle, KeyValuePair, Metadata, ObjectElement,
    ProcessingInstruction,
};
use crate::grammar::{self, *};
use crate::number::{parse_integer, IntegerValue, LongValue};
use crate::pi::Effect;
use crate::scanner::Scanner;
use crate::value::Value;
use crate::{Error, Result};
use tracing::{debug, trace, warn};

type Position = (usize, usize);

/// What one step of a sequence produced.
enum Item {
    Element(Element),
    /// An element removed by a conditional instruction.
    Excluded,
    Instruction(ProcessingInstruction),
    Metadata(Metadata),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Container {
    Document,
    Object,
    Array,
    Tuple,
    Block,
}

impl Container {
    /// Whether string and keyword elements start key/value pairs here.
    fn is_keyed(self) -> bool {
        matches!(self, Container::Object | Container::Block)
    }
}

#[derive(Clone, Copy, Debug)]
enum Closing {
    Eof,
    Bracket(char),
    Explicit(char),
    Block(usize),
}

impl Closing {
    fn describe(self) -> String {
        match self {
            Closing::Eof => "end of input".to_string(),
            Closing::Bracket(ch) => format!("'{}'", ch),
            Closing::Explicit(ch) => format!("'{}{}'", ch, ELEMENT_CLOSE),
            Closing::Block(count) => {
                format!("'{}{}'", METADATA.to_string().repeat(count), ELEMENT_CLOSE)
            }
        }
    }
}

pub(crate) struct Parser<'a, 'c> {
    scanner: Scanner<'a>,
    context: &'c mut ParseContext,
    metadata: Metadata,
    instructions: Vec<ProcessingInstruction>,
    includes: Vec<String>,
    warnings: Vec<String>,
}

impl<'a, 'c> Parser<'a, 'c> {
    pub(crate) fn new(input: &'a str, context: &'c mut ParseContext) -> Self {
        Parser {
            scanner: Scanner::new(input),
            context,
            metadata: Metadata::default(),
            instructions: Vec::new(),
            includes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn parse_document(mut self) -> Result<Document> {
        debug!("parsing document");
        let root = self
            .parse_sequence(Container::Document, Closing::Eof)?
            .into_iter()
            .map(|(element, _)| element)
            .collect();
        let document = Document::from_parts(
            self.metadata,
            root,
            self.instructions,
            self.includes,
            self.warnings,
        )?;
        debug!(
            elements = document.root().len(),
            instructions = document.instructions().len(),
            "parsed document"
        );
        Ok(document)
    }

    fn parse_sequence(
        &mut self,
        container: Container,
        closing: Closing,
    ) -> Result<Vec<(Element, Position)>> {
        let mut items = Vec::new();
        let mut pending: Vec<ProcessingInstruction> = Vec::new();
        let mut first = true;
        loop {
            self.skip_trivia()?;
            if self.at_closing(closing) {
                self.consume_closing(closing);
                break;
            }
            let at = self.scanner.position();
            if self.scanner.at_end() {
                return Err(Error::unexpected_eof(at.0, at.1, &closing.describe()));
            }
            match self.parse_item(container)? {
                Item::Metadata(metadata) => {
                    if container != Container::Document || !first {
                        return Err(Error::MetadataNotFirst {
                            line: at.0,
                            col: at.1,
                        });
                    }
                    self.metadata = metadata;
                }
                Item::Instruction(instruction) => pending.push(instruction),
                Item::Excluded => {
                    if !pending.is_empty() {
                        debug!(count = pending.len(), "instructions lost their excluded target");
                        pending.clear();
                    }
                }
                Item::Element(element) => {
                    if let Some(element) = self.bind(std::mem::take(&mut pending), element)? {
                        items.push((element, at));
                    }
                }
            }
            first = false;
        }
        if !pending.is_empty() {
            debug!(count = pending.len(), "instructions without a target");
        }
        Ok(items)
    }

    fn parse_item(&mut self, container: Container) -> Result<Item> {
        let at = self.scanner.position();
        if self.scanner.current() == Some(ELEMENT_OPEN) && self.scanner.peek() == Some(METADATA) {
            return self.parse_block(at);
        }
        Ok(match self.parse_value(container.is_keyed())? {
            Some(element) => Item::Element(element),
            None => Item::Excluded,
        })
    }

    /// Parses an element, turning key tokens into key/value pairs.
    fn parse_value(&mut self, keyed: bool) -> Result<Option<Element>> {
        let element = self.parse_element()?;
        let is_key = match element.kind() {
            ElementKind::Identifier(_) => true,
            ElementKind::String(_) | ElementKind::Keyword(_) => keyed,
            _ => false,
        };
        if is_key {
            self.parse_pair(element)
        } else {
            Ok(Some(element))
        }
    }

    fn parse_pair(&mut self, key: Element) -> Result<Option<Element>> {
        let mut pending = Vec::new();
        loop {
            self.skip_trivia()?;
            let at = self.scanner.position();
            match self.scanner.current() {
                None => {
                    let expected = format!("a value for key '{}'", key.as_str().unwrap_or_default());
                    return Err(Error::unexpected_eof(at.0, at.1, &expected));
                }
                Some(ELEMENT_OPEN) if self.scanner.peek() == Some(METADATA) => {
                    match self.parse_block(at)? {
                        Item::Instruction(instruction) => pending.push(instruction),
                        _ => {
                            return Err(Error::MetadataNotFirst {
                                line: at.0,
                                col: at.1,
                            })
                        }
                    }
                }
                Some(OBJECT_CLOSE | ARRAY_CLOSE | TUPLE_CLOSE) => {
                    return Err(self.syntax_error(
                        at,
                        &format!("missing value for key '{}'", key.as_str().unwrap_or_default()),
                        None,
                    ));
                }
                Some(_) => break,
            }
        }
        let value = match self.parse_value(false)? {
            Some(value) => value,
            None => return Ok(None),
        };
        let value = match self.bind(pending, value)? {
            Some(value) => value,
            None => {
                debug!(key = key.as_str().unwrap_or_default(), "pair excluded with its value");
                return Ok(None);
            }
        };
        let pair = KeyValuePair::with_key_element(key, value)?;
        Ok(Some(Element::with_style(
            ElementKind::KeyValuePair(pair),
            ElementStyle::Implicit,
        )))
    }

    fn parse_element(&mut self) -> Result<Element> {
        let at = self.scanner.position();
        let ch = self
            .scanner
            .current()
            .ok_or_else(|| Error::unexpected_eof(at.0, at.1, "an element"))?;
        trace!(line = at.0, col = at.1, ch = %ch, "element");
        match ch {
            ELEMENT_OPEN => self.parse_explicit(at),
            OBJECT_OPEN | ARRAY_OPEN | TUPLE_OPEN => {
                self.scanner.advance();
                self.parse_collection(ch, Closing::Bracket(closer(ch)), ElementStyle::Compact)
            }
            STRING | IDENTIFIER | KEYWORD | INTERPOLATED | DYNAMIC | DATE => {
                self.parse_compact_text(ch, at)
            }
            INTEGER | LONG | DECIMAL | DOUBLE | BOOLEAN | NULL | CHARACTER => {
                self.parse_compact_scalar(ch, at)
            }
            c if is_bare_word_start(c) => {
                self.scanner.mark();
                while self.scanner.current().is_some_and(is_bare_word_char) {
                    self.scanner.bump();
                }
                let word = self.scanner.capture().to_string();
                Ok(Element::with_style(
                    ElementKind::Identifier(word),
                    ElementStyle::Implicit,
                ))
            }
            c if is_integer_start(c) => self.parse_implicit_integer(at),
            _ => Err(self.syntax_error(at, &format!("unexpected character '{}'", ch), None)),
        }
    }

    fn parse_collection(
        &mut self,
        open: char,
        closing: Closing,
        style: ElementStyle,
    ) -> Result<Element> {
        let container = match open {
            OBJECT_OPEN => Container::Object,
            ARRAY_OPEN => Container::Array,
            _ => Container::Tuple,
        };
        let items = self.parse_sequence(container, closing)?;
        let kind = match container {
            Container::Object => {
                let mut object = ObjectElement::new();
                for (item, (line, col)) in items {
                    if !item.is_pair() {
                        return Err(Error::KeyTypeMismatch {
                            line,
                            col,
                            found: item.name().to_string(),
                        });
                    }
                    object.add_pair(item)?;
                }
                ElementKind::Object(object)
            }
            Container::Array => {
                let mut array = ArrayElement::new();
                for (item, _) in items {
                    array.push(item)?;
                }
                ElementKind::Array(array)
            }
            _ => ElementKind::Tuple(items.into_iter().map(|(item, _)| item).collect()),
        };
        Ok(Element::with_style(kind, style))
    }

    fn parse_explicit(&mut self, at: Position) -> Result<Element> {
        self.scanner.bump();
        let specifier = self
            .scanner
            .current()
            .ok_or_else(|| Error::unexpected_eof(at.0, at.1, "an element specifier"))?;
        match specifier {
            OBJECT_OPEN | ARRAY_OPEN | TUPLE_OPEN => {
                self.scanner.advance();
                self.parse_collection(
                    specifier,
                    Closing::Explicit(closer(specifier)),
                    ElementStyle::Explicit,
                )
            }
            METADATA => Err(self.syntax_error(
                at,
                "processing instruction is not allowed here",
                None,
            )),
            STRING | IDENTIFIER | KEYWORD | INTERPOLATED | DYNAMIC | DATE | INTEGER | LONG
            | DECIMAL | DOUBLE | BOOLEAN | NULL | CHARACTER => {
                let content = self.read_explicit(specifier, at)?;
                self.finish(specifier, content, ElementStyle::Explicit, at)
            }
            _ => Err(self.syntax_error(
                at,
                &format!("unknown element specifier '{}'", specifier),
                Some("strings are written <\"text\">, integers <#42#>"),
            )),
        }
    }

    /// Reads explicit content up to the earliest specifier run followed by `>`.
    fn read_explicit(&mut self, specifier: char, at: Position) -> Result<String> {
        let run = self.scanner.count_run(specifier);
        if self.scanner.peek_nth(run) == Some(ELEMENT_CLOSE) {
            if run % 2 == 0 {
                self.scanner.bump_n(run + 1);
                return Ok(String::new());
            }
            return Err(self.syntax_error(at, "unbalanced specifiers in empty element", None));
        }
        self.scanner.bump_n(run);
        self.scanner.mark();
        loop {
            if self.scanner.at_end() {
                let (line, col) = self.scanner.position();
                let expected = format!("'{}{}'", specifier.to_string().repeat(run), ELEMENT_CLOSE);
                return Err(Error::unexpected_eof(line, col, &expected));
            }
            if self.scanner.count_run(specifier) >= run
                && self.scanner.peek_nth(run) == Some(ELEMENT_CLOSE)
            {
                break;
            }
            self.scanner.bump();
        }
        let content = strip_padding(self.scanner.capture());
        self.scanner.bump_n(run + 1);
        Ok(content)
    }

    fn parse_compact_text(&mut self, specifier: char, at: Position) -> Result<Element> {
        let run = self.scanner.count_run(specifier);
        let after = self.scanner.peek_nth(run);
        if run % 2 == 0 && after.map_or(true, is_token_terminator) {
            self.scanner.bump_n(run);
            return self.finish(specifier, String::new(), ElementStyle::Compact, at);
        }
        self.scanner.bump_n(run);
        self.scanner.mark();
        loop {
            if self.scanner.at_end() {
                let (line, col) = self.scanner.position();
                let expected = format!("closing '{}'", specifier.to_string().repeat(run));
                return Err(Error::unexpected_eof(line, col, &expected));
            }
            let found = self.scanner.count_run(specifier);
            if found >= run {
                // A longer run closes on its last `run` characters.
                self.scanner.bump_n(found - run);
                break;
            }
            self.scanner.bump();
        }
        let content = self.scanner.capture().to_string();
        self.scanner.bump_n(run);
        self.finish(specifier, content, ElementStyle::Compact, at)
    }

    /// Numbers, booleans, null and characters: one specifier, a token, and
    /// an optional closing specifier.
    fn parse_compact_scalar(&mut self, specifier: char, at: Position) -> Result<Element> {
        self.scanner.bump();
        self.scanner.mark();
        while let Some(ch) = self.scanner.current() {
            if is_token_terminator(ch) || ch == specifier {
                break;
            }
            self.scanner.bump();
        }
        let content = self.scanner.capture().to_string();
        if self.scanner.current() == Some(specifier) {
            self.scanner.bump();
        }
        self.finish(specifier, content, ElementStyle::Compact, at)
    }

    fn parse_implicit_integer(&mut self, at: Position) -> Result<Element> {
        self.scanner.mark();
        while self
            .scanner
            .current()
            .is_some_and(|ch| !is_token_terminator(ch))
        {
            self.scanner.bump();
        }
        let text = self.scanner.capture();
        let kind = match parse_integer(text) {
            Some((value, base, digits)) => {
                if let Ok(value) = i32::try_from(value) {
                    ElementKind::Integer(IntegerValue::with_base(value, base, digits))
                } else if let Ok(value) = i64::try_from(value) {
                    ElementKind::Long(LongValue::with_base(value, base, digits))
                } else {
                    return Err(self.syntax_error(
                        at,
                        &format!("integer '{}' is out of range", text),
                        None,
                    ));
                }
            }
            None => {
                return Err(self.syntax_error(
                    at,
                    &format!("invalid number '{}'", text),
                    Some("write decimals as *1.5 and floating-point values as ^1.5"),
                ))
            }
        };
        Ok(Element::with_style(kind, ElementStyle::Implicit))
    }

    /// Builds the element for a specifier and its raw content.
    fn finish(
        &mut self,
        specifier: char,
        content: String,
        style: ElementStyle,
        at: Position,
    ) -> Result<Element> {
        let kind = match specifier {
            STRING => ElementKind::String(content),
            IDENTIFIER => ElementKind::Identifier(content),
            KEYWORD => ElementKind::Keyword(content),
            INTERPOLATED => ElementKind::Interpolated(self.expand(&content)?),
            DYNAMIC => {
                let value = self.resolve_dynamic(&content);
                ElementKind::Dynamic {
                    name: content,
                    value,
                }
            }
            DATE => match content.trim().parse() {
                Ok(value) => ElementKind::DateTime(value),
                Err(_) => return Err(self.invalid(at, "date", &content)),
            },
            CHARACTER => ElementKind::Character(self.code_point(content.trim(), at)?),
            _ => {
                let text = self.indirect(&content);
                self.scalar(specifier, text.trim(), at)?
            }
        };
        Ok(Element::with_style(kind, style))
    }

    fn scalar(&self, specifier: char, text: &str, at: Position) -> Result<ElementKind> {
        let kind = match specifier {
            INTEGER => parse_integer(text)
                .and_then(|(value, base, digits)| {
                    i32::try_from(value)
                        .ok()
                        .map(|value| IntegerValue::with_base(value, base, digits))
                })
                .map(ElementKind::Integer),
            LONG => parse_integer(text)
                .and_then(|(value, base, digits)| {
                    i64::try_from(value)
                        .ok()
                        .map(|value| LongValue::with_base(value, base, digits))
                })
                .map(ElementKind::Long),
            DECIMAL => text.parse().ok().map(ElementKind::Decimal),
            DOUBLE => text.parse().ok().map(ElementKind::Double),
            BOOLEAN => {
                if text.eq_ignore_ascii_case("true") {
                    Some(ElementKind::Boolean(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Some(ElementKind::Boolean(false))
                } else {
                    None
                }
            }
            NULL if text.is_empty() => Some(ElementKind::Null),
            _ => None,
        };
        kind.ok_or_else(|| {
            let name = match specifier {
                INTEGER => "integer",
                LONG => "long",
                DECIMAL => "decimal",
                DOUBLE => "double",
                BOOLEAN => "boolean",
                _ => "null",
            };
            self.invalid(at, name, text)
        })
    }

    /// A character name or a decimal, `$hex` or `%binary` code point.
    fn code_point(&self, text: &str, at: Position) -> Result<u32> {
        let first = text
            .chars()
            .next()
            .ok_or_else(|| self.syntax_error(at, "empty character element", None))?;
        if first.is_alphabetic() {
            return self.context.characters().resolve(text).ok_or_else(|| {
                self.syntax_error(
                    at,
                    &format!("unknown character name '{}'", text),
                    Some("define it with <! charDef { name \\$2192 } !>"),
                )
            });
        }
        parse_integer(text)
            .and_then(|(value, _, _)| u32::try_from(value).ok())
            .filter(|&cp| char::from_u32(cp).is_some())
            .ok_or_else(|| {
                self.syntax_error(
                    at,
                    &format!("'{}' is not a Unicode scalar value", text),
                    None,
                )
            })
    }

    /// Scalar content written as `|name|` reads the resolved dynamic value.
    fn indirect(&self, content: &str) -> String {
        let trimmed = content.trim();
        let inner = trimmed
            .strip_prefix(DYNAMIC)
            .and_then(|rest| rest.strip_suffix(DYNAMIC));
        match inner {
            Some(name) if trimmed.len() >= 2 => self.resolve_dynamic(name).unwrap_or_default(),
            _ => content.to_string(),
        }
    }

    fn resolve_dynamic(&self, name: &str) -> Option<String> {
        let value = self.context.sources().resolve(name);
        if value.is_none() {
            debug!(name, "dynamic value did not resolve");
        }
        value
    }

    /// Expands embedded explicit elements and drops comments in
    /// interpolated text.
    fn expand(&mut self, content: &str) -> Result<String> {
        if !content.contains(ELEMENT_OPEN) {
            return Ok(content.to_string());
        }
        let mut inner = Parser::new(content, &mut *self.context);
        inner.expand_all()
    }

    fn expand_all(&mut self) -> Result<String> {
        let mut out = String::new();
        while let Some(ch) = self.scanner.current() {
            if ch == ELEMENT_OPEN {
                match self.scanner.peek() {
                    Some(COMMENT) => {
                        self.skip_comment()?;
                        continue;
                    }
                    Some(specifier) if is_embeddable(specifier) => {
                        let element = self.parse_element()?;
                        out.push_str(&embedded_text(&element));
                        continue;
                    }
                    _ => {}
                }
            }
            out.push(ch);
            self.scanner.bump();
        }
        Ok(out)
    }

    /// Parses a `<! ... !>` block into metadata or a processing instruction.
    fn parse_block(&mut self, at: Position) -> Result<Item> {
        self.scanner.bump();
        let run = self.scanner.count_run(METADATA);
        if run % 2 == 0 && self.scanner.peek_nth(run) == Some(ELEMENT_CLOSE) {
            self.scanner.bump_n(run + 1);
            return Ok(Item::Metadata(Metadata::default()));
        }
        self.scanner.bump_n(run);
        let mut pairs = Vec::new();
        for (item, (line, col)) in self.parse_sequence(Container::Block, Closing::Block(run))? {
            match item.into_kind() {
                ElementKind::KeyValuePair(pair) => pairs.push(pair),
                other => {
                    return Err(Error::KeyTypeMismatch {
                        line,
                        col,
                        found: other.name().to_string(),
                    })
                }
            }
        }

        let handler = pairs
            .first()
            .and_then(|pair| self.context.instructions().get(pair.key()));
        let Some(handler) = handler else {
            let mut metadata = Metadata::default();
            for pair in pairs {
                let key = pair.key().to_string();
                metadata.set(&key, pair.into_value());
            }
            return Ok(Item::Metadata(metadata));
        };
        if pairs.len() > 1 {
            return Err(self.syntax_error(
                at,
                &format!(
                    "processing instruction '{}' must hold a single key/value pair",
                    pairs[0].key()
                ),
                None,
            ));
        }
        let pair = pairs.remove(0);
        let effects = handler.interpret(&pair, &*self.context)?;
        debug!(keyword = pair.key(), effects = effects.len(), "processing instruction");
        for effect in &effects {
            self.apply(effect);
        }
        let keyword = pair.key().to_string();
        let instruction = ProcessingInstruction::new(keyword, pair.into_value()).with_effects(effects);
        self.instructions.push(instruction.clone());
        Ok(Item::Instruction(instruction))
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::DefineCharacters(_) | Effect::ConfigureSource(..) | Effect::Bind(..) => {
                self.context.apply(effect)
            }
            Effect::Include(path) => {
                debug!(path = path.as_str(), "include recorded");
                self.includes.push(path.clone());
            }
            Effect::Warn(message) => {
                warn!(message = message.as_str(), "document warning");
                self.warnings.push(message.clone());
            }
            _ => {}
        }
    }

    /// Applies pending target effects; `None` when the target is excluded.
    fn bind(
        &self,
        pending: Vec<ProcessingInstruction>,
        mut target: Element,
    ) -> Result<Option<Element>> {
        let mut excluded = false;
        for instruction in &pending {
            for effect in instruction.effects() {
                match effect {
                    Effect::SetId(id) => target.set_id(id.clone()),
                    Effect::SetTag(tag) => {
                        if let Some(existing) = target.tag() {
                            return Err(Error::instruction(
                                instruction.keyword(),
                                format!("element is already tagged '{}'", existing),
                            ));
                        }
                        target.set_tag(tag.clone());
                    }
                    Effect::ExcludeTarget => excluded = true,
                    _ => {}
                }
            }
        }
        if excluded {
            debug!(kind = target.name(), "element excluded by instruction");
            return Ok(None);
        }
        for instruction in pending {
            target.push_instruction(instruction);
        }
        Ok(Some(target))
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.current() == Some(ELEMENT_OPEN) && self.scanner.peek() == Some(COMMENT)
            {
                self.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.scanner.bump();
        let run = self.scanner.count_run(COMMENT);
        if run % 2 == 0 && self.scanner.peek_nth(run) == Some(ELEMENT_CLOSE) {
            self.scanner.bump_n(run + 1);
            return Ok(());
        }
        self.scanner.bump_n(run);
        loop {
            if self.scanner.at_end() {
                let (line, col) = self.scanner.position();
                return Err(Error::unexpected_eof(line, col, "end of comment"));
            }
            if self.scanner.count_run(COMMENT) >= run
                && self.scanner.peek_nth(run) == Some(ELEMENT_CLOSE)
            {
                self.scanner.bump_n(run + 1);
                return Ok(());
            }
            self.scanner.bump();
        }
    }

    fn at_closing(&self, closing: Closing) -> bool {
        match closing {
            Closing::Eof => self.scanner.at_end(),
            Closing::Bracket(ch) => self.scanner.current() == Some(ch),
            Closing::Explicit(ch) => {
                self.scanner.current() == Some(ch) && self.scanner.peek() == Some(ELEMENT_CLOSE)
            }
            Closing::Block(run) => {
                self.scanner.count_run(METADATA) >= run
                    && self.scanner.peek_nth(run) == Some(ELEMENT_CLOSE)
            }
        }
    }

    fn consume_closing(&mut self, closing: Closing) {
        match closing {
            Closing::Eof => {}
            Closing::Bracket(_) => {
                self.scanner.bump();
            }
            Closing::Explicit(_) => self.scanner.bump_n(2),
            Closing::Block(run) => self.scanner.bump_n(run + 1),
        }
    }

    fn syntax_error(&self, at: Position, msg: &str, suggestion: Option<&str>) -> Error {
        Error::syntax_with_context(at.0, at.1, msg, self.scanner.line_context(), suggestion)
    }

    fn invalid(&self, at: Position, kind: &str, text: &str) -> Error {
        Error::syntax(at.0, at.1, &format!("invalid {} value '{}'", kind, text))
    }
}

fn closer(open: char) -> char {
    match open {
        OBJECT_OPEN => OBJECT_CLOSE,
        ARRAY_OPEN => ARRAY_CLOSE,
        _ => TUPLE_CLOSE,
    }
}

/// Strips one space from each end of explicit content padded on both sides.
fn strip_padding(raw: &str) -> String {
    if raw.chars().count() >= 2 && raw.starts_with(' ') && raw.ends_with(' ') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

fn is_embeddable(specifier: char) -> bool {
    specifier != grammar::IDENTIFIER
        && specifier != METADATA
        && specifier != COMMENT
        && OPENERS.contains(&specifier)
        && !matches!(specifier, OBJECT_OPEN | ARRAY_OPEN | TUPLE_OPEN | HEX_PREFIX | BINARY_PREFIX)
}

/// The text an embedded element contributes to interpolated content.
fn embedded_text(element: &Element) -> String {
    match element.kind() {
        ElementKind::Null => String::new(),
        ElementKind::Character(_) => element.as_char().map(String::from).unwrap_or_default(),
        _ => match element.as_str() {
            Some(text) => text.to_string(),
            None => Value::from_element(element).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, parse_with_context, ElementKind, Error, ParseContext, SourceConfig};

    fn first(input: &str) -> crate::Element {
        parse(input).unwrap().root()[0].clone()
    }

    #[test]
    fn test_compact_and_explicit_strings() {
        assert_eq!(first("\"hello\"").as_str(), Some("hello"));
        assert_eq!(first("<\"hello\">").as_str(), Some("hello"));
        assert_eq!(first("\"\"say \"hi\"\"\"").as_str(), Some("say \"hi\""));
        assert_eq!(first("<\"\">").as_str(), Some(""));
        assert_eq!(first("\"\"").as_str(), Some(""));
    }

    #[test]
    fn test_longer_run_closes_on_last_specifiers() {
        let doc = parse("( \"\"x\"\"\" 1 \"\"a \"b\"\"\" )").unwrap();
        let items = doc.root()[0].as_tuple().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_str(), Some("x\""));
        assert_eq!(items[1].as_i64(), Some(1));
        assert_eq!(items[2].as_str(), Some("a \"b\""));
    }

    #[test]
    fn test_explicit_padding_is_stripped() {
        assert_eq!(first("<\" \"quoted\" \">").as_str(), Some("\"quoted\""));
        assert_eq!(first("<\"  x  \">").as_str(), Some(" x "));
        assert_eq!(first("<\" x\">").as_str(), Some(" x"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(first("42").as_i64(), Some(42));
        assert_eq!(first("-7").as_i64(), Some(-7));
        assert_eq!(first("$FF").as_i64(), Some(255));
        assert_eq!(first("%1010").as_i64(), Some(10));
        assert_eq!(first("#42").as_i64(), Some(42));
        assert_eq!(first("<#42#>").as_i64(), Some(42));
        assert_eq!(first("&5000000000").as_i64(), Some(5_000_000_000));
        assert_eq!(first("^2.5").as_f64(), Some(2.5));
        assert_eq!(first("*12.50").as_f64(), Some(12.5));
        assert!(matches!(first("3000000000").kind(), ElementKind::Long(_)));
    }

    #[test]
    fn test_booleans_null_dates() {
        assert_eq!(first("~true").as_bool(), Some(true));
        assert_eq!(first("~FALSE").as_bool(), Some(false));
        assert!(first("?").is_null());
        assert!(first("<??>").is_null());
        assert!(first("@2024-03-01@").as_datetime().is_some());
        assert!(parse("~maybe").is_err());
    }

    #[test]
    fn test_characters() {
        assert_eq!(first("\\$41").as_char(), Some('A'));
        assert_eq!(first("\\65").as_char(), Some('A'));
        assert_eq!(first("\\tab").as_char(), Some('\t'));
        assert!(parse("\\nosuchname").is_err());
        assert!(parse("\\$D800").is_err());
    }

    #[test]
    fn test_objects_and_pairs() {
        let root = first("{ name \"Alice\" \"full name\" \"A. B.\" =odd key= 1 }");
        let object = root.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object.get("full name").and_then(|v| v.as_str()), Some("A. B."));
        assert_eq!(object.get("odd key").and_then(|v| v.as_i64()), Some(1));
    }

    #[test]
    fn test_object_member_must_be_pair() {
        let err = parse("{ name \"a\" 42 }").unwrap_err();
        assert!(matches!(err, Error::KeyTypeMismatch { line: 1, col: 12, .. }));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        assert!(matches!(
            parse("{ a 1 a 2 }"),
            Err(Error::DuplicateKey(_))
        ));
    }

    #[test]
    fn test_array_homogeneity() {
        assert_eq!(first("[ 1 2 3 ]").as_array().unwrap().len(), 3);
        assert!(matches!(
            parse("[ 1 \"two\" ]"),
            Err(Error::ArrayTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_comments_are_skipped() {
        let doc = parse("</ leading /> { a </ inner /> 1 } <// has / slash //>").unwrap();
        assert_eq!(doc.root().len(), 1);
    }

    #[test]
    fn test_metadata_must_come_first() {
        let doc = parse("<! xfer \"0.11\" author \"Ada\" !> { }").unwrap();
        assert_eq!(doc.metadata().version.as_deref(), Some("0.11"));
        let err = parse("{ } <! xfer \"0.11\" !>").unwrap_err();
        assert!(matches!(err, Error::MetadataNotFirst { line: 1, col: 5 }));
    }

    #[test]
    fn test_interpolated_expansion() {
        let input = "'Total: <#3#> items <\"now\"></ note />'";
        assert_eq!(first(input).as_str(), Some("Total: 3 items now"));
        assert_eq!(first("'a <\\$3C\\> b'").as_str(), Some("a < b"));
    }

    #[test]
    fn test_dynamic_and_indirect_numbers() {
        let mut context = ParseContext::new()
            .with_source("port", SourceConfig::constant("8080"))
            .with_source("name", SourceConfig::constant("svc"));
        let doc = parse_with_context("( |name| #|port| <#|port|#> )", &mut context).unwrap();
        let items = doc.root()[0].as_tuple().unwrap();
        assert_eq!(items[0].as_str(), Some("svc"));
        assert_eq!(items[1].as_i64(), Some(8080));
        assert_eq!(items[2].as_i64(), Some(8080));
    }

    #[test]
    fn test_errors_carry_positions() {
        let err = parse("{\n  a <,x,>\n}").unwrap_err();
        assert_eq!(err.position(), Some((2, 5)));
        let err = parse("\"unterminated").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
        let err = parse("{ a 1.5 }").unwrap_err();
        assert!(err.to_string().contains("Help:"));
    }
}
