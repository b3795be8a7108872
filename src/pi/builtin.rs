use super::{Effect, InstructionRegistry};
use crate::context::ParseContext;
use crate::dynamic::SourceConfig;
use crate::element::{Element, ElementKind, KeyValuePair, ObjectElement};
use crate::{Error, Result};
use tracing::warn;

pub(crate) const ID: &str = "id";
pub(crate) const TAG: &str = "tag";
pub(crate) const CHAR_DEF: &str = "charDef";
pub(crate) const DYNAMIC_SOURCE: &str = "dynamicSource";
pub(crate) const DESERIALIZE: &str = "deserialize";
pub(crate) const INCLUDE: &str = "include";
pub(crate) const IF: &str = "if";
pub(crate) const DEFINED: &str = "defined";
pub(crate) const DOCUMENT: &str = "document";
pub(crate) const PROPERTIES: &str = "properties";
pub(crate) const LET: &str = "let";

/// Installs the built-in instruction handlers.
pub fn register_builtins(registry: &mut InstructionRegistry) {
    registry.register(ID, id);
    registry.register(TAG, tag);
    registry.register(CHAR_DEF, char_def);
    registry.register(DYNAMIC_SOURCE, dynamic_source);
    registry.register(DESERIALIZE, no_effect);
    registry.register(INCLUDE, include);
    registry.register(IF, condition);
    registry.register(DEFINED, defined);
    registry.register(DOCUMENT, object_only);
    registry.register(PROPERTIES, properties);
    registry.register(LET, bind);
}

fn text<'a>(pair: &'a KeyValuePair) -> Result<&'a str> {
    match pair.value().kind() {
        ElementKind::String(text)
        | ElementKind::Identifier(text)
        | ElementKind::Keyword(text)
        | ElementKind::Interpolated(text) => Ok(text.as_str()),
        ElementKind::Dynamic { value, .. } => Ok(value.as_deref().unwrap_or_default()),
        _ => Err(Error::instruction(
            pair.key(),
            format!("expects a string, found {}", pair.value().name()),
        )),
    }
}

fn object<'a>(pair: &'a KeyValuePair) -> Result<&'a ObjectElement> {
    pair.value().as_object().ok_or_else(|| {
        Error::instruction(
            pair.key(),
            format!("expects an object, found {}", pair.value().name()),
        )
    })
}

fn id(pair: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    let id = text(pair)?;
    if id.is_empty() {
        return Err(Error::instruction(ID, "id must not be empty"));
    }
    Ok(vec![Effect::SetId(id.to_string())])
}

fn tag(pair: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    let tag = text(pair)?;
    if tag.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![Effect::SetTag(tag.to_string())])
}

fn char_def(pair: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    let mut definitions = Vec::new();
    for (name, value) in object(pair)?.iter() {
        let code_point = match value.kind() {
            ElementKind::Character(cp) => *cp,
            ElementKind::Integer(i) => u32::try_from(i.value).unwrap_or(u32::MAX),
            ElementKind::Long(l) => u32::try_from(l.value).unwrap_or(u32::MAX),
            _ => {
                return Err(Error::instruction(
                    CHAR_DEF,
                    format!("'{}' must be a character or code point, found {}", name, value.name()),
                ))
            }
        };
        if char::from_u32(code_point).is_none() {
            return Err(Error::instruction(
                CHAR_DEF,
                format!("'{}' is not a Unicode scalar value", name),
            ));
        }
        definitions.push((name.to_string(), code_point));
    }
    Ok(vec![Effect::DefineCharacters(definitions)])
}

/// `name sourceType "value"` or `name <element>` for a constant.
fn dynamic_source(pair: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    object(pair)?
        .iter()
        .map(|(name, value)| {
            let config = match value.as_pair() {
                Some(source) => SourceConfig::new(source.key(), element_text(source.value())),
                None => SourceConfig::constant(element_text(value)),
            };
            Ok(Effect::ConfigureSource(name.to_string(), config))
        })
        .collect()
}

fn element_text(element: &Element) -> String {
    match element.as_str() {
        Some(text) => text.to_string(),
        None => crate::value::Value::from_element(element).to_string(),
    }
}

fn no_effect(_: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    Ok(Vec::new())
}

fn include(pair: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    Ok(vec![Effect::Include(text(pair)?.to_string())])
}

fn condition(pair: &KeyValuePair, context: &ParseContext) -> Result<Vec<Effect>> {
    match context.script().evaluate_condition(pair.value()) {
        Ok(true) => Ok(Vec::new()),
        Ok(false) => Ok(vec![Effect::ExcludeTarget]),
        Err(err) => {
            warn!(error = %err, "condition could not be evaluated, treating as false");
            Ok(vec![
                Effect::Warn(format!("if: {}", err)),
                Effect::ExcludeTarget,
            ])
        }
    }
}

fn defined(pair: &KeyValuePair, context: &ParseContext) -> Result<Vec<Effect>> {
    if context.script().is_defined(pair.value()) {
        Ok(Vec::new())
    } else {
        Ok(vec![Effect::ExcludeTarget])
    }
}

/// `let name value` or `let ( :name: value )`. The value is evaluated now,
/// so later instructions see it as `:name:` or `|name|`.
fn bind(pair: &KeyValuePair, context: &ParseContext) -> Result<Vec<Effect>> {
    let value = pair.value();
    let (name, bound) = match value.kind() {
        ElementKind::KeyValuePair(inner) => (inner.key(), inner.value()),
        ElementKind::Tuple(items) => match items.as_slice() {
            [only] => match only.as_pair() {
                Some(inner) => (inner.key(), inner.value()),
                None => return Err(let_shape_error()),
            },
            [name, bound] => match name.kind() {
                ElementKind::Keyword(name) | ElementKind::String(name) => (name.as_str(), bound),
                _ => return Err(let_shape_error()),
            },
            _ => return Err(let_shape_error()),
        },
        _ => return Err(let_shape_error()),
    };
    if name.is_empty() {
        return Err(Error::instruction(LET, "binding name must not be empty"));
    }
    let value = context.script().evaluate(bound)?;
    Ok(vec![Effect::Bind(name.to_string(), value)])
}

fn let_shape_error() -> Error {
    Error::instruction(LET, "expected 'let name value' or 'let ( :name: value )'")
}

fn object_only(pair: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    object(pair).map(|_| Vec::new())
}

fn properties(pair: &KeyValuePair, _: &ParseContext) -> Result<Vec<Effect>> {
    let mut effects = Vec::new();
    for (name, value) in object(pair)?.iter() {
        if value.is_collection() {
            effects.push(Effect::Warn(format!(
                "properties: '{}' is a {}, not a scalar",
                name,
                value.name()
            )));
        }
    }
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn run(keyword: &str, value: Element) -> Result<Vec<Effect>> {
        let context = ParseContext::new();
        let handler = context.instructions().get(keyword).unwrap();
        handler.interpret(&KeyValuePair::new(keyword, value), &context)
    }

    fn object_of(entries: Vec<(&str, Element)>) -> Element {
        let mut object = ObjectElement::new();
        for (key, value) in entries {
            object.add(key, value).unwrap();
        }
        Element::object(object)
    }

    #[test]
    fn test_id_and_tag() {
        assert_eq!(run("id", Element::string("main")).unwrap(), vec![Effect::SetId("main".into())]);
        assert!(run("id", Element::string("")).is_err());
        assert!(run("id", Element::integer(1)).is_err());
        assert_eq!(run("tag", Element::string("")).unwrap(), vec![]);
    }

    #[test]
    fn test_char_def_validates_code_points() {
        let value = object_of(vec![
            ("arrow", Element::character('→')),
            ("bolt", Element::integer(0x26A1)),
        ]);
        assert_eq!(
            run("charDef", value).unwrap(),
            vec![Effect::DefineCharacters(vec![
                ("arrow".into(), 0x2192),
                ("bolt".into(), 0x26A1),
            ])]
        );
        let surrogate = object_of(vec![("bad", Element::integer(0xD800))]);
        assert!(run("charDef", surrogate).is_err());
        assert!(run("charDef", Element::string("x")).is_err());
    }

    #[test]
    fn test_dynamic_source_shapes() {
        let value = object_of(vec![
            ("user", Element::pair("env", Element::string("USER"))),
            ("level", Element::integer(3)),
        ]);
        assert_eq!(
            run("dynamicSource", value).unwrap(),
            vec![
                Effect::ConfigureSource("user".into(), SourceConfig::new("env", "USER")),
                Effect::ConfigureSource("level".into(), SourceConfig::constant("3")),
            ]
        );
    }

    #[test]
    fn test_if_outcomes() {
        assert_eq!(run("if", Element::boolean(true)).unwrap(), vec![]);
        assert_eq!(run("if", Element::integer(0)).unwrap(), vec![Effect::ExcludeTarget]);

        let unknown = Element::pair("similar", Element::tuple(vec![]));
        let effects = run("if", unknown).unwrap();
        assert!(matches!(effects[0], Effect::Warn(_)));
        assert_eq!(effects[1], Effect::ExcludeTarget);
    }

    #[test]
    fn test_defined_uses_variables() {
        let mut context = ParseContext::new();
        context.set_variable("ready", Value::from("yes"));
        let handler = context.instructions().get("defined").unwrap();
        let pair = KeyValuePair::new("defined", Element::keyword("ready"));
        assert_eq!(handler.interpret(&pair, &context).unwrap(), vec![]);

        let pair = KeyValuePair::new("defined", Element::null());
        assert_eq!(
            handler.interpret(&pair, &context).unwrap(),
            vec![Effect::ExcludeTarget]
        );
    }

    #[test]
    fn test_let_evaluates_its_value() {
        let mut context = ParseContext::new();
        context.set_variable("BASE", Value::from(4));
        let handler = context.instructions().get("let").unwrap();

        let pair = KeyValuePair::new("let", Element::pair("region", Element::string("eu")));
        assert_eq!(
            handler.interpret(&pair, &context).unwrap(),
            vec![Effect::Bind("region".into(), Value::from("eu"))]
        );

        let expr = Element::tuple(vec![
            Element::keyword("gt"),
            Element::keyword("BASE"),
            Element::integer(2),
        ]);
        let tuple = Element::tuple(vec![Element::keyword("big"), expr]);
        assert_eq!(
            handler.interpret(&KeyValuePair::new("let", tuple), &context).unwrap(),
            vec![Effect::Bind("big".into(), Value::Bool(true))]
        );

        assert!(run("let", Element::string("x")).is_err());
        assert!(run("let", Element::tuple(vec![Element::integer(1), Element::null()])).is_err());
    }

    #[test]
    fn test_document_requires_object() {
        assert!(run("document", Element::string("x")).is_err());
        assert_eq!(run("document", object_of(vec![])).unwrap(), vec![]);
        assert_eq!(
            run("include", Element::string("base.xfer")).unwrap(),
            vec![Effect::Include("base.xfer".into())]
        );
    }
}
