use serde::{Deserialize, Serialize};
use serde_json::json;
use xferlang::{
    from_element, from_str, parse, parse_with_context, to_element, to_string, to_string_pretty,
    to_string_with_options, Document, Effect, Element, ElementKind, ElementStyle, Error,
    Formatting, KeyValuePair, Operator, ParseContext, ScriptContext,
    StylePreference, Value, XferOptions,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u64,
    customer: User,
    items: Vec<Product>,
    note: Option<String>,
    total: f64,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn sample_order() -> Order {
    Order {
        order_id: 9_000_000_000,
        customer: User {
            id: 123,
            name: "Say \"hi\"".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "ops team".to_string()],
        },
        items: vec![
            Product {
                sku: "A-1".to_string(),
                price: 9.99,
                quantity: 2,
            },
            Product {
                sku: "B-2".to_string(),
                price: 14.5,
                quantity: 1,
            },
        ],
        note: None,
        total: 34.48,
    }
}

fn reparse(text: &str) -> Document {
    parse(text).unwrap_or_else(|e| panic!("failed to reparse {:?}: {}", text, e))
}

#[test]
fn test_struct_roundtrip_through_text() {
    init_tracing();
    let order = sample_order();
    let doc = Document::new(vec![to_element(&order).unwrap()]).unwrap();

    for text in [to_string(&doc), to_string_pretty(&doc)] {
        let back = reparse(&text);
        assert_eq!(back, doc, "text was {}", text);
        let decoded: Order = from_element(&back.root()[0]).unwrap();
        assert_eq!(decoded, order);
    }
}

#[test]
fn test_large_integers_become_longs() {
    let element = to_element(&sample_order()).unwrap();
    let id = element.get("order_id").unwrap();
    assert!(matches!(id.kind(), ElementKind::Long(_)));
    let text = to_string(&Document::new(vec![element.clone()]).unwrap());
    assert!(text.starts_with("{order_id&9000000000 customer{"), "{}", text);
}

#[test]
fn test_from_str_simple() {
    let user: User = from_str(
        r#"
        </ a user record />
        {
            id 7
            name <"Bob">
            active ~true
            tags [ "a" <"b"> ]
        }
        "#,
    )
    .unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.name, "Bob");
    assert_eq!(user.tags, vec!["a", "b"]);
}

#[test]
fn test_elements_as_json() {
    let doc = parse(
        "{ name \"svc\" port 8080 ratio ^0.5 price *12.50 on ~true none ? \
         list [ 1 2 ] mixed ( 1 \"a\" ) }",
    )
    .unwrap();
    let value: serde_json::Value = from_element(&doc.root()[0]).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "svc",
            "port": 8080,
            "ratio": 0.5,
            "price": 12.5,
            "on": true,
            "none": null,
            "list": [1, 2],
            "mixed": [1, "a"]
        })
    );
}

#[test]
fn test_styles_are_preserved() {
    let cases = [
        "<\"explicit\">",
        "\"compact\"",
        "<#42#>",
        "#42",
        "42",
        "<( 1 2 )>",
        "{a 1 b<\"x\">}",
        "$FF",
        "%1010",
    ];
    for input in cases {
        let doc = parse(input).unwrap();
        let once = to_string(&doc);
        let twice = to_string(&reparse(&once));
        assert_eq!(once, twice, "unstable output for {}", input);
        assert_eq!(reparse(&once), doc, "value changed for {}", input);
    }
    assert_eq!(to_string(&parse("$FF").unwrap()), "$FF");
    assert_eq!(to_string(&parse("<#42#>").unwrap()), "<#42#>");
}

#[test]
fn test_style_preferences_override_stored_style() {
    let doc = parse("( <\"a\"> 42 )").unwrap();
    let options = XferOptions::new()
        .with_string_style(StylePreference::ForceCompact)
        .with_numeric_style(StylePreference::Explicit);
    assert_eq!(to_string_with_options(&doc, &options), "(\"a\" <#42#>)");
}

#[test]
fn test_text_needing_escapes() {
    let texts = [
        "plain",
        "",
        "say \"hi\"",
        "\"quoted\"",
        " leading space",
        "trailing\"",
        "a \"\" b",
        "angle > bracket",
    ];
    for text in texts {
        let doc = Document::new(vec![Element::string(text)]).unwrap();
        let rendered = to_string(&doc);
        let back = reparse(&rendered);
        assert_eq!(back.root()[0].as_str(), Some(text), "rendered as {}", rendered);
    }
}

#[test]
fn test_spaced_formatting() {
    let doc = parse("{a 1 b [\"x\"]}").unwrap();
    let options = XferOptions::new().with_formatting(Formatting::SPACED);
    assert_eq!(to_string_with_options(&doc, &options), "{ a 1 b [ \"x\" ] }");
    let indented = XferOptions::new()
        .with_formatting(Formatting::INDENTED)
        .with_indent(4);
    assert_eq!(
        to_string_with_options(&doc, &indented),
        "{\n    a 1\n    b[\n        \"x\"\n    ]\n}"
    );
}

#[test]
fn test_id_and_tag_instructions() {
    let doc = parse(
        "<! id \"root\" !> <! tag \"config\" !> { <! id \"db\" !> db { host \"h\" } }",
    )
    .unwrap();
    let root = doc.find_by_id("root").unwrap();
    assert_eq!(root.tag(), Some("config"));
    assert_eq!(root.instructions().len(), 2);
    let db = doc.find_by_id("db").unwrap();
    assert_eq!(db.get("db").and_then(|e| e.get("host")).and_then(Element::as_str), Some("h"));

    let text = to_string(&doc);
    let back = reparse(&text);
    assert_eq!(back.find_by_id("db"), doc.find_by_id("db"));
}

#[test]
fn test_second_tag_is_rejected() {
    let err = parse("<! tag \"a\" !> <! tag \"b\" !> 1").unwrap_err();
    assert!(matches!(err, Error::Instruction { .. }), "{}", err);
}

#[test]
fn test_conditional_instructions() {
    init_tracing();
    let mut context = ParseContext::new().with_variable("STAGE", Value::from("prod"));
    let doc = parse_with_context(
        r#"{
            <! if eq ( :STAGE: "prod" ) !> replicas 3
            <! if eq ( :STAGE: "dev" ) !> debug ~true
            <! defined |MISSING_VALUE_FOR_TEST| !> secret "x"
            tail ?
        }"#,
        &mut context,
    )
    .unwrap();
    let object = doc.root()[0].as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), vec!["replicas", "tail"]);
    assert_eq!(doc.instructions().len(), 3);
}

#[test]
fn test_excluded_value_excludes_pair() {
    let doc = parse("{ a <! if ~false !> 1 b 2 }").unwrap();
    let object = doc.root()[0].as_object().unwrap();
    assert!(!object.contains_key("a"));
    assert_eq!(object.get("b").and_then(Element::as_i64), Some(2));
}

#[test]
fn test_instructions_of_excluded_pair_stay_on_document() {
    init_tracing();
    let doc = parse("{ <! id \"gone\" !> a <! if ~false !> 1 b 2 }").unwrap();
    assert!(doc.find_by_id("gone").is_none());
    assert_eq!(doc.instructions().len(), 2);
    assert_eq!(doc.instruction("id").map(|pi| pi.value().as_str()), Some(Some("gone")));
}

#[test]
fn test_unbound_variables_are_false() {
    let doc = parse(
        r#"(
            <! if if ( :undefinedVar: "A" ) !> "kept-if-A"
            <! if :undefinedVar: !> "kept"
            <! defined :UNSET: !> "defined"
            "always"
        )"#,
    )
    .unwrap();
    let items = doc.root()[0].as_tuple().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_str(), Some("always"));
}

#[test]
fn test_let_binds_document_variables() {
    init_tracing();
    let mut context = ParseContext::new();
    let doc = parse_with_context(
        r#"
        <! let region "eu" !>
        <! let ( :big: gt ( 8 4 ) ) !>
        {
            <! if eq ( :region: "eu" ) !> eu ~true
            <! if eq ( :region: "us" ) !> us ~true
            <! if :big: !> large ~true
        }
        "#,
        &mut context,
    )
    .unwrap();
    let object = doc.root()[0].as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), vec!["eu", "large"]);
    assert_eq!(context.variables().get("region"), Some(&Value::from("eu")));
    assert_eq!(context.variables().get("big"), Some(&Value::Bool(true)));
}

#[test]
fn test_char_def_overrides_builtin_name() {
    assert_eq!(parse("\\cr").unwrap().root()[0].as_char(), Some('\r'));
    let doc = parse("<! charDef { cr \\$41 } !> \\cr").unwrap();
    assert_eq!(doc.root()[0].as_char(), Some('A'));
}

#[test]
fn test_identifier_values_are_rejected() {
    let tuple = Element::tuple(vec![Element::identifier("x"), Element::integer(1)]);
    assert!(matches!(Document::new(vec![tuple]), Err(Error::TypeMismatch { .. })));
    let pair = Element::pair("a", Element::identifier("b"));
    assert!(Document::new(vec![pair]).is_err());
}

#[test]
fn test_unknown_operator_warns_and_excludes() {
    init_tracing();
    let doc = parse("<! if nosuchop ( 1 2 ) !> 1 2").unwrap();
    assert_eq!(doc.root().len(), 1);
    assert_eq!(doc.root()[0].as_i64(), Some(2));
    assert_eq!(doc.warnings().len(), 1);
    assert!(doc.warnings()[0].contains("nosuchop"));
}

#[test]
fn test_char_def_and_dynamic_source() {
    let mut context = ParseContext::new();
    let doc = parse_with_context(
        r#"
        <! charDef { arrow \$2192 check 10003 } !>
        <! dynamicSource { region const "eu-west" } !>
        ( \arrow \check |region| 'to <\arrow\> |region|' )
        "#,
        &mut context,
    )
    .unwrap();
    let items = doc.root()[0].as_tuple().unwrap();
    assert_eq!(items[0].as_char(), Some('→'));
    assert_eq!(items[1].as_char(), Some('✓'));
    assert_eq!(items[2].as_str(), Some("eu-west"));
    assert_eq!(items[3].as_str(), Some("to → |region|"));

    let later = parse_with_context("\\arrow", &mut context).unwrap();
    assert_eq!(later.root()[0].as_char(), Some('→'));
}

#[test]
fn test_include_document_and_properties() {
    let doc = parse(
        r#"
        <! xfer "0.11" !>
        <! include "shared.xfer" !>
        <! document { title "Inventory" version "2" } !>
        <! properties { owner "ops" } !>
        { }
        "#,
    )
    .unwrap();
    assert_eq!(doc.includes().to_vec(), vec!["shared.xfer".to_string()]);
    assert_eq!(doc.document_properties().title.as_deref(), Some("Inventory"));
    assert_eq!(doc.properties().get("owner").map(String::as_str), Some("ops"));
    assert_eq!(doc.metadata().version.as_deref(), Some("0.11"));
}

#[test]
fn test_custom_instruction_handler() {
    let mut context = ParseContext::new().with_instruction(
        "stamp",
        |pair: &KeyValuePair, _: &ParseContext| -> xferlang::Result<Vec<Effect>> {
            let label = pair.value().as_str().unwrap_or("stamped");
            Ok(vec![Effect::SetTag(label.to_string())])
        },
    );
    let doc = parse_with_context("<! stamp \"v1\" !> ~true", &mut context).unwrap();
    assert_eq!(doc.root()[0].tag(), Some("v1"));
    assert_eq!(doc.instruction("stamp").map(|pi| pi.effects().len()), Some(1));
}

struct Between;

impl Operator for Between {
    fn name(&self) -> &str {
        "between"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn evaluate(
        &self,
        context: &ScriptContext<'_>,
        args: &[Element],
    ) -> xferlang::Result<Option<Value>> {
        let mut numbers = Vec::with_capacity(3);
        for arg in args {
            let value = context.evaluate(arg)?;
            numbers.push(value.as_i64().ok_or_else(|| Error::script("between needs integers"))?);
        }
        Ok(Some(Value::Bool(numbers[1] <= numbers[0] && numbers[0] <= numbers[2])))
    }
}

#[test]
fn test_custom_operator() {
    let mut context = ParseContext::new()
        .with_operator(Between)
        .with_variable("CORES", Value::from(8));
    let doc = parse_with_context(
        "( <! if between ( :CORES: 4 16 ) !> \"mid\" <! if between ( :CORES: 1 2 ) !> \"low\" )",
        &mut context,
    )
    .unwrap();
    let items = doc.root()[0].as_tuple().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_str(), Some("mid"));

    let doc = parse_with_context("<! if between ( 1 2 ) !> 1", &mut context).unwrap();
    assert!(doc.root().is_empty());
    assert!(doc.warnings()[0].contains("at least 3"));
}

#[test]
fn test_errors_carry_positions() {
    let cases: [(&str, (usize, usize)); 4] = [
        ("{\n  name \"ok\"\n  42\n}", (3, 3)),
        ("( 1 2", (1, 6)),
        ("[ 1\n  <,> ]", (2, 3)),
        ("{ a 1 }\n<! xfer \"0.11\" !>", (2, 1)),
    ];
    for (input, expected) in cases {
        let err = parse(input).unwrap_err();
        assert_eq!(err.position(), Some(expected), "{} -> {}", input, err);
    }
}

#[test]
fn test_no_partial_documents() {
    assert!(parse("{ a 1 } { b }").is_err());
    assert!(parse("<\"never closed").is_err());
    assert!(parse("[ 1 ] ]").is_err());
}

#[test]
fn test_programmatic_document() {
    let mut element = Element::pair("answer", Element::integer(42));
    element.set_style(ElementStyle::Implicit);
    let doc = Document::new(vec![
        Element::tuple(vec![element]).with_id("t"),
        Element::keyword("done"),
    ])
    .unwrap();
    assert_eq!(to_string(&doc), "<! id \"t\" !>(answer 42):done:");
    let back = reparse(&to_string(&doc));
    assert_eq!(back, doc);
}
