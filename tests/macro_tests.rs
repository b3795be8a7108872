use xferlang::{to_string, xfer, ArrayElement, Document, Element, ElementKind, ObjectElement};

fn render(element: Element) -> String {
    to_string(&Document::new(vec![element]).unwrap())
}

#[test]
fn test_xfer_macro_null() {
    let value = xfer!(null);
    assert_eq!(value, Element::null());
    assert!(value.is_null());
}

#[test]
fn test_xfer_macro_booleans() {
    assert_eq!(xfer!(true), Element::boolean(true));
    assert_eq!(xfer!(false), Element::boolean(false));
}

#[test]
fn test_xfer_macro_numbers() {
    assert_eq!(xfer!(42), Element::integer(42));
    assert_eq!(xfer!(-123), Element::integer(-123));
    assert_eq!(xfer!(3.5), Element::double(3.5));
    assert_eq!(xfer!(9_000_000_000i64), Element::long(9_000_000_000));
}

#[test]
fn test_xfer_macro_strings() {
    assert_eq!(xfer!("hello world"), Element::string("hello world"));
    assert_eq!(xfer!(""), Element::string(""));
}

#[test]
fn test_xfer_macro_arrays() {
    assert_eq!(xfer!([]), Element::array(ArrayElement::new()));

    let numbers = xfer!([1, 2, 3]);
    let array = numbers.as_array().unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array.element_kind(), Some("integer"));
    assert_eq!(array.get(2), Some(&Element::integer(3)));
}

#[test]
fn test_xfer_macro_mixed_items_make_a_tuple() {
    let mixed = xfer!([1, "hello", true, null]);
    assert!(matches!(mixed.kind(), ElementKind::Tuple(_)));
    assert_eq!(
        mixed.as_tuple().unwrap(),
        &[
            Element::integer(1),
            Element::string("hello"),
            Element::boolean(true),
            Element::null(),
        ][..]
    );
    assert_eq!(render(mixed), "(1 \"hello\" ~true ?)");
}

#[test]
fn test_xfer_macro_objects() {
    assert_eq!(xfer!({}), Element::object(ObjectElement::new()));

    let simple = xfer!({
        "name": "Alice",
        "age": 30
    });
    let object = simple.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object.get("name"), Some(&Element::string("Alice")));
    assert_eq!(object.get("age"), Some(&Element::integer(30)));
    assert_eq!(object.keys().collect::<Vec<_>>(), vec!["name", "age"]);
}

#[test]
fn test_xfer_macro_nested() {
    let nested = xfer!({
        "user": {
            "id": 123,
            "name": "Bob",
            "active": true
        },
        "tags": ["admin", "developer"],
        "count": 42
    });

    let user = nested.get("user").unwrap();
    assert_eq!(user.get("id").and_then(Element::as_i64), Some(123));
    assert_eq!(user.get("name").and_then(Element::as_str), Some("Bob"));
    assert_eq!(user.get("active").and_then(Element::as_bool), Some(true));

    let tags = nested.get("tags").and_then(Element::as_array).unwrap();
    let names: Vec<_> = tags.iter().filter_map(Element::as_str).collect();
    assert_eq!(names, vec!["admin", "developer"]);

    assert_eq!(
        render(nested),
        "{user{id 123 name\"Bob\" active~true} tags[\"admin\" \"developer\"] count 42}"
    );
}

#[test]
fn test_xfer_macro_host_values() {
    let ports = vec![80u16, 443];
    let element = xfer!({ "ports": ports });
    assert_eq!(render(element), "{ports[80 443]}");
}
