/// Builds an [`Element`](crate::Element) tree from a JSON-like literal.
///
/// `[..]` becomes an array when every item has the same kind and a tuple
/// otherwise. Object keys are string literals. Any other expression goes
/// through [`to_element`](crate::to_element) and becomes null if it cannot
/// be converted.
///
/// ```rust
/// use xferlang::{xfer, to_string, Document};
///
/// let element = xfer!({
///     "name": "Alice",
///     "ports": [80, 443],
///     "mixed": [1, "one"],
///     "admin": null
/// });
/// let doc = Document::new(vec![element]).unwrap();
/// assert_eq!(to_string(&doc), "{name\"Alice\" ports[80 443] mixed(1 \"one\") admin?}");
/// ```
#[macro_export]
macro_rules! xfer {
    (null) => {
        $crate::Element::null()
    };

    (true) => {
        $crate::Element::boolean(true)
    };

    (false) => {
        $crate::Element::boolean(false)
    };

    ([]) => {
        $crate::Element::array($crate::ArrayElement::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Element::sequence(vec![$($crate::xfer!($elem)),*])
    };

    ({}) => {
        $crate::Element::object($crate::ObjectElement::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::ObjectElement::new();
        $(
            object.add_or_update($key, $crate::xfer!($value));
        )*
        $crate::Element::object(object)
    }};

    ($e:expr) => {
        $crate::to_element(&$e).unwrap_or_else(|_| $crate::Element::null())
    };
}
