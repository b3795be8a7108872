use super::{Operator, OperatorRegistry, ScriptContext};
use crate::element::Element;
use crate::value::Value;
use crate::Result;
use std::cmp::Ordering;

/// Installs `eq ne gt lt gte lte and or not xor if defined`.
pub fn register_builtins(registry: &mut OperatorRegistry) {
    registry.register(Compare::new("eq", |a, b| a.loose_eq(b)));
    registry.register(Compare::new("ne", |a, b| !a.loose_eq(b)));
    registry.register(Compare::new("gt", |a, b| a.compare(b) == Some(Ordering::Greater)));
    registry.register(Compare::new("lt", |a, b| a.compare(b) == Some(Ordering::Less)));
    registry.register(Compare::new("gte", |a, b| {
        (a.is_null() && b.is_null())
            || matches!(a.compare(b), Some(Ordering::Greater | Ordering::Equal))
    }));
    registry.register(Compare::new("lte", |a, b| {
        (a.is_null() && b.is_null())
            || matches!(a.compare(b), Some(Ordering::Less | Ordering::Equal))
    }));
    registry.register(And);
    registry.register(Or);
    registry.register(Not);
    registry.register(Xor);
    registry.register(If);
    registry.register(Defined);
}

/// Binary predicate over two evaluated arguments.
struct Compare {
    name: &'static str,
    test: fn(&Value, &Value) -> bool,
}

impl Compare {
    fn new(name: &'static str, test: fn(&Value, &Value) -> bool) -> Self {
        Compare { name, test }
    }
}

impl Operator for Compare {
    fn name(&self) -> &str {
        self.name
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }

    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
        let left = context.evaluate(&args[0])?;
        let right = context.evaluate(&args[1])?;
        Ok(Some(Value::Bool((self.test)(&left, &right))))
    }
}

struct And;

impl Operator for And {
    fn name(&self) -> &str {
        "and"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        None
    }

    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
        for arg in args {
            if !context.evaluate(arg)?.is_truthy() {
                return Ok(Some(Value::Bool(false)));
            }
        }
        Ok(Some(Value::Bool(true)))
    }
}

struct Or;

impl Operator for Or {
    fn name(&self) -> &str {
        "or"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        None
    }

    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
        for arg in args {
            if context.evaluate(arg)?.is_truthy() {
                return Ok(Some(Value::Bool(true)));
            }
        }
        Ok(Some(Value::Bool(false)))
    }
}

struct Not;

impl Operator for Not {
    fn name(&self) -> &str {
        "not"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }

    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
        Ok(Some(Value::Bool(!context.evaluate(&args[0])?.is_truthy())))
    }
}

struct Xor;

impl Operator for Xor {
    fn name(&self) -> &str {
        "xor"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }

    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
        let left = context.evaluate(&args[0])?.is_truthy();
        let right = context.evaluate(&args[1])?.is_truthy();
        Ok(Some(Value::Bool(left != right)))
    }
}

/// `if condition then [else]`; only the chosen branch is evaluated.
struct If;

impl Operator for If {
    fn name(&self) -> &str {
        "if"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
        if context.evaluate(&args[0])?.is_truthy() {
            context.evaluate(&args[1]).map(Some)
        } else {
            args.get(2).map(|branch| context.evaluate(branch)).transpose()
        }
    }
}

struct Defined;

impl Operator for Defined {
    fn name(&self) -> &str {
        "defined"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }

    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
        Ok(Some(Value::Bool(context.is_defined(&args[0]))))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Variables;
    use super::*;
    use crate::number::Decimal;
    use crate::Error;

    fn eval(name: &str, args: Vec<Element>) -> Result<Option<Value>> {
        let operators = OperatorRegistry::new();
        let mut variables = Variables::empty();
        variables.set("EMPTY", Value::from(""));
        let context = ScriptContext::new(&operators, &variables);
        context.call(name, &args)
    }

    fn truth(name: &str, args: Vec<Element>) -> bool {
        eval(name, args).unwrap() == Some(Value::Bool(true))
    }

    #[test]
    fn test_equality_coerces_types() {
        assert!(truth("eq", vec![Element::integer(5), Element::string("5")]));
        assert!(truth("eq", vec![Element::boolean(true), Element::string("true")]));
        assert!(truth("ne", vec![Element::string("a"), Element::string("b")]));
        assert!(truth("eq", vec![Element::null(), Element::null()]));
    }

    #[test]
    fn test_relational_null_rules() {
        assert!(!truth("gt", vec![Element::null(), Element::integer(0)]));
        assert!(!truth("lt", vec![Element::null(), Element::null()]));
        assert!(truth("lte", vec![Element::null(), Element::null()]));
        assert!(truth("gte", vec![Element::null(), Element::null()]));
        assert!(!truth("gte", vec![Element::null(), Element::integer(1)]));
    }

    #[test]
    fn test_relational_kinds() {
        assert!(truth("gt", vec![Element::double(2.5), Element::integer(2)]));
        assert!(truth("lt", vec![Element::string("apple"), Element::string("banana")]));
        let early = Element::datetime("2020-01-01".parse().unwrap());
        let late = Element::datetime("2021-01-01".parse().unwrap());
        assert!(truth("lt", vec![early, late]));
    }

    #[test]
    fn test_logic_short_circuits() {
        // the second argument would fail arity if it were evaluated
        let broken = Element::tuple(vec![Element::keyword("not")]);
        assert!(!truth("and", vec![Element::boolean(false), broken.clone()]));
        assert!(truth("or", vec![Element::boolean(true), broken.clone()]));
        assert!(eval("and", vec![Element::boolean(true), broken]).is_err());
        assert!(truth(
            "and",
            vec![Element::integer(1), Element::string("x"), Element::boolean(true)]
        ));
    }

    #[test]
    fn test_not_and_xor() {
        assert!(truth("not", vec![Element::string("FALSE")]));
        assert!(truth("xor", vec![Element::boolean(true), Element::integer(0)]));
        assert!(!truth("xor", vec![Element::integer(1), Element::integer(2)]));
    }

    #[test]
    fn test_if_branches() {
        let pick = eval(
            "if",
            vec![Element::boolean(false), Element::string("a"), Element::string("b")],
        )
        .unwrap();
        assert_eq!(pick, Some(Value::from("b")));
        let none = eval("if", vec![Element::boolean(false), Element::string("a")]).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_zero_equals_zero_point_zero() {
        assert!(truth("eq", vec![Element::integer(0), Element::double(0.0)]));
        assert!(truth("eq", vec![Element::long(0), Element::decimal(Decimal::new(0, 1))]));
    }

    #[test]
    fn test_and_stops_at_empty_string() {
        assert!(!truth(
            "and",
            vec![Element::boolean(true), Element::string(""), Element::integer(1)]
        ));
        assert!(truth(
            "or",
            vec![Element::boolean(false), Element::string(""), Element::integer(1)]
        ));
    }

    #[test]
    fn test_if_on_unbound_variable() {
        let none = eval("if", vec![Element::keyword("undefinedVar"), Element::string("A")]).unwrap();
        assert_eq!(none, None);
        let pick = eval(
            "if",
            vec![Element::keyword("undefinedVar"), Element::string("A"), Element::string("B")],
        )
        .unwrap();
        assert_eq!(pick, Some(Value::from("B")));
        assert!(!truth("defined", vec![Element::keyword("undefinedVar")]));
    }

    #[test]
    fn test_defined() {
        assert!(truth("defined", vec![Element::string("x")]));
        assert!(!truth("defined", vec![Element::keyword("EMPTY")]));
        assert!(!truth("defined", vec![Element::null()]));
        assert!(!truth("defined", vec![Element::dynamic("NOPE", None)]));
    }

    #[test]
    fn test_arity_errors_are_script_errors() {
        assert!(matches!(
            eval("eq", vec![Element::integer(1)]),
            Err(Error::Script(_))
        ));
        assert!(matches!(eval("nosuch", vec![]), Err(Error::Script(_))));
    }
}
