//! Expression evaluation for conditional instructions.
//!
//! An expression is either a scalar element, read through [`Value`], or an
//! operator application written in one of two shapes:
//!
//! ```text
//! ( :eq: |PLATFORM| "linux" )  tuple or array led by the operator keyword
//! gt ( |CPU_CORES| 4 )          key/value pair keyed by the operator name
//! ```
//!
//! Operators receive their arguments unevaluated so `and`/`or` can stop
//! early. Keywords and identifiers read as the variable they name, or null
//! when it is unbound. Dynamic elements that did not resolve while parsing
//! read as a variable first and a dynamic source second.
//!
//! ```rust
//! use xferlang::script::{OperatorRegistry, ScriptContext, Variables};
//! use xferlang::{Element, Value};
//!
//! let operators = OperatorRegistry::new();
//! let mut variables = Variables::empty();
//! variables.set("LEVEL", Value::from(3));
//! let context = ScriptContext::new(&operators, &variables);
//!
//! let expr = Element::tuple(vec![
//!     Element::keyword("gte"),
//!     Element::keyword("LEVEL"),
//!     Element::integer(2),
//! ]);
//! assert_eq!(context.evaluate(&expr).unwrap(), Value::Bool(true));
//! ```

mod operators;

pub use operators::register_builtins;

use crate::dynamic::DynamicSourceRegistry;
use crate::element::{Element, ElementKind};
use crate::value::Value;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A named operation over unevaluated argument elements.
pub trait Operator: Send + Sync {
    fn name(&self) -> &str;

    fn min_args(&self) -> usize;

    /// `None` for variadic operators.
    fn max_args(&self) -> Option<usize>;

    /// Applies the operator. `Ok(None)` means the expression has no value.
    fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>>;
}

/// Operators by name.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    operators: HashMap<String, Arc<dyn Operator>>,
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.names())
            .finish()
    }
}

impl OperatorRegistry {
    /// A registry holding the built-in operators.
    pub fn new() -> Self {
        let mut registry = OperatorRegistry::empty();
        register_builtins(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        OperatorRegistry::default()
    }

    /// Adds an operator, replacing one with the same name.
    pub fn register<O: Operator + 'static>(&mut self, operator: O) {
        self.operators
            .insert(operator.name().to_string(), Arc::new(operator));
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.operators.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Operator> {
        self.operators.get(name).map(|op| op.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up `name`, checks the argument count and applies the operator.
    pub fn evaluate(
        &self,
        name: &str,
        args: &[Element],
        context: &ScriptContext<'_>,
    ) -> Result<Option<Value>> {
        let operator = self
            .get(name)
            .ok_or_else(|| Error::script(format!("unknown operator '{}'", name)))?;
        check_arity(operator, args.len())?;
        trace!(operator = name, args = args.len(), "evaluating operator");
        operator.evaluate(context, args)
    }
}

fn check_arity(operator: &dyn Operator, count: usize) -> Result<()> {
    let min = operator.min_args();
    if count < min {
        return Err(Error::script(format!(
            "operator '{}' needs at least {} argument(s), got {}",
            operator.name(),
            min,
            count
        )));
    }
    if let Some(max) = operator.max_args() {
        if count > max {
            return Err(Error::script(format!(
                "operator '{}' takes at most {} argument(s), got {}",
                operator.name(),
                max,
                count
            )));
        }
    }
    Ok(())
}

/// Variables visible to expressions.
///
/// [`Variables::new`] installs the host facts `PLATFORM`, `ARCHITECTURE`,
/// `PROCESSOR_COUNT` (alias `CPU_CORES`), `DEBUG` and `WORKING_DIRECTORY`.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        let mut variables = Variables::empty();
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        variables.set("PLATFORM", Value::from(std::env::consts::OS));
        variables.set("ARCHITECTURE", Value::from(std::env::consts::ARCH));
        variables.set("PROCESSOR_COUNT", Value::from(cores));
        variables.set("CPU_CORES", Value::from(cores));
        variables.set("DEBUG", Value::Bool(cfg!(debug_assertions)));
        if let Ok(dir) = std::env::current_dir() {
            variables.set("WORKING_DIRECTORY", Value::from(dir.display().to_string()));
        }
        variables
    }

    pub fn empty() -> Self {
        Variables::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything an operator can see while it runs.
#[derive(Clone, Copy)]
pub struct ScriptContext<'a> {
    operators: &'a OperatorRegistry,
    variables: &'a Variables,
    sources: Option<&'a DynamicSourceRegistry>,
}

impl<'a> ScriptContext<'a> {
    pub fn new(operators: &'a OperatorRegistry, variables: &'a Variables) -> Self {
        ScriptContext {
            operators,
            variables,
            sources: None,
        }
    }

    /// Lets unresolved dynamic elements be looked up on demand.
    #[must_use]
    pub fn with_sources(mut self, sources: &'a DynamicSourceRegistry) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn operators(&self) -> &'a OperatorRegistry {
        self.operators
    }

    pub fn variable(&self, name: &str) -> Option<&'a Value> {
        self.variables.get(name)
    }

    /// Applies a registered operator.
    pub fn call(&self, name: &str, args: &[Element]) -> Result<Option<Value>> {
        self.operators.evaluate(name, args, self)
    }

    /// Splits an operator expression into its name and argument elements.
    pub fn expression<'e>(&self, element: &'e Element) -> Option<(&'e str, &'e [Element])> {
        let (name, args) = split_expression(element)?;
        self.operators.contains(name).then_some((name, args))
    }

    /// Reads an element as a value, evaluating operator expressions.
    pub fn evaluate(&self, element: &Element) -> Result<Value> {
        if let Some((name, args)) = self.expression(element) {
            return Ok(self.call(name, args)?.unwrap_or(Value::Null));
        }
        match element.kind() {
            ElementKind::Keyword(name) | ElementKind::Identifier(name) => {
                Ok(self.variable(name).cloned().unwrap_or(Value::Null))
            }
            ElementKind::Dynamic { name, value: None } => {
                if let Some(value) = self.variable(name) {
                    return Ok(value.clone());
                }
                Ok(self
                    .sources
                    .and_then(|sources| sources.resolve(name))
                    .map_or(Value::Null, Value::String))
            }
            ElementKind::KeyValuePair(pair) => self.evaluate(pair.value()),
            _ => Ok(Value::from_element(element)),
        }
    }

    /// True when the element reads as a non-null, non-empty value.
    pub fn is_defined(&self, element: &Element) -> bool {
        match self.evaluate(element) {
            Ok(Value::Null) | Err(_) => false,
            Ok(Value::String(text)) => !text.is_empty(),
            Ok(_) => true,
        }
    }

    /// Evaluates a condition.
    ///
    /// A pair keyed by an unregistered name is an error, so callers can tell
    /// a typo from a false condition. Dynamic elements test for definedness;
    /// anything else is read for truthiness.
    pub fn evaluate_condition(&self, element: &Element) -> Result<bool> {
        if let ElementKind::KeyValuePair(pair) = element.kind() {
            if !self.operators.contains(pair.key()) {
                return Err(Error::script(format!("unknown operator '{}'", pair.key())));
            }
        }
        if let Some((name, args)) = self.expression(element) {
            return Ok(self
                .call(name, args)?
                .map(|value| value.is_truthy())
                .unwrap_or(false));
        }
        match element.kind() {
            ElementKind::Dynamic { .. } => Ok(self.is_defined(element)),
            _ => Ok(self.evaluate(element)?.is_truthy()),
        }
    }
}

fn split_expression(element: &Element) -> Option<(&str, &[Element])> {
    match element.kind() {
        ElementKind::Tuple(items) => split_sequence(items),
        ElementKind::Array(array) => split_sequence(array.as_slice()),
        ElementKind::KeyValuePair(pair) => {
            let value = pair.value();
            let args = match value.kind() {
                ElementKind::Tuple(items) => items.as_slice(),
                ElementKind::Array(array) => array.as_slice(),
                _ => std::slice::from_ref(value),
            };
            Some((pair.key(), args))
        }
        _ => None,
    }
}

fn split_sequence(items: &[Element]) -> Option<(&str, &[Element])> {
    let (head, rest) = items.split_first()?;
    match head.kind() {
        ElementKind::Keyword(name) | ElementKind::Identifier(name) | ElementKind::String(name) => {
            Some((name.as_str(), rest))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Twice;

    impl Operator for Twice {
        fn name(&self) -> &str {
            "twice"
        }

        fn min_args(&self) -> usize {
            1
        }

        fn max_args(&self) -> Option<usize> {
            Some(1)
        }

        fn evaluate(&self, context: &ScriptContext<'_>, args: &[Element]) -> Result<Option<Value>> {
            let n = context.evaluate(&args[0])?.as_i64().unwrap_or(0);
            Ok(Some(Value::from(n * 2)))
        }
    }

    fn with_context<R>(f: impl FnOnce(&ScriptContext<'_>) -> R) -> R {
        let mut operators = OperatorRegistry::new();
        operators.register(Twice);
        let mut variables = Variables::new();
        variables.set("name", Value::from("xfer"));
        let context = ScriptContext::new(&operators, &variables);
        f(&context)
    }

    #[test]
    fn test_custom_operator_and_arity() {
        with_context(|context| {
            let expr = Element::tuple(vec![Element::keyword("twice"), Element::integer(21)]);
            assert_eq!(context.evaluate(&expr).unwrap(), Value::from(42i64));

            let err = context.call("twice", &[]).unwrap_err();
            assert!(err.to_string().contains("at least 1"));
            let err = context
                .call("twice", &[Element::integer(1), Element::integer(2)])
                .unwrap_err();
            assert!(err.to_string().contains("at most 1"));
        });
    }

    #[test]
    fn test_pair_expression_shape() {
        with_context(|context| {
            let expr = Element::pair(
                "eq",
                Element::tuple(vec![Element::keyword("name"), Element::string("xfer")]),
            );
            assert!(context.evaluate_condition(&expr).unwrap());

            let single = Element::pair("not", Element::boolean(false));
            assert!(context.evaluate_condition(&single).unwrap());
        });
    }

    #[test]
    fn test_unknown_pair_operator_is_error() {
        with_context(|context| {
            let expr = Element::pair("equals", Element::tuple(vec![]));
            assert!(matches!(context.evaluate_condition(&expr), Err(Error::Script(_))));
        });
    }

    #[test]
    fn test_variables_and_unbound_names() {
        with_context(|context| {
            assert_eq!(
                context.evaluate(&Element::keyword("name")).unwrap(),
                Value::from("xfer")
            );
            assert_eq!(context.evaluate(&Element::keyword("unbound")).unwrap(), Value::Null);
            assert_eq!(context.evaluate(&Element::identifier("unbound")).unwrap(), Value::Null);
            assert!(!context.evaluate_condition(&Element::keyword("unbound")).unwrap());
            assert!(!context.is_defined(&Element::keyword("unbound")));
            assert!(context.variable("PLATFORM").is_some());
            assert_eq!(context.variable("CPU_CORES"), context.variable("PROCESSOR_COUNT"));
        });
    }

    #[test]
    fn test_tuple_without_operator_is_not_expression() {
        with_context(|context| {
            let data = Element::tuple(vec![Element::string("hello"), Element::integer(1)]);
            assert!(context.expression(&data).is_none());
            assert_eq!(context.evaluate(&data).unwrap(), Value::Null);
        });
    }

    #[test]
    fn test_dynamic_condition_tests_definedness() {
        std::env::set_var("XFERLANG_SCRIPT_DEFINED", "1");
        let operators = OperatorRegistry::new();
        let variables = Variables::empty();
        let sources = DynamicSourceRegistry::new();
        let context = ScriptContext::new(&operators, &variables).with_sources(&sources);
        assert!(context
            .evaluate_condition(&Element::dynamic("XFERLANG_SCRIPT_DEFINED", None))
            .unwrap());
        assert!(!context
            .evaluate_condition(&Element::dynamic("XFERLANG_SCRIPT_UNDEFINED", None))
            .unwrap());
        assert!(!context
            .evaluate_condition(&Element::dynamic("X", Some(String::new())))
            .unwrap());
    }
}
