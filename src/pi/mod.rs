//! Processing instructions.
//!
//! A `<! keyword value !>` block whose keyword is registered is interpreted
//! by its [`InstructionHandler`]. Handlers never touch the parser; they read
//! the [`ParseContext`] and describe what should happen as a list of
//! [`Effect`]s. The parser applies the effects: context changes right away,
//! target changes to the next element parsed at the same level.
//!
//! ```rust
//! use xferlang::pi::Effect;
//! use xferlang::{parse_with_context, KeyValuePair, ParseContext, Result};
//!
//! let mut context = ParseContext::new();
//! context.instructions_mut().register(
//!     "owner",
//!     |pair: &KeyValuePair, _: &ParseContext| -> Result<Vec<Effect>> {
//!         let owner = pair.value().as_str().unwrap_or_default();
//!         Ok(vec![Effect::SetTag(owner.to_string())])
//!     },
//! );
//!
//! let doc = parse_with_context("<! owner \"ops\" !> { port 8080 }", &mut context).unwrap();
//! assert_eq!(doc.root()[0].tag(), Some("ops"));
//! ```

pub(crate) mod builtin;

pub use builtin::register_builtins;

use crate::context::ParseContext;
use crate::dynamic::SourceConfig;
use crate::element::KeyValuePair;
use crate::value::Value;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Something an instruction asks the parser to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Register named characters for the rest of the parse.
    DefineCharacters(Vec<(String, u32)>),
    /// Configure a dynamic source name for the rest of the parse.
    ConfigureSource(String, SourceConfig),
    /// Bind a script variable for the rest of the parse.
    Bind(String, Value),
    /// Record an include path on the document.
    Include(String),
    /// Record a warning on the document.
    Warn(String),
    /// Set the id of the target element.
    SetId(String),
    /// Set the tag of the target element.
    SetTag(String),
    /// Drop the target element and its bound instructions.
    ExcludeTarget,
}

impl Effect {
    /// Whether the effect waits for the instruction's target.
    pub fn is_target_effect(&self) -> bool {
        matches!(self, Effect::SetId(_) | Effect::SetTag(_) | Effect::ExcludeTarget)
    }
}

/// Interprets one instruction.
pub trait InstructionHandler: Send + Sync {
    fn interpret(&self, pair: &KeyValuePair, context: &ParseContext) -> Result<Vec<Effect>>;
}

impl<F> InstructionHandler for F
where
    F: Fn(&KeyValuePair, &ParseContext) -> Result<Vec<Effect>> + Send + Sync,
{
    fn interpret(&self, pair: &KeyValuePair, context: &ParseContext) -> Result<Vec<Effect>> {
        self(pair, context)
    }
}

/// Instruction handlers by keyword. Keywords are case-sensitive.
#[derive(Clone, Default)]
pub struct InstructionRegistry {
    handlers: HashMap<String, Arc<dyn InstructionHandler>>,
}

impl fmt::Debug for InstructionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionRegistry")
            .field("keywords", &self.keywords())
            .finish()
    }
}

impl InstructionRegistry {
    /// A registry with the built-in instructions.
    pub fn new() -> Self {
        let mut registry = InstructionRegistry::empty();
        register_builtins(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        InstructionRegistry::default()
    }

    /// Adds a handler, replacing any handler for the same keyword.
    pub fn register<H: InstructionHandler + 'static>(&mut self, keyword: &str, handler: H) {
        self.handlers.insert(keyword.to_string(), Arc::new(handler));
    }

    pub fn unregister(&mut self, keyword: &str) -> Result<()> {
        self.handlers
            .remove(keyword)
            .map(|_| ())
            .ok_or_else(|| Error::UnknownInstruction(keyword.to_string()))
    }

    pub fn get(&self, keyword: &str) -> Option<Arc<dyn InstructionHandler>> {
        self.handlers.get(keyword).cloned()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.handlers.contains_key(keyword)
    }

    /// Registered keywords, sorted.
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }
}
