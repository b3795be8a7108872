//! Registries shared by one or more parses.
//!
//! [`crate::parse`] builds a fresh [`ParseContext`] for every call. Pass your
//! own context to [`crate::parse_with_context`] to register handlers and
//! operators, predefine variables, or keep `charDef` and `dynamicSource`
//! definitions across documents.
//!
//! ```rust
//! use xferlang::{parse_with_context, ParseContext, SourceConfig};
//!
//! let mut context = ParseContext::new()
//!     .with_character("arrow", 0x2192)
//!     .with_source("region", SourceConfig::constant("eu-west"));
//!
//! let doc = parse_with_context("( \\arrow |region| )", &mut context).unwrap();
//! let items = doc.root()[0].as_tuple().unwrap();
//! assert_eq!(items[0].as_char(), Some('→'));
//! assert_eq!(items[1].as_str(), Some("eu-west"));
//! ```

use crate::chars::CharacterRegistry;
use crate::dynamic::{DynamicSourceRegistry, SourceConfig};
use crate::pi::{Effect, InstructionHandler, InstructionRegistry};
use crate::script::{Operator, OperatorRegistry, ScriptContext, Variables};
use crate::value::Value;
use tracing::debug;

/// Character names, dynamic sources, instruction handlers, operators and
/// script variables used while parsing.
#[derive(Clone, Debug)]
pub struct ParseContext {
    characters: CharacterRegistry,
    sources: DynamicSourceRegistry,
    instructions: InstructionRegistry,
    operators: OperatorRegistry,
    variables: Variables,
}

impl Default for ParseContext {
    fn default() -> Self {
        ParseContext::new()
    }
}

impl ParseContext {
    /// A context with every built-in installed.
    pub fn new() -> Self {
        ParseContext {
            characters: CharacterRegistry::new(),
            sources: DynamicSourceRegistry::new(),
            instructions: InstructionRegistry::new(),
            operators: OperatorRegistry::new(),
            variables: Variables::new(),
        }
    }

    /// A context with no built-ins at all.
    ///
    /// Without instruction handlers every `<! !>` block reads as metadata.
    pub fn empty() -> Self {
        ParseContext {
            characters: CharacterRegistry::empty(),
            sources: DynamicSourceRegistry::empty(),
            instructions: InstructionRegistry::empty(),
            operators: OperatorRegistry::empty(),
            variables: Variables::empty(),
        }
    }

    pub fn characters(&self) -> &CharacterRegistry {
        &self.characters
    }

    pub fn characters_mut(&mut self) -> &mut CharacterRegistry {
        &mut self.characters
    }

    pub fn sources(&self) -> &DynamicSourceRegistry {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut DynamicSourceRegistry {
        &mut self.sources
    }

    pub fn instructions(&self) -> &InstructionRegistry {
        &self.instructions
    }

    pub fn instructions_mut(&mut self) -> &mut InstructionRegistry {
        &mut self.instructions
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut OperatorRegistry {
        &mut self.operators
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.set(name, value);
    }

    /// An evaluation view over this context's operators, variables and sources.
    pub fn script(&self) -> ScriptContext<'_> {
        ScriptContext::new(&self.operators, &self.variables).with_sources(&self.sources)
    }

    #[must_use]
    pub fn with_character(mut self, name: &str, code_point: u32) -> Self {
        self.characters.define(name, code_point);
        self
    }

    #[must_use]
    pub fn with_source(mut self, name: &str, config: SourceConfig) -> Self {
        self.sources.configure(name, config);
        self
    }

    #[must_use]
    pub fn with_instruction<H: InstructionHandler + 'static>(mut self, keyword: &str, handler: H) -> Self {
        self.instructions.register(keyword, handler);
        self
    }

    #[must_use]
    pub fn with_operator<O: Operator + 'static>(mut self, operator: O) -> Self {
        self.operators.register(operator);
        self
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.set(name, value);
        self
    }

    /// Applies a context-level effect. Target effects are ignored here.
    pub(crate) fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::DefineCharacters(definitions) => {
                debug!(count = definitions.len(), "defining characters");
                self.characters
                    .set_custom_ids(definitions.iter().map(|(name, cp)| (name.as_str(), *cp)));
            }
            Effect::ConfigureSource(name, config) => {
                debug!(name = name.as_str(), source_type = config.source_type.as_str(), "configuring dynamic source");
                self.sources.configure(name, config.clone());
            }
            Effect::Bind(name, value) => {
                debug!(name = name.as_str(), "binding variable");
                self.variables.set(name.clone(), value.clone());
            }
            _ => {}
        }
    }
}
