//! Error types for parsing, building and converting Xfer documents.
//!
//! ## Error Categories
//!
//! - **Syntax errors**: malformed input, reported with line and column. A
//!   syntax error always rejects the whole document.
//! - **Model errors**: a mutation that would break a collection invariant
//!   (duplicate object key, heterogeneous array). The collection is left as it was.
//! - **Instruction and script errors**: a processing instruction or operator
//!   could not be applied.
//! - **Conversion errors**: a host value could not be mapped to or from an element.
//!
//! ## Examples
//!
//! ```rust
//! use xferlang::{parse, Error};
//!
//! let result = parse("{ name \"Alice\"");
//! assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents every failure the crate can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Syntax error with detailed context
    #[error("Syntax error at line {line}, column {col}: {msg}{context}{suggestion}")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
        context: String,
        suggestion: String,
    },

    /// Input ended inside an element
    #[error("Unexpected end of input at line {line}, column {col}: expected {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
    },

    /// A value had the wrong element kind for the requested operation
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// An object or metadata block held something other than a key/value pair
    #[error("Key type mismatch at line {line}, column {col}: {found} cannot be an object member")]
    KeyTypeMismatch {
        line: usize,
        col: usize,
        found: String,
    },

    /// A metadata block appeared after other content
    #[error("Metadata must be the first element of a document (line {line}, column {col})")]
    MetadataNotFirst { line: usize, col: usize },

    #[error("Duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("Duplicate element id '{0}'")]
    DuplicateId(String),

    /// An array received an element of a different kind than its first element
    #[error("Array type mismatch: array holds {expected} elements, cannot add {found}")]
    ArrayTypeMismatch { expected: String, found: String },

    #[error("Unknown processing instruction '{0}'")]
    UnknownInstruction(String),

    /// A processing instruction rejected its value
    #[error("Processing instruction '{keyword}': {msg}")]
    Instruction { keyword: String, msg: String },

    /// Operator lookup, arity or evaluation failure
    #[error("Script error: {0}")]
    Script(String),

    /// A literal could not be converted to its element value
    #[error("Invalid {kind} value '{text}'")]
    InvalidValue { kind: String, text: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),

    /// Generic message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xferlang::Error;
    ///
    /// let err = Error::syntax(10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: String::new(),
            suggestion: String::new(),
        }
    }

    /// Creates a syntax error that quotes the offending input and offers a hint.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xferlang::Error;
    ///
    /// let err = Error::syntax_with_context(
    ///     1,
    ///     3,
    ///     "unknown element specifier ','",
    ///     "<,x,>",
    ///     Some("did you mean '<\"x\">'?"),
    /// );
    /// assert!(err.to_string().contains("Help:"));
    /// ```
    pub fn syntax_with_context(
        line: usize,
        col: usize,
        msg: &str,
        context: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: if context.is_empty() {
                String::new()
            } else {
                format!("\n  | {}", context)
            },
            suggestion: suggestion
                .map(|s| format!("\nHelp: {}", s))
                .unwrap_or_default(),
        }
    }

    pub fn unexpected_eof(line: usize, col: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            expected: expected.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xferlang::Error;
    ///
    /// let err = Error::type_mismatch("integer", "string");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn array_type_mismatch(expected: &str, found: &str) -> Self {
        Error::ArrayTypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn instruction<T: fmt::Display>(keyword: &str, msg: T) -> Self {
        Error::Instruction {
            keyword: keyword.to_string(),
            msg: msg.to_string(),
        }
    }

    pub fn script<T: fmt::Display>(msg: T) -> Self {
        Error::Script(msg.to_string())
    }

    pub fn invalid_value(kind: &str, text: &str) -> Self {
        Error::InvalidValue {
            kind: kind.to_string(),
            text: text.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading or writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the `(line, column)` an error was reported at, when it has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::Syntax { line, col, .. }
            | Error::UnexpectedEof { line, col, .. }
            | Error::KeyTypeMismatch { line, col, .. }
            | Error::MetadataNotFirst { line, col } => Some((*line, *col)),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = Error::syntax(3, 7, "unterminated string element");
        let text = err.to_string();
        assert!(text.contains("line 3"));
        assert!(text.contains("column 7"));
        assert_eq!(err.position(), Some((3, 7)));
    }

    #[test]
    fn test_context_and_suggestion() {
        let err = Error::syntax_with_context(1, 1, "bad", "<,>", Some("remove it"));
        let text = err.to_string();
        assert!(text.contains("<,>"));
        assert!(text.contains("Help: remove it"));
    }

    #[test]
    fn test_model_errors_have_no_position() {
        assert_eq!(Error::DuplicateKey("a".into()).position(), None);
        let err = Error::array_type_mismatch("integer", "string");
        assert!(err.to_string().contains("cannot add string"));
    }
}
