//! Exception bridge
//!
//! Every failure inside a bridge method is a `BridgeError`; right before
//! control returns to QuickJS it is raised as a script exception. Argument
//! problems become `TypeError`, everything else a plain `Error`.

use hq_css::SelectionError;
use hq_html::ParseError;
use rquickjs::{Ctx, Exception, Value};

use crate::registry::InstanceId;

/// Failure inside the bridge
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("{function}(): {source}")]
    Parse {
        function: String,
        #[source]
        source: ParseError,
    },

    #[error("{method}() expects {expected} as argument {position}, got {found}")]
    ArgumentType {
        method: String,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{method}() requires {expected} as argument {position}")]
    MissingArgument {
        method: String,
        position: usize,
        expected: &'static str,
    },

    #[error("{method}() callback failed at index {index}: {message}")]
    Callback {
        method: &'static str,
        index: usize,
        message: String,
    },

    #[error("bridge object used after engine instance {0} was disposed")]
    InstanceDisposed(InstanceId),

    #[error("handle of engine instance {handle} used in engine instance {current}")]
    ForeignHandle { handle: InstanceId, current: InstanceId },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Engine failure; may already carry a pending exception
    #[error(transparent)]
    Engine(#[from] rquickjs::Error),
}

impl BridgeError {
    /// Whether the error surfaces as a `TypeError`
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::ArgumentType { .. } | Self::MissingArgument { .. })
    }
}

/// Translates bridge failures into QuickJS exceptions
pub struct ExceptionBridge;

impl ExceptionBridge {
    /// Raise `err` in `ctx` and return the error to hand back to rquickjs
    pub fn throw(ctx: &Ctx<'_>, err: BridgeError) -> rquickjs::Error {
        match err {
            BridgeError::Engine(err) => err,
            err if err.is_type_error() => Exception::throw_type(ctx, &err.to_string()),
            err => Exception::throw_message(ctx, &err.to_string()),
        }
    }
}

/// `Result` adapter used at the end of every bridge method
pub trait ThrowExt<T> {
    fn or_throw(self, ctx: &Ctx<'_>) -> rquickjs::Result<T>;
}

impl<T> ThrowExt<T> for Result<T, BridgeError> {
    fn or_throw(self, ctx: &Ctx<'_>) -> rquickjs::Result<T> {
        self.map_err(|err| ExceptionBridge::throw(ctx, err))
    }
}

/// Script-level type name, used in argument errors
pub(crate) fn type_name(value: &Value<'_>) -> &'static str {
    if value.is_undefined() {
        "undefined"
    } else if value.is_null() {
        "null"
    } else if value.is_bool() {
        "boolean"
    } else if value.is_number() {
        "number"
    } else if value.is_string() {
        "string"
    } else if value.is_symbol() {
        "symbol"
    } else if value.is_array() {
        "array"
    } else if value.is_function() {
        "function"
    } else if value.is_object() {
        "object"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BridgeError::ArgumentType {
            method: "find".to_string(),
            position: 1,
            expected: "a selector string",
            found: "number",
        };
        assert_eq!(err.to_string(), "find() expects a selector string as argument 1, got number");
        assert!(err.is_type_error());

        let err = BridgeError::Callback {
            method: "each",
            index: 1,
            message: "Error: boom".to_string(),
        };
        assert_eq!(err.to_string(), "each() callback failed at index 1: Error: boom");
        assert!(!err.is_type_error());
    }

    #[test]
    fn test_parse_error_message() {
        let err = BridgeError::Parse {
            function: "htmlParser".to_string(),
            source: ParseError::NotText("number".to_string()),
        };
        assert_eq!(err.to_string(), "htmlParser(): expected HTML text, got number");
    }
}
