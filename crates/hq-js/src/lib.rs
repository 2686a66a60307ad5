//! hq JavaScript Bridge
//!
//! Exposes HTML documents and CSS selections to QuickJS scripts.
//!
//! Features:
//! - `htmlParser(html)` constructor injected into the global scope
//! - `find`, `each`, `map`, `attr`, `text` and `size` on bridge objects
//! - Per-instance handle registry with leak accounting
//! - Script exceptions for every bridge failure
//! - Console API forwarding to tracing

mod callback;
mod config;
mod console;
mod exception;
mod factory;
mod instance;
mod registry;

pub use callback::CallbackInvoker;
pub use config::BridgeConfig;
pub use console::install_console;
pub use exception::{BridgeError, ExceptionBridge, ThrowExt};
pub use factory::{BridgeObjectFactory, inject_parser};
pub use instance::Instance;
pub use registry::{
    DocumentHandle, HandleCounts, InstanceId, Registry, SelectionHandle, live_handles,
};

/// Evaluate a script in a fresh default instance
pub fn eval(code: &str) -> Result<JsValue, JsError> {
    Instance::new(&BridgeConfig::default())?.eval(code)
}

/// Script value converted out of the engine
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsValue>),
    Object,
    Function,
}

impl JsValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Engine-level error
#[derive(Debug, thiserror::Error)]
pub enum JsError {
    #[error("JavaScript error: {0}")]
    Runtime(String),

    #[error("engine instance {0} has been disposed")]
    Disposed(InstanceId),
}
