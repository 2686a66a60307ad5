//! Engine instances
//!
//! One QuickJS runtime and context plus the handle registry that owns every
//! document and selection scripts create in it.

use std::rc::Rc;

use rquickjs::{CatchResultExt, Context, Ctx, Runtime, Value};

use crate::config::BridgeConfig;
use crate::console;
use crate::factory::inject_parser;
use crate::registry::{HandleCounts, InstanceId, Registry};
use crate::{JsError, JsValue};

struct Engine {
    // Field order matters: the context must go before its runtime
    context: Context,
    _runtime: Runtime,
}

/// A bridge-enabled script engine instance
pub struct Instance {
    registry: Rc<Registry>,
    engine: Option<Engine>,
}

impl Instance {
    /// Create a runtime and context and install the configured globals
    pub fn new(config: &BridgeConfig) -> Result<Self, JsError> {
        let runtime = Runtime::new().map_err(|e| JsError::Runtime(e.to_string()))?;
        runtime.set_memory_limit(config.memory_limit);
        runtime.set_max_stack_size(config.max_stack_size);

        let context = Context::full(&runtime).map_err(|e| JsError::Runtime(e.to_string()))?;
        let registry = Registry::new();

        context
            .with(|ctx| {
                if config.console {
                    console::install_console(&ctx)?;
                }
                inject_parser(&ctx, &ctx.globals(), &config.binding_name, &registry)
            })
            .map_err(|e| JsError::Runtime(e.to_string()))?;

        tracing::debug!(instance = %registry.id(), "engine instance created");
        Ok(Self {
            registry,
            engine: Some(Engine {
                context,
                _runtime: runtime,
            }),
        })
    }

    pub fn id(&self) -> InstanceId {
        self.registry.id()
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    /// Documents and selections currently owned by this instance
    pub fn handle_count(&self) -> HandleCounts {
        self.registry.counts()
    }

    pub fn is_disposed(&self) -> bool {
        self.engine.is_none()
    }

    /// Evaluate a script and convert its completion value
    pub fn eval(&self, code: &str) -> Result<JsValue, JsError> {
        let engine = self.engine()?;
        engine.context.with(|ctx| {
            let result: Value = ctx
                .eval(code)
                .catch(&ctx)
                .map_err(|e| JsError::Runtime(e.to_string()))?;
            Ok(convert_value(&result))
        })
    }

    /// Execute a script, ignoring its completion value
    pub fn exec(&self, code: &str) -> Result<(), JsError> {
        let engine = self.engine()?;
        engine.context.with(|ctx| {
            let _: Value = ctx
                .eval(code)
                .catch(&ctx)
                .map_err(|e| JsError::Runtime(e.to_string()))?;
            Ok(())
        })
    }

    /// Run `f` inside the engine context
    pub fn with_context<F, R>(&self, f: F) -> Result<R, JsError>
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        Ok(self.engine()?.context.with(f))
    }

    /// Release every registered document and selection, then the engine.
    /// Later calls fail with [`JsError::Disposed`]. Calling it again does
    /// nothing.
    pub fn dispose(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        self.registry.teardown();
        drop(engine);
        tracing::debug!(instance = %self.registry.id(), "engine instance disposed");
    }

    fn engine(&self) -> Result<&Engine, JsError> {
        self.engine.as_ref().ok_or(JsError::Disposed(self.registry.id()))
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Convert an engine value into an owned [`JsValue`]
pub(crate) fn convert_value(value: &Value<'_>) -> JsValue {
    if value.is_undefined() {
        JsValue::Undefined
    } else if value.is_null() {
        JsValue::Null
    } else if let Some(b) = value.as_bool() {
        JsValue::Bool(b)
    } else if let Some(n) = value.as_int() {
        JsValue::Number(n as f64)
    } else if let Some(n) = value.as_float() {
        JsValue::Number(n)
    } else if let Some(s) = value.as_string() {
        JsValue::String(s.to_string().unwrap_or_default())
    } else if let Some(array) = value.as_array() {
        JsValue::Array(
            array
                .iter::<Value>()
                .filter_map(Result::ok)
                .map(|item| convert_value(&item))
                .collect(),
        )
    } else if value.is_function() {
        JsValue::Function
    } else {
        JsValue::Object
    }
}
