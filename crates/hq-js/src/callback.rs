//! Script callback invocation for `each` and `map`

use rquickjs::function::This;
use rquickjs::{Ctx, Function, Object, Value};

use crate::console::format_value;
use crate::exception::{BridgeError, type_name};

/// A validated script callback bound to the bridge method that received it
pub struct CallbackInvoker<'js> {
    ctx: Ctx<'js>,
    method: &'static str,
    function: Function<'js>,
}

impl<'js> CallbackInvoker<'js> {
    /// Take the callback from the first argument of `method`
    pub fn from_args(
        ctx: &Ctx<'js>,
        method: &'static str,
        args: &[Value<'js>],
    ) -> Result<Self, BridgeError> {
        let value = args.first().ok_or_else(|| BridgeError::MissingArgument {
            method: method.to_string(),
            position: 1,
            expected: "a callback function",
        })?;
        let function = value.as_function().cloned().ok_or_else(|| BridgeError::ArgumentType {
            method: method.to_string(),
            position: 1,
            expected: "a callback function",
            found: type_name(value),
        })?;

        Ok(Self {
            ctx: ctx.clone(),
            method,
            function,
        })
    }

    /// Call the callback with `item` as its only argument and `this` null.
    ///
    /// A throwing callback is caught here and reported with the index it
    /// failed at.
    pub fn invoke(&self, index: usize, item: Object<'js>) -> Result<Value<'js>, BridgeError> {
        tracing::trace!(method = self.method, index, "invoking callback");

        let this = This(Value::new_null(self.ctx.clone()));
        match self.function.call::<_, Value<'js>>((this, item)) {
            Ok(value) => Ok(value),
            Err(rquickjs::Error::Exception) => {
                let thrown = self.ctx.catch();
                Err(self.failure(index, describe_thrown(&thrown)))
            }
            Err(err) => Err(self.failure(index, err.to_string())),
        }
    }

    fn failure(&self, index: usize, message: String) -> BridgeError {
        tracing::debug!(method = self.method, index, %message, "callback threw");
        BridgeError::Callback {
            method: self.method,
            index,
            message,
        }
    }
}

/// Render a thrown value as `Name: message` for errors, or its plain form
fn describe_thrown(thrown: &Value<'_>) -> String {
    if let Some(exception) = thrown.as_exception() {
        let message = exception.message().unwrap_or_default();
        let name = thrown
            .as_object()
            .and_then(|object| object.get::<_, String>("name").ok())
            .unwrap_or_else(|| "Error".to_string());
        return format!("{}: {}", name, message);
    }

    let mut out = String::new();
    format_value(&mut out, thrown);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquickjs::{Context, Runtime};

    #[test]
    fn test_rejects_non_function() {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();

        context.with(|ctx| {
            let args = vec![Value::new_int(ctx.clone(), 3)];
            match CallbackInvoker::from_args(&ctx, "each", &args) {
                Err(BridgeError::ArgumentType { found, .. }) => assert_eq!(found, "number"),
                _ => panic!("expected argument type error"),
            }
            assert!(matches!(
                CallbackInvoker::from_args(&ctx, "map", &[]),
                Err(BridgeError::MissingArgument { .. })
            ));
        });
    }

    #[test]
    fn test_invoke_reports_thrown_error() {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();

        context.with(|ctx| {
            let f: Value = ctx.eval("(function () { throw new TypeError('bad item') })").unwrap();
            let invoker = CallbackInvoker::from_args(&ctx, "each", &[f]).unwrap();
            let item = Object::new(ctx.clone()).unwrap();

            match invoker.invoke(4, item) {
                Err(BridgeError::Callback { method, index, message }) => {
                    assert_eq!(method, "each");
                    assert_eq!(index, 4);
                    assert_eq!(message, "TypeError: bad item");
                }
                _ => panic!("expected callback error"),
            }
        });
    }

    #[test]
    fn test_invoke_reports_thrown_primitive() {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();

        context.with(|ctx| {
            let f: Value = ctx.eval("(function () { throw 'plain' })").unwrap();
            let invoker = CallbackInvoker::from_args(&ctx, "map", &[f]).unwrap();
            let item = Object::new(ctx.clone()).unwrap();

            match invoker.invoke(0, item) {
                Err(BridgeError::Callback { message, .. }) => assert_eq!(message, "plain"),
                _ => panic!("expected callback error"),
            }
        });
    }

    #[test]
    fn test_this_is_null_and_value_returned() {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();

        context.with(|ctx| {
            let f: Value = ctx
                .eval("(function (item) { 'use strict'; return this === null && item.tag === 'li' })")
                .unwrap();
            let invoker = CallbackInvoker::from_args(&ctx, "map", &[f]).unwrap();
            let item = Object::new(ctx.clone()).unwrap();
            item.set("tag", "li").unwrap();

            let result = invoker.invoke(0, item).unwrap();
            assert_eq!(result.as_bool(), Some(true));
        });
    }
}
