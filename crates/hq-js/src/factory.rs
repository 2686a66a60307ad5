//! Bridge objects
//!
//! Script-visible wrappers around registered documents and selections.
//! Each wrapper is a plain object whose methods are Rust closures holding
//! the registry and a handle; nothing else from the Rust side leaks into
//! the engine.

use std::rc::Rc;

use hq_css::Selection;
use hq_html::{HtmlParser, ParseError};
use rquickjs::function::Rest;
use rquickjs::{Array, Ctx, Function, IntoJs, Object, Value};

use crate::callback::CallbackInvoker;
use crate::exception::{BridgeError, ThrowExt, type_name};
use crate::registry::{DocumentHandle, Registry, SelectionHandle};

/// Install the parser constructor as `globals[binding_name]`.
///
/// Calling it with HTML text returns a document object exposing `find`.
pub fn inject_parser<'js>(
    ctx: &Ctx<'js>,
    globals: &Object<'js>,
    binding_name: &str,
    registry: &Rc<Registry>,
) -> rquickjs::Result<()> {
    let factory = BridgeObjectFactory::new(registry.clone());
    let constructor = factory.constructor(ctx, binding_name)?;
    globals.set(binding_name, constructor)?;
    tracing::debug!(instance = %registry.id(), binding = binding_name, "parser binding installed");
    Ok(())
}

/// Builds bridge objects for one registry
#[derive(Clone)]
pub struct BridgeObjectFactory {
    registry: Rc<Registry>,
}

impl BridgeObjectFactory {
    pub fn new(registry: Rc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    /// The constructor function installed under the binding name
    pub fn constructor<'js>(&self, ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<Function<'js>> {
        let factory = self.clone();
        let function_name = name.to_string();
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Object<'js>> {
                factory.construct(&ctx, &function_name, &args.0).or_throw(&ctx)
            },
        )?
        .with_name(name)
    }

    fn construct<'js>(
        &self,
        ctx: &Ctx<'js>,
        name: &str,
        args: &[Value<'js>],
    ) -> Result<Object<'js>, BridgeError> {
        let value = args.first().ok_or_else(|| BridgeError::MissingArgument {
            method: name.to_string(),
            position: 1,
            expected: "HTML text",
        })?;
        let html = match value.as_string() {
            Some(text) => text.to_string()?,
            None => {
                return Err(BridgeError::Parse {
                    function: name.to_string(),
                    source: ParseError::NotText(type_name(value).to_string()),
                });
            }
        };

        let document = HtmlParser::new().parse(&html);
        tracing::trace!(
            bytes = html.len(),
            elements = document.element_count(),
            heap = document.memory_usage(),
            "document parsed"
        );
        let handle = self.registry.adopt(document)?;
        self.document_object(ctx, handle)
    }

    /// Wrapper for a document: `find`
    pub fn document_object<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: DocumentHandle,
    ) -> Result<Object<'js>, BridgeError> {
        let object = Object::new(ctx.clone())?;
        self.install(ctx, &object, "find", move |factory, ctx, args| {
            factory.document_find(ctx, handle, args)
        })?;
        Ok(object)
    }

    /// Wrapper for a selection: `find`, `each`, `map`, `attr`, `text`,
    /// `size` and a `length` property
    pub fn selection_object<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: SelectionHandle,
    ) -> Result<Object<'js>, BridgeError> {
        let size = self.registry.with_selection(handle, Selection::len)?;

        let object = Object::new(ctx.clone())?;
        object.set("length", count(ctx, size))?;
        self.install(ctx, &object, "find", move |factory, ctx, args| {
            factory.selection_find(ctx, handle, args)
        })?;
        self.install(ctx, &object, "each", move |factory, ctx, args| {
            factory.selection_each(ctx, handle, args)
        })?;
        self.install(ctx, &object, "map", move |factory, ctx, args| {
            factory.selection_map(ctx, handle, args)
        })?;
        self.install(ctx, &object, "attr", move |factory, ctx, args| {
            factory.selection_attr(ctx, handle, args)
        })?;
        self.install(ctx, &object, "text", move |factory, ctx, _| {
            let text = factory.registry.with_selection(handle, Selection::text)??;
            Ok(text.into_js(ctx)?)
        })?;
        self.install(ctx, &object, "size", move |factory, ctx, _| {
            let size = factory.registry.with_selection(handle, Selection::len)?;
            Ok(count(ctx, size))
        })?;
        Ok(object)
    }

    fn install<'js, F>(
        &self,
        ctx: &Ctx<'js>,
        object: &Object<'js>,
        name: &'static str,
        body: F,
    ) -> rquickjs::Result<()>
    where
        F: Fn(&BridgeObjectFactory, &Ctx<'js>, &[Value<'js>]) -> Result<Value<'js>, BridgeError> + 'js,
    {
        let factory = self.clone();
        let function = Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
                body(&factory, &ctx, &args.0).or_throw(&ctx)
            },
        )?
        .with_name(name)?;
        object.set(name, function)
    }

    fn document_find<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: DocumentHandle,
        args: &[Value<'js>],
    ) -> Result<Value<'js>, BridgeError> {
        let selector = string_arg(args, "find", "a selector string")?;
        let document = self.registry.document(handle)?;
        let found = Selection::root(&document).find(&selector)?;
        tracing::trace!(%selector, matched = found.len(), "document find");
        self.wrap(ctx, found)
    }

    fn selection_find<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: SelectionHandle,
        args: &[Value<'js>],
    ) -> Result<Value<'js>, BridgeError> {
        let selector = string_arg(args, "find", "a selector string")?;
        let found = self.registry.with_selection(handle, |s| s.find(&selector))??;
        tracing::trace!(%selector, matched = found.len(), "selection find");
        self.wrap(ctx, found)
    }

    /// Invoke the callback once per node, in order, with a one-node selection.
    /// Stops at the first callback that throws.
    fn selection_each<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: SelectionHandle,
        args: &[Value<'js>],
    ) -> Result<Value<'js>, BridgeError> {
        let callback = CallbackInvoker::from_args(ctx, "each", args)?;
        let size = self.registry.with_selection(handle, Selection::len)?;

        for index in 0..size {
            let item = self.item(ctx, handle, index)?;
            callback.invoke(index, item)?;
        }
        Ok(Value::new_undefined(ctx.clone()))
    }

    /// Collect the callback results into an array as long as the selection.
    /// A throwing callback discards the partial array.
    fn selection_map<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: SelectionHandle,
        args: &[Value<'js>],
    ) -> Result<Value<'js>, BridgeError> {
        let callback = CallbackInvoker::from_args(ctx, "map", args)?;
        let size = self.registry.with_selection(handle, Selection::len)?;

        let results = Array::new(ctx.clone())?;
        let as_object: &Object<'js> = &results;
        as_object.set("length", count(ctx, size))?;

        for index in 0..size {
            let item = self.item(ctx, handle, index)?;
            let value = callback.invoke(index, item)?;
            results.set(index, value)?;
        }
        Ok(results.into_value())
    }

    fn selection_attr<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: SelectionHandle,
        args: &[Value<'js>],
    ) -> Result<Value<'js>, BridgeError> {
        let name = string_arg(args, "attr", "an attribute name")?;
        match self.registry.with_selection(handle, |s| s.attr(&name))?? {
            Some(value) => Ok(value.into_js(ctx)?),
            None => Ok(Value::new_null(ctx.clone())),
        }
    }

    /// Register a one-node selection for `index` and wrap it.
    ///
    /// The registry borrow ends before the wrapper reaches script code, so
    /// callbacks are free to call back into the bridge.
    fn item<'js>(
        &self,
        ctx: &Ctx<'js>,
        handle: SelectionHandle,
        index: usize,
    ) -> Result<Object<'js>, BridgeError> {
        let single = self.registry.with_selection(handle, |s| s.eq(index))?;
        let single = self.registry.register(single)?;
        self.selection_object(ctx, single)
    }

    fn wrap<'js>(&self, ctx: &Ctx<'js>, selection: Selection) -> Result<Value<'js>, BridgeError> {
        let handle = self.registry.register(selection)?;
        Ok(self.selection_object(ctx, handle)?.into_value())
    }
}

fn string_arg(
    args: &[Value<'_>],
    method: &'static str,
    expected: &'static str,
) -> Result<String, BridgeError> {
    let value = args.first().ok_or_else(|| BridgeError::MissingArgument {
        method: method.to_string(),
        position: 1,
        expected,
    })?;
    let text = value.as_string().ok_or_else(|| BridgeError::ArgumentType {
        method: method.to_string(),
        position: 1,
        expected,
        found: type_name(value),
    })?;
    Ok(text.to_string()?)
}

fn count<'js>(ctx: &Ctx<'js>, n: usize) -> Value<'js> {
    Value::new_int(ctx.clone(), i32::try_from(n).unwrap_or(i32::MAX))
}
