//! Console API
//!
//! `console.log` and friends, forwarded to `tracing` with a `[JS]` prefix.

use std::fmt::Write;

use rquickjs::function::Rest;
use rquickjs::{Ctx, Function, Object, Value};
use tracing::Level;

const METHODS: &[(&str, Level)] = &[
    ("log", Level::INFO),
    ("info", Level::INFO),
    ("warn", Level::WARN),
    ("error", Level::ERROR),
    ("debug", Level::DEBUG),
];

/// Install the console object into the global object
pub fn install_console<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<()> {
    let console = Object::new(ctx.clone())?;

    for &(name, level) in METHODS {
        let function = Function::new(ctx.clone(), move |args: Rest<Value<'js>>| {
            log_with_level(level, &args.0);
            Ok::<(), rquickjs::Error>(())
        })?
        .with_name(name)?;
        console.set(name, function)?;
    }

    ctx.globals().set("console", console)?;
    Ok(())
}

fn log_with_level(level: Level, values: &[Value<'_>]) {
    let mut output = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            output.push(' ');
        }
        format_value(&mut output, value);
    }

    if level == Level::ERROR {
        tracing::error!("[JS] {}", output);
    } else if level == Level::WARN {
        tracing::warn!("[JS] {}", output);
    } else if level == Level::DEBUG {
        tracing::debug!("[JS] {}", output);
    } else {
        tracing::info!("[JS] {}", output);
    }
}

/// Format a script value for log output
pub(crate) fn format_value(out: &mut String, value: &Value<'_>) {
    if value.is_undefined() {
        out.push_str("undefined");
    } else if value.is_null() {
        out.push_str("null");
    } else if let Some(b) = value.as_bool() {
        write!(out, "{}", b).ok();
    } else if let Some(n) = value.as_int() {
        write!(out, "{}", n).ok();
    } else if let Some(n) = value.as_float() {
        write!(out, "{}", n).ok();
    } else if let Some(s) = value.as_string() {
        if let Ok(s) = s.to_string() {
            out.push_str(&s);
        }
    } else if let Some(array) = value.as_array() {
        out.push('[');
        for (i, item) in array.iter::<Value>().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match item {
                Ok(item) => format_value(out, &item),
                Err(_) => out.push('?'),
            }
        }
        out.push(']');
    } else if value.is_function() {
        out.push_str("[Function]");
    } else if value.is_object() {
        out.push_str("[Object]");
    } else {
        out.push_str("[unknown]");
    }
}
