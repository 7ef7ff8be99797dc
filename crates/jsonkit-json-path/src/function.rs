//! Named functions callable at the end of a path (`$.a.length()`) or inside
//! filters (`length(@.a)`).
//!
//! Every function receives its subject as the first argument followed by
//! the literal or operand arguments. A trailing path function's subject is
//! the single match itself, or an array of all matches otherwise.

use std::sync::Arc;

use dashmap::DashMap;
use jsonkit_node::{ErrorKind, JsonError, JsonValue, Number, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

pub type PathFunction = Arc<dyn Fn(&[JsonValue]) -> Result<JsonValue> + Send + Sync>;

static FUNCTIONS: Lazy<DashMap<String, PathFunction>> = Lazy::new(builtins);

/// Process-wide function table, pre-populated with the built-ins.
///
/// Registration under an existing name replaces the previous function.
pub struct PathFunctionRegistry;

impl PathFunctionRegistry {
    pub fn register<F>(name: impl Into<String>, function: F)
    where
        F: Fn(&[JsonValue]) -> Result<JsonValue> + Send + Sync + 'static,
    {
        let name = name.into();
        info!(function = %name, "registered path function");
        FUNCTIONS.insert(name, Arc::new(function));
    }

    pub fn contains(name: &str) -> bool {
        FUNCTIONS.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names() -> Vec<String> {
        let mut names: Vec<String> = FUNCTIONS.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn invoke(name: &str, args: &[JsonValue]) -> Result<JsonValue> {
        // Clone out of the map so the shard lock is released before the call.
        let function = FUNCTIONS
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| JsonError::new(ErrorKind::UnknownFunction(name.to_string())))?;
        function(args)
    }
}

fn builtins() -> DashMap<String, PathFunction> {
    let table: DashMap<String, PathFunction> = DashMap::new();
    let add = |name: &str, f: fn(&[JsonValue]) -> Result<JsonValue>| {
        table.insert(name.to_string(), Arc::new(f));
    };
    add("length", length);
    add("count", count);
    add("keys", keys);
    add("value", value);
    add("first", first);
    add("last", last);
    add("index", index);
    add("sum", sum);
    add("min", min);
    add("max", max);
    add("avg", avg);
    add("stddev", stddev);
    add("match", full_match);
    add("search", search);
    table
}

// ── Built-ins ──────────────────────────────────────────────────────────

fn arity(name: &str, args: &[JsonValue], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(JsonError::invalid_argument(format!(
            "{name}() takes {} argument(s), got {}",
            expected - 1,
            args.len().saturating_sub(1)
        )))
    }
}

fn length(args: &[JsonValue]) -> Result<JsonValue> {
    arity("length", args, 1)?;
    Ok(match &args[0] {
        JsonValue::String(s) => JsonValue::from(s.chars().count()),
        JsonValue::Array(items) => JsonValue::from(items.len()),
        JsonValue::Object(members) => JsonValue::from(members.len()),
        _ => JsonValue::Null,
    })
}

fn count(args: &[JsonValue]) -> Result<JsonValue> {
    arity("count", args, 1)?;
    Ok(match &args[0] {
        JsonValue::Array(items) => JsonValue::from(items.len()),
        _ => JsonValue::from(1),
    })
}

fn keys(args: &[JsonValue]) -> Result<JsonValue> {
    arity("keys", args, 1)?;
    Ok(match &args[0] {
        JsonValue::Object(members) => JsonValue::from(members.keys().cloned().collect::<Vec<_>>()),
        _ => JsonValue::Null,
    })
}

fn value(args: &[JsonValue]) -> Result<JsonValue> {
    arity("value", args, 1)?;
    Ok(args[0].clone())
}

fn first(args: &[JsonValue]) -> Result<JsonValue> {
    arity("first", args, 1)?;
    Ok(match &args[0] {
        JsonValue::Array(items) => items.get(0).cloned().unwrap_or_default(),
        _ => JsonValue::Null,
    })
}

fn last(args: &[JsonValue]) -> Result<JsonValue> {
    arity("last", args, 1)?;
    Ok(match &args[0] {
        JsonValue::Array(items) => items.iter().last().cloned().unwrap_or_default(),
        _ => JsonValue::Null,
    })
}

fn index(args: &[JsonValue]) -> Result<JsonValue> {
    arity("index", args, 2)?;
    let position = args[1]
        .as_i64()
        .ok_or_else(|| JsonError::invalid_argument("index() expects an integer position"))?;
    let JsonValue::Array(items) = &args[0] else {
        return Ok(JsonValue::Null);
    };
    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let resolved = if position < 0 { position + len } else { position };
    Ok(usize::try_from(resolved)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or_default())
}

/// Numeric members of the subject; a lone number counts as a one-element set.
fn numbers(name: &str, args: &[JsonValue]) -> Result<Vec<f64>> {
    arity(name, args, 1)?;
    match &args[0] {
        JsonValue::Array(items) => Ok(items
            .iter()
            .filter_map(|item| item.as_number().map(|n| n.to_f64()))
            .collect()),
        JsonValue::Number(n) => Ok(vec![n.to_f64()]),
        _ => Ok(Vec::new()),
    }
}

fn sum(args: &[JsonValue]) -> Result<JsonValue> {
    Ok(JsonValue::from(numbers("sum", args)?.iter().sum::<f64>()))
}

fn min(args: &[JsonValue]) -> Result<JsonValue> {
    let values = numbers("min", args)?;
    Ok(values
        .into_iter()
        .reduce(f64::min)
        .map_or(JsonValue::Null, JsonValue::from))
}

fn max(args: &[JsonValue]) -> Result<JsonValue> {
    let values = numbers("max", args)?;
    Ok(values
        .into_iter()
        .reduce(f64::max)
        .map_or(JsonValue::Null, JsonValue::from))
}

fn avg(args: &[JsonValue]) -> Result<JsonValue> {
    let values = numbers("avg", args)?;
    if values.is_empty() {
        return Ok(JsonValue::Null);
    }
    Ok(JsonValue::from(values.iter().sum::<f64>() / values.len() as f64))
}

/// Population standard deviation.
fn stddev(args: &[JsonValue]) -> Result<JsonValue> {
    let values = numbers("stddev", args)?;
    if values.is_empty() {
        return Ok(JsonValue::Null);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Ok(JsonValue::from(variance.sqrt()))
}

fn compile_pattern(name: &str, args: &[JsonValue], anchored: bool) -> Result<Option<(Regex, String)>> {
    arity(name, args, 2)?;
    let pattern = args[1]
        .as_str()
        .ok_or_else(|| JsonError::invalid_argument(format!("{name}() expects a string pattern")))?;
    let Some(subject) = args[0].as_str() else {
        return Ok(None);
    };
    let source = if anchored {
        format!("^(?:{pattern})$")
    } else {
        pattern.to_string()
    };
    let regex = Regex::new(&source)
        .map_err(|err| JsonError::invalid_argument(format!("{name}(): {err}")))?;
    Ok(Some((regex, subject.to_string())))
}

fn full_match(args: &[JsonValue]) -> Result<JsonValue> {
    Ok(JsonValue::Bool(
        compile_pattern("match", args, true)?.is_some_and(|(re, s)| re.is_match(&s)),
    ))
}

fn search(args: &[JsonValue]) -> Result<JsonValue> {
    Ok(JsonValue::Bool(
        compile_pattern("search", args, false)?.is_some_and(|(re, s)| re.is_match(&s)),
    ))
}
