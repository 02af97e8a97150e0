//! Query-string encoding.
//!
//! Output matches what dashboards produce in the browser: spaces become
//! `%20`, the `encodeURIComponent` unreserved set is left alone, list values
//! repeat their key and anything that is not a scalar encodes as empty.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters escaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URL component.
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Render a scalar the way it appears in a URL.
///
/// Strings are used as-is, whole floats drop their fraction and `null`
/// renders as an empty string.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn primitive(value: &Value) -> String {
    match value {
        Value::String(_) | Value::Bool(_) | Value::Number(_) => {
            encode_uri_component(&scalar_to_string(value))
        }
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Encode key/value pairs as `k=v&k=v`.
pub fn stringify<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut parts = Vec::new();
    for (key, value) in params {
        let key = encode_uri_component(key);
        match value {
            Value::Array(items) => {
                parts.extend(items.iter().map(|item| format!("{}={}", key, primitive(item))));
            }
            _ => parts.push(format!("{}={}", key, primitive(value))),
        }
    }
    parts.join("&")
}
