//! Plain JSON reader and writer.
//!
//! Reading parses the body with `serde_json`, then rebuilds the tree
//! bottom-up: every object key is kebab-cased into a keyword and its value is
//! passed through [`transform`] once the value's own children are done.
//!
//! Writing goes through [`JsonView`], a borrowed `Serialize` view that turns
//! keyword keys back into camelCase strings.

use std::collections::HashSet;
use std::io;

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::casing::{to_camel, to_keyword};
use crate::error::{DecodeError, ValueError};
use crate::value::{Key, Map, Value};
use crate::value_codec::transform;

/// Decode a JSON body into a [`Value`], applying key casing and field rules.
pub fn decode_json(bytes: &[u8]) -> Result<Value, DecodeError> {
    let raw: serde_json::Value = serde_json::from_slice(bytes)?;
    from_json_value(raw)
}

/// Rebuild an already parsed JSON tree, applying key casing and field rules.
pub fn from_json_value(raw: serde_json::Value) -> Result<Value, DecodeError> {
    Ok(match raw {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => number(&n)?,
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(from_json_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(object) => {
            let mut map = Map::new();
            for (key, raw) in object {
                let keyword = to_keyword(&key);
                let value = transform(keyword.name(), from_json_value(raw)?)?;
                map.insert(Key::Keyword(keyword), value);
            }
            Value::Map(map)
        }
    })
}

/// Integers outside the `i64` range are rejected rather than rounded.
pub(crate) fn number(n: &serde_json::Number) -> Result<Value, ValueError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Int(i));
    }
    if n.is_u64() {
        return Err(ValueError::IntegerOutOfRange(n.to_string()));
    }
    Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
}

/// Serialize a [`Value`] as plain JSON.
///
/// Fails when two keys of one map render to the same camelCase name, such
/// as `:page-id` next to the string key `"pageId"`.
pub struct JsonView<'a>(pub &'a Value);

impl Serialize for JsonView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Keyword(k) => serializer.serialize_str(k.name()),
            Value::Uuid(id) => serializer.collect_str(id),
            Value::Point(p) => serialize_map(serializer, &p.to_map()),
            Value::Rect(r) => serialize_map(serializer, &r.to_map()),
            Value::Matrix(m) => serialize_map(serializer, &m.to_map()),
            Value::Shape(shape) => serialize_map(serializer, shape.fields()),
            Value::Map(map) => serialize_map(serializer, map),
            Value::List(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&JsonView(item))?;
                }
                seq.end()
            }
        }
    }
}

fn serialize_map<S: Serializer>(serializer: S, map: &Map) -> Result<S::Ok, S::Error> {
    let mut seen = HashSet::with_capacity(map.len());
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        let name = match key {
            Key::Keyword(k) => to_camel(k.name()),
            Key::Str(s) => s.clone(),
        };
        if seen.contains(&name) {
            return Err(S::Error::custom(format!("duplicate JSON key `{name}`")));
        }
        out.serialize_entry(&name, &JsonView(value))?;
        seen.insert(name);
    }
    out.end()
}

/// Write `value` as JSON into `writer`.
pub fn write_json<W: io::Write>(writer: W, value: &Value) -> io::Result<()> {
    serde_json::to_writer(writer, &JsonView(value)).map_err(io::Error::from)
}

/// Encode `value` as a JSON byte vector.
pub fn to_json_vec(value: &Value) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_json(&mut buf, value)?;
    Ok(buf)
}
