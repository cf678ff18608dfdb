use std::cell::RefCell;
use std::io;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::cache::{MAP_AS_ARRAY, WriteCache};
use crate::value::{Key, Map, Value};

const MAX_SAFE_INT: i64 = (1 << 53) - 1;

/// Write `value` as transit+json into `writer`.
///
/// Compact mode encodes maps as `["^ ", k, v, …]` arrays and caches repeated
/// keys and keywords; verbose mode uses plain objects and no cache.
pub fn write_transit<W: io::Write>(writer: W, value: &Value, verbose: bool) -> io::Result<()> {
    let emitter = Emitter {
        cache: RefCell::new(WriteCache::default()),
        verbose,
    };
    serde_json::to_writer(writer, &Root(&emitter, value)).map_err(io::Error::from)
}

/// Encode `value` as a transit+json byte vector.
pub fn to_transit_vec(value: &Value, verbose: bool) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_transit(&mut buf, value, verbose)?;
    Ok(buf)
}

struct Emitter {
    cache: RefCell<WriteCache>,
    verbose: bool,
}

impl Emitter {
    fn emit(&self, s: &str, as_map_key: bool) -> String {
        if self.verbose {
            s.to_owned()
        } else {
            self.cache.borrow_mut().cache_write(s, as_map_key).into_owned()
        }
    }

    fn key(&self, key: &Key) -> String {
        match key {
            Key::Keyword(k) => self.emit(&format!("~:{}", k.name()), true),
            Key::Str(s) => self.emit(&escape(s), true),
        }
    }

    fn tagged<S, R>(&self, serializer: S, tag: &str, rep: &R) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        R: Serialize + ?Sized,
    {
        let tag = self.emit(&format!("~#{tag}"), false);
        if self.verbose {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(&tag, rep)?;
            map.end()
        } else {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(&tag)?;
            seq.serialize_element(rep)?;
            seq.end()
        }
    }
}

fn escape(s: &str) -> String {
    if s.starts_with(['~', '^', '`']) {
        format!("~{s}")
    } else {
        s.to_owned()
    }
}

/// Top-level value; bare scalars are quoted.
struct Root<'a>(&'a Emitter, &'a Value);

impl Serialize for Root<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Root(emitter, value) = *self;
        match value {
            Value::Nil
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Keyword(_)
            | Value::Uuid(_) => emitter.tagged(serializer, "'", &Node(emitter, value)),
            _ => Node(emitter, value).serialize(serializer),
        }
    }
}

struct Node<'a>(&'a Emitter, &'a Value);

impl Serialize for Node<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Node(emitter, value) = *self;
        match value {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) if (-MAX_SAFE_INT..=MAX_SAFE_INT).contains(i) => {
                serializer.serialize_i64(*i)
            }
            Value::Int(i) => serializer.serialize_str(&format!("~i{i}")),
            Value::Float(f) if f.is_nan() => serializer.serialize_str("~zNaN"),
            Value::Float(f) if f.is_infinite() && *f > 0.0 => serializer.serialize_str("~zINF"),
            Value::Float(f) if f.is_infinite() => serializer.serialize_str("~z-INF"),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(&emitter.emit(&escape(s), false)),
            Value::Keyword(k) => {
                serializer.serialize_str(&emitter.emit(&format!("~:{}", k.name()), false))
            }
            Value::Uuid(id) => serializer.serialize_str(&format!("~u{id}")),
            Value::Point(p) => emitter.tagged(serializer, "point", &MapNode(emitter, &p.to_map())),
            Value::Rect(r) => emitter.tagged(serializer, "rect", &MapNode(emitter, &r.to_map())),
            Value::Matrix(m) => {
                emitter.tagged(serializer, "matrix", &MapNode(emitter, &m.to_map()))
            }
            Value::Shape(shape) => {
                emitter.tagged(serializer, "shape", &MapNode(emitter, shape.fields()))
            }
            Value::List(items) => SeqNode(emitter, items).serialize(serializer),
            Value::Set(items) => emitter.tagged(serializer, "set", &SeqNode(emitter, items)),
            Value::Map(map) => MapNode(emitter, map).serialize(serializer),
        }
    }
}

struct SeqNode<'a>(&'a Emitter, &'a [Value]);

impl Serialize for SeqNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let SeqNode(emitter, items) = *self;
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&Node(emitter, item))?;
        }
        seq.end()
    }
}

struct MapNode<'a>(&'a Emitter, &'a Map);

impl Serialize for MapNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let MapNode(emitter, map) = *self;
        if emitter.verbose {
            let mut out = serializer.serialize_map(Some(map.len()))?;
            for (key, value) in map {
                out.serialize_entry(&emitter.key(key), &Node(emitter, value))?;
            }
            return out.end();
        }

        let mut seq = serializer.serialize_seq(Some(1 + 2 * map.len()))?;
        seq.serialize_element(MAP_AS_ARRAY)?;
        for (key, value) in map {
            seq.serialize_element(&emitter.key(key))?;
            seq.serialize_element(&Node(emitter, value))?;
        }
        seq.end()
    }
}
