use uuid::Uuid;

use super::cache::{MAP_AS_ARRAY, ReadCache};
use crate::error::{DecodeError, ValueError};
use crate::geom::{Matrix, Point, Rect, Shape};
use crate::json::number;
use crate::value::{Key, Keyword, Map, Value};

/// Decode a transit+json body (compact or verbose) into a [`Value`].
///
/// Transit carries its own types, so no key casing or field rules apply.
pub fn decode_transit(bytes: &[u8]) -> Result<Value, DecodeError> {
    let raw: serde_json::Value = serde_json::from_slice(bytes)?;
    Ok(Reader::default().read(raw)?)
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A parsed transit string: either a value or a tag awaiting its rep.
enum Parsed {
    Value(Value),
    Tag(String),
}

#[derive(Default)]
struct Reader {
    cache: ReadCache,
}

impl Reader {
    fn read(&mut self, raw: serde_json::Value) -> Result<Value, ValueError> {
        match raw {
            serde_json::Value::Null => Ok(Value::Nil),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => number(&n),
            serde_json::Value::String(s) => match self.read_string(s, false)? {
                Parsed::Value(value) => Ok(value),
                Parsed::Tag(tag) => Err(ValueError::MalformedTransit(format!(
                    "tag `{tag}` outside of a tagged value"
                ))),
            },
            serde_json::Value::Array(items) => self.read_array(items),
            serde_json::Value::Object(object) => self.read_object(object),
        }
    }

    fn read_string(&mut self, s: String, as_map_key: bool) -> Result<Parsed, ValueError> {
        let s = self.cache.cache_read(s, as_map_key)?;
        parse_string(s)
    }

    fn read_array(&mut self, items: Vec<serde_json::Value>) -> Result<Value, ValueError> {
        let len = items.len();
        let mut iter = items.into_iter();
        let first = match iter.next() {
            None => return Ok(Value::List(Vec::new())),
            Some(serde_json::Value::String(s)) if s == MAP_AS_ARRAY => {
                return self.read_map_pairs(iter);
            }
            Some(serde_json::Value::String(s)) => match self.read_string(s, false)? {
                Parsed::Tag(tag) if len == 2 => {
                    let rep = iter.next().unwrap_or_default();
                    return self.read_tagged(&tag, rep);
                }
                Parsed::Tag(tag) => {
                    return Err(ValueError::MalformedTransit(format!(
                        "tag `{tag}` in an array of {len} elements"
                    )));
                }
                Parsed::Value(value) => value,
            },
            Some(other) => self.read(other)?,
        };

        let mut out = Vec::with_capacity(len);
        out.push(first);
        for item in iter {
            out.push(self.read(item)?);
        }
        Ok(Value::List(out))
    }

    fn read_map_pairs<I>(&mut self, mut iter: I) -> Result<Value, ValueError>
    where
        I: Iterator<Item = serde_json::Value>,
    {
        let mut map = Map::new();
        while let Some(raw_key) = iter.next() {
            let Some(raw_value) = iter.next() else {
                return Err(ValueError::MalformedTransit(
                    "map array with an odd number of elements".into(),
                ));
            };
            let key = self.read_key(raw_key)?;
            map.insert(key, self.read(raw_value)?);
        }
        Ok(Value::Map(map))
    }

    fn read_key(&mut self, raw: serde_json::Value) -> Result<Key, ValueError> {
        let value = match raw {
            serde_json::Value::String(s) => match self.read_string(s, true)? {
                Parsed::Value(value) => value,
                Parsed::Tag(tag) => {
                    return Err(ValueError::MalformedTransit(format!(
                        "tag `{tag}` used as a map key"
                    )));
                }
            },
            other => self.read(other)?,
        };
        key_from_value(value)
    }

    // Verbose mode: maps are objects, tagged values are `{"~#tag": rep}`.
    fn read_object(
        &mut self,
        object: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Value, ValueError> {
        if object.len() == 1 {
            if let Some((key, rep)) = object.iter().next() {
                if let Some(tag) = key.strip_prefix("~#") {
                    return self.read_tagged(tag, rep.clone());
                }
            }
        }

        let mut map = Map::new();
        for (raw_key, raw_value) in object {
            let key = self.read_key(serde_json::Value::String(raw_key))?;
            map.insert(key, self.read(raw_value)?);
        }
        Ok(Value::Map(map))
    }

    fn read_elements(&mut self, rep: serde_json::Value, tag: &str) -> Result<Vec<Value>, ValueError> {
        match rep {
            serde_json::Value::Array(items) => items.into_iter().map(|item| self.read(item)).collect(),
            _ => Err(ValueError::MalformedTransit(format!(
                "`{tag}` rep is not an array"
            ))),
        }
    }

    fn read_tagged(&mut self, tag: &str, rep: serde_json::Value) -> Result<Value, ValueError> {
        match tag {
            "'" => self.read(rep),
            "set" => Ok(Value::set(self.read_elements(rep, tag)?)),
            "list" => Ok(Value::List(self.read_elements(rep, tag)?)),
            "cmap" => {
                let items = self.read_elements(rep, tag)?;
                if items.len() % 2 != 0 {
                    return Err(ValueError::MalformedTransit(
                        "cmap with an odd number of elements".into(),
                    ));
                }
                let mut map = Map::new();
                let mut iter = items.into_iter();
                while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                    map.insert(key_from_value(k)?, v);
                }
                Ok(Value::Map(map))
            }
            "u" => match self.read(rep)? {
                Value::Str(s) => Uuid::parse_str(&s)
                    .map(Value::Uuid)
                    .map_err(|_| ValueError::InvalidIdentifier(s)),
                Value::Uuid(id) => Ok(Value::Uuid(id)),
                Value::List(halves) => match halves.as_slice() {
                    [Value::Int(hi), Value::Int(lo)] => {
                        Ok(Value::Uuid(Uuid::from_u64_pair(*hi as u64, *lo as u64)))
                    }
                    _ => Err(ValueError::MalformedTransit("uuid rep".into())),
                },
                other => Err(ValueError::Unexpected {
                    ty: "uuid",
                    found: other.type_name(),
                }),
            },
            "point" => Point::from_value(&self.read(rep)?).map(Value::Point),
            "rect" => Rect::from_value(&self.read(rep)?).map(Value::Rect),
            "matrix" => Matrix::from_value(&self.read(rep)?).map(Value::Matrix),
            "shape" => Shape::from_value(self.read(rep)?).map(Value::Shape),
            other => Err(ValueError::UnknownTag(other.to_owned())),
        }
    }
}

fn key_from_value(value: Value) -> Result<Key, ValueError> {
    match value {
        Value::Keyword(k) => Ok(Key::Keyword(k)),
        Value::Str(s) => Ok(Key::Str(s)),
        Value::Uuid(id) => Ok(Key::Str(id.to_string())),
        Value::Int(i) => Ok(Key::Str(i.to_string())),
        Value::Bool(b) => Ok(Key::Str(b.to_string())),
        other => Err(ValueError::Unexpected {
            ty: "map key",
            found: other.type_name(),
        }),
    }
}

fn parse_string(s: String) -> Result<Parsed, ValueError> {
    let mut chars = s.chars();
    if chars.next() != Some('~') {
        return Ok(Parsed::Value(Value::Str(s)));
    }
    let Some(marker) = chars.next() else {
        return Ok(Parsed::Value(Value::Str(s)));
    };
    let rest = chars.as_str();
    let malformed = || ValueError::MalformedTransit(format!("invalid `~{marker}` value `{rest}`"));

    let value = match marker {
        '~' | '^' | '`' => Value::Str(s[1..].to_owned()),
        ':' | '$' => Value::Keyword(Keyword::new(rest)),
        '#' => return Ok(Parsed::Tag(rest.to_owned())),
        'u' => Uuid::parse_str(rest)
            .map(Value::Uuid)
            .map_err(|_| ValueError::InvalidIdentifier(rest.to_owned()))?,
        'i' | 'm' => Value::Int(rest.parse().map_err(|_| malformed())?),
        'n' => match rest.parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) if is_integer_literal(rest) => {
                return Err(ValueError::IntegerOutOfRange(rest.to_owned()));
            }
            Err(_) => return Err(malformed()),
        },
        'd' | 'f' => Value::Float(rest.parse().map_err(|_| malformed())?),
        'z' => match rest {
            "NaN" => Value::Float(f64::NAN),
            "INF" => Value::Float(f64::INFINITY),
            "-INF" => Value::Float(f64::NEG_INFINITY),
            _ => return Err(malformed()),
        },
        '?' => match rest {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            _ => return Err(malformed()),
        },
        '_' => Value::Nil,
        't' | 'r' | 'c' => Value::Str(rest.to_owned()),
        other => return Err(ValueError::UnknownTag(format!("~{other}"))),
    };
    Ok(Parsed::Value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Value {
        decode_transit(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode(r#"["~#'", null]"#), Value::Nil);
        assert_eq!(decode(r#"["~#'", "~:rect"]"#), Value::keyword("rect"));
        assert_eq!(decode(r#"["~#'", "~~tilde"]"#), Value::from("~tilde"));
        assert_eq!(decode(r#"["~#'", "~i9007199254740993"]"#), Value::Int(9007199254740993));
        assert_eq!(decode(r#"["~#'", "~m1700000000000"]"#), Value::Int(1700000000000));
        assert_eq!(decode(r#"["~#'", "~?t"]"#), Value::Bool(true));
        assert_eq!(decode(r#"["~#'", "~_"]"#), Value::Nil);
        assert!(matches!(decode(r#"["~#'", "~zNaN"]"#), Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_map_with_cache() {
        let id = Uuid::new_v4();
        let input = format!(
            r#"[["^ ", "~:page-id", "~u{id}", "name", "a"], ["^ ", "^0", "~u{id}", "^1", "b"]]"#
        );
        let value = decode(&input);
        let items = value.as_slice().unwrap();
        assert_eq!(items[1].get("page-id"), Some(&Value::Uuid(id)));
        assert_eq!(
            items[1].as_map().unwrap().get(&Key::Str("name".into())),
            Some(&Value::from("b"))
        );
    }

    #[test]
    fn test_set_and_domain_tags() {
        let value = decode(
            r#"["^ ",
                "~:touched", ["~#set", ["~:geometry-group", "~:geometry-group"]],
                "~:points", [["~#point", ["^ ", "~:x", 1, "~:y", 2]]]
            ]"#,
        );
        assert_eq!(
            value.get("touched"),
            Some(&Value::Set(vec![Value::keyword("geometry-group")]))
        );
        assert_eq!(
            value.get("points"),
            Some(&Value::List(vec![Value::Point(Point::new(1.0, 2.0))]))
        );
    }

    #[test]
    fn test_verbose_objects() {
        let value = decode(r#"{"~:selrect": {"~#rect": {"~:x": 0, "~:y": 0, "~:width": 2, "~:height": 3}}}"#);
        assert_eq!(
            value.get("selrect"),
            Some(&Value::Rect(Rect::new(0.0, 0.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn test_cmap() {
        let value = decode(r#"["~#cmap", ["~:a", 1, "b", 2]]"#);
        let map = value.as_map().unwrap();
        assert_eq!(map.get(&Key::keyword("a")), Some(&Value::Int(1)));
        assert_eq!(map.get(&Key::Str("b".into())), Some(&Value::Int(2)));
    }

    #[test]
    fn test_plain_arrays() {
        assert_eq!(
            decode(r#"[1, "two", "~:three"]"#),
            Value::List(vec![Value::Int(1), Value::from("two"), Value::keyword("three")])
        );
        assert_eq!(decode("[]"), Value::List(vec![]));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            decode_transit(br#"["~#bogus", 1]"#).unwrap_err(),
            DecodeError::Value(ValueError::UnknownTag(tag)) if tag == "bogus"
        ));
        assert!(matches!(
            decode_transit(br#"["^ ", "^3", 1]"#).unwrap_err(),
            DecodeError::Value(ValueError::InvalidCacheRef(_))
        ));
        assert!(matches!(
            decode_transit(br#"["^ ", "~:a"]"#).unwrap_err(),
            DecodeError::Value(ValueError::MalformedTransit(_))
        ));
        assert!(matches!(
            decode_transit(br#"["^ ", "~:a", "#).unwrap_err(),
            DecodeError::UnexpectedEof(_)
        ));
    }

    #[test]
    fn test_big_integers_are_rejected() {
        assert!(matches!(
            decode_transit(b"[18446744073709551615]").unwrap_err(),
            DecodeError::Value(ValueError::IntegerOutOfRange(_))
        ));
        assert!(matches!(
            decode_transit(br#"["~n123456789012345678901234567890"]"#).unwrap_err(),
            DecodeError::Value(ValueError::IntegerOutOfRange(n)) if n == "123456789012345678901234567890"
        ));
        assert_eq!(
            decode_transit(br#"["~n42"]"#).unwrap(),
            Value::List(vec![Value::Int(42)])
        );
        assert!(matches!(
            decode_transit(br#"["~nabc"]"#).unwrap_err(),
            DecodeError::Value(ValueError::MalformedTransit(_))
        ));
    }

    #[test]
    fn test_large_set_decodes_quickly() {
        let members: Vec<String> = (0..100_000).map(|i| i.to_string()).collect();
        let body = format!(r#"["~#set", [{}]]"#, members.join(","));

        let start = std::time::Instant::now();
        let value = decode_transit(body.as_bytes()).unwrap();
        assert_eq!(value.as_slice().map(<[Value]>::len), Some(100_000));
        assert!(
            start.elapsed() < std::time::Duration::from_secs(5),
            "took {:?}",
            start.elapsed()
        );
    }
}
