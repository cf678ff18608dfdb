//! Type-directed reconstruction of decoded JSON values.
//!
//! [`transform`] applies the [`rule_for`] table to one `(field, value)` pair.
//! The JSON reader calls it bottom-up, so by the time a parent field is
//! transformed its children already carry their domain types.

use uuid::Uuid;

use crate::casing::to_keyword;
use crate::error::ValueError;
use crate::fields::{FieldTransformRule, RESERVED_TYPE_LITERALS, rule_for};
use crate::geom::{Matrix, Point, Rect, Shape};
use crate::value::{Key, Keyword, Map, Value};

/// Rebuild `value` according to the rule registered for `field`.
///
/// `Nil` passes through every rule unchanged.
pub fn transform(field: &str, value: Value) -> Result<Value, ValueError> {
    apply(field, rule_for(field), value)
}

fn apply(field: &str, rule: FieldTransformRule, value: Value) -> Result<Value, ValueError> {
    if value.is_nil() {
        return Ok(value);
    }

    match rule {
        FieldTransformRule::Identifier => identifier(value).map(Value::Uuid),
        FieldTransformRule::Points => points(value),
        FieldTransformRule::Rect => Rect::from_value(&value).map(Value::Rect),
        FieldTransformRule::Matrix => Matrix::from_value(&value).map(Value::Matrix),
        FieldTransformRule::Shape => Shape::from_value(value).map(Value::Shape),
        FieldTransformRule::UuidCollection => identifiers(field, value),
        FieldTransformRule::KeywordSet => Ok(keyword_set(value)),
        FieldTransformRule::SymbolicEnum => Ok(symbol(field, value)),
        FieldTransformRule::Operations => operations(value),
        FieldTransformRule::Passthrough => Ok(value),
    }
}

fn identifier(value: Value) -> Result<Uuid, ValueError> {
    match value {
        Value::Uuid(id) => Ok(id),
        Value::Str(s) => Uuid::parse_str(&s).map_err(|_| ValueError::InvalidIdentifier(s)),
        other => Err(ValueError::Unexpected {
            ty: "uuid",
            found: other.type_name(),
        }),
    }
}

fn identifiers(field: &str, value: Value) -> Result<Value, ValueError> {
    let rebuild = |items: Vec<Value>| -> Result<Vec<Value>, ValueError> {
        items
            .into_iter()
            .map(|item| identifier(item).map(Value::Uuid))
            .collect()
    };

    match value {
        Value::List(items) => rebuild(items).map(Value::List),
        Value::Set(items) => rebuild(items).map(Value::set),
        _ => Err(ValueError::ExpectedCollection(field.to_owned())),
    }
}

fn points(value: Value) -> Result<Value, ValueError> {
    match value {
        Value::List(items) | Value::Set(items) => items
            .iter()
            .map(|item| Point::from_value(item).map(Value::Point))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        single => Ok(Value::List(vec![Value::Point(Point::from_value(&single)?)])),
    }
}

// A non-collection yields nil instead of an error.
fn keyword_set(value: Value) -> Value {
    match value {
        Value::List(items) | Value::Set(items) => Value::set(items.into_iter().map(|item| {
            match item {
                Value::Str(s) => Value::Keyword(Keyword::new(s)),
                other => other,
            }
        })),
        _ => Value::Nil,
    }
}

fn symbol(field: &str, value: Value) -> Value {
    match value {
        Value::Str(s) if field == "type" && RESERVED_TYPE_LITERALS.contains(&s.as_str()) => {
            Value::Str(s)
        }
        Value::Str(s) => Value::Keyword(Keyword::new(s)),
        other => other,
    }
}

fn operations(value: Value) -> Result<Value, ValueError> {
    let items = match value {
        Value::List(items) | Value::Set(items) => items,
        _ => return Err(ValueError::ExpectedCollection("operations".to_owned())),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Map(record) => operation(record),
            other => Ok(other),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Rebuild one `{attr, val}` record, dispatching on its own `attr`.
fn operation(mut record: Map) -> Result<Value, ValueError> {
    let attr_key = Key::keyword("attr");
    let attr = match record.get(&attr_key) {
        Some(Value::Str(s)) => to_keyword(s),
        Some(Value::Keyword(k)) => k.clone(),
        _ => return Ok(Value::Map(record)),
    };

    let val_key = Key::keyword("val");
    if let Some(val) = record.remove(&val_key) {
        record.insert(val_key, transform(attr.name(), val)?);
    }
    record.insert(attr_key, Value::Keyword(attr));
    Ok(Value::Map(record))
}
