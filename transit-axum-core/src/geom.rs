//! Domain records rebuilt from their flat field maps.
//!
//! Each record has a `from_value` constructor that validates the primitive
//! fields up front and reports the first missing or malformed one, so a bad
//! payload fails while decoding rather than later on access.

use uuid::Uuid;

use crate::error::ValueError;
use crate::value::{Key, Map, Value};

/// Read a required numeric field of a flat map.
fn number(map: &Map, ty: &'static str, field: &'static str) -> Result<f64, ValueError> {
    match map.get(&Key::keyword(field)) {
        None | Some(Value::Nil) => Err(ValueError::MissingField { ty, field }),
        Some(value) => value.as_f64().ok_or(ValueError::InvalidField {
            ty,
            field,
            expected: "number",
        }),
    }
}

/// Read an optional numeric field, falling back to `default` when absent.
fn number_or(
    map: &Map,
    ty: &'static str,
    field: &'static str,
    default: f64,
) -> Result<f64, ValueError> {
    match number(map, ty, field) {
        Err(ValueError::MissingField { .. }) => Ok(default),
        other => other,
    }
}

fn numeric_map<const N: usize>(fields: [(&str, f64); N]) -> Map {
    fields
        .into_iter()
        .map(|(name, v)| (Key::keyword(name), Value::Float(v)))
        .collect()
}

/// A 2D point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a point from `{x, y}`, or from a single number used for both axes.
    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Point(p) => Ok(*p),
            Value::Map(map) => Ok(Self::new(
                number(map, "point", "x")?,
                number(map, "point", "y")?,
            )),
            Value::Int(_) | Value::Float(_) => {
                let n = value.as_f64().unwrap_or_default();
                Ok(Self::new(n, n))
            }
            other => Err(ValueError::Unexpected {
                ty: "point",
                found: other.type_name(),
            }),
        }
    }

    /// The canonical flat representation.
    pub fn to_map(&self) -> Map {
        numeric_map([("x", self.x), ("y", self.y)])
    }
}

/// An axis-aligned selection rectangle with its derived corner coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    /// Create a rectangle, deriving the corners from origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    /// Build a rectangle from its flat fields.
    ///
    /// `x`, `y`, `width` and `height` are required; corner fields default to
    /// the values derived from them.
    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        let map = match value {
            Value::Rect(r) => return Ok(*r),
            Value::Map(map) => map,
            other => {
                return Err(ValueError::Unexpected {
                    ty: "rect",
                    found: other.type_name(),
                });
            }
        };
        let x = number(map, "rect", "x")?;
        let y = number(map, "rect", "y")?;
        let width = number(map, "rect", "width")?;
        let height = number(map, "rect", "height")?;
        Ok(Self {
            x,
            y,
            width,
            height,
            x1: number_or(map, "rect", "x1", x)?,
            y1: number_or(map, "rect", "y1", y)?,
            x2: number_or(map, "rect", "x2", x + width)?,
            y2: number_or(map, "rect", "y2", y + height)?,
        })
    }

    pub fn to_map(&self) -> Map {
        numeric_map([
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
            ("x1", self.x1),
            ("y1", self.y1),
            ("x2", self.x2),
            ("y2", self.y2),
        ])
    }
}

/// A 2D affine transform `[a c e; b d f]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Build a matrix from its six flat fields, all required.
    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        let map = match value {
            Value::Matrix(m) => return Ok(*m),
            Value::Map(map) => map,
            other => {
                return Err(ValueError::Unexpected {
                    ty: "matrix",
                    found: other.type_name(),
                });
            }
        };
        Ok(Self::new(
            number(map, "matrix", "a")?,
            number(map, "matrix", "b")?,
            number(map, "matrix", "c")?,
            number(map, "matrix", "d")?,
            number(map, "matrix", "e")?,
            number(map, "matrix", "f")?,
        ))
    }

    pub fn to_map(&self) -> Map {
        numeric_map([
            ("a", self.a),
            ("b", self.b),
            ("c", self.c),
            ("d", self.d),
            ("e", self.e),
            ("f", self.f),
        ])
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// A design object: an open record that must carry an `id` and a `type`.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    id: Uuid,
    fields: Map,
}

impl Shape {
    /// Build a shape from its fields.
    ///
    /// The fields are expected to be decoded already (nested `selrect`,
    /// `points`, … reconstructed); only `id` and `type` are checked here.
    pub fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut fields = match value {
            Value::Shape(shape) => return Ok(shape),
            Value::Map(map) => map,
            other => {
                return Err(ValueError::Unexpected {
                    ty: "shape",
                    found: other.type_name(),
                });
            }
        };

        let id = match fields.get(&Key::keyword("id")) {
            None | Some(Value::Nil) => {
                return Err(ValueError::MissingField {
                    ty: "shape",
                    field: "id",
                });
            }
            Some(Value::Uuid(id)) => *id,
            Some(Value::Str(s)) => {
                Uuid::parse_str(s).map_err(|_| ValueError::InvalidIdentifier(s.clone()))?
            }
            Some(_) => {
                return Err(ValueError::InvalidField {
                    ty: "shape",
                    field: "id",
                    expected: "uuid",
                });
            }
        };
        fields.insert(Key::keyword("id"), Value::Uuid(id));

        match fields.get(&Key::keyword("type")) {
            None | Some(Value::Nil) => Err(ValueError::MissingField {
                ty: "shape",
                field: "type",
            }),
            Some(_) => Ok(Self { id, fields }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The shape type name (`rect`, `frame`, `text`, …).
    pub fn kind(&self) -> Option<&str> {
        match self.fields.get(&Key::keyword("type"))? {
            Value::Keyword(k) => Some(k.name()),
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(&Key::keyword(name))
    }

    pub fn fields(&self) -> &Map {
        &self.fields
    }

    pub fn into_fields(self) -> Map {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Value)]) -> Value {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (Key::keyword(*k), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_point_from_map_and_number() {
        let p = Point::from_value(&map(&[("x", Value::Int(1)), ("y", Value::Float(2.5))])).unwrap();
        assert_eq!(p, Point::new(1.0, 2.5));

        let p = Point::from_value(&Value::Int(4)).unwrap();
        assert_eq!(p, Point::new(4.0, 4.0));
    }

    #[test]
    fn test_point_missing_field() {
        let err = Point::from_value(&map(&[("x", Value::Int(1))])).unwrap_err();
        assert_eq!(
            err,
            ValueError::MissingField {
                ty: "point",
                field: "y"
            }
        );
    }

    #[test]
    fn test_point_rejects_string() {
        let err = Point::from_value(&Value::from("1,2")).unwrap_err();
        assert!(matches!(err, ValueError::Unexpected { ty: "point", .. }));
    }

    #[test]
    fn test_rect_derives_corners() {
        let r = Rect::from_value(&map(&[
            ("x", Value::Int(10)),
            ("y", Value::Int(20)),
            ("width", Value::Int(30)),
            ("height", Value::Int(40)),
        ]))
        .unwrap();
        assert_eq!(r, Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(r.x2, 40.0);
        assert_eq!(r.y2, 60.0);
    }

    #[test]
    fn test_rect_invalid_field() {
        let err = Rect::from_value(&map(&[
            ("x", Value::from("ten")),
            ("y", Value::Int(0)),
            ("width", Value::Int(1)),
            ("height", Value::Int(1)),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ValueError::InvalidField {
                ty: "rect",
                field: "x",
                expected: "number"
            }
        );
    }

    #[test]
    fn test_matrix_requires_all_fields() {
        let full = map(&[
            ("a", Value::Int(1)),
            ("b", Value::Int(0)),
            ("c", Value::Int(0)),
            ("d", Value::Int(1)),
            ("e", Value::Int(5)),
            ("f", Value::Int(6)),
        ]);
        assert_eq!(
            Matrix::from_value(&full).unwrap(),
            Matrix::new(1.0, 0.0, 0.0, 1.0, 5.0, 6.0)
        );

        let partial = map(&[("a", Value::Int(1))]);
        assert!(matches!(
            Matrix::from_value(&partial),
            Err(ValueError::MissingField { field: "b", .. })
        ));
    }

    #[test]
    fn test_shape_requires_id_and_type() {
        let id = Uuid::new_v4();
        let shape = Shape::from_value(map(&[
            ("id", Value::Uuid(id)),
            ("type", Value::keyword("rect")),
            ("name", Value::from("Rectangle")),
        ]))
        .unwrap();
        assert_eq!(shape.id(), id);
        assert_eq!(shape.kind(), Some("rect"));
        assert_eq!(shape.get("name"), Some(&Value::from("Rectangle")));

        let err = Shape::from_value(map(&[("type", Value::keyword("rect"))])).unwrap_err();
        assert!(matches!(err, ValueError::MissingField { field: "id", .. }));

        let err = Shape::from_value(map(&[("id", Value::Uuid(id))])).unwrap_err();
        assert!(matches!(err, ValueError::MissingField { field: "type", .. }));
    }

    #[test]
    fn test_shape_parses_string_id() {
        let id = Uuid::new_v4();
        let shape = Shape::from_value(map(&[
            ("id", Value::Str(id.to_string())),
            ("type", Value::keyword("frame")),
        ]))
        .unwrap();
        assert_eq!(shape.id(), id);
        assert_eq!(shape.get("id"), Some(&Value::Uuid(id)));
    }
}
