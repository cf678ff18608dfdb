//! Decoded value model.
//!
//! Both wire formats decode into [`Value`]: a closed tree of maps, sequences,
//! scalars and the domain records the codec knows how to rebuild
//! ([`Point`], [`Rect`], [`Matrix`], [`Shape`]).

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use crate::geom::{Matrix, Point, Rect, Shape};

/// A kebab-cased symbolic name, written `:page-id`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keyword(String);

impl Keyword {
    /// Create a keyword from its bare name (without the leading colon).
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// The bare name of this keyword.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl From<&str> for Keyword {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A map key: keyword for decoded field names, plain string otherwise.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Keyword(Keyword),
    Str(String),
}

impl Key {
    /// Shorthand for a keyword key.
    pub fn keyword<S: Into<String>>(name: S) -> Self {
        Self::Keyword(Keyword::new(name))
    }

    /// The key's name, without any keyword marker.
    pub fn name(&self) -> &str {
        match self {
            Self::Keyword(k) => k.name(),
            Self::Str(s) => s,
        }
    }
}

impl From<Keyword> for Key {
    fn from(k: Keyword) -> Self {
        Self::Keyword(k)
    }
}

/// Mapping from unique keys to values. Ordering carries no meaning.
pub type Map = BTreeMap<Key, Value>;

/// A decoded payload node.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Keyword(Keyword),
    Uuid(Uuid),
    Point(Point),
    Rect(Rect),
    Matrix(Matrix),
    Shape(Shape),
    List(Vec<Value>),
    /// Members in first-seen order.
    ///
    /// Only [`Value::set`] drops duplicates. The decoders always go through
    /// it; building the variant directly skips the check.
    Set(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Shorthand for a keyword value.
    pub fn keyword<S: Into<String>>(name: S) -> Self {
        Self::Keyword(Keyword::new(name))
    }

    /// Build a set, dropping duplicate members. Runs in linear time.
    pub fn set<I: IntoIterator<Item = Value>>(items: I) -> Self {
        let items: Vec<Value> = items.into_iter().collect();
        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(items.len());
            items.iter().map(|item| seen.insert(Member(item))).collect()
        };
        Self::Set(
            items
                .into_iter()
                .zip(keep)
                .filter_map(|(item, keep)| keep.then_some(item))
                .collect(),
        )
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Whether this is a list, set or map.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map(_))
    }

    /// Whether a response carrying this value goes through the encoder.
    ///
    /// Booleans, collections and domain records qualify; other scalars do not.
    pub fn is_encodable(&self) -> bool {
        self.is_collection()
            || matches!(
                self,
                Self::Bool(_) | Self::Point(_) | Self::Rect(_) | Self::Matrix(_) | Self::Shape(_)
            )
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Keyword(_) => "keyword",
            Self::Uuid(_) => "uuid",
            Self::Point(_) => "point",
            Self::Rect(_) => "rect",
            Self::Matrix(_) => "matrix",
            Self::Shape(_) => "shape",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
        }
    }

    /// Numeric view of integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Self::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Elements of a list or set.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a keyword-keyed entry of a map.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(&Key::keyword(name)))
    }
}

/// Hashable view of a value for set membership.
///
/// Equality is `Value`'s own. Floats hash by bit pattern with `-0.0` folded
/// into `0.0`, so values that compare equal hash equal.
struct Member<'a>(&'a Value);

impl PartialEq for Member<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Member<'_> {}

impl Hash for Member<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(self.0, state);
    }
}

fn hash_f64<H: Hasher>(f: f64, state: &mut H) {
    let f = if f == 0.0 { 0.0 } else { f };
    f.to_bits().hash(state);
}

fn hash_map<H: Hasher>(map: &Map, state: &mut H) {
    map.len().hash(state);
    for (key, value) in map {
        key.hash(state);
        hash_value(value, state);
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Nil => {}
        Value::Bool(b) => b.hash(state),
        Value::Int(i) => i.hash(state),
        Value::Float(f) => hash_f64(*f, state),
        Value::Str(s) => s.hash(state),
        Value::Keyword(k) => k.hash(state),
        Value::Uuid(id) => id.hash(state),
        Value::Point(p) => [p.x, p.y].into_iter().for_each(|f| hash_f64(f, state)),
        Value::Rect(r) => [r.x, r.y, r.width, r.height]
            .into_iter()
            .for_each(|f| hash_f64(f, state)),
        Value::Matrix(m) => [m.a, m.b, m.c, m.d, m.e, m.f]
            .into_iter()
            .for_each(|f| hash_f64(f, state)),
        Value::Shape(shape) => {
            shape.id().hash(state);
            hash_map(shape.fields(), state);
        }
        Value::List(items) | Value::Set(items) => {
            items.len().hash(state);
            items.iter().for_each(|item| hash_value(item, state));
        }
        Value::Map(map) => hash_map(map, state),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Keyword> for Value {
    fn from(k: Keyword) -> Self {
        Self::Keyword(k)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<Point> for Value {
    fn from(p: Point) -> Self {
        Self::Point(p)
    }
}

impl From<Rect> for Value {
    fn from(r: Rect) -> Self {
        Self::Rect(r)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Self::Matrix(m)
    }
}

impl From<Shape> for Value {
    fn from(s: Shape) -> Self {
        Self::Shape(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Self::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Nil)
    }
}
