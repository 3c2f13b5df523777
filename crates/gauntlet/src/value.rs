use indexmap::IndexMap;
use std::{collections::BTreeMap, collections::HashMap, fmt, hash::BuildHasher};

/// The fundamental kind of a [`Value`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Double,
    String,
    Array,
    Object,
}

impl Kind {
    /// Return the name of this kind as shown in mismatch descriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "NULL",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operand of an assertion.
///
/// Two values are equal only if they are of the same [`Kind`] and carry the
/// same contents, so `Value::Int(1)`, `Value::Float(1.0)` and `Value::Str("1")`
/// are all distinct from each other.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object {
        type_name: &'static str,
        repr: String,
    },
}

impl Value {
    /// Wrap an arbitrary value as an object-like operand.
    ///
    /// Objects compare equal when their type names and `Debug`
    /// representations match.
    pub fn object<T>(val: &T) -> Self
    where
        T: fmt::Debug + ?Sized,
    {
        Value::Object {
            type_name: std::any::type_name::<T>(),
            repr: format!("{:?}", val),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(..) => Kind::Boolean,
            Value::Int(..) => Kind::Integer,
            Value::Float(..) => Kind::Double,
            Value::Str(..) => Kind::String,
            Value::Array(..) | Value::Map(..) => Kind::Array,
            Value::Object { .. } => Kind::Object,
        }
    }

    /// Return whether the value is structured (a list or a mapping).
    pub fn is_structured(&self) -> bool {
        self.kind() == Kind::Array
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(true) => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Array(..) | Value::Map(..) => f.write_str("array"),
            Value::Object { type_name, .. } => f.write_str(type_name),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(i128::from(n))
            }
        }
    )*};
}

impl_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        // pointer-sized integers are at most 64 bits wide
        Value::Int(n as i128)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i128)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T> From<&[T]> for Value
where
    T: Clone + Into<Value>,
{
    fn from(items: &[T]) -> Self {
        Value::Array(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T, const N: usize> From<[T; N]> for Value
where
    T: Into<Value>,
{
    fn from(items: [T; N]) -> Self {
        Value::Array(IntoIterator::into_iter(items).map(Into::into).collect())
    }
}

impl<K, T> From<IndexMap<K, T>> for Value
where
    K: Into<String>,
    T: Into<Value>,
{
    fn from(map: IndexMap<K, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, T> From<BTreeMap<K, T>> for Value
where
    K: Into<String>,
    T: Into<Value>,
{
    fn from(map: BTreeMap<K, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, T, S> From<HashMap<K, T, S>> for Value
where
    K: Into<String>,
    T: Into<Value>,
    S: BuildHasher,
{
    fn from(map: HashMap<K, T, S>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
