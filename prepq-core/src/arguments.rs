//! Types for passing named parameters to prepared statements.

use std::borrow::Cow;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;

/// A value that can be bound to a named placeholder.
///
/// The set of kinds is closed; anything else must be turned into text first, either directly or
/// through [`Param::display`].
#[derive(Clone)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// An object that is converted to text when it is bound, not when it is added.
    Display(Arc<dyn Display + Send + Sync>),
}

/// How a value is handed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    Null,
    Bool,
    Int,
    Str,
}

/// A bind-ready value, tagged with its [`BindType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Str(Cow<'a, str>),
}

impl Param {
    /// Wrap a value that is bound by its string representation.
    pub fn display<T>(value: T) -> Self
    where
        T: Display + Send + Sync + 'static,
    {
        Param::Display(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Param::Null)
    }

    /// Infer how this value is bound.
    ///
    /// String conversion is checked first, so a displayable wrapper around a boolean is bound as a
    /// string, never as a boolean. Floats are bound by their decimal string.
    pub fn to_bind_value(&self) -> BindValue<'_> {
        match self {
            Param::Display(value) => BindValue::Str(Cow::Owned(value.to_string())),
            Param::Bool(value) => BindValue::Bool(*value),
            Param::Int(value) => BindValue::Int(*value),
            Param::Float(value) => BindValue::Str(Cow::Owned(value.to_string())),
            Param::Null => BindValue::Null,
            Param::Text(value) => BindValue::Str(Cow::Borrowed(value)),
        }
    }
}

impl BindValue<'_> {
    pub fn bind_type(&self) -> BindType {
        match self {
            BindValue::Null => BindType::Null,
            BindValue::Bool(_) => BindType::Bool,
            BindValue::Int(_) => BindType::Int,
            BindValue::Str(_) => BindType::Str,
        }
    }

    pub fn into_owned(self) -> BindValue<'static> {
        match self {
            BindValue::Null => BindValue::Null,
            BindValue::Bool(v) => BindValue::Bool(v),
            BindValue::Int(v) => BindValue::Int(v),
            BindValue::Str(v) => BindValue::Str(Cow::Owned(v.into_owned())),
        }
    }
}

impl Display for BindType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            BindType::Null => "NULL",
            BindType::Bool => "BOOL",
            BindType::Int => "INT",
            BindType::Str => "STR",
        })
    }
}

impl Display for BindValue<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Null => f.write_str("NULL"),
            BindValue::Bool(v) => write!(f, "{v}"),
            BindValue::Int(v) => write!(f, "{v}"),
            BindValue::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl Debug for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Param::Null => f.write_str("Null"),
            Param::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Param::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Param::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Param::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Param::Display(v) => f.debug_tuple("Display").field(&v.to_string()).finish(),
        }
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Param::Null, Param::Null) => true,
            (Param::Bool(a), Param::Bool(b)) => a == b,
            (Param::Int(a), Param::Int(b)) => a == b,
            (Param::Float(a), Param::Float(b)) => a == b,
            (Param::Text(a), Param::Text(b)) => a == b,
            (Param::Display(a), Param::Display(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Param {
                fn from(value: $ty) -> Self {
                    Param::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Param {
    fn from(value: f32) -> Self {
        // the f32's own shortest digits, not those of its f64 widening
        let shortest = value.to_string().parse().unwrap_or(f64::from(value));

        Param::Float(shortest)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Text(value.clone())
    }
}

impl From<Cow<'_, str>> for Param {
    fn from(value: Cow<'_, str>) -> Self {
        Param::Text(value.into_owned())
    }
}

impl<T> From<Option<T>> for Param
where
    T: Into<Param>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

/// An ordered map of parameter names to the values bound to them.
///
/// Names are stored as given; whether a leading `:` is required is up to the driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, Param>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Param>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove `name`, keeping the order of the remaining parameters.
    pub fn remove(&mut self, name: &str) -> Option<Param> {
        self.values.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<Param>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut arguments = Arguments::new();
        arguments.extend(iter);
        arguments
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Arguments
where
    K: Into<String>,
    V: Into<Param>,
{
    fn from(params: [(K, V); N]) -> Self {
        params.into_iter().collect()
    }
}

impl<K, V> From<Vec<(K, V)>> for Arguments
where
    K: Into<String>,
    V: Into<Param>,
{
    fn from(params: Vec<(K, V)>) -> Self {
        params.into_iter().collect()
    }
}

impl<K, V> Extend<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<Param>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// Build [`Arguments`] from `name => value` pairs.
///
/// ```rust
/// let params = prepq_core::params! {
///     "maxDob" => "2003-01-16",
///     "maxWeight" => 65,
///     "isDev" => true,
/// };
///
/// assert_eq!(params.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::arguments::Arguments::new()
    };

    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut arguments = $crate::arguments::Arguments::new();
        $(
            arguments.insert($name, $crate::arguments::Param::from($value));
        )+
        arguments
    }};
}
