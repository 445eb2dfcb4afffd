use std::sync::Arc;
use std::collections::BTreeMap;

use either::Either;
use serde::{Serialize, Deserialize};

pub type Dict<K = Arc<str>, V = Value> = BTreeMap<K, V>;

/// Any value that can appear in front matter or JSON data.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Num(Num),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Dict(Arc<Dict>),
}

impl Value {
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None
        }
    }

    pub fn to_num(&self) -> Option<Num> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None
        }
    }

    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(v) => Some(&**v),
            _ => None
        }
    }

    pub fn into_dict(self) -> Result<Arc<Dict>, Value> {
        match self {
            Value::Dict(v) => Ok(v),
            _ => Err(self)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interprets `self` as an on/off switch: `true`, the number `1`, or the
    /// string `"true"` in any case are on. Everything else is off.
    ///
    /// ```rust
    /// use mkpage::value::Value;
    ///
    /// assert!(Value::from(true).is_truthy());
    /// assert!(Value::from(1u8).is_truthy());
    /// assert!(Value::from(1.0).is_truthy());
    /// assert!(Value::from("TRUE").is_truthy());
    ///
    /// assert!(!Value::from(2u8).is_truthy());
    /// assert!(!Value::from("yes").is_truthy());
    /// assert!(!Value::from(false).is_truthy());
    /// assert!(!Value::Null.is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => *n == Num::U64(1),
            Value::String(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
        }
    }
}

macro_rules! impl_from_primitive {
    ($($T:ty),+ => $E:ident::$kind:ident) => {
        $(
            impl From<$T> for $E {
                fn from(value: $T) -> Self {
                    $E::$kind(value.into())
                }
            }
        )+
    };
}

impl_from_primitive!(bool => Value::Bool);
impl_from_primitive!(&str => Value::String);
impl_from_primitive!(std::borrow::Cow<'_, str> => Value::String);
impl_from_primitive!(String => Value::String);
impl_from_primitive!(Arc<str> => Value::String);
impl_from_primitive!(Arc<Vec<Value>> => Value::Array);
impl_from_primitive!(Arc<Dict> => Value::Dict);
impl_from_primitive!(u8, u16, u32, u64, usize => Value::Num);
impl_from_primitive!(i8, i16, i32, i64, isize => Value::Num);
impl_from_primitive!(f32, f64 => Value::Num);

impl From<()> for Value  {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<A, B> From<Either<A, B>> for Value where Value: From<A>, Value: From<B> {
    fn from(value: Either<A, B>) -> Self {
        either::for_both!(value, v => v.into())
    }
}

impl<T> From<Option<T>> for Value where Value: From<T> {
    fn from(value: Option<T>) -> Self {
        value.map(Value::from).unwrap_or(Value::Null)
    }
}

impl<T> From<Vec<T>> for Value where Value: From<T> {
    fn from(value: Vec<T>) -> Self {
        value.into_iter()
            .map(Value::from)
            .collect()
    }
}

impl<K, V> From<Dict<K, V>> for Value where Arc<str>: From<K>, Value: From<V> {
    fn from(value: Dict<K, V>) -> Self {
        let dict = value.into_iter()
            .map(|(k, v)| (<Arc::<str>>::from(k), Value::from(v)))
            .collect::<Dict>();

        Value::Dict(Arc::new(dict))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let vec = iter.into_iter().collect::<Vec<Value>>();
        Value::Array(Arc::from(vec))
    }
}

/// A numeric value as it appears in JSON, YAML, or TOML.
///
/// Unsigned integers are tried first, then signed ones, then floats, so an
/// integral value never deserializes as a float.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Num {
    /// A 64-bit unsigned integer.
    U64(u64),
    /// A 64-bit signed integer.
    I64(i64),
    /// A 64-bit float.
    F64(f64),
}

impl Num {
    pub fn to_f64(self) -> f64 {
        match self {
            Num::U64(v) => v as f64,
            Num::I64(v) => v as f64,
            Num::F64(v) => v,
        }
    }

    pub fn to_i128(self) -> Option<i128> {
        match self {
            Num::U64(v) => Some(v as i128),
            Num::I64(v) => Some(v as i128),
            Num::F64(v) if v.fract() == 0.0 && v.abs() < 1e18 => Some(v as i128),
            Num::F64(_) => None,
        }
    }
}

impl PartialEq for Num {
    /// ```rust
    /// use mkpage::value::Num;
    ///
    /// assert_eq!(Num::from(-0i8), Num::from(0u8));
    /// assert_eq!(Num::from(10i32), Num::from(10u64));
    /// assert_eq!(Num::from(1.0), Num::from(1u8));
    /// assert_ne!(Num::from(1.5), Num::from(1u8));
    /// assert_ne!(Num::from(-1i64), Num::from(1u64));
    /// ```
    fn eq(&self, other: &Self) -> bool {
        match (self.to_i128(), other.to_i128()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

macro_rules! impl_from_for_num_value {
    ($($T:ty: $V:ident),* $(,)?) => ($(
        impl From<$T> for Num {
            fn from(value: $T) -> Num {
                Num::$V(value.into())
            }
        }
    )*)
}

impl_from_for_num_value! {
    u8: U64, u16: U64, u32: U64, u64: U64,
    i8: I64, i16: I64, i32: I64, i64: I64,
    f32: F64, f64: F64,
}

impl From<usize> for Num {
    fn from(value: usize) -> Num {
        Num::U64(value as u64)
    }
}

impl From<isize> for Num {
    fn from(value: isize) -> Num {
        Num::I64(value as i64)
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn deserializes_mixed_json() {
        let value: Value = serde_json::from_str(r#"{
            "title": "Hello",
            "count": 3,
            "ratio": 0.5,
            "offset": -2,
            "tags": ["a", "b"],
            "draft": false,
            "none": null
        }"#).unwrap();

        let dict = value.as_dict().unwrap();
        assert_eq!(dict["title"].as_str(), Some("Hello"));
        assert_eq!(dict["count"], Value::from(3u8));
        assert_eq!(dict["ratio"], Value::from(0.5));
        assert_eq!(dict["offset"], Value::from(-2i32));
        assert_eq!(dict["tags"].as_slice().map(|s| s.len()), Some(2));
        assert_eq!(dict["draft"].to_bool(), Some(false));
        assert!(dict["none"].is_null());
    }

    #[test]
    fn serializes_back_to_json() {
        let value = Value::from(crate::dict! {
            "a" => 1u8,
            "b" => "two",
            "c" => vec![Value::from(true), Value::Null],
        });

        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"a":1,"b":"two","c":[true,null]}"#);
    }
}
