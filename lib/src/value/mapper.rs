use serde::Deserialize;

use crate::error::{ErrorDetail, Result};

/// A serde-backed data format.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// A human-readable name for the format, used in error messages.
    const NAME: &'static str;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`.
    fn from_str<T: serde::de::DeserializeOwned>(string: &str) -> Result<T, Self::Error>;
}

macro_rules! impl_format {
    ($name:ident ($display:literal) : $func:expr, $E:ty) => (
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            const NAME: &'static str = $display;

            fn from_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml("TOML"): toml_from_str, toml::de::Error);
impl_format!(Json("JSON"): serde_json::from_str, serde_json::error::Error);
impl_format!(Yaml("YAML"): serde_yaml::from_str, serde_yaml::Error);

/// Parses TOML with datetimes turned into their TOML string form, so they
/// read as plain strings instead of `toml`'s internal datetime map.
fn toml_from_str<T: serde::de::DeserializeOwned>(string: &str) -> Result<T, toml::de::Error> {
    fn stringify_datetimes(value: toml::Value) -> toml::Value {
        match value {
            toml::Value::Datetime(datetime) => toml::Value::String(datetime.to_string()),
            toml::Value::Array(array) => {
                toml::Value::Array(array.into_iter().map(stringify_datetimes).collect())
            }
            toml::Value::Table(table) => toml::Value::Table(table.into_iter()
                .map(|(key, value)| (key, stringify_datetimes(value)))
                .collect()),
            value => value,
        }
    }

    let table: toml::Table = toml::from_str(string)?;
    T::deserialize(stringify_datetimes(toml::Value::Table(table)))
}
