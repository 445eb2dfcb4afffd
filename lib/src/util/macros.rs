/// Builds a [`Dict`](crate::value::Dict) from `key => value` pairs.
///
/// ```rust
/// use mkpage::value::Value;
///
/// let dict = mkpage::dict! { "title" => "Slides", "count" => 3u8 };
/// assert_eq!(dict["title"].as_str(), Some("Slides"));
/// assert_eq!(dict["count"], Value::from(3u8));
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut dict: $crate::value::Dict = $crate::value::Dict::new();
        $(dict.insert($key.into(), $value.into());)*
        dict
    });
}

pub use dict;
