/// Builds a [`Value`](crate::Value) from a literal, JSON-like description.
///
/// Handy for writing the expected side of decoder assertions.
///
/// ```rust
/// use serde_marshal::{marshal, Value};
///
/// let value = marshal!({ "name": "Alice", "tags": ["a", null], "n": 1.5 });
/// let map = value.as_hash().unwrap();
/// assert_eq!(map.get("name"), Some(&Value::from("Alice")));
/// assert_eq!(map.get("n"), Some(&Value::Float(1.5)));
/// ```
#[macro_export]
macro_rules! marshal {
    // Handle nil
    (null) => {
        $crate::Value::Nil
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    // Handle empty array
    ([]) => {
        $crate::Value::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::marshal!($elem)),*])
    };

    // Handle empty hash
    ({}) => {
        $crate::Value::Hash($crate::MarshalMap::new())
    };

    // Handle non-empty hash
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut hash = $crate::MarshalMap::new();
        $(
            hash.insert($key.to_string(), $crate::marshal!($value));
        )*
        $crate::Value::Hash(hash)
    }};

    // Anything with a `From` conversion
    ($s:expr) => {
        $crate::Value::from($s)
    };
}
