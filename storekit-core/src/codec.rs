//! Wire codec for typed store values.
//!
//! The remote store speaks UTF-8 strings for hash fields, hash values, and
//! sorted-set members. `WireValue` is the closed capability that converts an
//! application-level value to that wire string and back. It is implemented
//! explicitly for the supported scalar types; composite types go through the
//! [`Json`] wrapper, which uses `serde_json` as the structured text encoding.
//!
//! Encoding is deterministic and never fails at runtime; decoding reports
//! [`StoreError::Conversion`] when the stored string cannot be parsed into
//! the requested type. Absence never reaches the codec: lookups yield
//! `Option<String>` at the client boundary, so a missing value is `None`
//! before any decode happens and stays distinguishable from a stored `"0"`.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::type_name;

/// Bidirectional conversion between a typed value and its wire string.
///
/// Round-trip law: `T::decode(&v.encode())` returns a value equal to `v`
/// for every supported value `v`.
pub trait WireValue: Sized + Send + Sync {
    /// Encode the value into its wire string representation
    fn encode(&self) -> String;

    /// Decode a wire string back into the value
    fn decode(raw: &str) -> Result<Self>;
}

macro_rules! impl_wire_value_via_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WireValue for $ty {
                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(raw: &str) -> Result<Self> {
                    raw.parse::<$ty>()
                        .map_err(|e| StoreError::conversion(type_name::<$ty>(), raw, e))
                }
            }
        )*
    };
}

impl_wire_value_via_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool,
);

impl WireValue for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Result<Self> {
        Ok(raw.to_string())
    }
}

/// Wrapper marking a composite type as JSON-encoded on the wire.
///
/// Any `T: Serialize + DeserializeOwned` can be stored as a hash value or
/// sorted-set member by wrapping it: `Json(my_struct)`. The inner value is
/// reachable through `.0` or [`Json::into_inner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> WireValue for Json<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn encode(&self) -> String {
        // Failure here means the type itself cannot be represented as JSON
        // (e.g. a map with non-string keys), which is a programming error.
        serde_json::to_string(&self.0).expect("wire value must serialize to JSON")
    }

    fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map(Json)
            .map_err(|e| StoreError::conversion(type_name::<T>(), raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scalar_round_trip() {
        assert_eq!(i64::decode(&42i64.encode()).unwrap(), 42);
        assert_eq!(i64::decode(&(-7i64).encode()).unwrap(), -7);
        assert_eq!(u32::decode(&0u32.encode()).unwrap(), 0);
        assert_eq!(f64::decode(&1.5f64.encode()).unwrap(), 1.5);
        assert_eq!(bool::decode(&true.encode()).unwrap(), true);
        assert_eq!(
            String::decode(&"hello".to_string().encode()).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_decode_failure_is_conversion_error() {
        let err = i64::decode("not-a-number").unwrap_err();
        assert!(err.is_conversion());

        let err = bool::decode("yes").unwrap_err();
        assert!(err.is_conversion());

        let err = f64::decode("").unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn test_zero_value_is_not_absence() {
        // A stored "0" decodes to 0; absence is represented as Option::None
        // at the client boundary and never reaches the codec.
        assert_eq!(i64::decode("0").unwrap(), 0);
        assert_eq!(String::decode("").unwrap(), "");
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Task {
        id: u64,
        name: String,
        done: bool,
    }

    #[test]
    fn test_json_round_trip() {
        let task = Json(Task {
            id: 9,
            name: "review".to_string(),
            done: false,
        });
        let wire = task.encode();
        assert_eq!(Json::<Task>::decode(&wire).unwrap(), task);
    }

    #[test]
    fn test_json_decode_failure() {
        let err = Json::<Task>::decode("{\"id\": \"oops\"}").unwrap_err();
        assert!(err.is_conversion());
    }

    proptest! {
        #[test]
        fn prop_i64_round_trip(v in any::<i64>()) {
            prop_assert_eq!(i64::decode(&v.encode()).unwrap(), v);
        }

        #[test]
        fn prop_u64_round_trip(v in any::<u64>()) {
            prop_assert_eq!(u64::decode(&v.encode()).unwrap(), v);
        }

        #[test]
        fn prop_f64_round_trip(v in any::<f64>().prop_filter("NaN is not comparable", |f| !f.is_nan())) {
            prop_assert_eq!(f64::decode(&v.encode()).unwrap(), v);
        }

        #[test]
        fn prop_string_round_trip(v in ".*") {
            prop_assert_eq!(String::decode(&v.clone().encode()).unwrap(), v);
        }
    }
}
