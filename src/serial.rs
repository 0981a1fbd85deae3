//! Serde integration support.

use std::fmt;

use serde::de::{Error, Unexpected, Visitor};
use serde::*;
use serde_json::Value;

fn i64_to_u64<'d, V: Visitor<'d>, E: Error>(v: V, n: i64) -> Result<V::Value, E> {
    if n >= 0 {
        v.visit_u64(n as u64)
    } else {
        Err(E::invalid_value(Unexpected::Signed(n), &v))
    }
}

/// Deserialize a maybe-string ID into a u64.
pub fn deserialize_id<'d, D: Deserializer<'d>>(d: D) -> Result<u64, D::Error> {
    struct IdVisitor;
    impl<'d> Visitor<'d> for IdVisitor {
        type Value = u64;

        fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
            write!(fmt, "a u64 or parseable string")
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<u64, E> {
            i64_to_u64(self, v)
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<u64, E> {
            v.parse::<u64>()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    d.deserialize_any(IdVisitor)
}

/// Tell an absent field apart from an explicit `null`.
///
/// Use together with `#[serde(default)]` on an `Option<Option<T>>` field:
/// an absent field stays `None`, `null` becomes `Some(None)`.
pub fn nullable<'d, T: Deserialize<'d>, D: Deserializer<'d>>(
    d: D,
) -> Result<Option<Option<T>>, D::Error> {
    Option::<T>::deserialize(d).map(Some)
}

/// String-encoded bitfields, such as permissions.
///
/// Discord sends permission sets as decimal strings since they outgrew 53 bits;
/// older payloads and some gateway events still use plain integers.
pub mod bitfield {
    use super::*;

    pub fn serialize<S: Serializer>(bits: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(bits)
    }

    pub fn deserialize<'d, D: Deserializer<'d>>(d: D) -> Result<u64, D::Error> {
        deserialize_id(d)
    }
}

/// Convert a `camelCase` key into its `snake_case` wire form.
///
/// Keys that are already snake case pass through unchanged.
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            // a run of capitals is one word, the last of them may start the next
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower)
            {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Recursively rename every object key in a value with `rename`.
pub fn transform_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (rename(&key), transform_keys(value, rename)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| transform_keys(item, rename))
                .collect(),
        ),
        other => other,
    }
}

/// Recursively convert every object key in a value to `snake_case`.
pub fn snake_case_keys(value: Value) -> Value {
    transform_keys(value, &to_snake_case)
}

/// Make sure a field holds a certain numeric value, or fail otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eq<const N: u64>;

impl<'de, const N: u64> Deserialize<'de> for Eq<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NumberVisitor<const N: u64>;

        impl<'d, const N: u64> Visitor<'d> for NumberVisitor<N> {
            type Value = u64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "the number {}", N)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                if v == N {
                    Ok(v)
                } else {
                    Err(E::invalid_value(Unexpected::Unsigned(v), &self))
                }
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                // n can't be negative so no checks required
                if v as u64 == N {
                    Ok(v as u64)
                } else {
                    Err(E::invalid_value(Unexpected::Signed(v), &self))
                }
            }
        }

        deserializer.deserialize_any(NumberVisitor::<N>)?;
        Ok(Self)
    }
}

impl<const N: u64> Serialize for Eq<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("customId"), "custom_id");
        assert_eq!(to_snake_case("minValues"), "min_values");
        assert_eq!(to_snake_case("custom_id"), "custom_id");
        assert_eq!(to_snake_case("url"), "url");
        assert_eq!(to_snake_case("URL"), "url");
        assert_eq!(to_snake_case("proxyURL"), "proxy_url");
        assert_eq!(to_snake_case("skuID"), "sku_id");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
    }

    #[test]
    fn keys_are_transformed_recursively() {
        let input = json!({
            "customId": "a",
            "components": [{ "maxLength": 4, "defaultValues": [{ "id": "1" }] }],
        });

        assert_eq!(
            snake_case_keys(input),
            json!({
                "custom_id": "a",
                "components": [{ "max_length": 4, "default_values": [{ "id": "1" }] }],
            })
        );
    }

    #[test]
    fn nullable_keeps_absent_and_null_apart() {
        #[derive(Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "nullable")]
            topic: Option<Option<String>>,
        }

        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        let null: Patch = serde_json::from_value(json!({ "topic": null })).unwrap();
        let set: Patch = serde_json::from_value(json!({ "topic": "hi" })).unwrap();

        assert_eq!(absent.topic, None);
        assert_eq!(null.topic, Some(None));
        assert_eq!(set.topic, Some(Some("hi".to_owned())));
    }

    #[test]
    fn eq_rejects_other_numbers() {
        assert!(serde_json::from_value::<Eq<3>>(json!(3)).is_ok());
        assert!(serde_json::from_value::<Eq<3>>(json!(4)).is_err());
    }
}
