//! Common serde helpers for handling null values from the document store
//!
//! 文档中的字段可能显式为 `null` (Firestore `nullValue`)，与缺失同等对待。

use serde::{Deserialize, Deserializer};

/// Deserialize a value that treats null as `T::default()`
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "null_default")]
        items: Vec<u32>,
        #[serde(default, deserialize_with = "null_default")]
        name: String,
    }

    #[test]
    fn test_null_and_missing_become_default() {
        let null: Sample = serde_json::from_str(r#"{"items": null, "name": null}"#).unwrap();
        assert!(null.items.is_empty());
        assert_eq!(null.name, "");

        let missing: Sample = serde_json::from_str("{}").unwrap();
        assert!(missing.items.is_empty());

        let present: Sample = serde_json::from_str(r#"{"items": [1, 2], "name": "a"}"#).unwrap();
        assert_eq!(present.items, vec![1, 2]);
        assert_eq!(present.name, "a");
    }
}
