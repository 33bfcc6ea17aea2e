//! Firestore 值编解码
//!
//! REST 接口使用带类型标签的值：
//!
//! ```json
//! { "views": { "integerValue": "3" },
//!   "clicks": { "mapValue": { "fields": { "17": { "integerValue": "1" } } } } }
//! ```
//!
//! 整数以字符串传输；`timestampValue`/`referenceValue`/`bytesValue` 解码为字符串，
//! `geoPointValue` 解码为 `{latitude, longitude}`。

use serde_json::{Map, Number, Value, json};

use crate::db::document::{Document, FieldPath};
use crate::db::{DbResult, PersistenceError};

/// JSON 值 -> Firestore 值
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            if items.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                let values: Vec<Value> = items.iter().map(encode_value).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// 文档 -> Firestore `fields`
pub fn encode_fields(doc: &Document) -> Map<String, Value> {
    doc.iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Firestore 值 -> JSON 值
pub fn decode_value(value: &Value) -> DbResult<Value> {
    let Value::Object(tagged) = value else {
        return Err(malformed("value is not an object", value));
    };
    let Some((tag, inner)) = tagged.iter().next() else {
        return Err(malformed("value has no type tag", value));
    };

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed("booleanValue", inner)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| malformed("integerValue", inner))
        }
        "doubleValue" => match inner {
            Value::Number(n) => Ok(Value::Number(n.clone())),
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| malformed("doubleValue", inner)),
            _ => Err(malformed("doubleValue", inner)),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(tag, inner)),
        "geoPointValue" => Ok(json!({
            "latitude": inner.get("latitude").cloned().unwrap_or(json!(0.0)),
            "longitude": inner.get("longitude").cloned().unwrap_or(json!(0.0)),
        })),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(decode_value)
                    .collect::<DbResult<Vec<_>>>()?,
                Some(other) => return Err(malformed("arrayValue.values", other)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(Value::Object(fields)) => decode_fields(fields)?,
                Some(other) => return Err(malformed("mapValue.fields", other)),
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(PersistenceError::Malformed(format!(
            "unsupported value type `{other}`"
        ))),
    }
}

/// Firestore `fields` -> 文档
pub fn decode_fields(fields: &Map<String, Value>) -> DbResult<Document> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// 字段路径段：非简单标识符用反引号包裹 (如纯数字的商家 ID)
pub fn quote_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        return segment.to_string();
    }
    let escaped = segment.replace('\\', "\\\\").replace('`', "\\`");
    format!("`{escaped}`")
}

/// 渲染字段路径 (`clicks.`17``)
pub fn field_path_string(path: &FieldPath) -> String {
    path.segments()
        .iter()
        .map(|s| quote_segment(s))
        .collect::<Vec<_>>()
        .join(".")
}

fn malformed(what: &str, value: &Value) -> PersistenceError {
    PersistenceError::Malformed(format!("invalid {what}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_strings_on_the_wire() {
        assert_eq!(encode_value(&json!(42)), json!({"integerValue": "42"}));
        assert_eq!(encode_value(&json!(1.5)), json!({"doubleValue": 1.5}));
    }

    #[test]
    fn test_store_document_decodes() {
        let fields = json!({
            "name": {"stringValue": "Spice Hub"},
            "type": {"stringValue": "Restaurants"},
            "menu": {"arrayValue": {"values": [
                {"mapValue": {"fields": {
                    "name": {"stringValue": "Biryani"},
                    "price": {"stringValue": "150"}
                }}}
            ]}},
            "offers": {"arrayValue": {}},
            "updated": {"timestampValue": "2024-01-01T00:00:00Z"}
        });
        let Value::Object(fields) = fields else { unreachable!() };
        let doc = decode_fields(&fields).unwrap();
        assert_eq!(doc["name"], "Spice Hub");
        assert_eq!(doc["menu"][0]["price"], "150");
        assert_eq!(doc["offers"], json!([]));
        assert_eq!(doc["updated"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_analytics_document_decodes() {
        let value = json!({"mapValue": {"fields": {"17": {"integerValue": "4"}}}});
        assert_eq!(decode_value(&value).unwrap(), json!({"17": 4}));
        assert_eq!(decode_value(&json!({"mapValue": {}})).unwrap(), json!({}));
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let err = decode_value(&json!({"fancyValue": 1})).unwrap_err();
        assert!(matches!(err, PersistenceError::Malformed(_)));
    }

    #[test]
    fn test_quote_segment() {
        assert_eq!(quote_segment("views"), "views");
        assert_eq!(quote_segment("_a1"), "_a1");
        assert_eq!(quote_segment("1700000000000"), "`1700000000000`");
        assert_eq!(quote_segment("a-b"), "`a-b`");
        assert_eq!(quote_segment("we`ird"), "`we\\`ird`");
        let path = FieldPath::new("clicks").child("123");
        assert_eq!(field_path_string(&path), "clicks.`123`");
    }
}
