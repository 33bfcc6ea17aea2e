//! 文档路径与文档内容
//!
//! 文档是一个 JSON 对象；路径为 `{collection}/{id}`；字段路径为若干段
//! (例如 `clicks` + 商家 ID)。

use serde_json::{Map, Value};
use std::fmt;

/// 文档内容 (顶层必须是对象)
pub type Document = Map<String, Value>;

/// 文档路径 `collection/id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    pub collection: String,
    pub id: String,
}

impl DocPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// 字段路径 (嵌套 map 中的位置)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(first: impl Into<String>) -> Self {
        Self(vec![first.into()])
    }

    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// 深度合并：`patch` 中的 map 递归合并进 `target`，其他值直接覆盖。
///
/// 空 map 视为叶子值 (覆盖目标字段)。
pub fn deep_merge(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        match value {
            Value::Object(inner) if !inner.is_empty() => {
                let slot = target
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(existing) = slot {
                    deep_merge(existing, inner);
                }
            }
            other => {
                target.insert(key, other);
            }
        }
    }
}

/// 文档中所有叶子字段的路径 (merge 写入时作为字段掩码)
pub fn leaf_paths(doc: &Document) -> Vec<FieldPath> {
    let mut out = Vec::new();
    for (key, value) in doc {
        collect_leaves(FieldPath::new(key.clone()), value, &mut out);
    }
    out
}

fn collect_leaves(prefix: FieldPath, value: &Value, out: &mut Vec<FieldPath>) {
    match value {
        Value::Object(inner) if !inner.is_empty() => {
            for (key, child) in inner {
                collect_leaves(prefix.clone().child(key.clone()), child, out);
            }
        }
        _ => out.push(prefix),
    }
}

/// 在文档中对数值字段做增量
///
/// 中间层缺失时创建空 map；目标字段缺失或不是数字时直接置为 `delta`。
pub fn apply_increment(doc: &mut Document, field: &FieldPath, delta: i64) {
    let Some((last, parents)) = field.segments().split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just replaced with an object"),
        };
    }

    let next = match current.get(last) {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {
            let base = n.as_i64().unwrap_or(i64::MAX);
            Value::from(base.saturating_add(delta))
        }
        Some(Value::Number(n)) => {
            let base = n.as_f64().unwrap_or_default();
            serde_json::Number::from_f64(base + delta as f64)
                .map(Value::Number)
                .unwrap_or(Value::from(delta))
        }
        _ => Value::from(delta),
    };
    current.insert(last.clone(), next);
}
