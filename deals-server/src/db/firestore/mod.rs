//! Firestore REST 后端
//!
//! 直接通过 REST v1 接口访问托管的 Firestore 数据库：
//!
//! | 操作 | 请求 |
//! |------|------|
//! | get | `GET .../documents/{collection}/{id}` |
//! | list | `GET .../documents/{collection}?pageSize=&pageToken=` |
//! | set | `PATCH .../documents/{collection}/{id}` |
//! | merge | `PATCH ...?updateMask.fieldPaths=...` |
//! | create | `POST .../documents/{collection}?documentId={id}` |
//! | increment | `POST .../documents:commit` (fieldTransforms.increment) |
//! | delete | `DELETE .../documents/{collection}/{id}` |

pub mod codec;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::time::Duration;

use super::document::{self, DocPath, Document, FieldPath};
use super::{DbResult, DocumentStore, PersistenceError};

/// 每页文档数
const PAGE_SIZE: u32 = 300;

/// 默认 REST 入口
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Firestore 连接参数
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// 项目 ID
    pub project_id: String,
    /// 数据库 ID，通常为 `(default)`
    pub database: String,
    /// Web API key (附加为 `?key=`)
    pub api_key: Option<String>,
    /// OAuth2 access token (附加为 `Authorization: Bearer`)
    pub bearer_token: Option<String>,
    /// REST 入口，可指向本地模拟器
    pub base_url: String,
    /// 请求超时 (毫秒)，`None` 表示不设超时
    pub timeout_ms: Option<u64>,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            api_key: None,
            bearer_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PersistenceError::Malformed(err.to_string())
        } else {
            PersistenceError::Unavailable(err.to_string())
        }
    }
}

/// Firestore REST 客户端
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> DbResult<Self> {
        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build().map_err(|e| {
            PersistenceError::Unavailable(format!("Failed to build HTTP client: {e}"))
        })?;

        tracing::info!(
            project = %config.project_id,
            database = %config.database,
            base_url = %config.base_url,
            "Firestore backend configured"
        );

        Ok(Self { client, config })
    }

    /// `projects/{project}/databases/{database}`
    fn database_name(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.config.project_id, self.config.database
        )
    }

    /// 完整文档资源名 (commit 请求中使用)
    fn document_name(&self, path: &DocPath) -> String {
        format!(
            "{}/documents/{}/{}",
            self.database_name(),
            path.collection,
            path.id
        )
    }

    /// `{base}/projects/.../documents` 加上若干路径段
    fn url(&self, segments: &[&str]) -> DbResult<Url> {
        let root = format!(
            "{}/{}/documents",
            self.config.base_url.trim_end_matches('/'),
            self.database_name()
        );
        let mut url = Url::parse(&root)
            .map_err(|e| PersistenceError::Unavailable(format!("Invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PersistenceError::Unavailable("Base URL cannot have a path".into()))?
            .extend(segments);
        Ok(url)
    }

    fn commit_url(&self) -> DbResult<Url> {
        let raw = format!(
            "{}/{}/documents:commit",
            self.config.base_url.trim_end_matches('/'),
            self.database_name()
        );
        Url::parse(&raw).map_err(|e| PersistenceError::Unavailable(format!("Invalid base URL: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// 非 2xx 响应转为错误
    async fn check(response: Response, context: &str) -> DbResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let (api_status, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => (envelope.error.status, envelope.error.message),
            Err(_) => (String::new(), body),
        };
        let error = classify(status, &api_status, format!("{context}: {message}"));
        tracing::debug!(status = %status, api_status = %api_status, error = %error, "Firestore request failed");
        Err(error)
    }

    fn decode_document(raw: &RawDocument) -> DbResult<(String, Document)> {
        let id = raw
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Ok((id, codec::decode_fields(&raw.fields)?))
    }
}

/// set / create 请求体
fn document_body(doc: &Document) -> Value {
    json!({ "fields": codec::encode_fields(doc) })
}

/// merge 的字段掩码：只覆盖 `doc` 中出现的叶子字段
fn update_mask(doc: &Document) -> Vec<(&'static str, String)> {
    document::leaf_paths(doc)
        .iter()
        .map(|p| ("updateMask.fieldPaths", codec::field_path_string(p)))
        .collect()
}

/// 原子增量提交；文档必须已存在，否则返回 `NOT_FOUND`
fn increment_commit(document_name: String, field: &FieldPath, delta: i64) -> Value {
    json!({
        "writes": [{
            "transform": {
                "document": document_name,
                "fieldTransforms": [{
                    "fieldPath": codec::field_path_string(field),
                    "increment": { "integerValue": delta.to_string() }
                }]
            },
            "currentDocument": { "exists": true }
        }]
    })
}

/// HTTP 状态 + Firestore 状态码 -> 错误分类
fn classify(status: StatusCode, api_status: &str, message: String) -> PersistenceError {
    match api_status {
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => return PersistenceError::AccessDenied(message),
        "NOT_FOUND" | "FAILED_PRECONDITION" => return PersistenceError::NotFound(message),
        "UNAVAILABLE" | "DEADLINE_EXCEEDED" | "RESOURCE_EXHAUSTED" | "INTERNAL" => {
            return PersistenceError::Unavailable(message);
        }
        _ => {}
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PersistenceError::AccessDenied(message),
        StatusCode::NOT_FOUND => PersistenceError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => PersistenceError::Unavailable(message),
        s if s.is_server_error() => PersistenceError::Unavailable(message),
        _ => PersistenceError::Malformed(message),
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    async fn get(&self, path: &DocPath) -> DbResult<Option<Document>> {
        let url = self.url(&[path.collection.as_str(), path.id.as_str()])?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response, &format!("get {path}")).await?;
        let raw: RawDocument = response.json().await?;
        Ok(Some(Self::decode_document(&raw)?.1))
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<(String, Document)>> {
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.url(&[collection])?;
            let mut request = self
                .request(Method::GET, url)
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = Self::check(request.send().await?, &format!("list {collection}")).await?;
            let page: ListDocumentsResponse = response.json().await?;

            for raw in &page.documents {
                match Self::decode_document(raw) {
                    Ok(entry) => out.push(entry),
                    Err(e) => {
                        tracing::warn!(document = %raw.name, error = %e, "Skipping undecodable document");
                    }
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(out)
    }

    async fn set(&self, path: &DocPath, doc: Document) -> DbResult<()> {
        let url = self.url(&[path.collection.as_str(), path.id.as_str()])?;
        let response = self
            .request(Method::PATCH, url)
            .json(&document_body(&doc))
            .send()
            .await?;
        Self::check(response, &format!("set {path}")).await?;
        Ok(())
    }

    async fn merge(&self, path: &DocPath, doc: Document) -> DbResult<()> {
        let url = self.url(&[path.collection.as_str(), path.id.as_str()])?;
        let response = self
            .request(Method::PATCH, url)
            .query(&update_mask(&doc))
            .json(&document_body(&doc))
            .send()
            .await?;
        Self::check(response, &format!("merge {path}")).await?;
        Ok(())
    }

    async fn create(&self, path: &DocPath, doc: Document) -> DbResult<bool> {
        let url = self.url(&[path.collection.as_str()])?;
        let response = self
            .request(Method::POST, url)
            .query(&[("documentId", &path.id)])
            .json(&document_body(&doc))
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(false);
        }
        Self::check(response, &format!("create {path}")).await?;
        Ok(true)
    }

    async fn increment(&self, path: &DocPath, field: &FieldPath, delta: i64) -> DbResult<()> {
        let url = self.commit_url()?;
        let body = increment_commit(self.document_name(path), field, delta);
        let response = self.request(Method::POST, url).json(&body).send().await?;
        Self::check(response, &format!("increment {path} {field}")).await?;
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> DbResult<()> {
        let url = self.url(&[path.collection.as_str(), path.id.as_str()])?;
        let response = self.request(Method::DELETE, url).send().await?;
        Self::check(response, &format!("delete {path}")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FirestoreStore {
        FirestoreStore::new(FirestoreConfig::new("gulbarga-deals")).unwrap()
    }

    #[test]
    fn test_document_urls() {
        let store = store();
        let url = store.url(&["stores", "1700000000000"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/gulbarga-deals/databases/(default)/documents/stores/1700000000000"
        );
        assert_eq!(
            store.commit_url().unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/gulbarga-deals/databases/(default)/documents:commit"
        );
        assert_eq!(
            store.document_name(&DocPath::new("system", "analytics")),
            "projects/gulbarga-deals/databases/(default)/documents/system/analytics"
        );
    }

    #[test]
    fn test_url_segments_are_escaped() {
        let url = store().url(&["stores", "a b/c"]).unwrap();
        assert!(url.as_str().ends_with("/stores/a%20b%2Fc"));
    }

    #[test]
    fn test_classify() {
        assert!(classify(StatusCode::FORBIDDEN, "", "x".into()).is_access_denied());
        assert!(classify(StatusCode::BAD_REQUEST, "PERMISSION_DENIED", "x".into()).is_access_denied());
        assert!(classify(StatusCode::BAD_REQUEST, "FAILED_PRECONDITION", "x".into()).is_not_found());
        assert!(classify(StatusCode::NOT_FOUND, "", "x".into()).is_not_found());
        assert!(matches!(
            classify(StatusCode::SERVICE_UNAVAILABLE, "", "x".into()),
            PersistenceError::Unavailable(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "x".into()),
            PersistenceError::Malformed(_)
        ));
    }

    #[test]
    fn test_decode_document_takes_id_from_name() {
        let raw = RawDocument {
            name: "projects/p/databases/(default)/documents/stores/42".to_string(),
            fields: Map::new(),
        };
        let (id, doc) = FirestoreStore::decode_document(&raw).unwrap();
        assert_eq!(id, "42");
        assert!(doc.is_empty());
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_increment_commit_requires_existing_document() {
        let body = increment_commit(
            "projects/p/databases/(default)/documents/system/analytics".to_string(),
            &FieldPath::new("clicks").child("1700000000000"),
            1,
        );
        assert_eq!(
            body,
            json!({
                "writes": [{
                    "transform": {
                        "document": "projects/p/databases/(default)/documents/system/analytics",
                        "fieldTransforms": [{
                            "fieldPath": "clicks.`1700000000000`",
                            "increment": { "integerValue": "1" }
                        }]
                    },
                    "currentDocument": { "exists": true }
                }]
            })
        );
    }

    #[test]
    fn test_update_mask_lists_leaf_fields() {
        let mask = update_mask(&doc(json!({"tagline": "x", "clicks": {"17": 2}})));
        let paths: Vec<&str> = mask.iter().map(|(_, p)| p.as_str()).collect();
        assert!(mask.iter().all(|(k, _)| *k == "updateMask.fieldPaths"));
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&"tagline"));
        assert!(paths.contains(&"clicks.`17`"));
    }

    #[test]
    fn test_document_body_wraps_fields() {
        let body = document_body(&doc(json!({"views": 0})));
        assert_eq!(body, json!({"fields": {"views": {"integerValue": "0"}}}));
    }
}
