//! 持久化错误与降级结果
//!
//! - [`PersistenceError`] - 文档数据库错误分类
//! - [`Soft`] - 次要操作的结果：成功，或降级为默认值 (错误已记录)

use thiserror::Error;

/// 数据库读写被安全规则拒绝时给出的操作提示
pub const ACCESS_DENIED_HINT: &str = "Database access denied. Open the database console, \
go to the security rules and allow this service to read and write the `stores` and \
`system` collections.";

/// 文档数据库错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// 远端拒绝请求 (未认证 / 安全规则不允许)
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// 网络或服务端故障
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// 文档不存在
    #[error("Document not found: {0}")]
    NotFound(String),

    /// 文档内容无法编码/解码
    #[error("Malformed document: {0}")]
    Malformed(String),
}

impl PersistenceError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, PersistenceError::AccessDenied(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::NotFound(_))
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Malformed(err.to_string())
    }
}

/// Result type for document store operations
pub type DbResult<T> = Result<T, PersistenceError>;

/// 次要操作 (标语、统计、删除) 的结果
///
/// 这些操作失败时不打断用户：返回默认值，同时保留错误以便调用方或测试区分。
#[derive(Debug, Clone, PartialEq)]
pub enum Soft<T> {
    Ok(T),
    Degraded { value: T, error: PersistenceError },
}

impl<T> Soft<T> {
    /// 记录警告并返回降级结果
    pub fn degraded(operation: &'static str, value: T, error: PersistenceError) -> Self {
        tracing::warn!(operation = operation, error = %error, "Operation degraded to default");
        Soft::Degraded { value, error }
    }

    /// 把 `DbResult` 转为 `Soft`，失败时使用 `fallback`
    pub fn from_result(
        operation: &'static str,
        result: DbResult<T>,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match result {
            Ok(value) => Soft::Ok(value),
            Err(error) => Soft::degraded(operation, fallback(), error),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Soft::Ok(value) | Soft::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Soft::Ok(value) | Soft::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Soft::Degraded { .. })
    }

    pub fn error(&self) -> Option<&PersistenceError> {
        match self {
            Soft::Ok(_) => None,
            Soft::Degraded { error, .. } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_from_result() {
        let ok: Soft<u32> = Soft::from_result("test", Ok(3), || 0);
        assert!(!ok.is_degraded());
        assert_eq!(ok.into_value(), 3);

        let degraded: Soft<u32> = Soft::from_result(
            "test",
            Err(PersistenceError::Unavailable("timeout".into())),
            || 0,
        );
        assert!(degraded.is_degraded());
        assert_eq!(*degraded.value(), 0);
        assert!(matches!(
            degraded.error(),
            Some(PersistenceError::Unavailable(_))
        ));
    }
}
