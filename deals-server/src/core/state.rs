//! 服务器状态
//!
//! 所有处理函数共享的状态，`Clone` 只复制 `Arc`。

use std::sync::Arc;

use crate::auth::{AdminCredentials, DEV_ADMIN_PASSWORD, JwtService};
use crate::core::{Config, DatabaseBackend};
use crate::db::{DocumentStore, FirestoreStore, MemoryStore, PersistenceClient};
use crate::services::ImageNormalizer;

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub persistence: PersistenceClient,
    pub normalizer: ImageNormalizer,
    jwt_service: Arc<JwtService>,
    admin: Arc<AdminCredentials>,
}

impl ServerState {
    /// 根据配置创建状态：连接数据库后端、哈希管理员密码，并确保单例文档存在
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.database {
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory document store, data is lost on restart");
                Arc::new(MemoryStore::new())
            }
            DatabaseBackend::Firestore(firestore) => Arc::new(FirestoreStore::new(firestore.clone())?),
        };

        let state = Self::with_store(config, store)?;
        if let Some(e) = state.persistence.initialize().await.error() {
            tracing::warn!(error = %e, "Database initialization incomplete");
        }
        Ok(state)
    }

    /// 使用给定的文档存储创建状态 (不执行初始化)
    pub fn with_store(config: &Config, store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        config.validate()?;
        let password = match &config.admin_password {
            Some(password) => password.as_str(),
            None => {
                tracing::warn!("ADMIN_PASSWORD not set, using the development password");
                DEV_ADMIN_PASSWORD
            }
        };
        let admin = AdminCredentials::from_password(password)
            .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

        Ok(Self {
            config: Arc::new(config.clone()),
            persistence: PersistenceClient::new(store, config.default_tagline.as_str()),
            normalizer: ImageNormalizer::new(config.image.clone()),
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            admin: Arc::new(admin),
        })
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn admin_credentials(&self) -> &AdminCredentials {
        &self.admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_state_without_password_is_rejected() {
        let mut config = Config::for_testing("secret");
        config.environment = "production".into();
        config.admin_password = None;
        let err = ServerState::with_store(&config, Arc::new(MemoryStore::new())).unwrap_err();
        assert!(err.to_string().contains("ADMIN_PASSWORD"));
    }

    #[test]
    fn test_development_state_falls_back_to_dev_password() {
        let mut config = Config::for_testing("secret");
        config.admin_password = None;
        let state = ServerState::with_store(&config, Arc::new(MemoryStore::new())).unwrap();
        assert!(state.admin_credentials().verify(DEV_ADMIN_PASSWORD));
    }
}
