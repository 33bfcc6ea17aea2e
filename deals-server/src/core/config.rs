use anyhow::{Context, bail};
use shared::models::DEFAULT_TAGLINE;

use crate::auth::JwtConfig;
use crate::db::FirestoreConfig;
use crate::services::ImageConfig;
use crate::services::image::{DEFAULT_MAX_BYTES, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY};

/// 数据库后端
#[derive(Debug, Clone)]
pub enum DatabaseBackend {
    /// 进程内存储 (开发、测试)
    Memory,
    /// 托管 Firestore
    Firestore(FirestoreConfig),
}

impl DatabaseBackend {
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseBackend::Memory => "memory",
            DatabaseBackend::Firestore(_) => "firestore",
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (`RUST_LOG` 优先) |
/// | LOG_JSON | false | 控制台 JSON 日志 |
/// | LOG_DIR | - | 日志文件目录 |
/// | DATABASE_BACKEND | memory (开发) / firestore | 数据库后端 |
/// | FIRESTORE_PROJECT_ID | - | Firestore 项目 (firestore 后端必填) |
/// | FIRESTORE_DATABASE | (default) | 数据库 ID |
/// | FIRESTORE_API_KEY | - | Web API key |
/// | FIRESTORE_TOKEN | - | OAuth2 access token |
/// | FIRESTORE_BASE_URL | googleapis | REST 入口 (模拟器) |
/// | REQUEST_TIMEOUT_MS | - | 数据库请求超时 |
/// | DEFAULT_TAGLINE | 内置标语 | 初始化标语 |
/// | ADMIN_PASSWORD | zabulous (非生产) | 管理员密码 |
/// | JWT_SECRET / JWT_EXPIRATION_MINUTES / JWT_ISSUER / JWT_AUDIENCE | | 见 [`JwtConfig`] |
/// | IMAGE_MAX_WIDTH | 800 | 图片最大宽度 |
/// | IMAGE_QUALITY | 0.7 | JPEG 质量 |
/// | IMAGE_ALLOW_UPSCALE | false | 是否放大窄图 |
/// | MAX_UPLOAD_BYTES | 5MB | 上传大小上限 |
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub database: DatabaseBackend,
    pub default_tagline: String,
    /// 管理员密码 (明文，只在启动时哈希一次)
    pub admin_password: Option<String>,
    pub jwt: JwtConfig,
    pub image: ImageConfig,
}

const PRODUCTION: &str = "production";

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let production = environment == PRODUCTION;

        let backend = env_opt("DATABASE_BACKEND").unwrap_or_else(|| {
            if environment == "development" {
                "memory".into()
            } else {
                "firestore".into()
            }
        });
        let database = match backend.to_ascii_lowercase().as_str() {
            "memory" => DatabaseBackend::Memory,
            "firestore" => {
                let project = env_opt("FIRESTORE_PROJECT_ID")
                    .context("FIRESTORE_PROJECT_ID is required for the firestore backend")?;
                let mut firestore = FirestoreConfig::new(project);
                if let Some(database) = env_opt("FIRESTORE_DATABASE") {
                    firestore.database = database;
                }
                if let Some(base_url) = env_opt("FIRESTORE_BASE_URL") {
                    firestore.base_url = base_url;
                }
                firestore.api_key = env_opt("FIRESTORE_API_KEY");
                firestore.bearer_token = env_opt("FIRESTORE_TOKEN");
                firestore.timeout_ms = env_opt("REQUEST_TIMEOUT_MS").and_then(|v| v.parse().ok());
                DatabaseBackend::Firestore(firestore)
            }
            other => bail!("Unknown DATABASE_BACKEND `{other}` (expected memory or firestore)"),
        };

        let admin_password = env_opt("ADMIN_PASSWORD");
        let jwt = JwtConfig::from_env(production)?;

        let image = ImageConfig {
            max_width: env_or("IMAGE_MAX_WIDTH", DEFAULT_MAX_WIDTH),
            quality: env_or("IMAGE_QUALITY", DEFAULT_QUALITY).clamp(0.0, 1.0),
            allow_upscale: env_or("IMAGE_ALLOW_UPSCALE", false),
            max_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_BYTES),
        };

        let config = Self {
            http_port: env_or("HTTP_PORT", 3000),
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: env_opt("LOG_DIR"),
            database,
            default_tagline: env_opt("DEFAULT_TAGLINE").unwrap_or_else(|| DEFAULT_TAGLINE.into()),
            admin_password,
            jwt,
            image,
        };
        config.validate()?;
        Ok(config)
    }

    /// 内存后端 + 固定密钥的配置，不读取环境变量
    ///
    /// 常用于测试场景
    pub fn for_testing(admin_password: impl Into<String>) -> Self {
        Self {
            http_port: 0,
            environment: "test".into(),
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
            database: DatabaseBackend::Memory,
            default_tagline: DEFAULT_TAGLINE.into(),
            admin_password: Some(admin_password.into()),
            jwt: JwtConfig::with_secret("test-secret-test-secret-test-secret"),
            image: ImageConfig::default(),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// 生产环境必须显式配置管理员密码
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.is_production() && self.admin_password.is_none() {
            bail!("ADMIN_PASSWORD must be set in production");
        }
        Ok(())
    }
}
