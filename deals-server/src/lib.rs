//! Deals Server - 本地商家优惠目录服务
//!
//! # 架构概述
//!
//! - **数据库** (`db`): 托管文档数据库 (Firestore REST) 或进程内存储
//! - **视图** (`views`): 首页分类筛选、商家详情
//! - **后台** (`admin`): 商家增删改、复制、保存校验、点击排行
//! - **认证** (`auth`): Argon2 密码 + JWT 管理员令牌
//! - **图片** (`services`): 上传图片缩放并转为 JPEG data URL
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! deals-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── db/            # 文档存储、仓储、PersistenceClient
//! ├── views/         # 首页与详情页
//! ├── admin/         # 后台操作与会话
//! ├── services/      # 图片规范化
//! ├── api/           # HTTP 路由和处理器
//! ├── middleware/    # 请求日志
//! ├── utils/         # 错误、日志、校验
//! └── gesture.rs     # 隐藏入口的点击手势
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod gesture;
pub mod middleware;
pub mod services;
pub mod utils;
pub mod views;

// Re-export 公共类型
pub use auth::{CurrentAdmin, JwtService};
pub use core::{Config, DatabaseBackend, Server, ServerState};
pub use db::{PersistenceClient, PersistenceError, Soft};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

// Security logging macro - 写入 `security` 目标 (单独的日志文件)
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____             __
   / __ \___  ____ _/ /____
  / / / / _ \/ __ `/ / ___/
 / /_/ /  __/ /_/ / (__  )
/_____/\___/\__,_/_/____/
    "#
    );
}

/// 加载 `.env` 并初始化日志，返回配置
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    Ok(config)
}
