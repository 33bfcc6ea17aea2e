//! 认证模块
//!
//! 后台只有一个管理员角色：
//! - [`AdminCredentials`] - 管理员密码 (Argon2 哈希)
//! - [`JwtService`] - JWT 令牌签发与验证
//! - [`require_admin`] - 后台路由的认证中间件

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{ADMIN_ROLE, Claims, CurrentAdmin, JwtConfig, JwtError, JwtService};
pub use middleware::require_admin;
pub use password::{AdminCredentials, DEV_ADMIN_PASSWORD};
