//! 管理员密码
//!
//! 启动时对配置的密码做 Argon2 哈希，内存中只保留哈希。

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// 未配置 `ADMIN_PASSWORD` 时的开发环境密码
pub const DEV_ADMIN_PASSWORD: &str = "zabulous";

#[derive(Clone)]
pub struct AdminCredentials {
    hash: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminCredentials(..)")
    }
}

impl AdminCredentials {
    /// Hash password using argon2
    pub fn from_password(password: &str) -> Result<Self, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();
        Ok(Self { hash })
    }

    /// 已有的 PHC 格式哈希
    pub fn from_hash(hash: impl Into<String>) -> Result<Self, argon2::password_hash::Error> {
        let hash = hash.into();
        PasswordHash::new(&hash)?;
        Ok(Self { hash })
    }

    /// Verify password using argon2
    pub fn verify(&self, password: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "Stored admin password hash is invalid");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let creds = AdminCredentials::from_password("zabulous").unwrap();
        assert!(creds.verify("zabulous"));
        assert!(!creds.verify("Zabulous"));
        assert!(!creds.verify(""));
    }

    #[test]
    fn test_from_hash_round_trip() {
        let creds = AdminCredentials::from_password("pw").unwrap();
        let again = AdminCredentials::from_hash(creds.hash.clone()).unwrap();
        assert!(again.verify("pw"));
        assert!(AdminCredentials::from_hash("not-a-phc-string").is_err());
    }
}
