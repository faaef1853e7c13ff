//! 密码哈希
//!
//! Argon2id + 随机盐，存储为 PHC 字符串。

use admin_errors::AppError;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 哈希后的密码（PHC 格式）
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(pub String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

/// 密码错误
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    InvalidHash(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::internal(err.to_string())
    }
}

/// 密码哈希器
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<HashedPassword, PasswordError>;

    /// 比较明文与哈希；不匹配返回 `Ok(false)`
    fn verify(&self, plain: &str, hashed: &HashedPassword) -> Result<bool, PasswordError>;
}

/// Argon2id 实现
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 自定义成本参数（内存 KiB / 迭代次数 / 并行度）
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain: &str) -> Result<HashedPassword, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(HashedPassword(hash.to_string()))
    }

    fn verify(&self, plain: &str, hashed: &HashedPassword) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hashed.as_str())
            .map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        match self.argon2.verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::InvalidHash(e.to_string())),
        }
    }
}
