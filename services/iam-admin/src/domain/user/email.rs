//! Email 值对象

use admin_errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Email 值对象（存储为小写）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// 校验并规范化邮箱
    pub fn parse(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = email.as_ref().trim();

        if !email_address::EmailAddress::is_valid(email) {
            return Err(EmailError::InvalidFormat(email.to_string()));
        }

        Ok(Self(email.to_lowercase()))
    }

    /// 从存储中读取（已规范化，不再校验）
    pub fn from_trusted(email: String) -> Self {
        Self(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email 错误
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        AppError::validation(err.to_string())
    }
}
