//! admin-config - 配置加载库
//!
//! 加载顺序：`{dir}/default.toml` -> `{dir}/{APP_ENV}.toml` -> `APP__*` 环境变量，
//! 后者覆盖前者。嵌套字段使用 `__` 分隔，例如 `APP__JWT__SECRET`。

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// 开发配置中的占位密钥，生产环境拒绝使用
const DEVELOPMENT_PLACEHOLDERS: &[&str] = &["dev-only-secret-change-me", "change-me-on-first-boot"];

/// 令牌有效期上限（10 年）
const MAX_EXPIRES_IN: u64 = 10 * 365 * 24 * 3600;

fn missing_secret() -> Secret<String> {
    Secret::new(String::new())
}

/// JWT 配置
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// 签名密钥，缺省时启动失败
    #[serde(default = "missing_secret")]
    pub secret: Secret<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_expires_in() -> u64 {
    3600
}

fn default_issuer() -> String {
    "iam-admin".to_string()
}

fn default_audience() -> String {
    "iam-admin-api".to_string()
}

impl JwtConfig {
    /// 以秒为单位的有效期（带符号，供令牌签发使用）
    pub fn expires_in_secs(&self) -> Result<i64, ConfigError> {
        if self.expires_in == 0 {
            return Err(ConfigError::Invalid(
                "jwt.expires_in must be greater than 0".to_string(),
            ));
        }
        if self.expires_in > MAX_EXPIRES_IN {
            return Err(ConfigError::Invalid(format!(
                "jwt.expires_in must not exceed {} seconds",
                MAX_EXPIRES_IN
            )));
        }
        i64::try_from(self.expires_in)
            .map_err(|_| ConfigError::Invalid("jwt.expires_in is out of range".to_string()))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 以 JSON 格式输出日志（生产环境默认开启）
    pub json: Option<bool>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 权限来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionSource {
    /// 使用令牌中携带的权限
    #[default]
    Token,
    /// 每次请求从存储重新解析
    Store,
}

/// 认证配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub permission_source: PermissionSource,
}

/// 系统账号配置（启动时初始化）
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    pub email: String,
    #[serde(default = "missing_secret")]
    pub password: Secret<String>,
    #[serde(default = "default_system_name")]
    pub first_name: String,
    #[serde(default = "default_system_name")]
    pub last_name: String,
}

fn default_system_name() -> String {
    "System".to_string()
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub system: SystemConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("APP__").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.jwt.secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "jwt.secret is required (set APP__JWT__SECRET)".to_string(),
            ));
        }
        self.jwt.expires_in_secs()?;

        let password = self.system.password.expose_secret();
        if password.is_empty() {
            return Err(ConfigError::Invalid(
                "system.password is required (set APP__SYSTEM__PASSWORD)".to_string(),
            ));
        }

        if self.is_production() {
            if DEVELOPMENT_PLACEHOLDERS.contains(&secret.as_str()) {
                return Err(ConfigError::Invalid(
                    "jwt.secret uses a development placeholder".to_string(),
                ));
            }
            if DEVELOPMENT_PLACEHOLDERS.contains(&password.as_str()) {
                return Err(ConfigError::Invalid(
                    "system.password uses a development placeholder".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 日志是否使用 JSON 格式
    pub fn json_logs(&self) -> bool {
        self.telemetry.json.unwrap_or_else(|| self.is_production())
    }
}
