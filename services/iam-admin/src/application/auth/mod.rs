//! 认证

pub mod service;

pub use service::{AuthService, LoginResult};
