//! 用户领域模块

#![allow(clippy::module_inception)]

pub mod email;
pub mod password;
pub mod repository;
pub mod user;

pub use email::{Email, EmailError};
pub use password::{Argon2PasswordHasher, HashedPassword, PasswordError, PasswordHasher};
pub use repository::UserRepository;
pub use user::User;
