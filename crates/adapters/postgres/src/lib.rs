//! admin-adapter-postgres - PostgreSQL 适配器

mod connection;
mod migration;
mod retry;

pub use connection::*;
pub use migration::*;
pub use retry::*;
