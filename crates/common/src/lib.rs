//! common - 通用类型和工具库

pub mod context;
pub mod types;
pub mod utils;

pub use context::*;
pub use types::*;
pub use utils::*;
