//! 对外接口

pub mod http;
