//! 通用工具函数

use rand::RngCore;

/// 生成不透明的随机令牌（32 字节，十六进制编码）
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
