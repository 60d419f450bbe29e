//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 归一化链路中的所有失败都收敛到 `NormalizeError` 一个枚举上，
//! 每个分支对应一种错误类别（`ErrorKind`），调用侧可直接按类别匹配。
//! 通过 `thiserror` 保持人类可读错误信息。

use serde::Serialize;

/// 错误类别。
///
/// 与 `NormalizeError` 分支一一对应，便于调用侧只关心“哪一类失败”。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 前缀不匹配、图片宽或高为 0、配置非法。
    InvalidFormat,
    /// Base64 或 PNG 解码失败。
    DecodeFailure,
    /// 补白后的画布重新编码失败。
    EncodeFailure,
    /// 超过调用方显式设置的体积/像素上限；默认配置不会产生该类别。
    ResourceLimit,
}

impl ErrorKind {
    /// 稳定的字符串标识，供日志与命令行输出使用。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::DecodeFailure => "decode_failure",
            Self::EncodeFailure => "encode_failure",
            Self::ResourceLimit => "resource_limit",
        }
    }
}

/// Data URL 归一化统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::Decode(_) => ErrorKind::DecodeFailure,
            Self::Encode(_) => ErrorKind::EncodeFailure,
            Self::ResourceLimit(_) => ErrorKind::ResourceLimit,
        }
    }
}
