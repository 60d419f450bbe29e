//! # PNG Data URL 正方形归一化模块（normalizer）
//!
//! ## 设计思路
//!
//! 下游的二维码解码只接受正方形图像。本模块把“前缀校验 → Base64 解码 → PNG 解码
//! → 正方形判断 → 补白 → 重新编码 → 重新封装”按职责拆分为多个子模块。
//!
//! - `data_url`：前缀校验、Base64 解码与重新封装
//! - `pipeline`：PNG 解码、像素限制、补白合成、PNG 编码
//! - `handler`：编排整条处理流水线
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 调用链
//!
//! ```text
//! normalize / SquareNormalizer::normalize
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ data_url.rs（前缀校验 + Base64 解码）
//!    ├─ pipeline.rs（PNG 解码 + 补白 + 编码）
//!    └─ data_url.rs（重新封装）
//!    ↓
//! Result<String, NormalizeError>
//! ```
//!
//! 已是正方形的输入原样返回（仅去除首尾空白），不会重新编码。

mod config;
mod data_url;
mod error;
mod handler;
mod pipeline;
mod source;

pub use config::{CompressionProfile, NormalizerConfig};
pub use data_url::PNG_DATA_URL_PREFIX;
pub use error::{ErrorKind, NormalizeError};
pub use handler::SquareNormalizer;

/// 使用默认配置归一化 PNG Data URL。
///
/// # 示例
/// ```rust
/// use square_data_url::{ErrorKind, normalize};
///
/// let err = normalize("not a data url").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidFormat);
/// ```
pub fn normalize(input: &str) -> Result<String, NormalizeError> {
    SquareNormalizer::default().normalize(input)
}
