//! # PNG Data URL 正方形归一化 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//!  data:image/png;base64,...（任意大小写前缀，可带首尾空白）
//!         │
//!         ▼
//! ┌─ normalizer ────────────────────────────────────────────┐
//! │  data_url   前缀校验 · Base64 解码 / 封装               │
//! │  pipeline   PNG 解码 · 像素限制 · 白底居中补白 · 编码   │
//! │  handler    SquareNormalizer 编排 + 阶段耗时日志        │
//! │  config     NormalizerConfig / CompressionProfile       │
//! │  error      NormalizeError / ErrorKind                  │
//! └─────────────────────────────────────────────────────────┘
//!         │
//!         ▼
//!  正方形：原样返回去空白后的输入
//!  非正方形：data:image/png;base64,<补白后的 PNG>
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`normalizer`] | 纯函数式的 Data URL 归一化，无共享状态 |

pub mod normalizer;

pub use normalizer::{
    CompressionProfile, ErrorKind, NormalizeError, NormalizerConfig, PNG_DATA_URL_PREFIX,
    SquareNormalizer, normalize,
};
