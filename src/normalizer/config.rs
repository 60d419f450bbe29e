//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `NormalizerConfig`：
//! 资源上限决定何时尽早拒绝输入，压缩档位决定补白后重新编码的体积/速度取舍。
//!
//! ## 实现思路
//!
//! - `Default` 不设任何资源上限，只有调用方显式设置的上限才会生效。
//! - 支持从 JSON 读取（缺省字段回落到默认值），读取后统一 `validate`。
//! - `CompressionProfile` 负责档位字符串解析与反向输出，并映射到 PNG 编码参数。

use std::str::FromStr;

use image::codecs::png::CompressionType;
use serde::Deserialize;

use super::NormalizeError;

/// 归一化配置。
///
/// 所有资源上限默认关闭（`None`）：默认配置接受任意合法的 PNG Data URL。
/// 需要防御超大输入的调用方显式设置上限，超限时返回 `ResourceLimit`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Base64 解码后允许的最大字节数（按编码长度预估，解码前检查）。
    pub max_payload_bytes: Option<u64>,
    /// 原图像素上限（`width * height`），读取 PNG 头后、完整解码前检查。
    pub max_source_pixels: Option<u64>,
    /// 补白画布像素上限（`n * n`），分配画布前检查。
    pub max_canvas_pixels: Option<u64>,
    /// 重新编码时使用的压缩档位。
    pub compression: CompressionProfile,
}

impl NormalizerConfig {
    /// 从 JSON 文本解析配置，缺省字段使用默认值。
    ///
    /// # 示例
    /// ```rust
    /// use square_data_url::{CompressionProfile, NormalizerConfig};
    ///
    /// let config = NormalizerConfig::from_json_str(r#"{"compression":"speed"}"#)?;
    /// assert_eq!(config.compression, CompressionProfile::Speed);
    /// assert_eq!(config.max_source_pixels, None);
    /// # Ok::<(), square_data_url::NormalizeError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, NormalizeError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| NormalizeError::InvalidFormat(format!("配置解析失败：{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验上限取值。显式设置为 0 会让所有输入被拒绝，视为配置错误。
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.max_payload_bytes == Some(0) {
            return Err(NormalizeError::InvalidFormat(
                "max_payload_bytes 必须大于 0".to_string(),
            ));
        }
        if self.max_source_pixels == Some(0) {
            return Err(NormalizeError::InvalidFormat(
                "max_source_pixels 必须大于 0".to_string(),
            ));
        }
        if matches!(
            (self.max_canvas_pixels, self.max_source_pixels),
            (Some(canvas), Some(source)) if canvas < source
        ) {
            return Err(NormalizeError::InvalidFormat(
                "max_canvas_pixels 不能小于 max_source_pixels".to_string(),
            ));
        }
        Ok(())
    }
}

/// PNG 重新编码压缩档位。
///
/// - `Size`：体积优先
/// - `Balanced`：体积与速度平衡
/// - `Speed`：编码速度优先
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionProfile {
    Size,
    #[default]
    Balanced,
    Speed,
}

impl CompressionProfile {
    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }

    pub(crate) fn compression_type(self) -> CompressionType {
        match self {
            Self::Size => CompressionType::Best,
            Self::Balanced => CompressionType::Default,
            Self::Speed => CompressionType::Fast,
        }
    }
}

impl FromStr for CompressionProfile {
    type Err = NormalizeError;

    fn from_str(profile: &str) -> Result<Self, Self::Err> {
        match profile.trim().to_lowercase().as_str() {
            "size" => Ok(Self::Size),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(NormalizeError::InvalidFormat(format!(
                "未知压缩档位：{}（可选：size / balanced / speed）",
                other
            ))),
        }
    }
}
