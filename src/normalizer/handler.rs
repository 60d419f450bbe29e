//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `SquareNormalizer` 只负责流程编排，具体阶段分布在 `data_url` 与 `pipeline` 中。
//! 处理链路固定为：
//! 1. 去空白 + 前缀校验
//! 2. Base64 解码
//! 3. PNG 解码
//! 4. 已是正方形：原样返回去空白后的输入（不重新编码，保证字节级稳定、体积不膨胀）
//! 5. 否则补白为正方形、重新编码、重新封装
//!
//! ## 实现思路
//!
//! - 配置在构造时校验，之后只读；同一实例可在多线程间共享。
//! - 以 debug 级别记录 `decode/pad/encode/total` 阶段耗时，便于性能诊断。

use std::time::Instant;

use super::{NormalizeError, NormalizerConfig};

/// PNG Data URL 正方形归一化器。
#[derive(Debug, Clone, Default)]
pub struct SquareNormalizer {
    config: NormalizerConfig,
}

impl SquareNormalizer {
    /// 根据配置创建归一化器，配置非法时返回 `InvalidFormat`。
    ///
    /// # 示例
    /// ```rust
    /// use square_data_url::{NormalizerConfig, SquareNormalizer};
    ///
    /// let normalizer = SquareNormalizer::new(NormalizerConfig::default())?;
    /// # let _ = normalizer;
    /// # Ok::<(), square_data_url::NormalizeError>(())
    /// ```
    pub fn new(config: NormalizerConfig) -> Result<Self, NormalizeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 处理主入口：确保输入是可解码的 PNG Data URL，且图像为正方形。
    ///
    /// 非正方形图像会以白色背景补齐较短的一边，原图居中。
    pub fn normalize(&self, input: &str) -> Result<String, NormalizeError> {
        let total_start = Instant::now();
        let config = &self.config;

        let parsed = Self::parse_data_url(input)?;

        let decode_start = Instant::now();
        let raw = Self::decode_payload(parsed.payload, config.max_payload_bytes)?;
        let decoded = Self::decode_png(&raw, config)?;
        let decode_elapsed = decode_start.elapsed();

        if decoded.is_square() {
            log::debug!(
                "图片已是正方形 {}x{}，原样返回（{} 字节载荷）",
                decoded.width,
                decoded.height,
                raw.len()
            );
            return Ok(parsed.original.to_string());
        }

        let pad_start = Instant::now();
        let canvas = Self::pad_to_square(&decoded, config)?;
        let pad_elapsed = pad_start.elapsed();

        let encode_start = Instant::now();
        let png = Self::encode_canvas(canvas, config.compression)?;
        let output = Self::wrap_data_url(&png);
        let encode_elapsed = encode_start.elapsed();

        log::debug!(
            "✅ 图片已补白为正方形 - {}x{} -> {} 字节 => {} 字节 decode={}ms pad={}ms encode={}ms total={}ms",
            decoded.width,
            decoded.height,
            raw.len(),
            png.len(),
            decode_elapsed.as_millis(),
            pad_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(output)
    }
}
