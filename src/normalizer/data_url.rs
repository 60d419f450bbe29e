//! # Data URL 解析与封装模块
//!
//! ## 设计思路
//!
//! 在“尽可能早”的阶段校验输入：前缀不匹配直接拒绝，不做任何解码尝试；
//! 调用方设置了体积上限时，Base64 载荷先按长度预估解码体积，超限时同样不解码。
//!
//! ## 实现思路
//!
//! - 前缀：去除首尾空白后按 ASCII 忽略大小写比较，载荷部分原样保留。
//! - 载荷：标准字母表 + `=` 填充；CR/LF 换行符会被跳过，其余非法字符一律报错。
//! - 输出：始终使用小写前缀重新封装。

use std::borrow::Cow;

use base64::{Engine as _, engine::general_purpose};

use super::source::ParsedDataUrl;
use super::{NormalizeError, SquareNormalizer};

/// 唯一支持的 Data URL 前缀（输出时始终使用该小写形式）。
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

impl SquareNormalizer {
    /// 去除首尾空白并校验前缀。
    pub(super) fn parse_data_url(input: &str) -> Result<ParsedDataUrl<'_>, NormalizeError> {
        let original = input.trim();

        let has_prefix = original
            .get(..PNG_DATA_URL_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(PNG_DATA_URL_PREFIX));

        if !has_prefix {
            return Err(NormalizeError::InvalidFormat(format!(
                "输入不是 PNG Data URL（需要以 {} 开头）",
                PNG_DATA_URL_PREFIX
            )));
        }

        Ok(ParsedDataUrl {
            original,
            payload: &original[PNG_DATA_URL_PREFIX.len()..],
        })
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, NormalizeError> {
        let len = base64_data.len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| NormalizeError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| NormalizeError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    /// 解码 Base64 载荷；设置了上限时，解码前按预估体积做检查。
    pub(super) fn decode_payload(
        payload: &str,
        max_payload_bytes: Option<u64>,
    ) -> Result<Vec<u8>, NormalizeError> {
        let compact: Cow<'_, str> = if payload.contains(['\r', '\n']) {
            Cow::Owned(payload.chars().filter(|c| !matches!(c, '\r' | '\n')).collect())
        } else {
            Cow::Borrowed(payload)
        };

        if let Some(limit) = max_payload_bytes {
            let estimated_len = Self::estimate_base64_decoded_upper_bound_len(&compact)?;
            if estimated_len > limit {
                return Err(NormalizeError::ResourceLimit(format!(
                    "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                    estimated_len as f64 / 1024.0 / 1024.0,
                    limit as f64 / 1024.0 / 1024.0
                )));
            }
        }

        general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| NormalizeError::Decode(format!("Base64 解码失败：{}", e)))
    }

    /// 将 PNG 字节重新封装为小写前缀的 Data URL。
    pub(super) fn wrap_data_url(png_bytes: &[u8]) -> String {
        let mut out =
            String::with_capacity(PNG_DATA_URL_PREFIX.len() + png_bytes.len().div_ceil(3) * 4);
        out.push_str(PNG_DATA_URL_PREFIX);
        general_purpose::STANDARD.encode_string(png_bytes, &mut out);
        out
    }
}
