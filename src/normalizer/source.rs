//! # 中间数据模型
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `ParsedDataUrl` 表示前缀已校验、尚未解码的 Data URL
//! - `DecodedPng` 表示已解码的 PNG 图像及其尺寸

use image::DynamicImage;

/// 解析阶段输出：借用去除首尾空白后的输入。
pub(crate) struct ParsedDataUrl<'a> {
    /// 去除首尾空白后的完整输入（正方形时原样返回）。
    pub(crate) original: &'a str,
    /// 前缀之后的 Base64 载荷，大小写原样保留。
    pub(crate) payload: &'a str,
}

/// 解码阶段输出。
pub(crate) struct DecodedPng {
    pub(crate) image: DynamicImage,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl DecodedPng {
    pub(crate) fn is_square(&self) -> bool {
        self.width == self.height
    }
}
