//! # 解码、补白与编码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → 正方形画布 → 字节”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 PNG 头做尺寸检查，再进行完整解码；分配画布前再检查一次画布像素数。
//!
//! ## 实现思路
//!
//! 1. 文件签名必须是 PNG
//! 2. IHDR 中宽或高为 0 时直接拒绝（`InvalidFormat`），不交给解码器
//! 3. 读取 header 尺寸；调用方设置了像素上限时快速拒绝
//! 4. 完整解码
//! 5. 白色不透明画布 + alpha over 合成，偏移量向下取整（奇数余量落在右/下侧）
//! 6. 画布完全不透明，按 RGB8 编码为 PNG

use image::codecs::png::{FilterType as PngFilterType, PngEncoder};
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageFormat, ImageReader, Rgba,
    RgbaImage, imageops,
};
use std::io::Cursor;

use super::source::DecodedPng;
use super::{CompressionProfile, NormalizeError, NormalizerConfig, SquareNormalizer};

const PNG_MIME_TYPE: &str = "image/png";
/// 8 字节签名 + 4 字节长度 + `IHDR` + 宽高各 4 字节。
const IHDR_DIMENSIONS_END: usize = 24;
const CANVAS_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

impl SquareNormalizer {
    /// 将原始字节解码为 PNG 图像。
    pub(super) fn decode_png(bytes: &[u8], config: &NormalizerConfig) -> Result<DecodedPng, NormalizeError> {
        Self::validate_png_signature(bytes)?;
        Self::validate_ihdr_dimensions(bytes)?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(bytes)?;
        Self::validate_dimensions(header_width, header_height)?;
        Self::validate_pixel_limit(
            "原图",
            u64::from(header_width),
            u64::from(header_height),
            config.max_source_pixels,
        )?;

        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| NormalizeError::Decode(format!("PNG 解码失败：{}", e)))?;

        let (width, height) = image.dimensions();
        Self::validate_dimensions(width, height)?;

        log::debug!(
            "PNG 解码完成 - 尺寸: {}x{} 颜色类型: {:?}",
            width,
            height,
            image.color()
        );

        Ok(DecodedPng {
            image,
            width,
            height,
        })
    }

    /// 通过文件签名（magic bytes）校验载荷是否为 PNG。
    fn validate_png_signature(bytes: &[u8]) -> Result<(), NormalizeError> {
        if bytes.is_empty() {
            return Err(NormalizeError::Decode("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| NormalizeError::Decode("无法识别载荷类型".to_string()))?;

        if kind.mime_type() != PNG_MIME_TYPE {
            return Err(NormalizeError::Decode(format!(
                "载荷不是 PNG 图片：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }

    /// 直接读取首个 IHDR 块中的宽高，拒绝宽或高为 0 的图像。
    ///
    /// 结构不完整的头部交由解码器报告 `Decode` 错误。
    fn validate_ihdr_dimensions(bytes: &[u8]) -> Result<(), NormalizeError> {
        let Some(header) = bytes.get(..IHDR_DIMENSIONS_END) else {
            return Ok(());
        };
        if &header[12..16] != b"IHDR" {
            return Ok(());
        }

        let width = u32::from_be_bytes([header[16], header[17], header[18], header[19]]);
        let height = u32::from_be_bytes([header[20], header[21], header[22], header[23]]);
        Self::validate_dimensions(width, height)
    }

    /// 仅通过 PNG 头读取宽高，用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), NormalizeError> {
        ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png)
            .into_dimensions()
            .map_err(|e| NormalizeError::Decode(format!("无法读取 PNG 尺寸：{}", e)))
    }

    fn validate_dimensions(width: u32, height: u32) -> Result<(), NormalizeError> {
        if width == 0 || height == 0 {
            return Err(NormalizeError::InvalidFormat(format!(
                "图片尺寸无效：{}x{}",
                width, height
            )));
        }
        Ok(())
    }

    fn validate_pixel_limit(
        label: &str,
        width: u64,
        height: u64,
        limit: Option<u64>,
    ) -> Result<(), NormalizeError> {
        let Some(limit) = limit else {
            return Ok(());
        };

        let pixels = width
            .checked_mul(height)
            .ok_or_else(|| NormalizeError::ResourceLimit(format!("{}像素数溢出", label)))?;

        if pixels > limit {
            return Err(NormalizeError::ResourceLimit(format!(
                "{}像素过大：{} 像素（限制：{} 像素）",
                label, pixels, limit
            )));
        }

        Ok(())
    }

    /// 将非正方形图像居中合成到白色正方形画布上。
    pub(super) fn pad_to_square(
        decoded: &DecodedPng,
        config: &NormalizerConfig,
    ) -> Result<RgbaImage, NormalizeError> {
        let (width, height) = (decoded.width, decoded.height);
        let side = width.max(height);
        Self::validate_pixel_limit(
            "画布",
            u64::from(side),
            u64::from(side),
            config.max_canvas_pixels,
        )?;

        let offset_x = (side - width) / 2;
        let offset_y = (side - height) / 2;

        log::debug!(
            "补白为正方形：{}x{} -> {}x{}（offset={},{}）",
            width,
            height,
            side,
            side,
            offset_x,
            offset_y
        );

        let mut canvas = RgbaImage::from_pixel(side, side, CANVAS_BACKGROUND);
        let top = decoded.image.to_rgba8();
        imageops::overlay(&mut canvas, &top, i64::from(offset_x), i64::from(offset_y));

        Ok(canvas)
    }

    /// 将画布编码为 PNG 字节。
    pub(super) fn encode_canvas(
        canvas: RgbaImage,
        profile: CompressionProfile,
    ) -> Result<Vec<u8>, NormalizeError> {
        let (width, height) = canvas.dimensions();
        let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();

        let mut buf = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buf, profile.compression_type(), PngFilterType::Adaptive);
        encoder
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| NormalizeError::Encode(format!("PNG 编码失败：{}", e)))?;

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x % 255) as u8;
            let g = (y % 255) as u8;
            let b = ((x + y) % 255) as u8;
            Rgba([r, g, b, 255])
        });

        let dyn_img = DynamicImage::ImageRgba8(img);
        let mut cursor = Cursor::new(Vec::new());
        dyn_img
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn decode(bytes: &[u8]) -> DecodedPng {
        SquareNormalizer::decode_png(bytes, &NormalizerConfig::default())
            .expect("decode should succeed")
    }

    #[test]
    fn decode_reports_dimensions() {
        let decoded = decode(&create_png_bytes(7, 3));

        assert_eq!((decoded.width, decoded.height), (7, 3));
        assert!(!decoded.is_square());
    }

    #[test]
    fn decode_rejects_non_png_signature() {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(ImageBuffer::new(2, 2))
            .write_to(&mut cursor, ImageFormat::Bmp)
            .expect("failed to encode bmp");

        let result = SquareNormalizer::decode_png(cursor.get_ref(), &NormalizerConfig::default());
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn decode_rejects_truncated_png() {
        let png = create_png_bytes(16, 8);
        let truncated = &png[..png.len() / 2];

        let result = SquareNormalizer::decode_png(truncated, &NormalizerConfig::default());
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn decode_rejects_empty_bytes() {
        let result = SquareNormalizer::decode_png(&[], &NormalizerConfig::default());
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn decode_enforces_source_pixel_limit_from_header() {
        let config = NormalizerConfig {
            max_source_pixels: Some(10),
            ..NormalizerConfig::default()
        };

        let result = SquareNormalizer::decode_png(&create_png_bytes(4, 3), &config);
        assert!(matches!(result, Err(NormalizeError::ResourceLimit(_))));
    }

    #[test]
    fn zero_dimensions_are_invalid_format() {
        assert!(matches!(
            SquareNormalizer::validate_dimensions(0, 5),
            Err(NormalizeError::InvalidFormat(_))
        ));
        assert!(matches!(
            SquareNormalizer::validate_dimensions(5, 0),
            Err(NormalizeError::InvalidFormat(_))
        ));
        assert!(SquareNormalizer::validate_dimensions(1, 1).is_ok());
    }

    #[test]
    fn decode_rejects_zero_width_header_before_decoding() {
        let mut png = create_png_bytes(4, 4);
        // IHDR 宽度字段位于偏移 16..20（CRC 不再匹配也应先于解码器被拒绝）
        png[16..20].copy_from_slice(&0u32.to_be_bytes());

        let result = SquareNormalizer::decode_png(&png, &NormalizerConfig::default());
        assert!(matches!(result, Err(NormalizeError::InvalidFormat(_))));
    }

    #[test]
    fn pad_centers_wide_image_with_floor_offset() {
        let decoded = decode(&create_png_bytes(5, 2));
        let canvas = SquareNormalizer::pad_to_square(&decoded, &NormalizerConfig::default())
            .expect("pad should succeed");

        assert_eq!(canvas.dimensions(), (5, 5));
        // (5 - 2) / 2 = 1：上方 1 行、下方 2 行白边。
        for x in 0..5 {
            assert_eq!(*canvas.get_pixel(x, 0), CANVAS_BACKGROUND);
            assert_eq!(*canvas.get_pixel(x, 3), CANVAS_BACKGROUND);
            assert_eq!(*canvas.get_pixel(x, 4), CANVAS_BACKGROUND);
            for y in 0..2 {
                assert_eq!(*canvas.get_pixel(x, y + 1), decoded.image.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn pad_centers_tall_image_with_floor_offset() {
        let decoded = decode(&create_png_bytes(2, 5));
        let canvas = SquareNormalizer::pad_to_square(&decoded, &NormalizerConfig::default())
            .expect("pad should succeed");

        assert_eq!(canvas.dimensions(), (5, 5));
        for y in 0..5 {
            assert_eq!(*canvas.get_pixel(0, y), CANVAS_BACKGROUND);
            assert_eq!(*canvas.get_pixel(3, y), CANVAS_BACKGROUND);
            assert_eq!(*canvas.get_pixel(4, y), CANVAS_BACKGROUND);
            assert_eq!(*canvas.get_pixel(1, y), decoded.image.get_pixel(0, y));
            assert_eq!(*canvas.get_pixel(2, y), decoded.image.get_pixel(1, y));
        }
    }

    #[test]
    fn pad_blends_translucent_pixels_over_white() {
        let img = ImageBuffer::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 0, 128])
            }
        });
        let decoded = DecodedPng {
            image: DynamicImage::ImageRgba8(img),
            width: 2,
            height: 1,
        };

        let canvas = SquareNormalizer::pad_to_square(&decoded, &NormalizerConfig::default())
            .expect("pad should succeed");

        assert_eq!(*canvas.get_pixel(0, 0), CANVAS_BACKGROUND);
        let blended = canvas.get_pixel(1, 0);
        assert!(blended[3] >= 254);
        for channel in 0..3 {
            assert!(
                (126..=128).contains(&blended[channel]),
                "channel {} = {}",
                channel,
                blended[channel]
            );
        }
    }

    #[test]
    fn pad_enforces_canvas_pixel_limit() {
        let decoded = decode(&create_png_bytes(10, 1));
        let config = NormalizerConfig {
            max_source_pixels: Some(10),
            max_canvas_pixels: Some(99),
            ..NormalizerConfig::default()
        };

        let result = SquareNormalizer::pad_to_square(&decoded, &config);
        assert!(matches!(result, Err(NormalizeError::ResourceLimit(_))));
    }

    #[test]
    fn encode_canvas_produces_opaque_rgb_png() {
        let canvas = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 255]));
        let bytes = SquareNormalizer::encode_canvas(canvas, CompressionProfile::Speed)
            .expect("encode should succeed");

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .expect("encoded canvas should decode");
        assert_eq!(decoded.dimensions(), (3, 3));
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!(decoded.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
    }
}
