use crate::utils::error::ClassifierError;
use crate::Result;
use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::path::Path;

/// 交互页面允许上传的扩展名
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub struct ImageLoader;

impl ImageLoader {
    /// 从字节解码图像，统一转换为 3 通道 RGB
    pub fn from_bytes(bytes: &[u8]) -> Result<RgbImage> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::to_rgb(image))
    }

    /// 任意颜色模式转为 RGB（丢弃 alpha，灰度复制到三通道）
    pub fn to_rgb(image: DynamicImage) -> RgbImage {
        match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        }
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// 按文件名扩展名判断是否为允许的图片类型
    pub fn has_allowed_extension(file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                ALLOWED_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
            .unwrap_or(false)
    }

    /// 编码为 data URL，用于页面内直接展示上传的图片
    pub fn to_data_url(bytes: &[u8]) -> Result<String> {
        let mime = Self::detect_format(bytes)
            .map(|format| format.to_mime_type())
            .ok_or_else(|| {
                ClassifierError::UnsupportedFormat("unrecognized image data".to_string())
            })?;

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(format!("data:{};base64,{}", mime, encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn grayscale_is_expanded_to_rgb() {
        let gray = GrayImage::from_pixel(4, 3, Luma([200]));
        let rgb = ImageLoader::from_bytes(&encode_png(DynamicImage::ImageLuma8(gray))).unwrap();

        assert_eq!(rgb.dimensions(), (4, 3));
        assert_eq!(rgb.get_pixel(0, 0).0, [200, 200, 200]);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0]));
        let rgb = ImageLoader::from_bytes(&encode_png(DynamicImage::ImageRgba8(rgba))).unwrap();
        assert_eq!(rgb.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = ImageLoader::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ClassifierError::ImageDecode(_)));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(ImageLoader::has_allowed_extension("dog.JPG"));
        assert!(ImageLoader::has_allowed_extension("dog.jpeg"));
        assert!(ImageLoader::has_allowed_extension("scan.png"));
        assert!(!ImageLoader::has_allowed_extension("scan.gif"));
        assert!(!ImageLoader::has_allowed_extension("png"));
    }

    #[test]
    fn data_url_uses_detected_mime() {
        let png = encode_png(DynamicImage::ImageRgb8(RgbImage::new(1, 1)));
        let url = ImageLoader::to_data_url(&png).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
