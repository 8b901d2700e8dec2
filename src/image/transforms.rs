use crate::utils::error::ClassifierError;
use crate::Result;
use image::{imageops, imageops::FilterType, RgbImage};
use ndarray::Array3;

/// 短边缩放目标
pub const RESIZE_SHORT_SIDE: u32 = 256;
/// 中心裁剪尺寸
pub const CROP_SIZE: usize = 224;
pub const NUM_CHANNELS: usize = 3;

/// ImageNet 统计量（RGB），必须与训练时一致
pub const CHANNEL_MEAN: [f32; NUM_CHANNELS] = [0.485, 0.456, 0.406];
pub const CHANNEL_STD: [f32; NUM_CHANNELS] = [0.229, 0.224, 0.225];

/// 图像变换工具集
pub struct ImageTransforms;

impl ImageTransforms {
    /// 按短边缩放到 `short_side`，保持宽高比
    ///
    /// 长边取 `floor(short_side * long / short)`，与 torchvision 的 `Resize(int)` 一致。
    pub fn resize_shorter_side(image: &RgbImage, short_side: u32) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ClassifierError::ImageProcessing(format!(
                "Cannot resize empty image {}x{}",
                width, height
            )));
        }

        let (short, long) = if width <= height {
            (width, height)
        } else {
            (height, width)
        };
        let new_long = u32::try_from(short_side as u64 * long as u64 / short as u64).map_err(|_| {
            ClassifierError::ImageProcessing(format!(
                "Aspect ratio of {}x{} image is too extreme to resize",
                width, height
            ))
        })?;

        let (new_w, new_h) = if width <= height {
            (short_side, new_long)
        } else {
            (new_long, short_side)
        };

        if (new_w, new_h) == (width, height) {
            return Ok(image.clone());
        }

        Ok(imageops::resize(image, new_w, new_h, FilterType::Triangle))
    }

    /// 中心裁剪为 `size x size`
    ///
    /// 偏移量按 `(dim - size) / 2` 四舍六入五成双取整。
    pub fn center_crop(image: &RgbImage, size: u32) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width < size || height < size {
            return Err(ClassifierError::ImageProcessing(format!(
                "Image {}x{} is smaller than crop size {}",
                width, height, size
            )));
        }

        let left = ((width - size) as f64 / 2.0).round_ties_even() as u32;
        let top = ((height - size) as f64 / 2.0).round_ties_even() as u32;

        Ok(imageops::crop_imm(image, left, top, size, size).to_image())
    }

    /// HWC u8 转为 CHW f32，取值范围 [0, 1]
    pub fn to_tensor(image: &RgbImage) -> Array3<f32> {
        let (width, height) = image.dimensions();

        Array3::from_shape_fn(
            (NUM_CHANNELS, height as usize, width as usize),
            |(c, h, w)| image.get_pixel(w as u32, h as u32)[c] as f32 / 255.0,
        )
    }

    /// 按通道减均值除标准差
    pub fn normalize(mut tensor: Array3<f32>) -> Array3<f32> {
        for (c, mut channel) in tensor.outer_iter_mut().enumerate() {
            let (mean, std) = (CHANNEL_MEAN[c], CHANNEL_STD[c]);
            channel.mapv_inplace(|v| (v - mean) / std);
        }
        tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn resize_keeps_aspect_ratio_on_short_side() {
        let landscape = RgbImage::new(640, 480);
        let resized = ImageTransforms::resize_shorter_side(&landscape, 256).unwrap();
        assert_eq!(resized.dimensions(), (341, 256));

        let portrait = RgbImage::new(100, 300);
        let resized = ImageTransforms::resize_shorter_side(&portrait, 256).unwrap();
        assert_eq!(resized.dimensions(), (256, 768));
    }

    #[test]
    fn resize_upscales_tiny_images() {
        let tiny = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        let resized = ImageTransforms::resize_shorter_side(&tiny, 256).unwrap();
        assert_eq!(resized.dimensions(), (256, 256));
        assert!(resized.get_pixel(128, 128).0.iter().all(|&v| v >= 254));
    }

    #[test]
    fn resize_rejects_overflowing_long_side() {
        let strip = RgbImage::new(1, 20);
        let err = ImageTransforms::resize_shorter_side(&strip, u32::MAX).unwrap_err();
        assert!(matches!(err, ClassifierError::ImageProcessing(_)));

        let strip = RgbImage::new(20, 1);
        assert!(ImageTransforms::resize_shorter_side(&strip, u32::MAX).is_err());
    }

    #[test]
    fn center_crop_rounds_half_to_even() {
        // (341 - 224) / 2 = 58.5 -> 58
        let mut image = RgbImage::new(341, 256);
        image.put_pixel(58, 16, Rgb([1, 2, 3]));

        let cropped = ImageTransforms::center_crop(&image, 224).unwrap();
        assert_eq!(cropped.dimensions(), (224, 224));
        assert_eq!(cropped.get_pixel(0, 0).0, [1, 2, 3]);
    }

    #[test]
    fn center_crop_rejects_small_images() {
        let image = RgbImage::new(100, 300);
        assert!(ImageTransforms::center_crop(&image, 224).is_err());
    }

    #[test]
    fn to_tensor_is_channel_first_and_scaled() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(1, 0, Rgb([255, 0, 51]));

        let tensor = ImageTransforms::to_tensor(&image);
        assert_eq!(tensor.shape(), &[3, 1, 2]);
        assert_eq!(tensor[[0, 0, 1]], 1.0);
        assert_eq!(tensor[[1, 0, 1]], 0.0);
        assert!((tensor[[2, 0, 1]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn normalize_applies_per_channel_constants() {
        let tensor = Array3::<f32>::from_elem((3, 1, 1), 1.0);
        let normalized = ImageTransforms::normalize(tensor);

        for c in 0..NUM_CHANNELS {
            let expected = (1.0 - CHANNEL_MEAN[c]) / CHANNEL_STD[c];
            assert!((normalized[[c, 0, 0]] - expected).abs() < 1e-6);
        }
    }
}
