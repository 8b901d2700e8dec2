use crate::image::transforms::{ImageTransforms, CROP_SIZE, RESIZE_SHORT_SIDE};
use crate::image::ImageLoader;
use crate::Result;
use image::RgbImage;
use ndarray::Array3;

pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// 分类模型预处理流水线，输出 (3, 224, 224)
    ///
    /// 步骤顺序与训练时完全一致，不可调整。
    pub fn preprocess(image: &RgbImage) -> Result<Array3<f32>> {
        // 1. 短边缩放到 256
        let resized = ImageTransforms::resize_shorter_side(image, RESIZE_SHORT_SIDE)?;

        // 2. 中心裁剪 224x224
        let cropped = ImageTransforms::center_crop(&resized, CROP_SIZE as u32)?;

        // 3. 转为 [0,1] 浮点张量
        let tensor = ImageTransforms::to_tensor(&cropped);

        // 4. 通道归一化
        Ok(ImageTransforms::normalize(tensor))
    }

    /// 直接从上传的字节处理
    pub fn preprocess_bytes(bytes: &[u8]) -> Result<Array3<f32>> {
        let image = ImageLoader::from_bytes(bytes)?;
        tracing::debug!(
            "Decoded image: {}x{}",
            image.width(),
            image.height()
        );
        Self::preprocess(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::transforms::{CHANNEL_MEAN, CHANNEL_STD, NUM_CHANNELS};
    use image::Rgb;

    #[test]
    fn output_shape_is_fixed_for_any_input_size() {
        for (w, h) in [(1, 1), (224, 224), (256, 256), (640, 480), (97, 1203), (1000, 300)] {
            let image = RgbImage::from_pixel(w, h, Rgb([120, 80, 40]));
            let tensor = ImagePreprocessor::preprocess(&image).unwrap();
            assert_eq!(tensor.shape(), &[NUM_CHANNELS, CROP_SIZE, CROP_SIZE], "input {w}x{h}");
        }
    }

    #[test]
    fn solid_black_maps_to_negative_mean_over_std() {
        let image = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        let tensor = ImagePreprocessor::preprocess(&image).unwrap();

        for c in 0..NUM_CHANNELS {
            let expected = -CHANNEL_MEAN[c] / CHANNEL_STD[c];
            assert!((tensor[[c, 112, 112]] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn identical_input_gives_identical_tensor() {
        let mut image = RgbImage::new(320, 240);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }

        let first = ImagePreprocessor::preprocess(&image).unwrap();
        let second = ImagePreprocessor::preprocess(&image).unwrap();
        assert_eq!(first, second);
    }
}
