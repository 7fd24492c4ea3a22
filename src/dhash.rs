use image::imageops::{self, FilterType};

use crate::error::{IndexError, Result};

/// 64 位差异哈希
pub type DHash = u64;

/// 解码任意格式的图片并计算 dHash
///
/// 哈希仅依赖解码后的像素，与编码格式无关
pub fn d_hash(bytes: &[u8]) -> Result<DHash> {
    if bytes.is_empty() {
        return Err(IndexError::EmptySource);
    }
    let img = image::load_from_memory(bytes)?;
    let gray = img.to_luma8();
    let small = imageops::resize(&gray, 9, 8, FilterType::Triangle);

    let mut hash = 0u64;
    // 每行 9 个像素，比较相邻的 8 对
    for row in small.as_raw().chunks_exact(9) {
        for j in 0..8 {
            hash <<= 1;
            hash |= u64::from(row[j] < row[j + 1]);
        }
    }

    Ok(hash)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgb};

    use super::*;

    fn gradient() -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 48, |x, y| {
            Rgb([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8])
        }))
    }

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(vec![]);
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_deterministic() {
        let bytes = encode(&gradient(), ImageFormat::Png);
        assert_eq!(d_hash(&bytes).unwrap(), d_hash(&bytes).unwrap());
    }

    #[test]
    fn test_codec_independent() {
        let img = gradient();
        let png = d_hash(&encode(&img, ImageFormat::Png)).unwrap();
        let bmp = d_hash(&encode(&img, ImageFormat::Bmp)).unwrap();
        assert_eq!(png, bmp);
    }

    #[test]
    fn test_jpeg_close_to_png() {
        let img = gradient();
        let png = d_hash(&encode(&img, ImageFormat::Png)).unwrap();
        let jpg = d_hash(&encode(&img, ImageFormat::Jpeg)).unwrap();
        assert!((png ^ jpg).count_ones() <= 8);
    }

    #[test]
    fn test_horizontal_gradient() {
        // 从左到右逐渐变亮，每一对都满足 left < right
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_fn(90, 80, |x, _| Luma([(x * 2) as u8])));
        assert_eq!(d_hash(&encode(&img, ImageFormat::Png)).unwrap(), u64::MAX);
    }

    #[test]
    fn test_flat_image() {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(32, 32, Luma([128])));
        assert_eq!(d_hash(&encode(&img, ImageFormat::Png)).unwrap(), 0);
    }

    #[test]
    fn test_empty_source() {
        assert!(matches!(d_hash(&[]), Err(IndexError::EmptySource)));
    }

    #[test]
    fn test_not_an_image() {
        assert!(matches!(d_hash(b"definitely not a picture"), Err(IndexError::Decode(_))));
    }
}
