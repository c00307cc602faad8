//! Image loading, decoding and format conversion

use crate::Result;
use anyhow::{Context, bail};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use opencv::{
    core::{CV_8UC3, Mat, Scalar, Vector},
    imgcodecs::{self, IMREAD_COLOR},
    imgproc,
    prelude::*,
};
use std::path::Path;

/// Image utility functions; every Mat handed out is 8-bit BGR
pub struct ImageUtils;

impl ImageUtils {
    /// Load image file as color Mat (BGR)
    pub fn load_color<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path_str = path.as_ref().to_string_lossy();

        let image = imgcodecs::imread(&path_str, IMREAD_COLOR)
            .with_context(|| format!("Failed to load color image: {}", path_str))?;
        if image.empty() {
            bail!("Image is missing or unreadable: {}", path_str);
        }

        Ok(image)
    }

    /// Decode an encoded image (JPEG, PNG, ...) into a BGR Mat
    pub fn decode_color(bytes: &[u8]) -> Result<Mat> {
        if bytes.is_empty() {
            bail!("Image buffer is empty");
        }

        let buffer = Vector::<u8>::from_slice(bytes);
        let image = imgcodecs::imdecode(&buffer, IMREAD_COLOR).context("Failed to decode image")?;
        if image.empty() {
            bail!("Image buffer could not be decoded");
        }

        Ok(image)
    }

    /// Convert grayscale or BGRA input to 3-channel BGR
    pub fn ensure_bgr(image: &Mat) -> Result<Mat> {
        let code = match image.channels() {
            3 => return Ok(image.clone()),
            1 => imgproc::COLOR_GRAY2BGR,
            4 => imgproc::COLOR_BGRA2BGR,
            other => bail!("Unsupported channel count: {}", other),
        };

        let mut bgr = Mat::default();
        imgproc::cvt_color_def(image, &mut bgr, code).context("Failed to convert image to BGR")?;
        Ok(bgr)
    }

    /// Convert image::RgbImage to a BGR Mat
    pub fn rgb_to_mat(rgb_image: &image::RgbImage) -> Result<Mat> {
        let (width, height) = rgb_image.dimensions();
        let (rows, cols) = (height as i32, width as i32);
        let mut mat = Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0))?;

        let data = mat.data_bytes_mut()?;
        for (bgr, rgb) in data.chunks_exact_mut(3).zip(rgb_image.as_raw().chunks_exact(3)) {
            bgr[0] = rgb[2];
            bgr[1] = rgb[1];
            bgr[2] = rgb[0];
        }

        Ok(mat)
    }

    /// Encode as JPEG bytes
    pub fn encode_jpeg(mat: &Mat) -> Result<Vec<u8>> {
        let mut buffer = Vector::<u8>::new();
        let encoded = imgcodecs::imencode(".jpg", mat, &mut buffer, &Vector::new())
            .context("Failed to encode JPEG")?;
        if !encoded {
            bail!("JPEG encoder rejected the image");
        }

        Ok(buffer.to_vec())
    }

    /// Encode as a `data:image/jpeg;base64,...` URI
    pub fn encode_jpeg_data_uri(mat: &Mat) -> Result<String> {
        let bytes = Self::encode_jpeg(mat)?;
        Ok(format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(bytes)))
    }

    /// Save Mat as image
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();

        let written = imgcodecs::imwrite(&path_str, mat, &Vector::new())
            .with_context(|| format!("Failed to save image: {}", path_str))?;
        if !written {
            bail!("Image writer refused: {}", path_str);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{CV_8UC1, CV_8UC4, Vec3b};

    #[test]
    fn test_rgb_to_mat_swaps_channels() -> Result<()> {
        let mut rgb_img = image::RgbImage::new(4, 3);
        rgb_img.put_pixel(2, 1, image::Rgb([200, 100, 10]));

        let mat = ImageUtils::rgb_to_mat(&rgb_img)?;
        assert_eq!((mat.cols(), mat.rows()), (4, 3));

        let pixel = *mat.at_2d::<Vec3b>(1, 2)?;
        assert_eq!((pixel[0], pixel[1], pixel[2]), (10, 100, 200));
        assert_eq!(*mat.at_2d::<Vec3b>(0, 0)?, Vec3b::all(0));
        Ok(())
    }

    #[test]
    fn test_ensure_bgr() -> Result<()> {
        let gray = Mat::new_rows_cols_with_default(10, 10, CV_8UC1, Scalar::all(90.0))?;
        assert_eq!(ImageUtils::ensure_bgr(&gray)?.channels(), 3);

        let bgra = Mat::new_rows_cols_with_default(10, 10, CV_8UC4, Scalar::all(90.0))?;
        assert_eq!(ImageUtils::ensure_bgr(&bgra)?.channels(), 3);
        Ok(())
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(ImageUtils::decode_color(&[]).is_err());
        assert!(ImageUtils::decode_color(b"definitely not an image").is_err());
    }

    #[test]
    fn test_jpeg_encode_decode() -> Result<()> {
        let color = Scalar::new(40.0, 80.0, 120.0, 0.0);
        let image = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, color)?;
        let bytes = ImageUtils::encode_jpeg(&image)?;
        let decoded = ImageUtils::decode_color(&bytes)?;

        assert_eq!((decoded.cols(), decoded.rows()), (64, 48));
        Ok(())
    }

    #[test]
    fn test_jpeg_data_uri() -> Result<()> {
        let image = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(90.0))?;
        let uri = ImageUtils::encode_jpeg_data_uri(&image)?;

        let payload = uri.strip_prefix("data:image/jpeg;base64,").expect("jpeg data uri");
        let bytes = BASE64_STANDARD.decode(payload)?;
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(ImageUtils::decode_color(&bytes)?.cols(), 64);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ImageUtils::load_color("no/such/lot.jpg").is_err());
    }
}
