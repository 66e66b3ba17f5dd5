//! PNG helpers shared by the store and the clipboard adapter

use std::io::Cursor;

use image::{ImageFormat, ImageReader, RgbaImage};
use thiserror::Error;

/// Image conversion errors
#[derive(Debug, Error)]
pub enum ImagingError {
    /// The pixel buffer length does not match the stated dimensions
    #[error("pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },

    /// PNG encoding or decoding failed
    #[error("PNG codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// Pixel dimensions of a PNG buffer, without decoding the pixel data
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::with_format(Cursor::new(data), ImageFormat::Png)
        .into_dimensions()
        .ok()
}

/// Encode raw RGBA8 pixels as PNG
pub fn encode_rgba_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>, ImagingError> {
    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or(ImagingError::BufferSize { width, height })?;

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Decode a PNG buffer into `(width, height, rgba8)`
pub fn decode_png_rgba(data: &[u8]) -> Result<(u32, u32, Vec<u8>), ImagingError> {
    let image = image::load_from_memory_with_format(data, ImageFormat::Png)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok((width, height, image.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_of_encoded_png() {
        let png = encode_rgba_png(3, 2, vec![255; 3 * 2 * 4]).unwrap();
        assert_eq!(png_dimensions(&png), Some((3, 2)));
    }

    #[test]
    fn test_dimensions_of_garbage() {
        assert_eq!(png_dimensions(b"definitely not a png"), None);
    }

    #[test]
    fn test_mismatched_buffer() {
        assert!(matches!(
            encode_rgba_png(4, 4, vec![0; 10]),
            Err(ImagingError::BufferSize { width: 4, height: 4 })
        ));
    }

    #[test]
    fn test_decode_garbage_is_codec_error() {
        assert!(matches!(
            decode_png_rgba(b"not a png"),
            Err(ImagingError::Codec(_))
        ));
    }

    #[test]
    fn test_decode_restores_pixels() {
        let pixels: Vec<u8> = (0..16u8).collect();
        let png = encode_rgba_png(2, 2, pixels.clone()).unwrap();
        let (w, h, rgba) = decode_png_rgba(&png).unwrap();
        assert_eq!((w, h), (2, 2));
        assert_eq!(rgba, pixels);
    }
}
