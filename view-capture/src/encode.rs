use crate::error::EncodeError;
use crate::frame::Frame;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

/// Encode a frame as baseline JPEG. Alpha is discarded.
///
/// `quality` is clamped to the encoder's accepted 1-100 range.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let rgb = DynamicImage::ImageRgba8(frame.as_image().clone()).to_rgb8();

    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
        encoder.encode_image(&rgb)?;
    }

    if bytes.is_empty() {
        return Err(EncodeError::Empty);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_a_decodable_jpeg() {
        let frame = Frame::filled(16, 16, [200, 40, 40, 255]);
        let bytes = encode_jpeg(&frame, 92).unwrap();

        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));

        let px = decoded.to_rgb8().get_pixel(8, 8).0;
        assert!(px[0] > 150 && px[1] < 90 && px[2] < 90);
    }

    #[test]
    fn lower_quality_is_smaller() {
        let frame = Frame::from_image(image::RgbaImage::from_fn(64, 64, |x, y| {
            image::Rgba([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8, 255])
        }));

        let high = encode_jpeg(&frame, 100).unwrap();
        let low = encode_jpeg(&frame, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn zero_quality_is_clamped() {
        let frame = Frame::filled(8, 8, [0, 0, 0, 255]);
        assert!(encode_jpeg(&frame, 0).is_ok());
    }
}
