use crate::error::FrameError;
use image::{Rgba, RgbaImage, imageops};

/// Full-resolution RGBA framebuffer read back from a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    /// Wrap tightly packed RGBA8 pixels, row-major from the top-left corner.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        RgbaImage::from_raw(width, height, pixels)
            .filter(|_| actual == expected)
            .map(|image| Self { image })
            .ok_or(FrameError::BufferSize {
                width,
                height,
                expected,
                actual,
            })
    }

    /// Same as [`Frame::from_rgba`] for swapchains that read back as BGRA8.
    pub fn from_bgra(width: u32, height: u32, mut pixels: Vec<u8>) -> Result<Self, FrameError> {
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        Self::from_rgba(width, height, pixels)
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(color)),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Top-left corner of a centred `size` square inside a `width` x `height`
/// frame. Negative when the frame is smaller than the crop along that axis.
pub fn crop_origin(width: u32, height: u32, size: u32) -> (i64, i64) {
    let sx = (i64::from(width) - i64::from(size)).div_euclid(2);
    let sy = (i64::from(height) - i64::from(size)).div_euclid(2);
    (sx, sy)
}

/// Square `size` x `size` region taken from the centre of `frame`.
///
/// Areas of the square that fall outside the frame are filled with opaque
/// black.
pub fn center_crop(frame: &Frame, size: u32) -> Frame {
    let (sx, sy) = crop_origin(frame.width(), frame.height(), size);

    if sx >= 0 && sy >= 0 {
        let cropped = imageops::crop_imm(&frame.image, sx as u32, sy as u32, size, size);
        return Frame::from_image(cropped.to_image());
    }

    let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 255]));
    imageops::replace(&mut canvas, &frame.image, -sx, -sy);
    Frame::from_image(canvas)
}
