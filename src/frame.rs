//! A single frame of an animated GIF.

use gif::DisposalMethod;

use crate::error::{GifError, GifResult};
use crate::palette::Palette;

/// One frame: an RGBA pixel buffer plus its placement metadata.
///
/// The buffer always holds `width * height` pixels of 4 bytes each. Frames
/// are owned by the caller; encoding reads them and derives palette-indexed
/// copies without ever mutating the pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GifFrame {
    /// RGBA pixel data, row major, 4 bytes per pixel.
    pub pixels: Vec<u8>,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Horizontal placement within the GIF canvas.
    pub x_offset: u16,
    /// Vertical placement within the GIF canvas.
    pub y_offset: u16,
    /// How this frame's pixels are treated before the next frame draws.
    pub disposal: DisposalMethod,
    /// Whether the frame was stored interlaced. Interlaced frames can be
    /// decoded but not re-encoded.
    pub interlaced: bool,
    /// Display time in hundredths of a second.
    pub delay: u16,
}

impl GifFrame {
    /// Creates a frame of fully transparent black pixels.
    pub fn new(width: u16, height: u16) -> GifFrame {
        GifFrame {
            pixels: vec![0; byte_len(width, height)],
            width,
            height,
            x_offset: 0,
            y_offset: 0,
            disposal: DisposalMethod::Any,
            interlaced: false,
            delay: 0,
        }
    }

    /// Creates a frame from an existing RGBA buffer.
    ///
    /// Fails with [`GifError::BufferSize`] if the buffer does not hold
    /// exactly `width * height` RGBA pixels.
    pub fn from_pixels(width: u16, height: u16, pixels: Vec<u8>) -> GifResult<GifFrame> {
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(GifError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(GifFrame {
            pixels,
            width,
            height,
            x_offset: 0,
            y_offset: 0,
            disposal: DisposalMethod::Any,
            interlaced: false,
            delay: 0,
        })
    }

    /// The RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the frame.
    pub fn rgba_at(&self, x: u16, y: u16) -> [u8; 4] {
        let at = self.pixel_offset(x, y);
        [
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        ]
    }

    /// Overwrites the RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the frame.
    pub fn set_rgba(&mut self, x: u16, y: u16, rgba: [u8; 4]) {
        let at = self.pixel_offset(x, y);
        self.pixels[at..at + 4].copy_from_slice(&rgba);
    }

    /// Builds the color table of this frame alone.
    pub fn palette(&self) -> Palette {
        Palette::from_pixels(&self.pixels)
    }

    /// Byte length the pixel buffer must have.
    pub(crate) fn expected_len(&self) -> usize {
        byte_len(self.width, self.height)
    }

    fn pixel_offset(&self, x: u16, y: u16) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} frame",
            self.width,
            self.height
        );
        (usize::from(y) * usize::from(self.width) + usize::from(x)) * 4
    }
}

fn byte_len(width: u16, height: u16) -> usize {
    usize::from(width) * usize::from(height) * 4
}
