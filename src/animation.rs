//! The decoded animation container.

use crate::frame::GifFrame;

/// A whole GIF: its frames plus the properties of the logical screen.
///
/// Returned by decoding. The pixel data of every frame is fully expanded to
/// RGBA; color tables are not retained, they are rebuilt if the frames are
/// encoded again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gif {
    /// Frames in presentation order.
    pub frames: Vec<GifFrame>,
    /// Canvas width; the maximum extent of `x_offset + width` over the
    /// frames.
    pub width: u16,
    /// Canvas height; the maximum extent of `y_offset + height` over the
    /// frames.
    pub height: u16,
    /// Total number of times the animation plays. `0` means loop forever.
    /// A GIF carrying no looping information decodes as `1`.
    pub loops: u16,
    /// Whether any frame contains a fully transparent pixel.
    pub uses_transparency: bool,
}
