//! Encoding and decoding of animated GIFs, built around the choice GIF
//! forces on every encoder: one color table shared by all frames, or an
//! independent table per frame.
//!
//! Encoding extracts each frame's exact colors (no quantization; a frame
//! may use at most 256 distinct colors plus transparency), estimates the
//! encoded size of both table strategies without encoding, and writes the
//! smaller one; [`Optimization`] trades that estimate against encoding twice
//! or skipping the comparison entirely. Decoding expands every frame to RGBA
//! and reports the authored play count and whether transparency is used.
//! The GIF bitstream itself (LZW, block framing) is handled by the [`gif`]
//! crate underneath.
//!
//! # Examples
//!
//! ```
//! use gifcodec::{decode_gif, encode_gif, EncodeOptions, GifFrame};
//!
//! # fn main() -> gifcodec::GifResult<()> {
//! let mut first = GifFrame::new(4, 4);
//! first.set_rgba(0, 0, [0xff, 0x00, 0x00, 0xff]);
//! first.delay = 10;
//! let mut second = first.clone();
//! second.set_rgba(3, 3, [0x00, 0xff, 0x00, 0xff]);
//!
//! let bytes = encode_gif(&[first, second], &EncodeOptions::default())?;
//!
//! let gif = decode_gif(&bytes)?;
//! assert_eq!(gif.frames.len(), 2);
//! assert_eq!(gif.frames[0].rgba_at(0, 0), [0xff, 0x00, 0x00, 0xff]);
//! assert!(gif.uses_transparency);
//! # Ok(())
//! # }
//! ```
//!
//! Pixels are RGBA with no partial transparency: alpha zero means
//! transparent, anything else encodes as opaque. Frames own their buffers;
//! encoding never mutates them.

#![warn(missing_docs)]
#![warn(unused_qualifications)]
#![deny(unreachable_pub)]
#![forbid(unsafe_code)]

mod animation;
mod decoder;
mod encoder;
pub mod error;
mod frame;
mod palette;

pub use crate::animation::Gif;
pub use crate::decoder::GifDecoder;
pub use crate::encoder::{encode_gif, EncodeOptions, Optimization};
pub use crate::error::{GifError, GifErrorKind, GifResult};
pub use crate::frame::GifFrame;
pub use crate::palette::Palette;

/// How a frame's area is treated before the next frame draws, as stored in
/// the GIF graphic control extension.
pub use gif::DisposalMethod;

/// Decodes a complete GIF with the default transparency policy.
///
/// Equivalent to [`GifDecoder::new`]`().decode_gif(data)`.
pub fn decode_gif(data: &[u8]) -> GifResult<Gif> {
    GifDecoder::new().decode_gif(data)
}
