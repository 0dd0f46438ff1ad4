//! GIF decoding over the underlying `gif` reader, with the transparent-pixel
//! substitution policy.

use crate::animation::Gif;
use crate::error::{GifError, GifResult};
use crate::frame::GifFrame;

/// Decodes GIF bytes into a [`Gif`] container of RGBA frames.
///
/// The decoder carries one piece of configuration, fixed at construction:
/// what to write into the RGB channels of fully transparent pixels. By
/// default they are left as the reader produced them (black), which is the
/// fastest path; a substitution color forces a rewrite pass over every
/// frame.
///
/// ```
/// use gifcodec::GifDecoder;
///
/// # fn main() -> gifcodec::GifResult<()> {
/// # let data = gifcodec::encode_gif(
/// #     &[gifcodec::GifFrame::new(2, 2)],
/// #     &gifcodec::EncodeOptions::default(),
/// # )?;
/// let gif = GifDecoder::with_transparent_color([0xff, 0x00, 0xff]).decode_gif(&data)?;
/// assert!(gif.uses_transparency);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct GifDecoder {
    transparent_color: Option<[u8; 3]>,
}

impl GifDecoder {
    /// Creates a decoder with the default policy: transparent pixels keep
    /// the reader's RGB and only alpha zero marks them.
    pub fn new() -> GifDecoder {
        GifDecoder::default()
    }

    /// Creates a decoder that overwrites the RGB of every fully transparent
    /// pixel with `rgb`.
    pub fn with_transparent_color(rgb: [u8; 3]) -> GifDecoder {
        GifDecoder {
            transparent_color: Some(rgb),
        }
    }

    /// Decodes a complete GIF.
    ///
    /// Every frame comes back as its own RGBA buffer at the frame's size and
    /// offset; nothing is composited onto the canvas. The container's
    /// `loops` field holds the authored total play count (see
    /// [`Gif::loops`]).
    pub fn decode_gif(&self, data: &[u8]) -> GifResult<Gif> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut reader = options.read_info(data).map_err(GifError::from_decoding)?;

        let width = reader.width();
        let height = reader.height();
        let loops = total_plays(reader.repeat());

        let mut frames = Vec::new();
        let mut uses_transparency = false;
        loop {
            let (frame_width, frame_height, x_offset, y_offset, disposal, interlaced, delay) =
                match reader.next_frame_info().map_err(GifError::from_decoding)? {
                    Some(info) => (
                        info.width,
                        info.height,
                        info.left,
                        info.top,
                        info.dispose,
                        info.interlaced,
                        info.delay,
                    ),
                    None => break,
                };

            let mut pixels = vec![0; reader.buffer_size()];
            reader
                .read_into_buffer(&mut pixels)
                .map_err(GifError::from_decoding)?;

            // every frame is scanned for its own flag, even once the
            // aggregate is already known to be true
            uses_transparency |= self.apply_transparency(&mut pixels);

            frames.push(GifFrame {
                pixels,
                width: frame_width,
                height: frame_height,
                x_offset,
                y_offset,
                disposal,
                interlaced,
                delay,
            });
        }

        Ok(Gif {
            frames,
            width,
            height,
            loops,
            uses_transparency,
        })
    }

    /// Reports whether the frame uses transparency; with a substitution
    /// color configured, also rewrites every transparent pixel's RGB.
    fn apply_transparency(&self, pixels: &mut [u8]) -> bool {
        match self.transparent_color {
            None => pixels.chunks_exact(4).any(|px| px[3] == 0),
            Some(rgb) => {
                let mut used = false;
                for px in pixels.chunks_exact_mut(4) {
                    if px[3] == 0 {
                        px[..3].copy_from_slice(&rgb);
                        used = true;
                    }
                }
                used
            }
        }
    }
}

/// Inverse of the writer's repeat mapping: a finite repeat value K was
/// authored as K+1 total plays, infinite stays the `0` sentinel, and a GIF
/// without looping information plays once.
fn total_plays(repeat: gif::Repeat) -> u16 {
    match repeat {
        gif::Repeat::Infinite => 0,
        gif::Repeat::Finite(0) => 1,
        gif::Repeat::Finite(n) => n.saturating_add(1),
    }
}
