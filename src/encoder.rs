//! GIF encoding: size estimation, color table strategy selection, and the
//! write path over the underlying `gif` encoder.
//!
//! Encoding picks between one color table shared by all frames and an
//! independent table per frame. The shared table saves the per-frame table
//! bytes but may widen every frame's pixel indices; which wins is decided
//! from size estimates (or, under [`Optimization::Size`], by encoding both
//! ways and keeping the smaller output).

use std::borrow::Cow;
use std::io::{self, Cursor, Write};

use crate::error::{GifError, GifResult};
use crate::frame::GifFrame;
use crate::palette::Palette;

// Estimated bytes per GIF excluding color tables and pixel data.
const PER_GIF_OVERHEAD: usize = 34;
// Estimated bytes per frame excluding color tables and pixel data.
const PER_FRAME_OVERHEAD: usize = 22;
// The writer pads an absent global table to a flagged 2-entry stub.
const STUB_TABLE_BYTES: usize = 6;

/// How encoding trades time against output size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Optimization {
    /// Use per-frame color tables unconditionally and skip the shared-table
    /// attempt. Fastest; never encodes twice.
    Speed,
    /// Encode with both strategies and return the smaller buffer. Up to
    /// twice the encoding time.
    Size,
    /// Estimate both strategies and encode once with the smaller estimate.
    #[default]
    Both,
}

/// Caller options for [`encode_gif`].
///
/// The default encodes an endlessly looping GIF sized to the frames' bounding
/// box, choosing the color table strategy by estimate.
#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    /// Canvas width. When set it must equal the frames' computed bounding
    /// box; leaving it unset always works.
    pub width: Option<u16>,
    /// Canvas height, same rule as `width`.
    pub height: Option<u16>,
    /// Total number of plays. `0` loops forever; `1` plays once with no
    /// repeat extension written; `N` plays N times.
    pub loops: u16,
    /// Strategy selection mode.
    pub optimization: Optimization,
    /// Declared transparency expectation. When set, it is checked against
    /// what the frames actually contain and a mismatch fails the encode.
    pub uses_transparency: Option<bool>,
}

/// Encodes frames into a complete GIF file.
///
/// Frames keep their own offsets, delays and disposal; the canvas is the
/// bounding box of all frames. On any error nothing is returned; there is no
/// partial output.
pub fn encode_gif(frames: &[GifFrame], options: &EncodeOptions) -> GifResult<Vec<u8>> {
    if frames.is_empty() {
        return Err(GifError::NoFrames);
    }

    let mut max_width: u32 = 0;
    let mut max_height: u32 = 0;
    for (index, frame) in frames.iter().enumerate() {
        if frame.pixels.len() != frame.expected_len() {
            return Err(GifError::BufferSize {
                expected: frame.expected_len(),
                actual: frame.pixels.len(),
            });
        }
        if frame.interlaced {
            return Err(GifError::Interlaced);
        }
        let right = u32::from(frame.x_offset) + u32::from(frame.width);
        let bottom = u32::from(frame.y_offset) + u32::from(frame.height);
        if right > u32::from(u16::MAX) || bottom > u32::from(u16::MAX) {
            return Err(GifError::FrameOutOfBounds { index });
        }
        max_width = max_width.max(right);
        max_height = max_height.max(bottom);
    }
    let canvas = (max_width as u16, max_height as u16);

    if options.width.is_some_and(|w| w != canvas.0) || options.height.is_some_and(|h| h != canvas.1)
    {
        return Err(GifError::DimensionMismatch {
            width: options.width.unwrap_or(canvas.0),
            height: options.height.unwrap_or(canvas.1),
            max_width: canvas.0,
            max_height: canvas.1,
        });
    }

    let palettes: Vec<Palette> = frames.iter().map(GifFrame::palette).collect();
    let mut detected = false;
    for (index, palette) in palettes.iter().enumerate() {
        if palette.index_size() > 256 {
            return Err(GifError::TooManyColors { index });
        }
        detected |= palette.uses_transparency();
    }
    if let Some(declared) = options.uses_transparency {
        if declared != detected {
            return Err(GifError::TransparencyMismatch { declared, detected });
        }
    }

    let local_estimate = gif_size_estimate_local(frames, &palettes);

    if options.optimization == Optimization::Speed {
        return encode_frames(
            frames,
            canvas,
            options.loops,
            Tables::PerFrame(&palettes),
            local_estimate,
        );
    }

    let global = Palette::union(&palettes);
    if global.index_size() > 256 {
        // no valid shared table; every mode falls back to per-frame tables
        return encode_frames(
            frames,
            canvas,
            options.loops,
            Tables::PerFrame(&palettes),
            local_estimate,
        );
    }
    let global_estimate = gif_size_estimate_global(frames, &global);

    if options.optimization == Optimization::Both {
        return if global_estimate <= local_estimate {
            encode_frames(
                frames,
                canvas,
                options.loops,
                Tables::Shared(&global),
                global_estimate,
            )
        } else {
            encode_frames(
                frames,
                canvas,
                options.loops,
                Tables::PerFrame(&palettes),
                local_estimate,
            )
        };
    }

    // Optimization::Size pays for both encodings and keeps the smaller,
    // favoring the shared table on a tie.
    let shared = encode_frames(
        frames,
        canvas,
        options.loops,
        Tables::Shared(&global),
        global_estimate,
    )?;
    let per_frame = encode_frames(
        frames,
        canvas,
        options.loops,
        Tables::PerFrame(&palettes),
        local_estimate,
    )?;
    Ok(if shared.len() <= per_frame.len() {
        shared
    } else {
        per_frame
    })
}

/// The strategy selector's verdict: which color tables the write path uses.
enum Tables<'a> {
    /// An independent table per frame, written as local tables.
    PerFrame(&'a [Palette]),
    /// One table shared by every frame, written once as the global table.
    Shared(&'a Palette),
}

fn encode_frames(
    frames: &[GifFrame],
    (width, height): (u16, u16),
    loops: u16,
    tables: Tables<'_>,
    estimated: usize,
) -> GifResult<Vec<u8>> {
    let global_table = match tables {
        Tables::PerFrame(_) => Vec::new(),
        Tables::Shared(palette) => palette.table_bytes(),
    };

    // The buffer is fixed at the estimate; the writer running out of room
    // means the estimate failed its upper-bound contract.
    let mut buffer = vec![0; estimated];
    let written = {
        let cursor = Cursor::new(&mut buffer[..]);
        let mut encoder = gif::Encoder::new(cursor, width, height, &global_table)
            .map_err(|err| write_error(err, estimated))?;
        if let Some(repeat) = writer_repeat(loops) {
            encoder
                .set_repeat(repeat)
                .map_err(|err| write_error(err, estimated))?;
        }
        for (index, frame) in frames.iter().enumerate() {
            let (palette, write_local_table) = match tables {
                Tables::PerFrame(palettes) => (&palettes[index], true),
                Tables::Shared(palette) => (palette, false),
            };
            write_frame(
                &mut encoder,
                index,
                frame,
                palette,
                write_local_table,
                estimated,
            )?;
        }
        let cursor = encoder
            .into_inner()
            .map_err(|err| finish_error(err, estimated))?;
        cursor.position() as usize
    };
    buffer.truncate(written);
    Ok(buffer)
}

/// Maps the container's total play count to the writer's repeat value.
///
/// The writer's finite value means "play once, then repeat this many more
/// times", so N total plays are written as N-1; a single play writes no
/// repeat extension at all.
fn writer_repeat(loops: u16) -> Option<gif::Repeat> {
    match loops {
        0 => Some(gif::Repeat::Infinite),
        1 => None,
        n => Some(gif::Repeat::Finite(n - 1)),
    }
}

fn write_frame<W: Write>(
    encoder: &mut gif::Encoder<W>,
    index: usize,
    frame: &GifFrame,
    palette: &Palette,
    write_local_table: bool,
    estimated: usize,
) -> GifResult<()> {
    let (index_buffer, transparent) = indexed_image(index, frame, palette)?;
    let out = gif::Frame {
        left: frame.x_offset,
        top: frame.y_offset,
        width: frame.width,
        height: frame.height,
        delay: frame.delay,
        dispose: frame.disposal,
        transparent,
        palette: write_local_table.then(|| palette.table_bytes()),
        buffer: Cow::Owned(index_buffer),
        ..gif::Frame::default()
    };
    encoder
        .write_frame(&out)
        .map_err(|err| write_error(err, estimated))
}

/// Converts a frame's RGBA pixels to color table indices.
///
/// Fully transparent pixels take the reserved index one past the last color;
/// every other pixel must find its RGB triple in the table. The lookup
/// function is picked once per table.
fn indexed_image(
    frame_index: usize,
    frame: &GifFrame,
    palette: &Palette,
) -> GifResult<(Vec<u8>, Option<u8>)> {
    let colors = palette.colors();
    let transparent_index = colors.len();
    if palette.uses_transparency() && transparent_index > 0xff {
        return Err(GifError::NoTransparencySlot { index: frame_index });
    }
    let lookup = palette.lookup();

    let mut indexes = Vec::with_capacity(frame.pixels.len() / 4);
    let mut saw_transparent = false;
    for px in frame.pixels.chunks_exact(4) {
        if px[3] == 0 {
            saw_transparent = true;
            indexes.push(transparent_index as u8);
        } else {
            let color = u32::from(px[0]) << 16 | u32::from(px[1]) << 8 | u32::from(px[2]);
            match lookup(colors, color) {
                Some(i) => indexes.push(i as u8),
                None => return Err(GifError::MissingColor { index: frame_index }),
            }
        }
    }

    if !palette.uses_transparency() {
        if saw_transparent {
            // the table was built at the wrong granularity for this frame
            return Err(GifError::UnexpectedTransparency { index: frame_index });
        }
        return Ok((indexes, None));
    }
    Ok((indexes, Some(transparent_index as u8)))
}

fn gif_size_estimate_local(frames: &[GifFrame], palettes: &[Palette]) -> usize {
    // even without a shared table the writer emits its stub global table
    let mut estimate = PER_GIF_OVERHEAD + STUB_TABLE_BYTES;
    for (frame, palette) in frames.iter().zip(palettes) {
        estimate += frame_size_estimate(frame, palette.pixel_bit_width(), palette.padded_len());
    }
    estimate
}

fn gif_size_estimate_global(frames: &[GifFrame], global: &Palette) -> usize {
    // the shared table is charged once at GIF level, not per frame
    let mut estimate = PER_GIF_OVERHEAD + 3 * global.padded_len();
    for frame in frames {
        estimate += frame_size_estimate(frame, global.pixel_bit_width(), 0);
    }
    estimate
}

/// Upper-bound byte count for one frame's encoded payload: pixel data, block
/// terminators every 255 data bytes, fixed per-frame overhead, and the
/// frame's written color table.
fn frame_size_estimate(frame: &GifFrame, bit_width: u8, table_entries: usize) -> usize {
    let pixels = usize::from(frame.width) * usize::from(frame.height);
    let data = lzw_data_upper_bound(pixels, bit_width);
    data + data.div_ceil(255) + PER_FRAME_OVERHEAD + 3 * table_entries
}

/// Upper bound on the LZW-coded length of `pixels` palette indices.
///
/// The coder emits at most one code per pixel. Codes start one bit above the
/// minimum code size (`max(2, bit_width)`) and widen each time the dictionary
/// crosses the next power of two, up to 12 bits; past that, every code is
/// counted at the full 12 bits, which also dominates coders that reset the
/// dictionary instead. The result is monotone in `bit_width`, so strategy
/// estimates stay comparable, and the real writer can never exceed it.
fn lzw_data_upper_bound(pixels: usize, bit_width: u8) -> usize {
    const MAX_WIDTH: u64 = 12;
    let min_code_size = u64::from(bit_width.max(2));

    // leading clear code plus trailing end-of-information code
    let mut bits = (min_code_size + 1) + MAX_WIDTH;
    // literals plus the clear and end codes; grows by one entry per code
    let mut entries = (1u64 << min_code_size) + 2;
    let mut width = min_code_size + 1;
    let mut remaining = pixels as u64;
    while remaining > 0 {
        let codes = if width >= MAX_WIDTH {
            remaining
        } else {
            ((1u64 << width) - entries).min(remaining)
        };
        bits += codes * width;
        entries += codes;
        remaining -= codes;
        if width < MAX_WIDTH {
            width += 1;
        }
    }
    bits.div_ceil(8) as usize
}

// WriteZero from the fixed-size output means the encoder needed more room
// than the estimate granted it.
fn write_error(err: gif::EncodingError, estimated: usize) -> GifError {
    match err {
        gif::EncodingError::Io(io_err) if io_err.kind() == io::ErrorKind::WriteZero => {
            GifError::BufferOverrun { estimated }
        }
        err => GifError::from_encoding(err),
    }
}

fn finish_error(err: io::Error, estimated: usize) -> GifError {
    if err.kind() == io::ErrorKind::WriteZero {
        GifError::BufferOverrun { estimated }
    } else {
        GifError::Io(err)
    }
}
