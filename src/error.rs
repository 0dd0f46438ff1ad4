//! Contains the error representation shared by encoding and decoding.
//!
//! See the main [`GifError`] which carries a variant for each failure the
//! codec can report. Variants can be roughly inspected through the
//! [`GifError::kind`] method which works similar to `std::io::Error::kind`.
//! Failures of the underlying GIF reader and writer are wrapped, not masked,
//! and remain reachable through `Error::source`.

use std::io;

use thiserror::Error;

/// The error type for all codec operations.
///
/// Every failure is fatal to the call that produced it; nothing is retried
/// internally, and no partial output accompanies an error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GifError {
    /// Encoding was requested for an empty frame sequence.
    #[error("there are no frames to encode")]
    NoFrames,

    /// A frame's pixel buffer does not hold `width * height` RGBA pixels.
    #[error("pixel buffer holds {actual} bytes where {expected} are required")]
    BufferSize {
        /// Bytes required by the frame's dimensions.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// Explicitly requested canvas dimensions differ from the bounding box of
    /// the frames.
    #[error(
        "GIF dimensions {width}x{height} do not match the {max_width}x{max_height} \
         extent of the frames (try not specifying dimensions)"
    )]
    DimensionMismatch {
        /// Requested canvas width.
        width: u16,
        /// Requested canvas height.
        height: u16,
        /// Computed maximum of `x_offset + width` over all frames.
        max_width: u16,
        /// Computed maximum of `y_offset + height` over all frames.
        max_height: u16,
    },

    /// A frame's offset plus size exceeds the 65535 pixel limit of a GIF
    /// logical screen.
    #[error("frame {index} extends past the 65535 pixel limit of the GIF canvas")]
    FrameOutOfBounds {
        /// Index of the offending frame.
        index: usize,
    },

    /// The caller declared whether the GIF uses transparency and the frames
    /// disagree.
    #[error(
        "`uses_transparency` was declared {declared} but the frames show {detected} \
         (try leaving it unset)"
    )]
    TransparencyMismatch {
        /// The declared expectation.
        declared: bool,
        /// What scanning the frames found.
        detected: bool,
    },

    /// A single frame references more distinct colors than a GIF color table
    /// can hold, counting the reserved transparency slot.
    #[error("frame {index} uses more than 256 color indexes")]
    TooManyColors {
        /// Index of the offending frame.
        index: usize,
    },

    /// A frame fills all 256 color table entries and also needs the reserved
    /// transparent index.
    #[error("frame {index} already has 256 colors and so cannot use transparency")]
    NoTransparencySlot {
        /// Index of the offending frame.
        index: usize,
    },

    /// Interlaced frames cannot be written.
    #[error("writing interlaced GIFs is not supported")]
    Interlaced,

    /// An opaque pixel's color was not found in the color table assigned to
    /// its frame. The table builder and the converter disagree; this is a bug.
    #[error("frame {index} holds a color missing from its color table")]
    MissingColor {
        /// Index of the offending frame.
        index: usize,
    },

    /// A frame contains transparent pixels but its color table reserved no
    /// transparent index. The table was built at the wrong granularity; this
    /// is a bug.
    #[error("frame {index} has transparent pixels but its color table reserves no transparent index")]
    UnexpectedTransparency {
        /// Index of the offending frame.
        index: usize,
    },

    /// The encoder produced more bytes than the size estimate allowed for.
    /// The estimate is required to be an upper bound; this is a bug.
    #[error("encoded output exceeded the estimated {estimated} bytes")]
    BufferOverrun {
        /// The estimate the output buffer was sized from.
        estimated: usize,
    },

    /// The underlying GIF reader rejected the data.
    #[error("invalid GIF data")]
    Decoding(#[source] gif::DecodingError),

    /// The underlying GIF writer failed.
    #[error("GIF encoding failed")]
    Encoding(#[source] gif::EncodingError),

    /// Reading or writing bytes failed outside the codec itself.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse category of a [`GifError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum GifErrorKind {
    /// The caller's input failed validation before any work was done.
    InvalidInput,
    /// A color table cannot fit within GIF's 256-entry limit.
    Capacity,
    /// The input requires a GIF feature this crate does not write.
    Unsupported,
    /// An internal invariant was violated; always a bug in this crate.
    Internal,
    /// The underlying reader reported malformed GIF data.
    Decoding,
    /// The underlying writer failed.
    Encoding,
    /// An I/O failure outside the codec itself.
    Io,
}

impl GifError {
    /// Returns the taxonomy category of this error.
    pub fn kind(&self) -> GifErrorKind {
        match self {
            GifError::NoFrames
            | GifError::BufferSize { .. }
            | GifError::DimensionMismatch { .. }
            | GifError::FrameOutOfBounds { .. }
            | GifError::TransparencyMismatch { .. } => GifErrorKind::InvalidInput,
            GifError::TooManyColors { .. } | GifError::NoTransparencySlot { .. } => {
                GifErrorKind::Capacity
            }
            GifError::Interlaced => GifErrorKind::Unsupported,
            GifError::MissingColor { .. }
            | GifError::UnexpectedTransparency { .. }
            | GifError::BufferOverrun { .. } => GifErrorKind::Internal,
            GifError::Decoding(_) => GifErrorKind::Decoding,
            GifError::Encoding(_) => GifErrorKind::Encoding,
            GifError::Io(_) => GifErrorKind::Io,
        }
    }

    pub(crate) fn from_decoding(err: gif::DecodingError) -> GifError {
        use gif::DecodingError::*;
        match err {
            err @ Format(_) => GifError::Decoding(err),
            Io(io_err) => GifError::Io(io_err),
        }
    }

    pub(crate) fn from_encoding(err: gif::EncodingError) -> GifError {
        use gif::EncodingError::*;
        match err {
            err @ Format(_) => GifError::Encoding(err),
            Io(io_err) => GifError::Io(io_err),
        }
    }
}

/// Result of an encoding or decoding operation.
pub type GifResult<T> = Result<T, GifError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[allow(dead_code)]
    // This will fail to compile if the size of this type is large.
    const ASSERT_SMALLISH: usize = [0][(mem::size_of::<GifError>() >= 64) as usize];

    #[test]
    fn test_send_sync_stability() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<GifError>();
    }

    #[test]
    fn kind_follows_taxonomy() {
        assert_eq!(GifError::NoFrames.kind(), GifErrorKind::InvalidInput);
        assert_eq!(
            GifError::TooManyColors { index: 3 }.kind(),
            GifErrorKind::Capacity
        );
        assert_eq!(GifError::Interlaced.kind(), GifErrorKind::Unsupported);
        assert_eq!(
            GifError::BufferOverrun { estimated: 128 }.kind(),
            GifErrorKind::Internal
        );
    }

    #[test]
    fn messages_name_the_frame() {
        let err = GifError::TooManyColors { index: 7 };
        assert!(err.to_string().contains("frame 7"));
        let err = GifError::MissingColor { index: 2 };
        assert!(err.to_string().contains("frame 2"));
    }
}
