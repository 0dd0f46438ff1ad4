//! Color tables built from frame pixels.

use std::collections::BTreeSet;

use crate::frame::GifFrame;

// Break-even guess between a linear scan and binary search.
const LINEAR_SEARCH_MAX: usize = 5;

/// The distinct colors used by one frame, or by every frame of a GIF.
///
/// Colors are 24-bit `0xRRGGBB` values, sorted ascending and duplicate-free;
/// index lookup during encoding relies on that order. Tables are transient:
/// they are rebuilt from pixels on every encode call and never cached or
/// shared between calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<u32>,
    uses_transparency: bool,
}

impl Palette {
    /// Builds the color table of a single RGBA pixel buffer.
    ///
    /// A fully transparent pixel (alpha 0) sets the transparency flag; every
    /// other pixel contributes its RGB triple. There is no
    /// partial-transparency support, so intermediate alpha is treated as
    /// opaque.
    pub fn from_pixels(rgba: &[u8]) -> Palette {
        let mut set = BTreeSet::new();
        let mut uses_transparency = false;
        for px in rgba.chunks_exact(4) {
            if px[3] == 0 {
                uses_transparency = true;
            } else {
                set.insert(u32::from(px[0]) << 16 | u32::from(px[1]) << 8 | u32::from(px[2]));
            }
        }
        Palette {
            colors: set.into_iter().collect(),
            uses_transparency,
        }
    }

    /// Builds the unified color table of several frames, the table a GIF
    /// would share across all of them.
    ///
    /// The result obeys the same 256-entry limit as any other table; callers
    /// deciding between shared and per-frame tables check [`index_size`]
    /// against 256 before using it.
    ///
    /// [`index_size`]: Palette::index_size
    pub fn from_frames(frames: &[GifFrame]) -> Palette {
        let locals: Vec<Palette> = frames.iter().map(|frame| frame.palette()).collect();
        Palette::union(&locals)
    }

    /// Merges already-built tables into their set union.
    pub(crate) fn union<'a>(palettes: impl IntoIterator<Item = &'a Palette>) -> Palette {
        let mut set = BTreeSet::new();
        let mut uses_transparency = false;
        for palette in palettes {
            set.extend(palette.colors.iter().copied());
            uses_transparency |= palette.uses_transparency;
        }
        Palette {
            colors: set.into_iter().collect(),
            uses_transparency,
        }
    }

    /// The sorted colors, without the reserved transparency slot.
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Whether any pixel this table was built from was fully transparent.
    pub fn uses_transparency(&self) -> bool {
        self.uses_transparency
    }

    /// Number of table entries needed, counting the reserved transparent
    /// index when transparency is used. Above 256 the owning frame cannot be
    /// encoded.
    pub fn index_size(&self) -> usize {
        self.colors.len() + usize::from(self.uses_transparency)
    }

    /// The index reserved for fully transparent pixels, when there is one.
    ///
    /// Always one past the last color, so it stays valid after the table is
    /// padded for writing.
    pub fn transparent_index(&self) -> Option<usize> {
        self.uses_transparency.then_some(self.colors.len())
    }

    /// Minimum bits needed to store the largest valid index, at least 1.
    pub fn pixel_bit_width(&self) -> u8 {
        let max_index = (self.index_size().saturating_sub(1)) as u32;
        if max_index == 0 {
            1
        } else {
            (32 - max_index.leading_zeros()) as u8
        }
    }

    /// Entry count of the table as actually written: the color count plus
    /// the transparent slot, rounded up to a power of two, minimum 2.
    pub(crate) fn padded_len(&self) -> usize {
        let mut padded = 2;
        while self.index_size() > padded {
            padded <<= 1;
        }
        padded
    }

    /// Renders the table as the RGB byte triples handed to the writer.
    ///
    /// The transparent slot and the power-of-two padding are filled with
    /// black, the sentinel the writer's padding would use anyway.
    pub(crate) fn table_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.padded_len() * 3);
        for &color in &self.colors {
            bytes.push((color >> 16) as u8);
            bytes.push((color >> 8) as u8);
            bytes.push(color as u8);
        }
        bytes.resize(self.padded_len() * 3, 0);
        bytes
    }

    /// Position of an exact color in the table, if present.
    pub fn index_of(&self, color: u32) -> Option<usize> {
        (self.lookup())(&self.colors, color)
    }

    /// Picks a lookup function once per table: small tables scan, larger
    /// ones binary-search the sorted colors. Both return identical results.
    pub(crate) fn lookup(&self) -> fn(&[u32], u32) -> Option<usize> {
        if self.colors.len() <= LINEAR_SEARCH_MAX {
            color_lookup_linear
        } else {
            color_lookup_binary
        }
    }
}

fn color_lookup_linear(colors: &[u32], color: u32) -> Option<usize> {
    colors.iter().position(|&c| c == color)
}

fn color_lookup_binary(colors: &[u32], color: u32) -> Option<usize> {
    colors.binary_search(&color).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn rgba(pixels: &[(u8, u8, u8, u8)]) -> Vec<u8> {
        pixels
            .iter()
            .flat_map(|&(r, g, b, a)| [r, g, b, a])
            .collect()
    }

    #[test]
    fn colors_sorted_and_deduped() {
        let buf = rgba(&[
            (9, 9, 9, 255),
            (1, 2, 3, 255),
            (9, 9, 9, 255),
            (0, 0, 0, 255),
        ]);
        let palette = Palette::from_pixels(&buf);
        assert_eq!(palette.colors(), &[0x000000, 0x010203, 0x090909]);
        assert!(!palette.uses_transparency());
        assert_eq!(palette.index_size(), 3);
    }

    #[test]
    fn transparency_reserves_an_index() {
        let buf = rgba(&[(255, 0, 0, 255), (0, 0, 0, 0)]);
        let palette = Palette::from_pixels(&buf);
        assert!(palette.uses_transparency());
        assert_eq!(palette.index_size(), 2);
        assert_eq!(palette.transparent_index(), Some(1));
    }

    #[test]
    fn intermediate_alpha_counts_as_opaque() {
        let buf = rgba(&[(10, 20, 30, 128)]);
        let palette = Palette::from_pixels(&buf);
        assert_eq!(palette.colors(), &[0x0a141e]);
        assert!(!palette.uses_transparency());
    }

    #[test]
    fn fully_transparent_frame() {
        let buf = rgba(&[(7, 7, 7, 0), (8, 8, 8, 0)]);
        let palette = Palette::from_pixels(&buf);
        assert!(palette.colors().is_empty());
        assert!(palette.uses_transparency());
        assert_eq!(palette.index_size(), 1);
        assert_eq!(palette.transparent_index(), Some(0));
        assert_eq!(palette.pixel_bit_width(), 1);
    }

    #[test]
    fn bit_widths() {
        fn palette_of(count: usize, transparent: bool) -> Palette {
            Palette {
                colors: (0..count as u32).collect(),
                uses_transparency: transparent,
            }
        }
        assert_eq!(palette_of(1, false).pixel_bit_width(), 1);
        assert_eq!(palette_of(2, false).pixel_bit_width(), 1);
        assert_eq!(palette_of(3, false).pixel_bit_width(), 2);
        assert_eq!(palette_of(4, false).pixel_bit_width(), 2);
        assert_eq!(palette_of(5, false).pixel_bit_width(), 3);
        assert_eq!(palette_of(255, true).pixel_bit_width(), 8);
        assert_eq!(palette_of(256, false).pixel_bit_width(), 8);
    }

    #[test]
    fn padding_rounds_up_to_power_of_two() {
        let buf = rgba(&[(0, 0, 0, 255), (1, 1, 1, 0)]);
        let palette = Palette::from_pixels(&buf);
        // one color plus the transparent slot fits exactly in two entries
        assert_eq!(palette.padded_len(), 2);
        assert_eq!(palette.table_bytes(), vec![0, 0, 0, 0, 0, 0]);

        let buf = rgba(&[(1, 0, 0, 255), (2, 0, 0, 255), (0, 0, 0, 0)]);
        let palette = Palette::from_pixels(&buf);
        assert_eq!(palette.index_size(), 3);
        assert_eq!(palette.padded_len(), 4);
        assert_eq!(palette.table_bytes().len(), 12);
    }

    #[test]
    fn lookup_cutover_agrees() {
        let colors: Vec<u32> = vec![2, 3, 5, 7, 11, 13, 17, 19];
        for probe in 0..25 {
            assert_eq!(
                color_lookup_linear(&colors, probe),
                color_lookup_binary(&colors, probe)
            );
        }
    }

    #[test]
    fn union_merges_colors_and_transparency() {
        let a = Palette::from_pixels(&rgba(&[(1, 1, 1, 255)]));
        let b = Palette::from_pixels(&rgba(&[(2, 2, 2, 255), (0, 0, 0, 0)]));
        let both = Palette::union([&a, &b]);
        assert_eq!(both.colors(), &[0x010101, 0x020202]);
        assert!(both.uses_transparency());
    }

    quickcheck! {
        fn builds_sorted_unique(pixels: Vec<(u8, u8, u8, u8)>) -> bool {
            let palette = Palette::from_pixels(&rgba(&pixels));
            palette.colors().windows(2).all(|w| w[0] < w[1])
        }

        fn every_color_is_found(pixels: Vec<(u8, u8, u8, u8)>) -> bool {
            let palette = Palette::from_pixels(&rgba(&pixels));
            palette
                .colors()
                .iter()
                .enumerate()
                .all(|(i, &color)| palette.index_of(color) == Some(i))
        }

        fn lookup_strategies_agree(pixels: Vec<(u8, u8, u8, u8)>, probe: (u8, u8, u8)) -> bool {
            let palette = Palette::from_pixels(&rgba(&pixels));
            let color = u32::from(probe.0) << 16 | u32::from(probe.1) << 8 | u32::from(probe.2);
            color_lookup_linear(palette.colors(), color)
                == color_lookup_binary(palette.colors(), color)
        }
    }
}
