// Packed pixel formats for the converted framebuffer
//
// Two output encodings are supported:
// - 16-bit RGB 5-6-5, the fastest streaming format on old hardware
// - 32-bit RGBA with one byte per channel
//
// The 32-bit encoding keeps the in-memory byte order R, G, B, A on every
// target (matching `wgpu::TextureFormat::Rgba8Unorm`), so the per-channel
// shift amounts depend on the build target's endianness. They are computed
// here, once, and nowhere else.

use crate::palette::ColorTable;

#[cfg(target_endian = "little")]
mod shifts {
    pub const R_SHIFT: u32 = 0;
    pub const G_SHIFT: u32 = 8;
    pub const B_SHIFT: u32 = 16;
    pub const A_SHIFT: u32 = 24;
}

#[cfg(target_endian = "big")]
mod shifts {
    pub const R_SHIFT: u32 = 24;
    pub const G_SHIFT: u32 = 16;
    pub const B_SHIFT: u32 = 8;
    pub const A_SHIFT: u32 = 0;
}

use shifts::{A_SHIFT, B_SHIFT, G_SHIFT, R_SHIFT};

/// In-memory byte offset of the red channel in a packed 32-bit pixel
pub const RED_BYTE: usize = 0;
/// In-memory byte offset of the green channel
pub const GREEN_BYTE: usize = 1;
/// In-memory byte offset of the blue channel
pub const BLUE_BYTE: usize = 2;

/// Pack 8-bit channels into a 32-bit pixel with R, G, B, A memory order
#[inline]
pub fn pack_rgba32(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << R_SHIFT) | ((g as u32) << G_SHIFT) | ((b as u32) << B_SHIFT) | (0xFFu32 << A_SHIFT)
}

/// Pack 8-bit channels into RGB 5-6-5
#[inline]
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((b as u16) >> 3) | (((g as u16) >> 2) << 5) | (((r as u16) >> 3) << 11)
}

/// A pixel encoding the converter can emit
///
/// `lookup` is the plain color-table fetch; `blend` is the dither smear:
/// the floor of the per-channel mean of two table entries. Blending always
/// mixes through the 32-bit table so both encodings round identically.
pub trait FramePixel:
    Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + bytemuck::Pod + 'static
{
    /// Direct color-table lookup for one palette index
    fn lookup(table: &ColorTable, index: u8) -> Self;

    /// Floor-average of two palette entries, per channel
    fn blend(table: &ColorTable, left: u8, right: u8) -> Self;
}

#[inline]
fn mix_channels(table: &ColorTable, left: u8, right: u8) -> (u8, u8, u8) {
    let l = table.color32(left).to_ne_bytes();
    let r = table.color32(right).to_ne_bytes();

    let rmix = ((l[RED_BYTE] as u16 + r[RED_BYTE] as u16) >> 1) as u8;
    let gmix = ((l[GREEN_BYTE] as u16 + r[GREEN_BYTE] as u16) >> 1) as u8;
    let bmix = ((l[BLUE_BYTE] as u16 + r[BLUE_BYTE] as u16) >> 1) as u8;

    (rmix, gmix, bmix)
}

impl FramePixel for u32 {
    #[inline]
    fn lookup(table: &ColorTable, index: u8) -> Self {
        table.color32(index)
    }

    #[inline]
    fn blend(table: &ColorTable, left: u8, right: u8) -> Self {
        let (r, g, b) = mix_channels(table, left, right);
        pack_rgba32(r, g, b)
    }
}

impl FramePixel for u16 {
    #[inline]
    fn lookup(table: &ColorTable, index: u8) -> Self {
        table.color16(index)
    }

    #[inline]
    fn blend(table: &ColorTable, left: u8, right: u8) -> Self {
        let (r, g, b) = mix_channels(table, left, right);
        pack_rgb565(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::GamePalette;

    #[test]
    fn test_pack_rgba32_memory_order() {
        let bytes = pack_rgba32(0x12, 0x34, 0x56).to_ne_bytes();
        assert_eq!(bytes, [0x12, 0x34, 0x56, 0xFF]);
    }

    #[test]
    fn test_pack_rgb565() {
        assert_eq!(pack_rgb565(0xFF, 0xFF, 0xFF), 0xFFFF);
        assert_eq!(pack_rgb565(0, 0, 0), 0);
        // Pure red occupies the top 5 bits
        assert_eq!(pack_rgb565(0xFF, 0, 0), 0b11111_000000_00000);
        // Pure green the middle 6
        assert_eq!(pack_rgb565(0, 0xFF, 0), 0b00000_111111_00000);
        // Pure blue the bottom 5
        assert_eq!(pack_rgb565(0, 0, 0xFF), 0b00000_000000_11111);
    }

    #[test]
    fn test_blend_is_floor_average() {
        let mut palette = GamePalette::new();
        palette.set_rgb(0, 10, 20, 31);
        palette.set_rgb(1, 20, 41, 32);
        let table = ColorTable::build(&palette);

        let mixed = <u32 as FramePixel>::blend(&table, 0, 1);
        let bytes = mixed.to_ne_bytes();
        assert_eq!(bytes[RED_BYTE], 15); // (10 + 20) / 2
        assert_eq!(bytes[GREEN_BYTE], 30); // (20 + 41) / 2, floor
        assert_eq!(bytes[BLUE_BYTE], 31); // (31 + 32) / 2, floor
    }

    #[test]
    fn test_blend_565_matches_32_bit_mix() {
        let mut palette = GamePalette::new();
        palette.set_rgb(4, 200, 100, 50);
        palette.set_rgb(5, 100, 200, 150);
        let table = ColorTable::build(&palette);

        let expected = pack_rgb565(150, 150, 100);
        assert_eq!(<u16 as FramePixel>::blend(&table, 4, 5), expected);
    }
}
