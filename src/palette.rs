// Game Palette and Derived Color Table
//
// The game palette is an ordered table of 256 colors stored as 0xAARRGGBB.
// Conversion never reads the palette directly; it goes through the derived
// color table, which caches every entry pre-packed in both output pixel
// formats. The table is rebuilt synchronously on every palette mutation so
// it can never go stale.

use crate::color::{pack_rgb565, pack_rgba32};

/// Number of palette entries
pub const PALETTE_SIZE: usize = 256;

/// The active game palette (256 × 0xAARRGGBB, always opaque)
#[derive(Clone, PartialEq, Eq)]
pub struct GamePalette {
    entries: [u32; PALETTE_SIZE],
}

impl GamePalette {
    /// Create a palette with the placeholder identity coloring
    /// (entry i = 0xFF000000 | i)
    pub fn new() -> Self {
        let mut entries = [0u32; PALETTE_SIZE];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = 0xFF00_0000 | i as u32;
        }
        Self { entries }
    }

    /// Create a grayscale ramp (entry i = gray level i)
    pub fn grayscale() -> Self {
        let mut palette = Self::new();
        for i in 0..PALETTE_SIZE {
            let v = i as u8;
            palette.set_rgb(i as u8, v, v, v);
        }
        palette
    }

    /// Get one entry as 0xAARRGGBB
    #[inline]
    pub fn entry(&self, index: u8) -> u32 {
        self.entries[index as usize]
    }

    /// Set one entry from RGB channels (alpha forced opaque)
    #[inline]
    pub fn set_rgb(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.entries[index as usize] =
            0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
    }

    /// Red channel of one entry
    #[inline]
    pub fn red(&self, index: u8) -> u8 {
        ((self.entries[index as usize] >> 16) & 0xFF) as u8
    }

    /// Green channel of one entry
    #[inline]
    pub fn green(&self, index: u8) -> u8 {
        ((self.entries[index as usize] >> 8) & 0xFF) as u8
    }

    /// Blue channel of one entry
    #[inline]
    pub fn blue(&self, index: u8) -> u8 {
        (self.entries[index as usize] & 0xFF) as u8
    }

    /// A copy of this palette with every channel scaled by `brightness`
    /// percent (0 = black, 100 = unchanged)
    pub fn scaled(&self, brightness: u32) -> Self {
        let brightness = brightness.min(100);
        let mut out = self.clone();
        for i in 0..PALETTE_SIZE {
            let index = i as u8;
            let r = (self.red(index) as u32 * brightness / 100) as u8;
            let g = (self.green(index) as u32 * brightness / 100) as u8;
            let b = (self.blue(index) as u32 * brightness / 100) as u8;
            out.set_rgb(index, r, g, b);
        }
        out
    }
}

impl Default for GamePalette {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived color table: every palette entry pre-packed in both output
/// pixel formats
///
/// Building is a pure transform; building twice from the same palette
/// yields identical tables.
#[derive(Clone, PartialEq, Eq)]
pub struct ColorTable {
    colors16: [u16; PALETTE_SIZE],
    colors32: [u32; PALETTE_SIZE],
}

impl ColorTable {
    /// Pack every palette entry into both output formats
    pub fn build(palette: &GamePalette) -> Self {
        let mut colors16 = [0u16; PALETTE_SIZE];
        let mut colors32 = [0u32; PALETTE_SIZE];

        for i in 0..PALETTE_SIZE {
            let index = i as u8;
            let (r, g, b) = (palette.red(index), palette.green(index), palette.blue(index));
            colors16[i] = pack_rgb565(r, g, b);
            colors32[i] = pack_rgba32(r, g, b);
        }

        Self { colors16, colors32 }
    }

    /// Packed 16-bit 5-6-5 value for one palette index
    #[inline]
    pub fn color16(&self, index: u8) -> u16 {
        self.colors16[index as usize]
    }

    /// Packed 32-bit value for one palette index
    #[inline]
    pub fn color32(&self, index: u8) -> u32 {
        self.colors32[index as usize]
    }
}

/// Process-owned palette state: the game palette, a fade backup, and the
/// derived color table
///
/// This is the only mutation API for the palette. Every mutating method
/// rebuilds the color table before returning, which is what keeps the
/// "no conversion ever sees a stale table" invariant: the table is private
/// and there is no path that changes the palette without rebuilding it.
pub struct PaletteState {
    palette: GamePalette,
    backup: GamePalette,
    table: ColorTable,
}

impl PaletteState {
    /// Create palette state from an initial palette
    pub fn new(palette: GamePalette) -> Self {
        let table = ColorTable::build(&palette);
        let backup = palette.clone();
        Self {
            palette,
            backup,
            table,
        }
    }

    /// The active palette
    pub fn palette(&self) -> &GamePalette {
        &self.palette
    }

    /// The derived color table for the active palette
    pub fn color_table(&self) -> &ColorTable {
        &self.table
    }

    /// Replace the palette wholesale
    pub fn set_palette(&mut self, palette: GamePalette) {
        self.palette = palette;
        self.rebuild();
    }

    /// Set a single entry
    pub fn set_entry(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.palette.set_rgb(index, r, g, b);
        self.rebuild();
    }

    /// Snapshot the current palette as the fade reference
    ///
    /// Fade steps always scale the snapshot, not the current palette, so
    /// repeated steps don't compound.
    pub fn begin_fade(&mut self) {
        self.backup = self.palette.clone();
    }

    /// One fade step: set the palette to the snapshot scaled by
    /// `brightness` percent (0 = black, 100 = unchanged)
    pub fn step_fade(&mut self, brightness: u32) {
        self.palette = self.backup.scaled(brightness);
        self.rebuild();
    }

    /// Restore the fade snapshot exactly
    pub fn restore(&mut self) {
        self.palette = self.backup.clone();
        self.rebuild();
    }

    /// Blank the palette to black
    pub fn erase(&mut self) {
        for i in 0..PALETTE_SIZE {
            self.palette.set_rgb(i as u8, 0, 0, 0);
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.table = ColorTable::build(&self.palette);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_channels() {
        let mut palette = GamePalette::new();
        palette.set_rgb(7, 0x12, 0x34, 0x56);
        assert_eq!(palette.entry(7), 0xFF123456);
        assert_eq!(palette.red(7), 0x12);
        assert_eq!(palette.green(7), 0x34);
        assert_eq!(palette.blue(7), 0x56);
    }

    #[test]
    fn test_table_build_idempotent() {
        let mut palette = GamePalette::new();
        palette.set_rgb(0, 255, 128, 64);
        palette.set_rgb(255, 1, 2, 3);

        let a = ColorTable::build(&palette);
        let b = ColorTable::build(&palette);
        assert!(a == b);
    }

    #[test]
    fn test_table_packs_both_formats() {
        let mut palette = GamePalette::new();
        palette.set_rgb(9, 0xFF, 0x00, 0xFF);
        let table = ColorTable::build(&palette);

        assert_eq!(table.color16(9), pack_rgb565(0xFF, 0x00, 0xFF));
        assert_eq!(table.color32(9), pack_rgba32(0xFF, 0x00, 0xFF));
    }

    #[test]
    fn test_mutation_rebuilds_table() {
        let mut state = PaletteState::new(GamePalette::new());
        let before = state.color_table().color32(3);

        state.set_entry(3, 200, 100, 50);
        let after = state.color_table().color32(3);

        assert_ne!(before, after);
        assert_eq!(after, pack_rgba32(200, 100, 50));
    }

    #[test]
    fn test_fade_scales_from_snapshot() {
        let mut palette = GamePalette::new();
        palette.set_rgb(0, 100, 200, 50);
        let mut state = PaletteState::new(palette);

        state.begin_fade();
        state.step_fade(50);
        assert_eq!(state.palette().red(0), 50);
        assert_eq!(state.palette().green(0), 100);
        assert_eq!(state.palette().blue(0), 25);

        // Steps scale the snapshot, not the faded palette
        state.step_fade(50);
        assert_eq!(state.palette().red(0), 50);

        state.restore();
        assert_eq!(state.palette().red(0), 100);
    }

    #[test]
    fn test_erase_blanks_palette() {
        let mut state = PaletteState::new(GamePalette::grayscale());
        state.erase();
        assert_eq!(state.palette().entry(128), 0xFF000000);
        assert_eq!(state.color_table().color16(128), 0);
    }
}
