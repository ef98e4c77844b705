// Indexed Frame Buffer - the game's native pixel representation
//
// The game renders at a fixed 640×480 resolution. Each pixel is an 8-bit
// palette index which maps to an RGB color through the active game palette.

/// Logical visible width in pixels
pub const VISIBLE_WIDTH: usize = 640;

/// Logical visible height in pixels
pub const VISIBLE_HEIGHT: usize = 480;

/// Total number of pixels in the frame buffer
pub const VISIBLE_SIZE: usize = VISIBLE_WIDTH * VISIBLE_HEIGHT;

/// Frame buffer storing one palette index per pixel
///
/// Written once per game frame by game-logic rendering; the presentation
/// pipeline only reads it.
pub struct IndexedFramebuffer {
    /// Pixel data stored as palette indices (0-255)
    pixels: Box<[u8]>,
}

impl IndexedFramebuffer {
    /// Create a new frame buffer initialized to palette index 0
    pub fn new() -> Self {
        Self {
            pixels: vec![0u8; VISIBLE_SIZE].into_boxed_slice(),
        }
    }

    /// Set a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        assert!(x < VISIBLE_WIDTH, "X coordinate {} out of bounds", x);
        assert!(y < VISIBLE_HEIGHT, "Y coordinate {} out of bounds", y);

        self.pixels[y * VISIBLE_WIDTH + x] = index;
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < VISIBLE_WIDTH, "X coordinate {} out of bounds", x);
        assert!(y < VISIBLE_HEIGHT, "Y coordinate {} out of bounds", y);

        self.pixels[y * VISIBLE_WIDTH + x]
    }

    /// Clear the frame buffer to a single palette index
    pub fn clear(&mut self, index: u8) {
        self.pixels.fill(index);
    }

    /// Get the raw pixel data as palette indices
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels[..]
    }

    /// Get mutable access to the raw pixel data
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.pixels[..]
    }

    /// One scanline of palette indices
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < VISIBLE_HEIGHT, "Y coordinate {} out of bounds", y);
        &self.pixels[y * VISIBLE_WIDTH..(y + 1) * VISIBLE_WIDTH]
    }

    /// Fill with a block test pattern cycling through the whole palette
    pub fn test_pattern(&mut self) {
        for y in 0..VISIBLE_HEIGHT {
            for x in 0..VISIBLE_WIDTH {
                let index = ((x / 16) + (y / 16) * 16) as u8;
                self.set_pixel(x, y, index);
            }
        }
    }

    /// Fill with alternating-index checkerboard bands
    ///
    /// This is the pattern the dithering filter is designed to detect:
    /// horizontal runs alternating between two palette indices, the classic
    /// trick for simulating intermediate colors with an 8-bit palette.
    pub fn dither_pattern(&mut self) {
        for y in 0..VISIBLE_HEIGHT {
            let band = (y / 60) as u8;
            let (a, b) = (band * 16, band * 16 + 8);
            for x in 0..VISIBLE_WIDTH {
                let index = if (x + y) % 2 == 0 { a } else { b };
                self.set_pixel(x, y, index);
            }
        }
    }
}

impl Default for IndexedFramebuffer {
    fn default() -> Self {
        Self::new()
    }
}
