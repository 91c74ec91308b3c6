//! The monochrome screen of the chip.
use crate::definitions::display::{HEIGHT, RESOLUTION, WIDTH};

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`, stored row major.
///
/// Sprites wrap toroidally: the target of a sprite bit is computed on the flattened
/// buffer, so a row running past the right edge continues at the left edge of the
/// next row, and rows running past the bottom continue at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [bool; RESOLUTION],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: [false; RESOLUTION],
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.pixels = [false; RESOLUTION];
    }

    /// XORs the sprite into the buffer with the origin `(x, y)`, every byte
    /// is one row of eight pixels with the most significant bit on the left.
    ///
    /// Returns true if any pixel was flipped from set to unset.
    ///
    /// # Example
    /// ```rust
    /// # use chip::framebuffer::Framebuffer;
    /// let mut fb = Framebuffer::new();
    /// assert!(!fb.draw(62, 0, &[0b1100_0000]));
    /// assert!(fb.is_set(62, 0) && fb.is_set(63, 0));
    /// assert!(fb.draw(62, 0, &[0b1000_0000]));
    /// assert!(!fb.is_set(62, 0));
    /// ```
    pub fn draw(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        const BYTE: usize = 8;

        let x = x % WIDTH;
        let y = y % HEIGHT;
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            for bit in 0..BYTE {
                let mask = 0x80 >> bit;
                if byte & mask == 0 {
                    continue;
                }
                let index = (x + bit + (y + row) * WIDTH) % RESOLUTION;
                let pixel = &mut self.pixels[index];
                if *pixel {
                    collision = true;
                }
                *pixel = !*pixel;
            }
        }

        collision
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.pixels[(x % WIDTH) + (y % HEIGHT) * WIDTH]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(WIDTH)
    }
}
