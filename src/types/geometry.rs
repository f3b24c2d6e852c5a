//! Pixel rectangles produced by the geometric detector

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, origin top-left
///
/// Serialized as `[x, y, width, height]`, the shape detectors usually emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Horizontal center, integer pixel
    pub fn center_x(&self) -> u32 {
        self.x + self.width / 2
    }

    /// Vertical center, integer pixel
    pub fn center_y(&self) -> u32 {
        self.y + self.height / 2
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Non-empty and fully inside a `frame_width × frame_height` frame
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= frame_width as u64
            && self.y as u64 + self.height as u64 <= frame_height as u64
    }

    /// Map a box found on a horizontally flipped frame back into frame space
    ///
    /// Profile detectors usually only know one orientation; left profiles are
    /// found by running them on the mirrored image.
    pub fn mirror_horizontal(&self, frame_width: u32) -> Self {
        Self {
            x: frame_width.saturating_sub(self.x + self.width),
            ..*self
        }
    }
}

impl From<[u32; 4]> for BBox {
    fn from(v: [u32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [u32; 4] {
    fn from(b: BBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centers_use_integer_halves() {
        let b = BBox::new(10, 20, 31, 41);
        assert_eq!(b.center_x(), 25);
        assert_eq!(b.center_y(), 40);
    }

    #[test]
    fn test_mirror_horizontal() {
        let b = BBox::new(100, 50, 80, 80);
        let m = b.mirror_horizontal(640);
        assert_eq!(m, BBox::new(460, 50, 80, 80));
        // Mirroring twice is identity
        assert_eq!(m.mirror_horizontal(640), b);
    }

    #[test]
    fn test_fits_within() {
        assert!(BBox::new(0, 0, 640, 480).fits_within(640, 480));
        assert!(!BBox::new(1, 0, 640, 480).fits_within(640, 480));
        assert!(!BBox::new(0, 0, 0, 10).fits_within(640, 480));
    }

    #[test]
    fn test_serde_as_array() {
        let b: BBox = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(b, BBox::new(1, 2, 3, 4));
        assert_eq!(serde_json::to_string(&b).unwrap(), "[1,2,3,4]");
    }
}
