use core::fmt::{self, Display};

use bytemuck::{Pod, Zeroable};

use crate::consts::SSI_INDEX_SIZE;

/// A single RGB pixel, three 8-bit channels.
///
/// The layout is exactly three bytes in R, G, B order, so a slice of raw
/// interleaved RGB data can be reinterpreted as a slice of pixels without
/// copying (see [`pixels_from_bytes`](crate::pixels_from_bytes)).
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug, Pod, Zeroable)]
#[repr(transparent)]
pub struct Pixel([u8; 3]);

impl Pixel {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0[2]
    }

    /// Cache slot for this pixel: sum of the channels modulo 64.
    #[inline]
    pub const fn hash_index(self) -> u8 {
        let sum = self.r() as u16 + self.g() as u16 + self.b() as u16;
        (sum % SSI_INDEX_SIZE as u16) as u8
    }

    /// Signed per-channel difference `self - prev`, without wrapping.
    #[inline]
    pub const fn delta(self, prev: Self) -> [i16; 3] {
        [
            self.r() as i16 - prev.r() as i16,
            self.g() as i16 - prev.g() as i16,
            self.b() as i16 - prev.b() as i16,
        ]
    }
}

impl From<[u8; 3]> for Pixel {
    #[inline(always)]
    fn from(arr: [u8; 3]) -> Self {
        Self(arr)
    }
}

impl From<(u8, u8, u8)> for Pixel {
    #[inline(always)]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self([r, g, b])
    }
}

impl From<Pixel> for [u8; 3] {
    #[inline(always)]
    fn from(px: Pixel) -> Self {
        px.0
    }
}

impl Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R={} G={} B={}", self.r(), self.g(), self.b())
    }
}
