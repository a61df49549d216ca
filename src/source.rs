use alloc::vec::Vec;

use bytemuck::try_cast_slice;

use crate::error::{Error, Result};
use crate::pixel::Pixel;
use crate::utils::unlikely;

/// Reinterprets raw interleaved RGB bytes as pixels, without copying.
#[inline]
pub fn pixels_from_bytes(data: &[u8]) -> Result<&[Pixel]> {
    if unlikely(data.len() % 3 != 0) {
        return Err(Error::InvalidImageLength { size: data.len() });
    }
    try_cast_slice(data).map_err(|_| Error::InvalidImageLength { size: data.len() })
}

/// One of the three colour channels of an interleaved RGB buffer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Byte offset of this channel within a pixel.
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// Returns a copy of `data` where every channel other than `channel` is zeroed.
///
/// The output keeps the interleaved RGB layout, so it can be fed straight back
/// into the encoder to look at a single channel in isolation.
pub fn extract_channel(data: &[u8], channel: Channel) -> Result<Vec<u8>> {
    let pixels = pixels_from_bytes(data)?;
    let mut out = Vec::with_capacity(data.len());
    for &px in pixels {
        let mut rgb = [0_u8; 3];
        rgb[channel.offset()] = <[u8; 3]>::from(px)[channel.offset()];
        out.extend_from_slice(&rgb);
    }
    Ok(out)
}
