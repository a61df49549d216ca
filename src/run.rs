use crate::consts::{SSI_RUN_MAX, SSI_RUN_MIN};
use crate::pixel::Pixel;

/// Counts consecutive repeats of a pixel at the head of a slice.
///
/// A run is capped at [`SSI_RUN_MAX`] repeats; longer stretches of identical
/// pixels are closed at the cap and picked up again as a new run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunDetector {
    max_run: u8,
}

impl Default for RunDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RunDetector {
    pub const fn new() -> Self {
        Self { max_run: SSI_RUN_MAX }
    }

    /// Number of leading pixels in `rest` equal to `prev`, at most the cap.
    #[inline]
    pub fn repeats(&self, prev: Pixel, rest: &[Pixel]) -> u8 {
        let mut n = 0_u8;
        for &px in rest {
            if px != prev || n == self.max_run {
                break;
            }
            n += 1;
        }
        n
    }

    /// Like [`repeats`](Self::repeats), but only reports runs worth a `Run` tag.
    #[inline]
    pub fn detect(&self, prev: Pixel, rest: &[Pixel]) -> Option<u8> {
        let n = self.repeats(prev, rest);
        (n >= SSI_RUN_MIN).then_some(n)
    }
}
