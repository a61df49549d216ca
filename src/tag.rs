use core::fmt::{self, Display};

use crate::consts::{SSI_DIFF_LONG_BITS, SSI_DIFF_SHORT_BITS};
use crate::pixel::Pixel;

/// Signed per-channel delta that fits into `BITS`-wide wire fields.
///
/// The only way to obtain a value is through [`Delta::new`], which rejects
/// anything outside `[-(2^(BITS-1)), 2^(BITS-1) - 1]`, so the biased fields
/// returned by [`Delta::biased`] always fit without truncation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Delta<const BITS: u32>([i8; 3]);

/// Deltas in `[-2, 1]`, two bits per channel.
pub type ShortDelta = Delta<SSI_DIFF_SHORT_BITS>;
/// Deltas in `[-8, 7]`, four bits per channel.
pub type LongDelta = Delta<SSI_DIFF_LONG_BITS>;

impl<const BITS: u32> Delta<BITS> {
    pub const MIN: i16 = -(1 << (BITS - 1));
    pub const MAX: i16 = (1 << (BITS - 1)) - 1;

    #[inline]
    pub const fn contains(d: i16) -> bool {
        d >= Self::MIN && d <= Self::MAX
    }

    /// Returns `None` unless all three channel deltas are representable.
    #[inline]
    pub const fn new(d: [i16; 3]) -> Option<Self> {
        if Self::contains(d[0]) && Self::contains(d[1]) && Self::contains(d[2]) {
            Some(Self([d[0] as i8, d[1] as i8, d[2] as i8]))
        } else {
            None
        }
    }

    #[inline]
    pub const fn dr(self) -> i8 {
        self.0[0]
    }

    #[inline]
    pub const fn dg(self) -> i8 {
        self.0[1]
    }

    #[inline]
    pub const fn db(self) -> i8 {
        self.0[2]
    }

    /// Wire fields: each delta shifted up by `-MIN`, always non-negative.
    #[inline]
    pub const fn biased(self) -> [u8; 3] {
        [
            (self.0[0] as i16 - Self::MIN) as u8,
            (self.0[1] as i16 - Self::MIN) as u8,
            (self.0[2] as i16 - Self::MIN) as u8,
        ]
    }

    /// Reconstructs the pixel this delta was computed for.
    #[inline]
    pub const fn apply(self, prev: Pixel) -> Pixel {
        Pixel::new(
            (prev.r() as i16 + self.0[0] as i16) as u8,
            (prev.g() as i16 + self.0[1] as i16) as u8,
            (prev.b() as i16 + self.0[2] as i16) as u8,
        )
    }
}

/// One encoded unit: a single pixel or a run of repeats of the previous one.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Tag {
    /// Full pixel value.
    Literal(Pixel),
    /// The previous pixel repeats this many additional times (2..=62).
    Run(u8),
    /// Cache slot (0..=63) whose content equals the current pixel.
    Index(u8),
    DiffShort(ShortDelta),
    DiffLong(LongDelta),
}

impl Tag {
    /// Number of input pixels this tag stands for.
    #[inline]
    pub const fn pixels_covered(&self) -> usize {
        match *self {
            Self::Run(n) => n as usize,
            _ => 1,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "RGB",
            Self::Run(_) => "RUN",
            Self::Index(_) => "INDEX",
            Self::DiffShort(_) => "DIFF_SHORT",
            Self::DiffLong(_) => "DIFF_LONG",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Literal(px) => write!(f, "{}: {}", self.name(), px),
            Self::Run(n) => write!(f, "{}: {}", self.name(), n),
            Self::Index(slot) => write!(f, "{}: {}", self.name(), slot),
            Self::DiffShort(d) => {
                write!(f, "{}: dR={} dG={} dB={}", self.name(), d.dr(), d.dg(), d.db())
            }
            Self::DiffLong(d) => {
                write!(f, "{}: dR={} dG={} dB={}", self.name(), d.dr(), d.dg(), d.db())
            }
        }
    }
}
