use core::fmt;
use core::ops::Deref;

use crate::consts::{
    SSI_INDEX_SIZE, SSI_MAX_TAG_LEN, SSI_OP_DIFF_LONG, SSI_OP_DIFF_SHORT, SSI_OP_INDEX, SSI_OP_RGB,
    SSI_OP_RUN, SSI_RUN_MAX, SSI_RUN_MIN,
};
use crate::tag::Tag;

/// Wire representation of a single [`Tag`]: between one and four bytes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PackedTag {
    buf: [u8; SSI_MAX_TAG_LEN],
    len: u8,
}

impl PackedTag {
    #[inline]
    const fn one(b0: u8) -> Self {
        Self { buf: [b0, 0, 0, 0], len: 1 }
    }

    #[inline]
    const fn two(b0: u8, b1: u8) -> Self {
        Self { buf: [b0, b1, 0, 0], len: 2 }
    }

    #[inline]
    const fn four(buf: [u8; 4]) -> Self {
        Self { buf, len: 4 }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl Deref for PackedTag {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for PackedTag {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Bit-level dump, most significant bit first, one 8-bit group per byte.
impl fmt::Binary for PackedTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, b) in self.as_slice().iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:08b}", b)?;
        }
        Ok(())
    }
}

impl Tag {
    /// Size of the packed representation in bytes.
    #[inline]
    pub const fn encoded_len(&self) -> usize {
        match self {
            Self::Literal(_) => 4,
            Self::Run(_) | Self::Index(_) | Self::DiffShort(_) => 1,
            Self::DiffLong(_) => 2,
        }
    }

    /// Maps the tag onto its byte-exact wire form.
    ///
    /// Delta payloads are range-checked on construction. A run length or
    /// slot outside its 6-bit field can only come from a bug in the caller
    /// and panics rather than being silently truncated.
    #[inline]
    pub fn pack(&self) -> PackedTag {
        match *self {
            Self::Literal(px) => PackedTag::four([SSI_OP_RGB, px.r(), px.g(), px.b()]),
            Self::Run(n) => {
                assert!(
                    (SSI_RUN_MIN..=SSI_RUN_MAX).contains(&n),
                    "run length out of range: {}",
                    n
                );
                PackedTag::one(SSI_OP_RUN | n)
            }
            Self::Index(slot) => {
                assert!(usize::from(slot) < SSI_INDEX_SIZE, "index slot out of range: {}", slot);
                PackedTag::one(SSI_OP_INDEX | slot)
            }
            Self::DiffShort(d) => {
                let [vr, vg, vb] = d.biased();
                PackedTag::one(SSI_OP_DIFF_SHORT | vr << 4 | vg << 2 | vb)
            }
            Self::DiffLong(d) => {
                let [vr, vg, vb] = d.biased();
                PackedTag::two(SSI_OP_DIFF_LONG | vr, vg << 4 | vb)
            }
        }
    }
}
