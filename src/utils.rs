#[cfg(feature = "std")]
use std::io::Write;

use crate::error::Result;

#[inline(always)]
#[cold]
pub const fn cold() {}

#[inline(always)]
pub const fn unlikely(b: bool) -> bool {
    if b {
        cold();
    }
    b
}

/// Sink for packed tag bytes.
pub trait Writer: Sized {
    fn write_many(self, v: &[u8]) -> Result<Self>;
    fn capacity(&self) -> usize;
}

pub struct BytesMut<'a>(&'a mut [u8]);

impl<'a> BytesMut<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self(buf)
    }

    #[inline]
    pub fn write_many(self, v: &[u8]) -> Self {
        if v.len() <= self.0.len() {
            let (head, tail) = self.0.split_at_mut(v.len());
            head.copy_from_slice(v);
            Self(tail)
        } else {
            cold();
            panic!();
        }
    }
}

impl<'a> Writer for BytesMut<'a> {
    #[inline]
    fn write_many(self, v: &[u8]) -> Result<Self> {
        Ok(BytesMut::write_many(self, v))
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.0.len()
    }
}

#[cfg(feature = "std")]
pub struct GenericWriter<W> {
    writer: W,
    n_written: usize,
}

#[cfg(feature = "std")]
impl<W: Write> GenericWriter<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer, n_written: 0 }
    }
}

#[cfg(feature = "std")]
impl<W: Write> Writer for GenericWriter<W> {
    fn write_many(mut self, v: &[u8]) -> Result<Self> {
        self.writer.write_all(v)?;
        self.n_written += v.len();
        Ok(self)
    }

    fn capacity(&self) -> usize {
        usize::MAX - self.n_written
    }
}
