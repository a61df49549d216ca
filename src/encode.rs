use alloc::vec::Vec;
use core::fmt::{self, Display};
use core::iter::FusedIterator;
use core::ops::AddAssign;
use core::slice;
#[cfg(feature = "std")]
use std::io::Write;

use log::{debug, trace};

use crate::cache::HashCache;
use crate::consts::{SSI_MAX_TAG_LEN, SSI_RUN_MAX};
use crate::error::{Error, Result};
use crate::pixel::Pixel;
use crate::run::RunDetector;
use crate::source::pixels_from_bytes;
use crate::tag::{LongDelta, ShortDelta, Tag};
#[cfg(feature = "std")]
use crate::utils::GenericWriter;
use crate::utils::{unlikely, BytesMut, Writer};

/// Turns a pixel sequence into tags, one decision per step.
///
/// The encoder owns its [`HashCache`]; nothing is shared between runs.
#[derive(Clone, Debug)]
pub struct TagEncoder<'a> {
    pixels: &'a [Pixel],
    pos: usize,
    prev: Option<Pixel>,
    cache: HashCache,
    runs: RunDetector,
}

impl<'a> TagEncoder<'a> {
    pub fn new(pixels: &'a [Pixel]) -> Self {
        Self { pixels, pos: 0, prev: None, cache: HashCache::new(), runs: RunDetector::new() }
    }

    /// Cache contents as seen by the next pixel to be encoded.
    pub const fn cache(&self) -> &HashCache {
        &self.cache
    }

    /// Number of input pixels consumed so far.
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn encode_pixel(&self, px: Pixel) -> Tag {
        if let Some(slot) = self.cache.lookup(px) {
            return Tag::Index(slot);
        }
        let Some(prev) = self.prev else {
            return Tag::Literal(px);
        };
        let d = px.delta(prev);
        if let Some(d) = ShortDelta::new(d) {
            Tag::DiffShort(d)
        } else if let Some(d) = LongDelta::new(d) {
            Tag::DiffLong(d)
        } else {
            Tag::Literal(px)
        }
    }
}

impl<'a> Iterator for TagEncoder<'a> {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        let rest = self.pixels.get(self.pos..).filter(|rest| !rest.is_empty())?;

        if let Some(prev) = self.prev {
            if let Some(n) = self.runs.detect(prev, rest) {
                self.pos += usize::from(n);
                self.cache.insert(prev);
                return Some(Tag::Run(n));
            }
        }

        let px = rest[0];
        let tag = self.encode_pixel(px);
        self.cache.insert(px);
        self.prev = Some(px);
        self.pos += 1;
        Some(tag)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.pixels.len() - self.pos;
        let max_run = usize::from(SSI_RUN_MAX);
        ((left + max_run - 1) / max_run, Some(left))
    }
}

impl<'a> FusedIterator for TagEncoder<'a> {}

/// Per-variant tag counts for a compressed stream.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct TagStats {
    pub literal: usize,
    pub run: usize,
    pub index: usize,
    pub diff_short: usize,
    pub diff_long: usize,
    /// Input pixels covered by all counted tags.
    pub pixels: usize,
    /// Packed size of all counted tags.
    pub bytes: usize,
}

impl TagStats {
    pub fn add(&mut self, tag: &Tag) {
        match tag {
            Tag::Literal(_) => self.literal += 1,
            Tag::Run(_) => self.run += 1,
            Tag::Index(_) => self.index += 1,
            Tag::DiffShort(_) => self.diff_short += 1,
            Tag::DiffLong(_) => self.diff_long += 1,
        }
        self.pixels += tag.pixels_covered();
        self.bytes += tag.encoded_len();
    }

    pub const fn tags(&self) -> usize {
        self.literal + self.run + self.index + self.diff_short + self.diff_long
    }
}

impl AddAssign for TagStats {
    fn add_assign(&mut self, other: Self) {
        self.literal += other.literal;
        self.run += other.run;
        self.index += other.index;
        self.diff_short += other.diff_short;
        self.diff_long += other.diff_long;
        self.pixels += other.pixels;
        self.bytes += other.bytes;
    }
}

impl<'t> Extend<&'t Tag> for TagStats {
    fn extend<I: IntoIterator<Item = &'t Tag>>(&mut self, iter: I) {
        iter.into_iter().for_each(|tag| self.add(tag));
    }
}

impl Display for TagStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "rgb={} run={} index={} diff_short={} diff_long={} ({} tags, {} px, {} bytes)",
            self.literal,
            self.run,
            self.index,
            self.diff_short,
            self.diff_long,
            self.tags(),
            self.pixels,
            self.bytes
        )
    }
}

/// Ordered tag sequence produced by one compression run.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct CompressedStream {
    tags: Vec<Tag>,
}

impl CompressedStream {
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    /// Total size of the packed byte stream.
    pub fn encoded_len(&self) -> usize {
        self.tags.iter().map(Tag::encoded_len).sum()
    }

    pub fn stats(&self) -> TagStats {
        let mut stats = TagStats::default();
        stats.extend(&self.tags);
        stats
    }

    pub fn write_to_buf(&self, mut out: impl AsMut<[u8]>) -> Result<usize> {
        let out = out.as_mut();
        let required = self.encoded_len();
        if unlikely(out.len() < required) {
            return Err(Error::OutputBufferTooSmall { size: out.len(), required });
        }
        let mut buf = BytesMut::new(out);
        for tag in &self.tags {
            buf = buf.write_many(&tag.pack());
        }
        Ok(required)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for tag in &self.tags {
            out.extend_from_slice(&tag.pack());
        }
        out
    }

    #[cfg(feature = "std")]
    pub fn write_to_stream<W: Write>(&self, writer: &mut W) -> Result<usize> {
        write_tags(GenericWriter::new(writer), self.tags.iter().copied())
    }
}

impl FromIterator<Tag> for CompressedStream {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self { tags: iter.into_iter().collect() }
    }
}

impl IntoIterator for CompressedStream {
    type Item = Tag;
    type IntoIter = alloc::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompressedStream {
    type Item = &'a Tag;
    type IntoIter = slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Compresses a pixel sequence into an ordered tag stream.
///
/// An empty input produces an empty stream.
pub fn compress(pixels: &[Pixel]) -> CompressedStream {
    let mut stream = CompressedStream::new();
    for tag in TagEncoder::new(pixels) {
        trace!("{}", tag);
        stream.push(tag);
    }
    debug!(
        "compressed {} px into {} tags ({} bytes)",
        pixels.len(),
        stream.len(),
        stream.encoded_len()
    );
    stream
}

fn write_tags<W: Writer>(mut buf: W, tags: impl Iterator<Item = Tag>) -> Result<usize> {
    let cap = buf.capacity();
    for tag in tags {
        buf = buf.write_many(&tag.pack())?;
    }
    Ok(cap.saturating_sub(buf.capacity()))
}

/// Upper bound on the packed size of `n_pixels` pixels.
#[inline]
pub const fn encode_max_len(n_pixels: usize) -> usize {
    n_pixels.saturating_mul(SSI_MAX_TAG_LEN)
}

/// Encodes raw interleaved RGB data into a caller-owned buffer.
#[inline]
pub fn encode_to_buf(buf: impl AsMut<[u8]>, data: impl AsRef<[u8]>) -> Result<usize> {
    Encoder::new(&data)?.encode_to_buf(buf)
}

/// Encodes raw interleaved RGB data into a newly allocated vector.
#[inline]
pub fn encode_to_vec(data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    Ok(Encoder::new(&data)?.encode_to_vec())
}

/// Byte-level encoder over a borrowed pixel buffer.
pub struct Encoder<'a> {
    pixels: &'a [Pixel],
}

impl<'a> Encoder<'a> {
    /// Creates an encoder over raw interleaved RGB bytes.
    #[inline]
    pub fn new(data: &'a (impl AsRef<[u8]> + ?Sized)) -> Result<Self> {
        Ok(Self::from_pixels(pixels_from_bytes(data.as_ref())?))
    }

    #[inline]
    pub const fn from_pixels(pixels: &'a [Pixel]) -> Self {
        Self { pixels }
    }

    #[inline]
    pub const fn n_pixels(&self) -> usize {
        self.pixels.len()
    }

    /// Minimum buffer size accepted by [`encode_to_buf`](Self::encode_to_buf).
    #[inline]
    pub const fn required_buf_len(&self) -> usize {
        encode_max_len(self.pixels.len())
    }

    pub fn tags(&self) -> TagEncoder<'a> {
        TagEncoder::new(self.pixels)
    }

    pub fn compress(&self) -> CompressedStream {
        compress(self.pixels)
    }

    pub fn encode_to_buf(&self, mut buf: impl AsMut<[u8]>) -> Result<usize> {
        let buf = buf.as_mut();
        let size_required = self.required_buf_len();
        if unlikely(buf.len() < size_required) {
            return Err(Error::OutputBufferTooSmall { size: buf.len(), required: size_required });
        }
        let n_written = write_tags(BytesMut::new(buf), self.tags())?;
        debug!("encoded {} px into {} bytes", self.pixels.len(), n_written);
        Ok(n_written)
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len());
        for tag in self.tags() {
            out.extend_from_slice(&tag.pack());
        }
        debug!("encoded {} px into {} bytes", self.pixels.len(), out.len());
        out
    }

    #[cfg(feature = "std")]
    pub fn encode_to_stream<W: Write>(&self, writer: &mut W) -> Result<usize> {
        write_tags(GenericWriter::new(writer), self.tags())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn px(r: u8, g: u8, b: u8) -> Pixel {
        Pixel::new(r, g, b)
    }

    fn short(d: [i16; 3]) -> Tag {
        Tag::DiffShort(ShortDelta::new(d).unwrap())
    }

    fn long(d: [i16; 3]) -> Tag {
        Tag::DiffLong(LongDelta::new(d).unwrap())
    }

    #[test]
    fn test_empty_input() {
        let stream = compress(&[]);
        assert!(stream.is_empty());
        assert_eq!(stream.encoded_len(), 0);
        assert!(stream.to_bytes().is_empty());
    }

    #[test]
    fn test_first_pixel_is_literal() {
        for p in [px(0, 0, 0), px(1, 1, 0), px(255, 0, 3)] {
            assert_eq!(compress(&[p]).tags(), &[Tag::Literal(p)]);
        }
    }

    #[test]
    fn test_run_after_literal() {
        let a = px(10, 10, 10);
        let stream = compress(&[a, a, a, px(20, 0, 0)]);
        assert_eq!(stream.tags(), &[Tag::Literal(a), Tag::Run(2), Tag::Literal(px(20, 0, 0))]);
    }

    #[test]
    fn test_two_identical_is_not_a_run() {
        let a = px(10, 10, 10);
        let stream = compress(&[a, a]);
        assert_eq!(stream.tags(), &[Tag::Literal(a), Tag::Index(a.hash_index())]);
    }

    #[test]
    fn test_run_of_three() {
        let a = px(40, 50, 60);
        assert_eq!(compress(&[a, a, a]).tags(), &[Tag::Literal(a), Tag::Run(2)]);
    }

    #[test]
    fn test_run_split_at_cap() {
        let a = px(200, 100, 50);
        let stream = compress(&vec![a; 70]);
        assert_eq!(stream.tags(), &[Tag::Literal(a), Tag::Run(62), Tag::Run(7)]);
        assert_eq!(stream.stats().pixels, 70);
    }

    #[test]
    fn test_run_remainder_of_one_uses_index() {
        let a = px(200, 100, 50);
        let stream = compress(&vec![a; 64]);
        assert_eq!(stream.tags(), &[Tag::Literal(a), Tag::Run(62), Tag::Index(a.hash_index())]);
    }

    #[test]
    fn test_diff_short_and_long() {
        let stream = compress(&[px(0, 0, 0), px(0, 0, 1), px(5, 0, 0), px(5, 0, 9)]);
        assert_eq!(
            stream.tags(),
            &[Tag::Literal(px(0, 0, 0)), short([0, 0, 1]), long([5, 0, -1]), Tag::Literal(px(5, 0, 9))]
        );
        let bytes = stream.to_bytes();
        assert_eq!(bytes[4] >> 6, 0b11);
    }

    #[test]
    fn test_diff_range_edges() {
        let base = px(100, 100, 100);
        let tags = compress(&[base, px(98, 101, 100)]).into_iter().collect::<Vec<_>>();
        assert_eq!(tags[1], short([-2, 1, 0]));
        let tags = compress(&[base, px(102, 100, 100)]).into_iter().collect::<Vec<_>>();
        assert_eq!(tags[1], long([2, 0, 0]));
        let tags = compress(&[base, px(92, 107, 100)]).into_iter().collect::<Vec<_>>();
        assert_eq!(tags[1], long([-8, 7, 0]));
        let tags = compress(&[base, px(91, 100, 100)]).into_iter().collect::<Vec<_>>();
        assert_eq!(tags[1], Tag::Literal(px(91, 100, 100)));
    }

    #[test]
    fn test_no_wrapping_deltas() {
        // 255 -> 0 is a delta of -255, not +1
        let stream = compress(&[px(255, 255, 255), px(0, 0, 0)]);
        assert_eq!(stream.tags()[1], Tag::Literal(px(0, 0, 0)));
    }

    #[test]
    fn test_index_hit() {
        let (a, b) = (px(10, 20, 30), px(200, 200, 200));
        let stream = compress(&[a, b, a]);
        assert_eq!(stream.tags(), &[Tag::Literal(a), Tag::Literal(b), Tag::Index(a.hash_index())]);
    }

    #[test]
    fn test_index_takes_priority_over_diff() {
        let (a, b) = (px(10, 10, 10), px(10, 10, 11));
        let stream = compress(&[a, b, a]);
        assert_eq!(stream.tags(), &[Tag::Literal(a), short([0, 0, 1]), Tag::Index(30)]);
    }

    #[test]
    fn test_hash_collision_falls_back() {
        // (1, 2, 3) and (3, 2, 1) share slot 6
        let (a, b) = (px(1, 2, 3), px(3, 2, 1));
        let far = px(100, 100, 100);
        let stream = compress(&[a, b, far, a]);
        assert_eq!(
            stream.tags(),
            &[Tag::Literal(a), long([2, 0, -2]), Tag::Literal(far), Tag::Literal(a)]
        );
    }

    #[test]
    fn test_cache_updated_for_every_pixel() {
        let (a, b) = (px(1, 2, 3), px(50, 60, 70));
        let pixels = [a, a, a, a, b];
        let mut enc = TagEncoder::new(&pixels);
        assert_eq!(enc.next(), Some(Tag::Literal(a)));
        assert_eq!(enc.next(), Some(Tag::Run(3)));
        assert_eq!(enc.cache().lookup(a), Some(6));
        assert_eq!(enc.position(), 4);
        assert_eq!(enc.next(), Some(Tag::Literal(b)));
        assert_eq!(enc.cache().get(b.hash_index()), Some(b));
        assert_eq!(enc.next(), None);
        assert_eq!(enc.next(), None);
    }

    #[test]
    fn test_stats() {
        let a = px(10, 10, 10);
        let stream = compress(&[a, a, a, px(11, 10, 10), px(200, 0, 0), a]);
        let stats = stream.stats();
        assert_eq!(
            stats,
            TagStats {
                literal: 2,
                run: 1,
                index: 1,
                diff_short: 1,
                diff_long: 0,
                pixels: 6,
                bytes: 4 + 1 + 1 + 4 + 1,
            }
        );
        assert_eq!(stats.tags(), stream.len());

        let mut total = TagStats::default();
        total += stats;
        total += compress(&[a]).stats();
        assert_eq!((total.literal, total.pixels, total.bytes), (3, 7, 15));
    }

    #[test]
    fn test_encode_to_buf() {
        let data = [1_u8, 2, 3, 1, 2, 3, 1, 2, 3];
        let enc = Encoder::new(&data).unwrap();
        let mut buf = vec![0xaa_u8; enc.required_buf_len()];
        let n = enc.encode_to_buf(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x0f, 1, 2, 3, 0x42]);
        assert_eq!(enc.encode_to_vec(), &buf[..n]);
        assert_eq!(enc.compress().to_bytes(), &buf[..n]);
    }

    #[test]
    fn test_encode_to_buf_too_small() {
        let data = [1_u8, 2, 3];
        let err = encode_to_buf([0_u8; 3], data).unwrap_err();
        assert!(matches!(err, Error::OutputBufferTooSmall { size: 3, required: 4 }));

        let stream = compress(&[px(1, 2, 3)]);
        let err = stream.write_to_buf([0_u8; 2]).unwrap_err();
        assert!(matches!(err, Error::OutputBufferTooSmall { size: 2, required: 4 }));
    }

    #[test]
    fn test_encode_bad_length() {
        assert!(matches!(encode_to_vec([1_u8, 2]), Err(Error::InvalidImageLength { size: 2 })));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_encode_to_stream() {
        let data = [0_u8, 0, 0, 0, 0, 1, 7, 7, 7];
        let enc = Encoder::new(&data).unwrap();
        let mut out = Vec::new();
        let n = enc.encode_to_stream(&mut out).unwrap();
        assert_eq!(n, out.len());
        assert_eq!(out, enc.encode_to_vec());

        let mut out2 = Vec::new();
        assert_eq!(enc.compress().write_to_stream(&mut out2).unwrap(), n);
        assert_eq!(out, out2);
    }
}
