use crate::consts::SSI_INDEX_SIZE;
use crate::pixel::Pixel;

/// Direct-mapped cache of recently seen pixels, keyed by [`Pixel::hash_index`].
///
/// Every slot starts out empty. A slot, once occupied, always holds the most
/// recently inserted pixel that hashed to it. The cache carries positional
/// history of one pixel sequence, so each compression run (or independently
/// encoded tile) must own a fresh instance.
#[derive(Clone, Debug)]
pub struct HashCache {
    slots: [Option<Pixel>; SSI_INDEX_SIZE],
}

impl Default for HashCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HashCache {
    pub const SIZE: usize = SSI_INDEX_SIZE;

    #[inline]
    pub const fn new() -> Self {
        Self { slots: [None; SSI_INDEX_SIZE] }
    }

    #[inline]
    pub const fn hash(px: Pixel) -> u8 {
        px.hash_index()
    }

    /// Returns the slot only if it is occupied by a pixel equal to `px`.
    ///
    /// Two distinct pixels may share a slot; a hash match alone is not a hit.
    #[inline]
    pub fn lookup(&self, px: Pixel) -> Option<u8> {
        let slot = Self::hash(px);
        match self.slots[usize::from(slot)] {
            Some(cached) if cached == px => Some(slot),
            _ => None,
        }
    }

    /// Overwrites the slot for `px` unconditionally.
    #[inline]
    pub fn insert(&mut self, px: Pixel) {
        self.slots[usize::from(Self::hash(px))] = Some(px);
    }

    #[inline]
    pub fn get(&self, slot: u8) -> Option<Pixel> {
        self.slots.get(usize::from(slot)).copied().flatten()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
