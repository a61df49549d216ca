pub const SSI_OP_RGB: u8 = 0x0f; // 00001111
pub const SSI_OP_RUN: u8 = 0x40; // 01xxxxxx
pub const SSI_OP_INDEX: u8 = 0x80; // 10xxxxxx
pub const SSI_OP_DIFF_SHORT: u8 = 0xc0; // 11xxxxxx
pub const SSI_OP_DIFF_LONG: u8 = 0x30; // 0011xxxx xxxxxxxx

pub const SSI_MASK_2: u8 = 0xc0;
pub const SSI_MASK_4: u8 = 0xf0;

pub const SSI_INDEX_SIZE: usize = 64;

pub const SSI_RUN_MIN: u8 = 2;
pub const SSI_RUN_MAX: u8 = 62;

pub const SSI_DIFF_SHORT_BITS: u32 = 2;
pub const SSI_DIFF_LONG_BITS: u32 = 4;

/// Largest byte group emitted for a single tag (`SSI_OP_RGB` + 3 channels).
pub const SSI_MAX_TAG_LEN: usize = 4;
