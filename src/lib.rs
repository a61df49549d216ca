//! Tagged run-length / indexed-cache / delta encoder for raw RGB pixel streams.
//!
//! Each pixel (or run of repeated pixels) becomes one [`Tag`]:
//!
//! | Tag          | Bytes | Layout                                     |
//! |--------------|-------|--------------------------------------------|
//! | `Literal`    | 4     | `00001111` R G B                           |
//! | `Run`        | 1     | `01` + repeat count (2..=62)               |
//! | `Index`      | 1     | `10` + cache slot (0..=63)                 |
//! | `DiffShort`  | 1     | `11` + 3x 2-bit biased deltas in [-2, 1]   |
//! | `DiffLong`   | 2     | `0011` + 3x 4-bit biased deltas in [-8, 7] |
//!
//! The output is a bare tag stream: no header, dimensions or end marker.
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::inline_always,
    clippy::similar_names,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::cargo_common_metadata,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

extern crate alloc;

mod cache;
mod encode;
mod error;
mod pack;
mod pixel;
mod run;
mod source;
mod tag;
mod utils;

#[doc(hidden)]
pub mod consts;

pub use crate::cache::HashCache;
pub use crate::encode::{
    compress, encode_max_len, encode_to_buf, encode_to_vec, CompressedStream, Encoder, TagEncoder,
    TagStats,
};
pub use crate::error::{Error, Result};
pub use crate::pack::PackedTag;
pub use crate::pixel::Pixel;
pub use crate::run::RunDetector;
pub use crate::source::{extract_channel, pixels_from_bytes, Channel};
pub use crate::tag::{Delta, LongDelta, ShortDelta, Tag};
