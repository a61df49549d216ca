#![no_main]
use libfuzzer_sys::fuzz_target;

use qoi_ssi::{compress, encode_max_len, encode_to_vec, pixels_from_bytes, Tag};

fuzz_target!(|data: &[u8]| {
    let n_pixels = data.len() / 3;
    let data = &data[..n_pixels * 3];
    let pixels = pixels_from_bytes(data).unwrap();

    let out = encode_to_vec(data).unwrap();
    assert!(out.len() <= encode_max_len(n_pixels));

    let stream = compress(pixels);
    assert_eq!(stream.to_bytes(), out);
    assert_eq!(stream.stats().pixels, n_pixels);
    if let Some(first) = stream.tags().first() {
        assert!(matches!(first, Tag::Literal(_)));
    }
    for tag in &stream {
        match *tag {
            Tag::Run(n) => assert!((2..=62).contains(&n)),
            Tag::Index(slot) => assert!(slot < 64),
            _ => {}
        }
    }
});
