#![allow(dead_code)]

use qoi_ssi::consts::{
    SSI_INDEX_SIZE, SSI_MASK_2, SSI_MASK_4, SSI_OP_DIFF_LONG, SSI_OP_DIFF_SHORT, SSI_OP_INDEX,
    SSI_OP_RGB, SSI_OP_RUN,
};
use qoi_ssi::Pixel;

/// Minimal decoder used to check that encoded streams round-trip.
pub fn decode(data: &[u8]) -> anyhow::Result<Vec<Pixel>> {
    let mut index = [None::<Pixel>; SSI_INDEX_SIZE];
    let mut prev = None::<Pixel>;
    let mut out = vec![];
    let mut bytes = data.iter().copied();

    let unbias = |v: u8, bits: u32| i16::from(v) - (1 << (bits - 1));
    let add = |p: Pixel, d: [i16; 3]| {
        Pixel::new(
            (i16::from(p.r()) + d[0]) as u8,
            (i16::from(p.g()) + d[1]) as u8,
            (i16::from(p.b()) + d[2]) as u8,
        )
    };

    while let Some(b1) = bytes.next() {
        let px = if b1 == SSI_OP_RGB {
            let mut rgb = [0; 3];
            for c in &mut rgb {
                *c = bytes.next().ok_or_else(|| anyhow::anyhow!("truncated RGB tag"))?;
            }
            Pixel::from(rgb)
        } else if b1 & SSI_MASK_4 == SSI_OP_DIFF_LONG {
            let p = prev.ok_or_else(|| anyhow::anyhow!("DIFF_LONG without previous pixel"))?;
            let b2 = bytes.next().ok_or_else(|| anyhow::anyhow!("truncated DIFF_LONG tag"))?;
            add(p, [unbias(b1 & 0x0f, 4), unbias(b2 >> 4, 4), unbias(b2 & 0x0f, 4)])
        } else {
            match b1 & SSI_MASK_2 {
                SSI_OP_RUN => {
                    let p = prev.ok_or_else(|| anyhow::anyhow!("RUN without previous pixel"))?;
                    let n = usize::from(b1 & 0x3f);
                    anyhow::ensure!((2..=62).contains(&n), "invalid run length: {}", n);
                    out.extend(std::iter::repeat(p).take(n));
                    continue;
                }
                SSI_OP_INDEX => {
                    let slot = usize::from(b1 & 0x3f);
                    index[slot].ok_or_else(|| anyhow::anyhow!("empty cache slot: {}", slot))?
                }
                SSI_OP_DIFF_SHORT => {
                    let p = prev.ok_or_else(|| anyhow::anyhow!("DIFF_SHORT without previous pixel"))?;
                    add(p, [unbias((b1 >> 4) & 3, 2), unbias((b1 >> 2) & 3, 2), unbias(b1 & 3, 2)])
                }
                _ => anyhow::bail!("invalid tag byte: {:08b}", b1),
            }
        };
        index[usize::from(px.hash_index())] = Some(px);
        prev = Some(px);
        out.push(px);
    }
    Ok(out)
}

pub fn to_pixels(data: &[u8]) -> Vec<Pixel> {
    data.chunks_exact(3).map(|c| Pixel::new(c[0], c[1], c[2])).collect()
}
