use std::cmp::Ordering;
use std::fs::{self, File};
use std::hint::black_box;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, ensure, Context, Result};
use bytemuck::cast_slice;
use log::{debug, info};
use qoi_ssi::{Encoder, TagStats};
use structopt::StructOpt;
use walkdir::{DirEntry, WalkDir};

fn timeit<T>(func: impl Fn() -> T) -> (T, Duration) {
    let t0 = Instant::now();
    let out = func();
    let t1 = Instant::now();
    (black_box(out), t1 - t0)
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

fn find_pngs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let is_png_file = |path: &PathBuf| {
        path.is_file()
            && path.extension().unwrap_or_default().to_string_lossy().to_ascii_lowercase() == "png"
    };

    let mut out = vec![];
    for path in paths {
        if is_png_file(path) {
            out.push(path.clone());
        } else if path.is_dir() {
            out.extend(
                WalkDir::new(path)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(Result::ok)
                    .map(DirEntry::into_path)
                    .filter(is_png_file),
            )
        } else {
            bail!("path doesn't exist: {}", path.to_string_lossy());
        }
    }
    out.sort_unstable();
    Ok(out)
}

fn grayscale_to_rgb(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() * 3);
    for &px in buf {
        for _ in 0..3 {
            out.push(px);
        }
    }
    out
}

fn grayscale_alpha_to_rgb(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() / 2 * 3);
    for &px in cast_slice::<_, [u8; 2]>(buf) {
        for _ in 0..3 {
            out.push(px[0]);
        }
    }
    out
}

fn rgba_to_rgb(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() / 4 * 3);
    for px in cast_slice::<_, [u8; 4]>(buf) {
        out.extend_from_slice(&px[..3]);
    }
    out
}

struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    fn read_png(filename: &Path) -> Result<Self> {
        let mut decoder = png::Decoder::new(File::open(filename)?);
        let transformations = png::Transformations::normalize_to_color8();
        decoder.set_transformations(transformations);
        let mut reader = decoder.read_info()?;
        let mut whole_buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut whole_buf)?;
        let buf = &whole_buf[..info.buffer_size()];
        ensure!(info.bit_depth == png::BitDepth::Eight, "invalid bit depth: {:?}", info.bit_depth);
        // alpha is dropped, only the three colour channels are encoded
        let data = match info.color_type {
            png::ColorType::Grayscale => grayscale_to_rgb(buf),
            png::ColorType::GrayscaleAlpha => grayscale_alpha_to_rgb(buf),
            png::ColorType::Rgba => rgba_to_rgb(buf),
            png::ColorType::Rgb => buf.to_vec(),
            color_type => bail!("unsupported color type: {:?}", color_type),
        };
        Ok(Self { width: info.width, height: info.height, data })
    }

    pub const fn n_pixels(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub const fn n_bytes(&self) -> usize {
        self.n_pixels() * 3
    }
}

struct ImageBench {
    encode_sec: Vec<f64>,
    stats: TagStats,
    n_pixels: usize,
    n_bytes: usize,
}

impl ImageBench {
    pub fn run(img: &Image, sec_allowed: f64) -> Result<Self> {
        let encoder = Encoder::new(&img.data)?;
        let (stream, t_encode) = timeit(|| encoder.compress());
        let encoded = stream.to_bytes();
        ensure!(encoded == encoder.encode_to_vec(), "tag stream and byte encoder disagree");

        let n_encode = (sec_allowed / t_encode.as_secs_f64().max(1e-9)).max(2.).ceil() as usize;
        debug!("timing {} encode iterations", n_encode);
        let mut encode_sec: Vec<f64> =
            (0..n_encode).map(|_| timeit(|| encoder.encode_to_vec()).1.as_secs_f64()).collect();
        encode_sec.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        Ok(Self { encode_sec, stats: stream.stats(), n_pixels: img.n_pixels(), n_bytes: img.n_bytes() })
    }

    pub fn average_encode_sec(&self, use_median: bool) -> f64 {
        if use_median {
            self.encode_sec[self.encode_sec.len() / 2]
        } else {
            mean(&self.encode_sec)
        }
    }

    pub fn ratio(&self) -> f64 {
        self.stats.bytes as f64 / self.n_bytes as f64
    }

    pub fn report(&self, use_median: bool) {
        let encode_sec = self.average_encode_sec(use_median);
        let mpixels = self.n_pixels as f64 / 1e6;
        let mbytes = self.n_bytes as f64 / 1024. / 1024.;
        println!(
            "  encode: {:.2} ms, {:.1} Mp/s, {:.1} MB/s; ratio: {:.3} ({} -> {} bytes)",
            encode_sec * 1e3,
            mpixels / encode_sec,
            mbytes / encode_sec,
            self.ratio(),
            self.n_bytes,
            self.stats.bytes
        );
        println!("  tags: {}", self.stats);
    }
}

fn dump_tags(img: &Image, limit: usize) -> Result<()> {
    for (i, tag) in Encoder::new(&img.data)?.tags().take(limit).enumerate() {
        println!("{:>8}  {:<32} {:b}", i, tag.to_string(), tag.pack());
    }
    Ok(())
}

fn bench_png(filename: &Path, args: &Args) -> Result<ImageBench> {
    let f = filename.to_string_lossy();
    let img = Image::read_png(filename).context(format!("error reading PNG file: {}", f))?;
    let size_png_kb = fs::metadata(filename)?.len() / 1024;
    let size_mb_raw = img.n_bytes() as f64 / 1024. / 1024.;
    let mpixels = img.n_pixels() as f64 / 1e6;
    println!(
        "{} ({}x{}, {} KB png, {:.2} MB raw, {:.2} MP)",
        f, img.width, img.height, size_png_kb, size_mb_raw, mpixels
    );
    if args.dump {
        dump_tags(&img, args.limit)?;
    }
    let bench = ImageBench::run(&img, args.seconds)?;
    bench.report(!args.average);
    Ok(bench)
}

fn report_totals(results: &[ImageBench], use_median: bool) {
    let mut stats = TagStats::default();
    let (mut encode_sec, mut n_pixels, mut n_bytes) = (0., 0, 0);
    for r in results {
        // sum of medians is not the median of sums, but good enough here
        encode_sec += r.average_encode_sec(use_median);
        n_pixels += r.n_pixels;
        n_bytes += r.n_bytes;
        stats += r.stats;
    }
    let mpixels = n_pixels as f64 / 1e6;
    let mbytes = n_bytes as f64 / 1024. / 1024.;
    println!("---");
    println!(
        "Overall results: ({} images, {:.2} MB raw, {:.2} MP):",
        results.len(),
        mbytes,
        mpixels
    );
    println!(
        "  encode: {:.1} Mp/s, {:.1} MB/s; ratio: {:.3}",
        mpixels / encode_sec,
        mbytes / encode_sec,
        stats.bytes as f64 / n_bytes as f64
    );
    println!("  tags: {}", stats);
}

#[derive(Debug, StructOpt)]
struct Args {
    /// Files or directories containing png images.
    #[structopt(parse(from_os_str))]
    paths: Vec<PathBuf>,
    /// Number of seconds allocated for timing each image.
    #[structopt(short, long, default_value = "1")]
    seconds: f64,
    /// Use average (mean) instead of the median.
    #[structopt(short, long)]
    average: bool,
    /// Print every emitted tag with its bit layout.
    #[structopt(long)]
    dump: bool,
    /// Maximum number of tags printed per image with --dump.
    #[structopt(long, default_value = "256")]
    limit: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = <Args as StructOpt>::from_args();
    ensure!(!args.paths.is_empty(), "no input paths given");
    let files = find_pngs(&args.paths)?;
    ensure!(!files.is_empty(), "no PNG files found in given paths");
    info!("found {} PNG files", files.len());

    let mut results = vec![];
    for file in &files {
        match bench_png(file, &args) {
            Ok(res) => results.push(res),
            Err(err) => eprintln!("{:?}", err),
        }
    }
    if results.len() > 1 {
        report_totals(&results, !args.average);
    }
    Ok(())
}
