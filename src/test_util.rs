use std::path::Path;

use crate::{encoder::Settings, error::Result, frame::rgb_len, writer::VideoWriter};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
    crate::init().unwrap();
}

/// A picture that changes every frame so the encoder has real motion to
/// code: a diagonal gradient scrolling one pixel per frame.
pub fn pattern(width: u32, height: u32, index: u64) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgb_len(width, height));
    for y in 0..height as u64 {
        for x in 0..width as u64 {
            let v = x + y + index;
            rgb.extend_from_slice(&[v as u8, (v * 2) as u8, (255 - v % 256) as u8]);
        }
    }
    rgb
}

/// Writes `frames` pattern frames to `path` with one keyframe every `gop`
/// frames.
pub fn synthesize(
    path: &Path,
    width: u32,
    height: u32,
    fps: f64,
    frames: u64,
    gop: u32,
) -> Result<()> {
    let settings = Settings {
        gop_size: gop,
        ..Settings::new(width, height, fps, 1_000_000)?
    };
    let mut writer = VideoWriter::open_with(path, settings)?;
    for i in 0..frames {
        writer.encode_frame(&pattern(width, height, i), width, height)?;
    }
    writer.finalize()
}
