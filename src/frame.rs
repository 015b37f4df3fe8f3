use std::fmt::{Display, Formatter};

use ffmpeg_next::{format::Pixel, frame};

use crate::error::{Error, Result};

/// What [`crate::reader::VideoReader::next_frame`] reports about the frame it
/// wrote into the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    /// Best-effort presentation timestamp in microseconds.
    pub pts: Option<i64>,
}

impl Display for FrameInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.pts {
            Some(pts) => write!(f, "{}x{} @ {}us", self.width, self.height, pts),
            None => write!(f, "{}x{} @ N/A", self.width, self.height),
        }
    }
}

/// Size in bytes of a packed RGB24 picture.
pub fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn check_len(width: u32, height: u32, actual: usize) -> Result<usize> {
    let expected = rgb_len(width, height);
    if actual != expected {
        return Err(Error::BufferSize { expected, actual });
    }
    Ok(expected)
}

/// Copies an RGB24 frame into a tightly packed buffer, dropping the
/// per-row padding FFmpeg adds to line sizes.
pub fn pack_rgb(frame: &frame::Video, out: &mut [u8]) -> Result<()> {
    debug_assert_eq!(frame.format(), Pixel::RGB24);
    check_len(frame.width(), frame.height(), out.len())?;
    let row = frame.width() as usize * 3;
    if row == 0 {
        return Ok(());
    }
    let stride = frame.stride(0);
    let data = frame.data(0);
    for (y, dst) in out.chunks_exact_mut(row).enumerate() {
        dst.copy_from_slice(&data[y * stride..y * stride + row]);
    }
    Ok(())
}

/// Inverse of [`pack_rgb`]: spreads a packed buffer over an RGB24 frame.
pub fn unpack_rgb(rgb: &[u8], frame: &mut frame::Video) -> Result<()> {
    debug_assert_eq!(frame.format(), Pixel::RGB24);
    check_len(frame.width(), frame.height(), rgb.len())?;
    let row = frame.width() as usize * 3;
    if row == 0 {
        return Ok(());
    }
    let stride = frame.stride(0);
    let data = frame.data_mut(0);
    for (y, src) in rgb.chunks_exact(row).enumerate() {
        data[y * stride..y * stride + row].copy_from_slice(src);
    }
    Ok(())
}

/// Allocates a frame with its buffers, reporting allocation failure instead
/// of handing back a frame without planes.
pub fn alloc_video(format: Pixel, width: u32, height: u32) -> Result<frame::Video> {
    let frame = frame::Video::new(format, width, height);
    let has_data = unsafe { !(*frame.as_ptr()).data[0].is_null() };
    if !has_data {
        return Err(Error::Allocation("video frame buffer"));
    }
    Ok(frame)
}
