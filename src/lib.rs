//! Sequential video decoding to RGB and encoding from RGB on top of FFmpeg.
//!
//! [`VideoReader`] pulls decoded frames out of a file and can seek to an
//! exact timestamp; [`VideoWriter`] pushes frames into a new file and
//! finalizes it. Both are thin shells around the pumps in [`pump`], which
//! drive FFmpeg's send/receive codec protocol.

/// Registers FFmpeg components. Call once at startup.
pub fn init() -> Result<()> {
    ffmpeg_next::init().map_err(Error::Init)
}

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod input;
pub mod metadata;
pub mod output;
pub mod pump;
pub mod reader;
pub mod scaler;
pub mod stream;
pub mod timestamp;
pub mod writer;

#[cfg(test)]
mod test_util;

pub use encoder::Settings;
pub use error::{Error, Result};
pub use frame::FrameInfo;
pub use reader::VideoReader;
pub use writer::VideoWriter;
