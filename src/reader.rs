use std::path::Path;

use ffmpeg_next::{format::Pixel, software::scaling::Flags};

use crate::{
    decoder::Decoder,
    error::{Error, Result},
    frame::{self, FrameInfo},
    input::AvInput,
    pump::{DecodePump, best_effort_timestamp},
    scaler::{Geometry, Scaler},
    stream::AvStream,
};

/// Sequential RGB access to the first video stream of a file.
///
/// ```ignore
/// let mut reader = VideoReader::open("input.mp4")?;
/// let mut rgb = vec![0u8; reader.width() as usize * reader.height() as usize * 3];
/// while let Some(info) = reader.next_frame(&mut rgb)? {
///     println!("{}", info);
/// }
/// ```
pub struct VideoReader {
    pump: DecodePump<AvInput, Decoder>,
    stream: AvStream,
    duration: Option<i64>,
    converter: RgbConverter,
}

impl VideoReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let input = AvInput::open(path)?;
        let stream = input.video_stream().clone();
        let decoder = Decoder::new(&stream)?;
        let duration = stream.duration_micros().or_else(|| input.duration());

        log::info!(
            "opened {} ({}): {}x{} {:?}, {:.3} fps, {:?}",
            path.display(),
            input.format_name(),
            decoder.width(),
            decoder.height(),
            stream.codec_id(),
            stream.fps(),
            duration
        );

        let pump = DecodePump::new(input, decoder, stream.index(), stream.time_base());
        Ok(Self {
            pump,
            stream,
            duration,
            converter: RgbConverter::new(Flags::BICUBIC),
        })
    }

    pub fn width(&self) -> u32 {
        self.pump.decoder().width()
    }

    pub fn height(&self) -> u32 {
        self.pump.decoder().height()
    }

    /// Frame rate guessed from the container and codec.
    pub fn fps(&self) -> f64 {
        self.stream.fps()
    }

    /// Stream bitrate in bits per second; 0 if the container doesn't say.
    pub fn bitrate(&self) -> i64 {
        self.stream.bit_rate()
    }

    /// Duration in microseconds: the stream's if known, else the container's,
    /// else 0.
    pub fn total_duration(&self) -> i64 {
        self.duration.unwrap_or(0)
    }

    /// Decodes the next frame into `rgb` as packed RGB24.
    ///
    /// `rgb` must hold exactly `width * height * 3` bytes of the decoded
    /// frame. Returns `Ok(None)` at end of stream.
    pub fn next_frame(&mut self, rgb: &mut [u8]) -> Result<Option<FrameInfo>> {
        let time_base = self.pump.time_base();
        let Some(decoded) = self.pump.next_frame()? else {
            return Ok(None);
        };

        let converted = self.converter.frame_to_rgb(decoded, rgb);
        let info = FrameInfo {
            width: decoded.width(),
            height: decoded.height(),
            pts: best_effort_timestamp(decoded, time_base),
        };
        if let Err(err) = converted {
            // keep the frame so a retry with a fitting buffer gets it
            self.pump.hold();
            return Err(err);
        }
        Ok(Some(info))
    }

    /// Positions the reader on the first frame at or after `timestamp`
    /// microseconds, which the next [`next_frame`](Self::next_frame) returns.
    ///
    /// Returns `false` if the container can't seek or the stream ends first.
    pub fn seek_to_timestamp(&mut self, timestamp: i64) -> Result<bool> {
        self.pump.seek(timestamp)
    }
}

/// Converts decoded frames of any format to packed RGB24 at their own size.
pub struct RgbConverter {
    scaler: Option<Scaler>,
    scaling: Flags,
    rgb: ffmpeg_next::frame::Video,
}

impl RgbConverter {
    pub fn new(scaling: Flags) -> Self {
        Self {
            scaler: None,
            scaling,
            rgb: ffmpeg_next::frame::Video::empty(),
        }
    }

    /// Writes `decoded` into `out`, which must be exactly
    /// `width * height * 3` bytes. The scaler is rebuilt whenever the
    /// source geometry changes.
    pub fn frame_to_rgb(
        &mut self,
        decoded: &ffmpeg_next::frame::Video,
        out: &mut [u8],
    ) -> Result<()> {
        let src = Geometry::of(decoded);
        let dst = Geometry::new(Pixel::RGB24, src.width, src.height);
        // check before converting, so a bad buffer costs nothing
        let expected = frame::rgb_len(dst.width, dst.height);
        if out.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: out.len(),
            });
        }

        if Geometry::of(&self.rgb) != dst {
            self.rgb = frame::alloc_video(dst.format, dst.width, dst.height)?;
        }
        Scaler::cached(&mut self.scaler, src, dst, self.scaling)?.run(decoded, &mut self.rgb)?;
        frame::pack_rgb(&self.rgb, out)
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod reader_test;
