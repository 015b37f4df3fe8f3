use ffmpeg_next::{
    Packet, Rational, codec,
    format::Pixel,
    frame,
    software::scaling::Flags,
};

use crate::{
    codec::{CodecStatus, FrameEncoder},
    error::{Error, Result},
    timestamp,
};

/// Output stream configuration for [`crate::writer::VideoWriter`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    /// Frames per second; fractional rates such as 29.97 are kept to three
    /// decimals.
    pub frame_rate: f64,
    /// Target bitrate in bits per second.
    pub bit_rate: usize,
    /// Maximum distance between keyframes.
    pub gop_size: u32,
    pub pixel_format: Pixel,
    /// Resampling used when converting caller RGB frames.
    pub scaling: Flags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            frame_rate: 25.0,
            bit_rate: 4_000_000,
            gop_size: 12,
            pixel_format: Pixel::YUV420P,
            scaling: Flags::BICUBIC,
        }
    }
}

impl Settings {
    pub fn new(width: u32, height: u32, frame_rate: f64, bit_rate: usize) -> Result<Self> {
        let settings = Self {
            width,
            height,
            frame_rate,
            bit_rate,
            ..Default::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Settings("width and height must be non-zero"));
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(Error::Settings("frame rate must be a positive number"));
        }
        let millis = (self.frame_rate * 1000.0).round();
        if millis < 1.0 {
            return Err(Error::Settings("frame rate is too small"));
        }
        if millis > i32::MAX as f64 {
            return Err(Error::Settings("frame rate is too large"));
        }
        if self.gop_size == 0 {
            return Err(Error::Settings("GOP size must be non-zero"));
        }
        Ok(())
    }

    pub fn codec_time_base(&self) -> Rational {
        timestamp::codec_time_base(self.frame_rate)
    }
}

/// An opened video encoder.
pub struct Encoder {
    inner: codec::encoder::Video,
    time_base: Rational,
}

impl Encoder {
    /// Allocates, configures and opens `codec` for `settings`.
    ///
    /// `global_header` must be set when the container wants codec extradata
    /// in its header rather than in the stream (mp4, mkv, ...).
    pub fn new(codec: codec::Codec, settings: &Settings, global_header: bool) -> Result<Self> {
        let context = codec::Context::new_with_codec(codec);
        if context.as_ptr().is_null() {
            return Err(Error::Allocation("video codec context"));
        }

        let mut encoder = context.encoder().video().map_err(Error::CodecContext)?;
        encoder.set_width(settings.width);
        encoder.set_height(settings.height);
        encoder.set_format(settings.pixel_format);
        encoder.set_time_base(settings.codec_time_base());
        encoder.set_frame_rate(Some(Rational::from(settings.frame_rate)));
        encoder.set_gop(settings.gop_size);
        encoder.set_bit_rate(settings.bit_rate);
        if global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let inner = encoder.open_as(codec).map_err(Error::CodecInit)?;
        let time_base: Rational = unsafe { (*inner.as_ptr()).time_base.into() };

        log::debug!(
            "opened encoder {} for {}x{} {:?}, time base {}",
            codec.name(),
            settings.width,
            settings.height,
            settings.pixel_format,
            time_base
        );
        Ok(Self { inner, time_base })
    }

    /// The codec time base, as the opened encoder reports it.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub(crate) fn context(&self) -> &codec::encoder::Video {
        &self.inner
    }
}

impl FrameEncoder for Encoder {
    fn send_frame(&mut self, frame: Option<&frame::Video>) -> Result<CodecStatus> {
        let result = match frame {
            Some(frame) => self.inner.send_frame(frame),
            None => self.inner.send_eof(),
        };
        CodecStatus::from_ffmpeg(result).map_err(Error::Encode)
    }

    fn receive_packet(&mut self, packet: &mut Packet) -> Result<CodecStatus> {
        CodecStatus::from_ffmpeg(self.inner.receive_packet(packet)).map_err(Error::Encode)
    }
}
