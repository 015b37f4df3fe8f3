use ffmpeg_next::{Rational, codec::Parameters, format::stream};

use crate::timestamp;

/// Snapshot of the selected video stream's metadata, taken once when the
/// container is opened.
pub struct AvStream {
    index: usize,
    parameters: Parameters,
    time_base: Rational,
    rate: Rational,
    duration: Option<i64>,
}

impl AvStream {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Frame rate guessed from the container and codec, like `av_guess_frame_rate`.
    pub fn rate(&self) -> Rational {
        self.rate
    }

    pub fn is_video(&self) -> bool {
        self.parameters.medium() == ffmpeg_next::media::Type::Video
    }

    pub fn codec_id(&self) -> ffmpeg_next::codec::Id {
        self.parameters.id()
    }

    pub fn width(&self) -> u32 {
        unsafe {
            let ptr = self.parameters.as_ptr() as *const ffmpeg_next::ffi::AVCodecParameters;
            (*ptr).width.max(0) as u32
        }
    }

    pub fn height(&self) -> u32 {
        unsafe {
            let ptr = self.parameters.as_ptr() as *const ffmpeg_next::ffi::AVCodecParameters;
            (*ptr).height.max(0) as u32
        }
    }

    /// Bitrate in bits per second; 0 if unknown.
    pub fn bit_rate(&self) -> i64 {
        unsafe {
            let ptr = self.parameters.as_ptr() as *const ffmpeg_next::ffi::AVCodecParameters;
            (*ptr).bit_rate
        }
    }

    pub fn fps(&self) -> f64 {
        if self.rate.denominator() == 0 {
            return 0.0;
        }
        f64::from(self.rate)
    }

    /// Duration in microseconds, if known.
    pub fn duration_micros(&self) -> Option<i64> {
        self.duration.map(|d| timestamp::to_micros(d, self.time_base))
    }
}

impl AvStream {
    /// Captures `stream`, using `rate` as the frame rate. Callers that own
    /// the format context pass the `av_guess_frame_rate` result.
    pub fn with_rate(stream: &stream::Stream<'_>, rate: Rational) -> Self {
        Self {
            index: stream.index(),
            parameters: stream.parameters(),
            time_base: stream.time_base(),
            rate,
            duration: timestamp::valid(stream.duration()).filter(|d| *d >= 0),
        }
    }
}

impl From<stream::Stream<'_>> for AvStream {
    fn from(stream: stream::Stream<'_>) -> Self {
        let rate = stream.avg_frame_rate();
        Self::with_rate(&stream, rate)
    }
}

impl Clone for AvStream {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            parameters: self.parameters.clone(),
            time_base: self.time_base,
            rate: self.rate,
            duration: self.duration,
        }
    }
}
