//! Media file metadata (similar to ffprobe).

use std::fmt;
use std::path::Path;

use crate::{
    error::{Error, Result},
    stream::AvStream,
    timestamp,
};

/// Format-level info (corresponds to ffprobe format).
#[derive(Debug, Clone)]
pub struct FormatInfo {
    /// Format name, e.g. "mov,mp4,m4a,3gp,3g2,mj2"
    pub format_name: String,
    /// Duration in microseconds; None if unknown (e.g. raw h264).
    pub duration: Option<i64>,
    /// Total bitrate in bps; 0 if unknown.
    pub bit_rate: i64,
    pub nb_streams: u32,
}

/// Per-stream info (corresponds to ffprobe stream).
#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub index: usize,
    /// "video", "audio", "subtitle", ...
    pub codec_type: String,
    /// Codec name, e.g. "h264"
    pub codec_name: String,
    /// Time base, e.g. "1/15360"
    pub time_base: String,
    /// Stream duration in microseconds; None if unknown.
    pub duration: Option<i64>,
    /// Guessed frame rate, e.g. "30/1"
    pub rate: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Packets demuxed for this stream. For video this is the frame count
    /// (ffprobe -count_packets).
    pub frames: u64,
}

/// Full probe result (format + streams, like ffprobe).
#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub format: FormatInfo,
    pub streams: Vec<StreamInfo>,
}

impl MediaInfo {
    /// The first video stream, the one [`crate::reader::VideoReader`] decodes.
    pub fn video(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.codec_type == "video")
    }
}

impl fmt::Display for MediaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[FORMAT]")?;
        writeln!(f, "format_name={}", self.format.format_name)?;
        match self.format.duration {
            Some(d) => writeln!(f, "duration={:.6}", d as f64 / 1_000_000.0)?,
            None => writeln!(f, "duration=N/A")?,
        }
        writeln!(f, "bit_rate={}", self.format.bit_rate)?;
        writeln!(f, "nb_streams={}", self.format.nb_streams)?;
        writeln!(f, "[/FORMAT]")?;
        for s in &self.streams {
            writeln!(f, "[STREAM]")?;
            writeln!(f, "index={}", s.index)?;
            writeln!(f, "codec_type={}", s.codec_type)?;
            writeln!(f, "codec_name={}", s.codec_name)?;
            writeln!(f, "time_base={}", s.time_base)?;
            if let Some(d) = s.duration {
                writeln!(f, "duration={:.6}", d as f64 / 1_000_000.0)?;
            }
            writeln!(f, "rate={}", s.rate)?;
            if let (Some(w), Some(h)) = (s.width, s.height) {
                writeln!(f, "width={}", w)?;
                writeln!(f, "height={}", h)?;
            }
            writeln!(f, "nb_read_packets={}", s.frames)?;
            writeln!(f, "[/STREAM]")?;
        }
        Ok(())
    }
}

/// Opens a file and returns its metadata, demuxing it once to count packets.
///
/// ```ignore
/// let info = ffmpeg_pump::metadata::probe("input.mp4")?;
/// println!("{}", info);
/// ```
pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    let path = path.as_ref();
    let mut input = ffmpeg_next::format::input(&path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let format_name = input.format().name().to_string();
    let nb_streams = input.nb_streams();
    let bit_rate = input.bit_rate();
    let duration = timestamp::valid(input.duration()).filter(|d| *d > 0);

    let mut streams: Vec<StreamInfo> = input
        .streams()
        .map(|stream| {
            let av_stream = AvStream::from(stream);
            let params = av_stream.parameters();
            let time_base = av_stream.time_base();
            let rate = av_stream.rate();
            let (width, height) = if av_stream.is_video() {
                (Some(av_stream.width()), Some(av_stream.height()))
            } else {
                (None, None)
            };

            StreamInfo {
                index: av_stream.index(),
                codec_type: format!("{:?}", params.medium()).to_lowercase(),
                codec_name: format!("{:?}", params.id()).to_lowercase(),
                time_base: format!("{}/{}", time_base.numerator(), time_base.denominator()),
                duration: av_stream.duration_micros(),
                rate: format!("{}/{}", rate.numerator(), rate.denominator()),
                width,
                height,
                frames: 0,
            }
        })
        .collect();

    for (stream, _) in input.packets() {
        if let Some(info) = streams.get_mut(stream.index()) {
            info.frames += 1;
        }
    }

    Ok(MediaInfo {
        format: FormatInfo {
            format_name,
            duration,
            bit_rate,
            nb_streams,
        },
        streams,
    })
}
