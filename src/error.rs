use std::path::PathBuf;

use ffmpeg_next::codec;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the decode and encode sessions.
///
/// End of stream is never an error: it is reported as `Ok(None)` or
/// `Ok(false)` by the operations that can reach it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("couldn't initialize FFmpeg: {0}")]
    Init(#[source] ffmpeg_next::Error),
    #[error("couldn't open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("couldn't retrieve stream information: {0}")]
    Probe(#[source] ffmpeg_next::Error),
    #[error("couldn't find a video stream")]
    NoVideoStream,
    #[error("unsupported video codec: {0:?}")]
    UnsupportedCodec(codec::Id),
    #[error("couldn't open video codec: {0}")]
    CodecInit(#[source] ffmpeg_next::Error),
    #[error("couldn't allocate {0}")]
    Allocation(&'static str),
    #[error("seek failed: {0}")]
    Seek(#[source] ffmpeg_next::Error),
    #[error("couldn't read packet: {0}")]
    Read(#[source] ffmpeg_next::Error),
    #[error("decode failed: {0}")]
    Decode(#[source] ffmpeg_next::Error),
    #[error("encode failed: {0}")]
    Encode(#[source] ffmpeg_next::Error),
    #[error("pixel conversion failed: {0}")]
    Conversion(#[source] ffmpeg_next::Error),
    #[error("rgb buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("couldn't write packet: {0}")]
    Write(#[source] ffmpeg_next::Error),
    #[error("couldn't write trailer: {0}")]
    Finalize(#[source] ffmpeg_next::Error),
    #[error("couldn't allocate output format context for {path}: {source}")]
    OutputContext {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("couldn't create output file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("no encoder found for {0:?}")]
    EncoderNotFound(codec::Id),
    #[error("couldn't create output stream: {0}")]
    StreamCreate(#[source] ffmpeg_next::Error),
    #[error("couldn't allocate video codec context: {0}")]
    CodecContext(#[source] ffmpeg_next::Error),
    #[error("couldn't copy codec parameters to stream: {0}")]
    ParameterCopy(#[source] ffmpeg_next::Error),
    #[error("couldn't write format header: {0}")]
    WriteHeader(#[source] ffmpeg_next::Error),
    #[error("invalid encoder settings: {0}")]
    Settings(&'static str),
    #[error("encoder already finalized")]
    Finalized,
}
