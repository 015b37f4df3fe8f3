//! Codec capability seams.
//!
//! The pumps in [`crate::pump`] only talk to these traits. The FFmpeg-backed
//! implementations live in [`crate::input`], [`crate::decoder`],
//! [`crate::encoder`] and [`crate::output`].

use ffmpeg_next::{Packet, frame};

use crate::error::Result;

/// Outcome of one send or receive call against a codec.
///
/// `WouldBlock` and `EndOfStream` are ordinary steady-state answers, hard
/// failures travel as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecStatus {
    /// The input was consumed, or an output unit was produced.
    Accepted,
    /// The codec wants the other side of the negotiation serviced first.
    WouldBlock,
    /// The codec has been fully drained.
    EndOfStream,
}

impl CodecStatus {
    /// Splits an FFmpeg send/receive result into a status or a hard error.
    pub fn from_ffmpeg(
        result: std::result::Result<(), ffmpeg_next::Error>,
    ) -> std::result::Result<Self, ffmpeg_next::Error> {
        match result {
            Ok(()) => Ok(CodecStatus::Accepted),
            Err(ffmpeg_next::Error::Eof) => Ok(CodecStatus::EndOfStream),
            Err(ffmpeg_next::Error::Other { errno })
                if errno == ffmpeg_next::util::error::EAGAIN =>
            {
                Ok(CodecStatus::WouldBlock)
            }
            Err(err) => Err(err),
        }
    }
}

/// A demuxer handing out packets of every stream in container order.
pub trait PacketSource {
    /// Reads the next packet, `None` once the container is exhausted.
    fn read_packet(&mut self) -> Result<Option<Packet>>;

    /// Seeks `stream_index` to the nearest keyframe at or before `timestamp`
    /// (in that stream's time base).
    fn seek_keyframe(&mut self, stream_index: usize, timestamp: i64) -> Result<()>;
}

pub trait FrameDecoder {
    fn send_packet(&mut self, packet: &Packet) -> Result<CodecStatus>;

    /// Signals end of input; the decoder starts returning its buffered frames.
    fn send_eof(&mut self) -> Result<CodecStatus>;

    fn receive_frame(&mut self, frame: &mut frame::Video) -> Result<CodecStatus>;

    /// Drops every buffered packet and frame, used before a seek.
    fn flush(&mut self);
}

pub trait FrameEncoder {
    /// Sends a frame, or the flush signal when `frame` is `None`.
    fn send_frame(&mut self, frame: Option<&frame::Video>) -> Result<CodecStatus>;

    fn receive_packet(&mut self, packet: &mut Packet) -> Result<CodecStatus>;
}

/// A muxer accepting encoded packets for a single stream.
pub trait PacketSink {
    fn write_packet(&mut self, packet: &mut Packet) -> Result<()>;

    fn write_trailer(&mut self) -> Result<()>;
}
