use ffmpeg_next::{Packet, codec, frame};

use crate::{
    codec::{CodecStatus, FrameDecoder},
    error::{Error, Result},
    stream::AvStream,
};

/// An opened video decoder bound to one stream.
pub struct Decoder {
    inner: codec::decoder::Video,
}

impl Decoder {
    pub fn new(stream: &AvStream) -> Result<Self> {
        let codec_id = stream.codec_id();
        let codec = ffmpeg_next::decoder::find(codec_id).ok_or(Error::UnsupportedCodec(codec_id))?;

        let mut context = codec::Context::from_parameters(stream.parameters().clone())
            .map_err(Error::CodecInit)?;
        // packets reach the decoder in stream time base
        unsafe {
            (*context.as_mut_ptr()).pkt_timebase = stream.time_base().into();
        }

        let inner = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(Error::CodecInit)?;

        log::debug!(
            "opened decoder {} for {}x{} {:?}",
            codec.name(),
            inner.width(),
            inner.height(),
            inner.format()
        );
        Ok(Self { inner })
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }
}

impl FrameDecoder for Decoder {
    fn send_packet(&mut self, packet: &Packet) -> Result<CodecStatus> {
        CodecStatus::from_ffmpeg(self.inner.send_packet(packet)).map_err(Error::Decode)
    }

    fn send_eof(&mut self) -> Result<CodecStatus> {
        CodecStatus::from_ffmpeg(self.inner.send_eof()).map_err(Error::Decode)
    }

    fn receive_frame(&mut self, frame: &mut frame::Video) -> Result<CodecStatus> {
        CodecStatus::from_ffmpeg(self.inner.receive_frame(frame)).map_err(Error::Decode)
    }

    fn flush(&mut self) {
        self.inner.flush();
    }
}
