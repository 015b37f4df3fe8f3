use ffmpeg_next::{Packet, Rational, Rescale, frame};

use crate::{
    codec::{CodecStatus, FrameEncoder, PacketSink},
    error::{Error, Result},
};

/// Push-based frame → packet pump.
///
/// Stamps every submitted frame from a logical frame counter, negotiates
/// with the encoder until the frame is accepted, and writes every packet the
/// encoder hands back to the sink. [`finalize`](Self::finalize) flushes the
/// encoder and writes the trailer exactly once.
pub struct EncodePump<E, W> {
    encoder: E,
    sink: W,
    codec_time_base: Rational,
    stream_time_base: Rational,
    frame_count: i64,
    packet_count: u64,
    finalized: bool,
}

impl<E: FrameEncoder, W: PacketSink> EncodePump<E, W> {
    pub fn new(encoder: E, sink: W, codec_time_base: Rational, stream_time_base: Rational) -> Self {
        Self {
            encoder,
            sink,
            codec_time_base,
            stream_time_base,
            frame_count: 0,
            packet_count: 0,
            finalized: false,
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Number of frames submitted so far.
    pub fn frame_count(&self) -> i64 {
        self.frame_count
    }

    /// Number of packets written so far.
    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Encodes one raw frame.
    ///
    /// The frame's pts is overwritten with the frame counter rescaled from
    /// codec to stream time base. The counter advances once per call, no
    /// matter how many packets (zero included) the frame produces.
    pub fn submit(&mut self, frame: &mut frame::Video) -> Result<()> {
        if self.finalized {
            return Err(Error::Finalized);
        }

        let pts = self
            .frame_count
            .rescale(self.codec_time_base, self.stream_time_base);
        frame.set_pts(Some(pts));
        self.frame_count += 1;

        loop {
            match self.encoder.send_frame(Some(&*frame))? {
                CodecStatus::Accepted => break,
                CodecStatus::EndOfStream => return Ok(()),
                // the encoder is full: make room, then offer the frame again
                CodecStatus::WouldBlock => {
                    if self.drain()? == CodecStatus::EndOfStream {
                        return Ok(());
                    }
                }
            }
        }

        self.drain()?;
        Ok(())
    }

    /// Flushes the encoder and writes the trailer. Later calls do nothing.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;

        self.encoder.send_frame(None)?;
        self.drain()?;
        self.sink.write_trailer()?;
        log::debug!(
            "finalized after {} frames, {} packets",
            self.frame_count,
            self.packet_count
        );
        Ok(())
    }

    /// Writes every packet the encoder has ready. Returns the status that
    /// stopped the drain: `WouldBlock` or `EndOfStream`.
    fn drain(&mut self) -> Result<CodecStatus> {
        loop {
            let mut packet = Packet::empty();
            match self.encoder.receive_packet(&mut packet)? {
                CodecStatus::Accepted => {
                    self.sink.write_packet(&mut packet)?;
                    self.packet_count += 1;
                }
                status => return Ok(status),
            }
        }
    }
}

#[cfg(test)]
#[path = "encode_test.rs"]
mod encode_test;
