use std::mem;

use ffmpeg_next::{Packet, Rational, frame};

use crate::{
    codec::{CodecStatus, FrameDecoder, PacketSource},
    error::Result,
    timestamp,
};

enum State {
    /// The decoder reported "no frame ready": the next step reads a packet.
    NeedPacket,
    /// The decoder refused this packet until its output is drained.
    Resend(Packet),
    /// The last receive produced a frame, more may be buffered.
    Draining,
    /// The decoder reported end of stream. Sticky until the next seek.
    Finished,
}

/// Pull-based packet → frame pump.
///
/// Reads packets from `S`, feeds the ones belonging to `stream_index` to
/// `D`, and hands out decoded frames one at a time. The pump never reads a
/// new packet while the decoder may still hold output from the previous
/// one, so packets of other streams never strand buffered frames.
pub struct DecodePump<S, D> {
    source: S,
    decoder: D,
    stream_index: usize,
    time_base: Rational,
    frame: frame::Video,
    state: State,
    eof_sent: bool,
    /// Set by a successful seek: the frame slot holds the target frame and
    /// the next call returns it again.
    held: bool,
}

impl<S: PacketSource, D: FrameDecoder> DecodePump<S, D> {
    pub fn new(source: S, decoder: D, stream_index: usize, time_base: Rational) -> Self {
        Self {
            source,
            decoder,
            stream_index,
            time_base,
            frame: frame::Video::empty(),
            state: State::NeedPacket,
            eof_sent: false,
            held: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// True once the decoder has been drained to end of stream.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished) && !self.held
    }

    /// Decodes the next frame.
    ///
    /// The returned frame lives in the pump's single frame slot and is
    /// overwritten by the next call. `Ok(None)` means end of stream.
    pub fn next_frame(&mut self) -> Result<Option<&frame::Video>> {
        if self.held {
            self.held = false;
            return Ok(Some(&self.frame));
        }

        loop {
            match mem::replace(&mut self.state, State::NeedPacket) {
                State::Finished => {
                    self.state = State::Finished;
                    return Ok(None);
                }
                State::Draining => {}
                State::Resend(packet) => self.send(packet)?,
                State::NeedPacket => match self.source.read_packet()? {
                    Some(packet) if packet.stream() != self.stream_index => {
                        log::trace!("discarding packet of stream #{}", packet.stream());
                        continue;
                    }
                    Some(packet) => self.send(packet)?,
                    None if !self.eof_sent => {
                        log::trace!("end of input, draining decoder");
                        self.eof_sent = true;
                        self.decoder.send_eof()?;
                    }
                    None => {}
                },
            }

            match self.decoder.receive_frame(&mut self.frame)? {
                CodecStatus::Accepted => {
                    if matches!(self.state, State::NeedPacket) {
                        self.state = State::Draining;
                    }
                    return Ok(Some(&self.frame));
                }
                CodecStatus::WouldBlock if self.eof_sent => {
                    // a drained decoder that still asks for input has nothing left
                    self.state = State::Finished;
                    return Ok(None);
                }
                CodecStatus::WouldBlock => {}
                CodecStatus::EndOfStream => {
                    self.state = State::Finished;
                    return Ok(None);
                }
            }
        }
    }

    /// Makes the next [`next_frame`](Self::next_frame) call return the frame
    /// it returned last instead of decoding a new one.
    pub(crate) fn hold(&mut self) {
        self.held = true;
    }

    fn send(&mut self, packet: Packet) -> Result<()> {
        if self.decoder.send_packet(&packet)? == CodecStatus::WouldBlock {
            self.state = State::Resend(packet);
        }
        Ok(())
    }

    /// Seeks to the first frame whose best-effort timestamp is at or after
    /// `target` microseconds.
    ///
    /// The container is sought to the nearest keyframe at or before the
    /// target, then frames are decoded until the target is reached; cost is
    /// bounded by the keyframe interval. On success the frame found is
    /// returned by the next [`next_frame`](Self::next_frame) call.
    ///
    /// Returns `Ok(false)` if the container refuses the seek or the stream
    /// ends before the target.
    pub fn seek(&mut self, target: i64) -> Result<bool> {
        let time_base = self.time_base;
        let ts = timestamp::from_micros(target, time_base);

        self.decoder.flush();
        self.state = State::NeedPacket;
        self.eof_sent = false;
        self.held = false;

        if let Err(err) = self.source.seek_keyframe(self.stream_index, ts) {
            log::debug!("seek to {}us failed: {}", target, err);
            return Ok(false);
        }

        let mut skipped = 0usize;
        while let Some(frame) = self.next_frame()? {
            if best_effort_timestamp(frame, time_base).is_some_and(|pts| pts >= target) {
                log::debug!("seek to {}us reached after {} frames", target, skipped);
                self.hold();
                return Ok(true);
            }
            skipped += 1;
        }

        log::debug!("seek to {}us hit end of stream", target);
        Ok(false)
    }
}

/// Best-effort timestamp of `frame` in microseconds, falling back to its pts
/// when the decoder did not infer one.
pub fn best_effort_timestamp(frame: &frame::Video, time_base: Rational) -> Option<i64> {
    frame
        .timestamp()
        .or_else(|| frame.pts())
        .map(|ts| timestamp::to_micros(ts, time_base))
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod decode_test;
