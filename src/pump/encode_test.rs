use std::collections::VecDeque;

use ffmpeg_next::{Packet, Rational, format::Pixel, frame};

use super::EncodePump;
use crate::codec::{CodecStatus, FrameEncoder, PacketSink};
use crate::error::{Error, Result};

// ------------------------------------------------------------------------
// Stubs
// ------------------------------------------------------------------------

/// Counts everything it is given. Holds up to `delay` frames internally
/// (like an encoder reordering B-frames) and turns each frame it lets go of
/// into `packets_per_frame[n % len]` packets.
struct StubEncoder {
    delay: usize,
    packets_per_frame: Vec<usize>,
    held: VecDeque<i64>,
    ready: VecDeque<i64>,
    released: usize,
    frame_pts: Vec<i64>,
    sends: usize,
    flushes: usize,
    flushing: bool,
    closed: bool,
    fail_receive: bool,
}

impl StubEncoder {
    fn new(delay: usize, packets_per_frame: Vec<usize>) -> Self {
        Self {
            delay,
            packets_per_frame,
            held: VecDeque::new(),
            ready: VecDeque::new(),
            released: 0,
            frame_pts: Vec::new(),
            sends: 0,
            flushes: 0,
            flushing: false,
            closed: false,
            fail_receive: false,
        }
    }

    fn release_oldest(&mut self) {
        if let Some(pts) = self.held.pop_front() {
            let n = self.packets_per_frame[self.released % self.packets_per_frame.len()];
            self.released += 1;
            for _ in 0..n {
                self.ready.push_back(pts);
            }
        }
    }
}

impl FrameEncoder for StubEncoder {
    fn send_frame(&mut self, frame: Option<&frame::Video>) -> Result<CodecStatus> {
        let Some(frame) = frame else {
            self.flushes += 1;
            self.flushing = true;
            while !self.held.is_empty() {
                self.release_oldest();
            }
            return Ok(CodecStatus::Accepted);
        };

        self.sends += 1;
        if self.closed || self.flushing {
            return Ok(CodecStatus::EndOfStream);
        }
        if self.delay > 0 && self.held.len() >= self.delay {
            self.release_oldest();
            return Ok(CodecStatus::WouldBlock);
        }

        let pts = frame.pts().expect("pump stamps every frame");
        self.frame_pts.push(pts);
        self.held.push_back(pts);
        while self.held.len() > self.delay {
            self.release_oldest();
        }
        Ok(CodecStatus::Accepted)
    }

    fn receive_packet(&mut self, packet: &mut Packet) -> Result<CodecStatus> {
        if self.fail_receive {
            return Err(Error::Encode(ffmpeg_next::Error::InvalidData));
        }
        match self.ready.pop_front() {
            Some(pts) => {
                packet.set_pts(Some(pts));
                Ok(CodecStatus::Accepted)
            }
            None if self.flushing => Ok(CodecStatus::EndOfStream),
            None => Ok(CodecStatus::WouldBlock),
        }
    }
}

#[derive(Default)]
struct StubSink {
    written: Vec<i64>,
    trailers: usize,
    /// Packets written when the trailer went out.
    trailer_at: Option<usize>,
    fail_write: bool,
}

impl PacketSink for StubSink {
    fn write_packet(&mut self, packet: &mut Packet) -> Result<()> {
        if self.fail_write {
            return Err(Error::Write(ffmpeg_next::Error::InvalidData));
        }
        self.written.push(packet.pts().unwrap_or(-1));
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<()> {
        self.trailers += 1;
        self.trailer_at = Some(self.written.len());
        Ok(())
    }
}

/// 25 fps codec clock, 1/12800 muxer clock (what mp4 picks for 25 fps).
fn stub_pump(encoder: StubEncoder) -> EncodePump<StubEncoder, StubSink> {
    EncodePump::new(
        encoder,
        StubSink::default(),
        Rational::new(1, 25),
        Rational::new(1, 12800),
    )
}

fn yuv_frame() -> frame::Video {
    frame::Video::new(Pixel::YUV420P, 4, 4)
}

fn submit_n(pump: &mut EncodePump<StubEncoder, StubSink>, n: usize) -> Result<()> {
    let mut frame = yuv_frame();
    for _ in 0..n {
        pump.submit(&mut frame)?;
    }
    Ok(())
}

// ------------------------------------------------------------------------
// submit
// ------------------------------------------------------------------------

#[test]
fn test_counter_advances_once_per_frame() -> anyhow::Result<()> {
    let mut pump = stub_pump(StubEncoder::new(0, vec![0, 3, 1, 0, 2]));
    submit_n(&mut pump, 5)?;

    assert_eq!(pump.frame_count(), 5);
    assert_eq!(pump.encoder().frame_pts, vec![0, 512, 1024, 1536, 2048]);
    assert_eq!(pump.packet_count(), 6);
    assert_eq!(pump.sink().written, vec![512, 512, 512, 1024, 2048, 2048]);
    Ok(())
}

#[test]
fn test_accepted_without_packets_is_not_an_error() -> anyhow::Result<()> {
    let mut pump = stub_pump(StubEncoder::new(3, vec![1]));
    submit_n(&mut pump, 2)?;

    assert_eq!(pump.frame_count(), 2);
    assert!(pump.sink().written.is_empty());

    pump.finalize()?;
    assert_eq!(pump.sink().written, vec![0, 512]);
    Ok(())
}

#[test]
fn test_full_encoder_is_drained_before_resend() -> anyhow::Result<()> {
    let mut pump = stub_pump(StubEncoder::new(2, vec![1]));
    submit_n(&mut pump, 3)?;

    // the third frame was refused once, which released the first
    assert_eq!(pump.encoder().sends, 4);
    assert_eq!(pump.sink().written, vec![0]);
    assert_eq!(pump.encoder().frame_pts, vec![0, 512, 1024]);

    submit_n(&mut pump, 2)?;
    assert_eq!(pump.frame_count(), 5);
    assert_eq!(pump.sink().written, vec![0, 512, 1024]);

    pump.finalize()?;
    assert_eq!(pump.sink().written, vec![0, 512, 1024, 1536, 2048]);
    Ok(())
}

#[test]
fn test_end_of_stream_on_send_returns_quietly() -> anyhow::Result<()> {
    let mut encoder = StubEncoder::new(0, vec![1]);
    encoder.closed = true;
    let mut pump = stub_pump(encoder);

    submit_n(&mut pump, 1)?;
    assert_eq!(pump.frame_count(), 1);
    assert!(pump.sink().written.is_empty());
    Ok(())
}

#[test]
fn test_receive_error_is_surfaced() {
    let mut encoder = StubEncoder::new(0, vec![1]);
    encoder.fail_receive = true;
    let mut pump = stub_pump(encoder);

    match submit_n(&mut pump, 1) {
        Err(Error::Encode(_)) => {}
        other => panic!("expected Encode error, got {:?}", other),
    }
}

#[test]
fn test_write_error_is_surfaced() {
    let mut pump = stub_pump(StubEncoder::new(0, vec![1]));
    pump.sink.fail_write = true;

    match submit_n(&mut pump, 1) {
        Err(Error::Write(_)) => {}
        other => panic!("expected Write error, got {:?}", other),
    }
}

// ------------------------------------------------------------------------
// finalize
// ------------------------------------------------------------------------

#[test]
fn test_finalize_flushes_then_writes_trailer() -> anyhow::Result<()> {
    let mut pump = stub_pump(StubEncoder::new(4, vec![1, 2]));
    submit_n(&mut pump, 4)?;
    assert!(pump.sink().written.is_empty());

    pump.finalize()?;
    assert!(pump.is_finalized());
    assert_eq!(pump.sink().written.len(), 6);
    assert_eq!(pump.sink().trailer_at, Some(6));
    Ok(())
}

#[test]
fn test_finalize_is_idempotent() -> anyhow::Result<()> {
    let mut pump = stub_pump(StubEncoder::new(1, vec![1]));
    submit_n(&mut pump, 3)?;

    pump.finalize()?;
    pump.finalize()?;
    assert_eq!(pump.encoder().flushes, 1);
    assert_eq!(pump.sink().trailers, 1);
    assert_eq!(pump.sink().written.len(), 3);
    Ok(())
}

#[test]
fn test_submit_after_finalize_is_rejected() -> anyhow::Result<()> {
    let mut pump = stub_pump(StubEncoder::new(0, vec![1]));
    submit_n(&mut pump, 1)?;
    pump.finalize()?;

    match submit_n(&mut pump, 1) {
        Err(Error::Finalized) => {}
        other => panic!("expected Finalized, got {:?}", other),
    }
    assert_eq!(pump.frame_count(), 1);
    Ok(())
}

#[test]
fn test_finalize_without_frames() -> anyhow::Result<()> {
    let mut pump = stub_pump(StubEncoder::new(2, vec![1]));
    pump.finalize()?;
    assert_eq!(pump.sink().trailers, 1);
    assert!(pump.sink().written.is_empty());
    Ok(())
}
