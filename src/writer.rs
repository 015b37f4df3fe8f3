use std::path::Path;

use ffmpeg_next::{ffi, format::Pixel, frame};

use crate::{
    encoder::{Encoder, Settings},
    error::{Error, Result},
    frame::{alloc_video, unpack_rgb},
    output::AvOutput,
    pump::EncodePump,
    scaler::{Geometry, Scaler},
};

/// Encodes packed RGB24 frames into a new file.
///
/// The container is picked from the file extension and the stream uses that
/// container's default video codec. The file is finalized by
/// [`finalize`](Self::finalize), or on drop.
pub struct VideoWriter {
    pump: EncodePump<Encoder, AvOutput>,
    settings: Settings,
    /// Encoder-format frame, overwritten by every conversion.
    frame: frame::Video,
    /// Caller RGB copied into an FFmpeg frame, sized to the last input.
    source: Option<frame::Video>,
    scaler: Option<Scaler>,
}

impl VideoWriter {
    pub fn open<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        fps: f64,
        bitrate: usize,
    ) -> Result<Self> {
        Self::open_with(path, Settings::new(width, height, fps, bitrate)?)
    }

    pub fn open_with<P: AsRef<Path>>(path: P, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let path = path.as_ref();

        let mut output = AvOutput::create(path)?;
        let codec = output.default_video_codec()?;
        output.add_stream(codec)?;
        let encoder = Encoder::new(codec, &settings, output.global_header())?;
        output.bind_stream(&encoder)?;
        let stream_time_base = output.write_header(encoder.time_base())?;

        let frame = alloc_video(settings.pixel_format, settings.width, settings.height)?;

        log::info!(
            "writing {} ({}): {} {}x{} {:?}, {} fps, {} bps, gop {}",
            path.display(),
            output.format_name(),
            codec.name(),
            settings.width,
            settings.height,
            settings.pixel_format,
            settings.frame_rate,
            settings.bit_rate,
            settings.gop_size
        );

        let codec_time_base = encoder.time_base();
        Ok(Self {
            pump: EncodePump::new(encoder, output, codec_time_base, stream_time_base),
            settings,
            frame,
            source: None,
            scaler: None,
        })
    }

    /// Number of frames submitted so far.
    pub fn frame_count(&self) -> i64 {
        self.pump.frame_count()
    }

    /// Converts one packed RGB24 picture to the output format and encodes
    /// it. `width` and `height` describe `rgb` and may differ from the
    /// output size; the picture is rescaled.
    pub fn encode_frame(&mut self, rgb: &[u8], width: u32, height: u32) -> Result<()> {
        if self.pump.is_finalized() {
            return Err(Error::Finalized);
        }

        let src = Geometry::new(Pixel::RGB24, width, height);
        let source = match self.source.take() {
            Some(source) if Geometry::of(&source) == src => source,
            _ => alloc_video(src.format, src.width, src.height)?,
        };
        let source = self.source.insert(source);
        unpack_rgb(rgb, source)?;

        // the encoder may still reference the previous picture
        let ret = unsafe { ffi::av_frame_make_writable(self.frame.as_mut_ptr()) };
        if ret < 0 {
            return Err(Error::Allocation("writable video frame"));
        }

        let dst = Geometry::of(&self.frame);
        Scaler::cached(&mut self.scaler, src, dst, self.settings.scaling)?
            .run(source, &mut self.frame)?;
        self.pump.submit(&mut self.frame)
    }

    /// Flushes the encoder and writes the trailer. Safe to call more than
    /// once; only the first call does anything.
    pub fn finalize(&mut self) -> Result<()> {
        if self.pump.is_finalized() {
            return Ok(());
        }
        self.pump.finalize()?;
        log::info!(
            "finalized {}: {} frames, {} packets",
            self.pump.sink().path().display(),
            self.pump.frame_count(),
            self.pump.packet_count()
        );
        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if let Err(err) = self.finalize() {
            log::error!(
                "failed to finalize {}: {}",
                self.pump.sink().path().display(),
                err
            );
        }
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
