use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr;

use ffmpeg_next::{Packet, Rational, Rescale, codec, ffi, format, format::context::Output, media};

use crate::{
    codec::PacketSink,
    encoder::Encoder,
    error::{Error, Result},
};

/// An output container carrying a single video stream.
pub struct AvOutput {
    inner: Output,
    path: PathBuf,
    stream_index: usize,
    /// One frame in stream time base, stamped on every packet written.
    frame_duration: i64,
    have_written_header: bool,
    have_written_trailer: bool,
}

impl AvOutput {
    /// Allocates a format context guessed from the extension of `path` and
    /// opens the file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let context_err = |source: ffmpeg_next::Error| Error::OutputContext {
            path: path.to_path_buf(),
            source,
        };
        let cpath = path
            .to_str()
            .and_then(|p| CString::new(p).ok())
            .ok_or_else(|| context_err(ffmpeg_next::Error::InvalidData))?;

        let inner = unsafe {
            let mut ps = ptr::null_mut();
            let ret = ffi::avformat_alloc_output_context2(
                &mut ps,
                ptr::null(),
                ptr::null(),
                cpath.as_ptr(),
            );
            if ret < 0 {
                return Err(context_err(ffmpeg_next::Error::from(ret)));
            }
            if ps.is_null() {
                return Err(Error::Allocation("output format context"));
            }
            // closes the file too, once opened below
            let output = Output::wrap(ps);

            if (*(*ps).oformat).flags & ffi::AVFMT_NOFILE as i32 == 0 {
                let ret =
                    ffi::avio_open(&mut (*ps).pb, cpath.as_ptr(), ffi::AVIO_FLAG_WRITE as i32);
                if ret < 0 {
                    return Err(Error::Create {
                        path: path.to_path_buf(),
                        source: ffmpeg_next::Error::from(ret),
                    });
                }
            }
            output
        };

        Ok(Self {
            inner,
            path: path.to_path_buf(),
            stream_index: 0,
            frame_duration: 0,
            have_written_header: false,
            have_written_trailer: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format_name(&self) -> String {
        self.inner.format().name().to_string()
    }

    /// The container's default video encoder for this file.
    pub fn default_video_codec(&self) -> Result<codec::Codec> {
        let id = self.inner.format().codec(&self.path, media::Type::Video);
        ffmpeg_next::encoder::find(id).ok_or(Error::EncoderNotFound(id))
    }

    /// Whether encoders must put their extradata in the container header.
    pub fn global_header(&self) -> bool {
        self.inner
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER)
    }

    pub fn add_stream(&mut self, codec: codec::Codec) -> Result<usize> {
        let stream = self.inner.add_stream(codec).map_err(Error::StreamCreate)?;
        self.stream_index = stream.index();
        Ok(self.stream_index)
    }

    /// Copies the opened encoder's parameters to the stream and adopts its
    /// time base.
    pub fn bind_stream(&mut self, encoder: &Encoder) -> Result<()> {
        let mut stream = self
            .inner
            .stream_mut(self.stream_index)
            .ok_or(Error::StreamCreate(ffmpeg_next::Error::StreamNotFound))?;
        let ret = unsafe {
            ffi::avcodec_parameters_from_context(
                (*stream.as_mut_ptr()).codecpar,
                encoder.context().as_ptr(),
            )
        };
        if ret < 0 {
            return Err(Error::ParameterCopy(ffmpeg_next::Error::from(ret)));
        }
        stream.set_time_base(encoder.time_base());
        Ok(())
    }

    /// Writes the container header and returns the stream time base, which
    /// the muxer is free to change from what [`bind_stream`](Self::bind_stream)
    /// set.
    pub fn write_header(&mut self, codec_time_base: Rational) -> Result<Rational> {
        self.inner.write_header().map_err(Error::WriteHeader)?;
        self.have_written_header = true;

        let time_base = self.stream_time_base().unwrap_or(codec_time_base);
        self.frame_duration = 1i64.rescale(codec_time_base, time_base).max(1);
        log::debug!(
            "wrote {} header for {}, stream time base {}",
            self.format_name(),
            self.path.display(),
            time_base
        );
        Ok(time_base)
    }

    pub fn stream_time_base(&self) -> Option<Rational> {
        self.inner.stream(self.stream_index).map(|s| s.time_base())
    }
}

impl PacketSink for AvOutput {
    fn write_packet(&mut self, packet: &mut Packet) -> Result<()> {
        packet.set_stream(self.stream_index);
        packet.set_position(-1);
        packet.set_duration(self.frame_duration);
        log::trace!(
            "writing packet pts {:?} dts {:?} size {}",
            packet.pts(),
            packet.dts(),
            packet.size()
        );
        packet.write_interleaved(&mut self.inner).map_err(Error::Write)
    }

    fn write_trailer(&mut self) -> Result<()> {
        if self.have_written_header && !self.have_written_trailer {
            self.have_written_trailer = true;
            self.inner.write_trailer().map_err(Error::Finalize)?;
            log::debug!("wrote trailer for {}", self.path.display());
        }
        Ok(())
    }
}
