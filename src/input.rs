use std::ffi::CString;
use std::path::Path;
use std::ptr;

use ffmpeg_next::{Packet, Rational, ffi, format::context::Input, media};

use crate::{
    codec::PacketSource,
    error::{Error, Result},
    stream::AvStream,
};

/// An opened container with its first video stream selected.
pub struct AvInput {
    inner: Input,
    video: AvStream,
}

impl AvInput {
    /// Opens `path` and reads its stream information.
    ///
    /// Opening and probing are separate FFmpeg calls so that an unreadable
    /// file (`Error::Open`) and an undecipherable one (`Error::Probe`) can be
    /// told apart; `ffmpeg_next::format::input` folds both into one error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source: ffmpeg_next::Error| Error::Open {
            path: path.to_path_buf(),
            source,
        };
        let cpath = path
            .to_str()
            .and_then(|p| CString::new(p).ok())
            .ok_or_else(|| open_err(ffmpeg_next::Error::InvalidData))?;

        let inner = unsafe {
            let mut ps = ptr::null_mut();
            let ret =
                ffi::avformat_open_input(&mut ps, cpath.as_ptr(), ptr::null(), ptr::null_mut());
            if ret != 0 {
                return Err(open_err(ffmpeg_next::Error::from(ret)));
            }
            // from here on the context is closed by Input's Drop on every path
            let input = Input::wrap(ps);
            let ret = ffi::avformat_find_stream_info(ps, ptr::null_mut());
            if ret < 0 {
                return Err(Error::Probe(ffmpeg_next::Error::from(ret)));
            }
            input
        };

        let video = Self::select_video_stream(&inner)?;
        log::debug!(
            "opened {} ({}), video stream #{} of {}",
            path.display(),
            inner.format().name(),
            video.index(),
            inner.nb_streams()
        );
        Ok(Self { inner, video })
    }

    /// Picks the first stream with video media type.
    fn select_video_stream(input: &Input) -> Result<AvStream> {
        let stream = input
            .streams()
            .find(|s| s.parameters().medium() == media::Type::Video)
            .ok_or(Error::NoVideoStream)?;
        let rate: Rational = unsafe {
            ffi::av_guess_frame_rate(
                input.as_ptr() as *mut _,
                stream.as_ptr() as *mut _,
                ptr::null_mut(),
            )
            .into()
        };
        Ok(AvStream::with_rate(&stream, rate))
    }

    pub fn video_stream(&self) -> &AvStream {
        &self.video
    }

    /// Container duration in microseconds, if known.
    pub fn duration(&self) -> Option<i64> {
        crate::timestamp::valid(self.inner.duration()).filter(|d| *d >= 0)
    }

    pub fn format_name(&self) -> String {
        self.inner.format().name().to_string()
    }
}

impl PacketSource for AvInput {
    fn read_packet(&mut self) -> Result<Option<Packet>> {
        let mut packet = Packet::empty();
        match packet.read(&mut self.inner) {
            Ok(()) => Ok(Some(packet)),
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(err) => Err(Error::Read(err)),
        }
    }

    fn seek_keyframe(&mut self, stream_index: usize, timestamp: i64) -> Result<()> {
        let ret = unsafe {
            ffi::av_seek_frame(
                self.inner.as_mut_ptr(),
                stream_index as i32,
                timestamp,
                ffi::AVSEEK_FLAG_BACKWARD as i32,
            )
        };
        if ret < 0 {
            return Err(Error::Seek(ffmpeg_next::Error::from(ret)));
        }
        Ok(())
    }
}
