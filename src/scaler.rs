use ffmpeg_next::{
    format::Pixel,
    frame,
    software::scaling::{self, Flags},
};

use crate::error::{Error, Result};

/// Format and dimensions of one side of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub format: Pixel,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(format: Pixel, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }

    pub fn of(frame: &frame::Video) -> Self {
        Self::new(frame.format(), frame.width(), frame.height())
    }
}

/// A software scaling context bound to a fixed source and destination
/// geometry. A new one is built whenever either side changes.
pub struct Scaler {
    context: scaling::Context,
}

impl Scaler {
    pub fn new(src: Geometry, dst: Geometry, flags: Flags) -> Result<Self> {
        let context = scaling::Context::get(
            src.format, src.width, src.height, dst.format, dst.width, dst.height, flags,
        )
        .map_err(Error::Conversion)?;
        Ok(Self { context })
    }

    /// Returns the scaler cached in `slot`, replacing it first when it was
    /// built for a different geometry.
    pub fn cached(
        slot: &mut Option<Scaler>,
        src: Geometry,
        dst: Geometry,
        flags: Flags,
    ) -> Result<&mut Scaler> {
        let scaler = match slot.take() {
            Some(scaler) if scaler.matches(src, dst) => scaler,
            stale => {
                drop(stale);
                log::debug!(
                    "building scaler {:?} {}x{} -> {:?} {}x{}",
                    src.format,
                    src.width,
                    src.height,
                    dst.format,
                    dst.width,
                    dst.height
                );
                Scaler::new(src, dst, flags)?
            }
        };
        Ok(slot.insert(scaler))
    }

    pub fn matches(&self, src: Geometry, dst: Geometry) -> bool {
        let input = self.context.input();
        let output = self.context.output();
        Geometry::new(input.format, input.width, input.height) == src
            && Geometry::new(output.format, output.width, output.height) == dst
    }

    pub fn run(&mut self, frame: &frame::Video, dst: &mut frame::Video) -> Result<()> {
        self.context.run(frame, dst).map_err(Error::Conversion)
    }
}
