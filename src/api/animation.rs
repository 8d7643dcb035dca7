//! Stepping a slider through its domain and recording one frame per step.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use tracing::debug;

use crate::core::linspace;
use crate::error::{ControlsError, ControlsResult};
use crate::figure::Figure;
use crate::widgets::{SliderBounds, Widget};

use super::Controls;

/// Per-export overrides of [`super::AnimationDefaults`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationOptions {
    pub interval_ms: Option<u32>,
    /// Frames of the synthesized sweep used when the slider has no step.
    pub frame_count: Option<usize>,
    pub repeat: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            interval_ms: None,
            frame_count: None,
            repeat: true,
        }
    }
}

impl AnimationOptions {
    #[must_use]
    pub fn with_interval_ms(mut self, interval_ms: u32) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }

    #[must_use]
    pub fn with_frame_count(mut self, frame_count: usize) -> Self {
        self.frame_count = Some(frame_count);
        self
    }

    #[must_use]
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Receives captured frames in order.
pub trait FrameSink {
    fn push_frame(&mut self, frame: RgbaImage, delay_ms: u32) -> ControlsResult<()>;

    fn finish(&mut self) -> ControlsResult<()> {
        Ok(())
    }
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct FrameCollector {
    pub frames: Vec<(RgbaImage, u32)>,
}

impl FrameSink for FrameCollector {
    fn push_frame(&mut self, frame: RgbaImage, delay_ms: u32) -> ControlsResult<()> {
        self.frames.push((frame, delay_ms));
        Ok(())
    }
}

const GIF_TRAILER: u8 = 0x3B;

/// Encoder target that stays readable after the encoder is dropped.
#[derive(Debug, Clone, Default)]
struct EncodedBytes(Rc<RefCell<Vec<u8>>>);

impl Write for EncodedBytes {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Encodes frames as an animated GIF.
///
/// Frames are encoded in memory and written to `writer` by
/// [`FrameSink::finish`], which reports write and flush failures.
pub struct GifFrameSink<W: Write> {
    encoder: Option<GifEncoder<EncodedBytes>>,
    encoded: EncodedBytes,
    writer: W,
    frames: usize,
}

impl<W: Write> GifFrameSink<W> {
    pub fn new(writer: W, repeat: bool) -> ControlsResult<Self> {
        let encoded = EncodedBytes::default();
        let mut encoder = GifEncoder::new(encoded.clone());
        encoder.set_repeat(if repeat {
            Repeat::Infinite
        } else {
            Repeat::Finite(0)
        })?;
        Ok(Self {
            encoder: Some(encoder),
            encoded,
            writer,
            frames: 0,
        })
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for GifFrameSink<W> {
    fn push_frame(&mut self, frame: RgbaImage, delay_ms: u32) -> ControlsResult<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| ControlsError::Export("gif encoder already finished".to_owned()))?;
        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        encoder.encode_frame(Frame::from_parts(frame, 0, 0, delay))?;
        self.frames += 1;
        Ok(())
    }

    /// Writes the trailer, then copies the whole file to the writer.
    fn finish(&mut self) -> ControlsResult<()> {
        let Some(encoder) = self.encoder.take() else {
            return Ok(());
        };
        // The encoder writes the trailer when dropped.
        drop(encoder);
        let bytes = std::mem::take(&mut *self.encoded.0.borrow_mut());
        if bytes.last() != Some(&GIF_TRAILER) {
            return Err(ControlsError::Export("gif trailer was not written".to_owned()));
        }
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Slider positions visited by an export: every step when the slider has
/// one, otherwise `synthesized` evenly spaced positions.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn frame_positions(bounds: SliderBounds, synthesized: usize) -> Vec<f64> {
    match bounds.step {
        Some(step) if step > 0.0 && bounds.max >= bounds.min => {
            let count = ((bounds.max - bounds.min) / step + 1e-9).floor() as usize + 1;
            (0..count)
                .map(|i| bounds.min + step * i as f64)
                .collect()
        }
        _ => linspace(bounds.min, bounds.max, synthesized),
    }
}

impl Controls {
    /// Steps the slider for `name` through its domain, running the normal
    /// update cascade and capturing `figure` once per frame.
    ///
    /// Returns the number of frames written. Only slider controls can be
    /// stepped; anything else fails with `UnsupportedWidgetType`.
    pub fn animate(
        &self,
        figure: &dyn Figure,
        name: &str,
        options: AnimationOptions,
        sink: &mut dyn FrameSink,
    ) -> ControlsResult<usize> {
        let driver = self.driver(name)?;
        let Widget::Slider(slider) = driver.widget() else {
            return Err(ControlsError::UnsupportedWidgetType {
                name: driver.name().to_owned(),
                widget: driver.widget().type_name(),
            });
        };
        let defaults = self.config().animation;
        let interval_ms = options.interval_ms.unwrap_or(defaults.interval_ms);
        let positions = frame_positions(
            slider.bounds(),
            options.frame_count.unwrap_or(defaults.synthesized_frames),
        );

        for position in &positions {
            let before = slider.value();
            driver.set_value(*position)?;
            // A slider already at this position sends no event.
            if slider.value() == before {
                self.dispatch(driver.name(), driver.slider_payload()?)?;
            }
            sink.push_frame(figure.capture_frame()?, interval_ms)?;
        }
        sink.finish()?;
        debug!(name, frames = positions.len(), interval_ms, "exported animation");
        Ok(positions.len())
    }

    /// [`Controls::animate`] into a GIF file at `path`.
    pub fn save_animation(
        &self,
        path: impl AsRef<Path>,
        figure: &dyn Figure,
        name: &str,
        options: AnimationOptions,
    ) -> ControlsResult<usize> {
        let file = File::create(path.as_ref())?;
        let mut sink = GifFrameSink::new(BufWriter::new(file), options.repeat)?;
        self.animate(figure, name, options, &mut sink)
    }
}
