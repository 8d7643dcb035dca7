//! Figures the registry redraws.
//!
//! The plotting layer owns figures; the registry only keeps weak handles and
//! asks them to redraw (and, for animation export, to capture a frame).

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::ControlsResult;

/// Process-unique figure identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FigureId(u64);

impl FigureId {
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Contract the plotting layer implements for its figures.
pub trait Figure {
    fn id(&self) -> FigureId;

    /// Schedules a repaint. Repeated requests before the next paint coalesce.
    fn request_redraw(&self);

    /// Paints synchronously and returns the current pixels.
    fn capture_frame(&self) -> ControlsResult<RgbaImage>;
}

pub type FigureHandle = Rc<dyn Figure>;

/// Figure double that records redraw requests and captures a flat frame.
///
/// Useful in tests and as a placeholder when no canvas exists yet.
#[derive(Debug)]
pub struct NullFigure {
    id: FigureId,
    width: u32,
    height: u32,
    redraws: Cell<usize>,
    fill: RefCell<Rgba<u8>>,
}

impl NullFigure {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Rc<Self> {
        Rc::new(Self {
            id: FigureId::next(),
            width: width.max(1),
            height: height.max(1),
            redraws: Cell::new(0),
            fill: RefCell::new(Rgba([255, 255, 255, 255])),
        })
    }

    #[must_use]
    pub fn redraw_count(&self) -> usize {
        self.redraws.get()
    }

    /// Colour of every pixel in subsequent captures.
    pub fn set_fill(&self, fill: Rgba<u8>) {
        self.fill.replace(fill);
    }
}

impl Default for NullFigure {
    fn default() -> Self {
        Self {
            id: FigureId::next(),
            width: 64,
            height: 48,
            redraws: Cell::new(0),
            fill: RefCell::new(Rgba([255, 255, 255, 255])),
        }
    }
}

impl Figure for NullFigure {
    fn id(&self) -> FigureId {
        self.id
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }

    fn capture_frame(&self) -> ControlsResult<RgbaImage> {
        Ok(RgbaImage::from_pixel(
            self.width,
            self.height,
            *self.fill.borrow(),
        ))
    }
}
