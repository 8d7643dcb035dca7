use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::widgets::{Label, Play, Widget};

/// One on-screen element of a composed control panel.
#[derive(Debug, Clone)]
pub enum PanelItem {
    Widget(Widget),
    Readout(Rc<Label>),
    Play(Rc<Play>),
}

/// Horizontal row holding one parameter's widgets, left to right.
#[derive(Debug, Clone)]
pub struct PanelRow {
    pub name: String,
    pub items: Vec<PanelItem>,
}

/// Vertical stack of rows handed to the notebook display mechanism.
#[derive(Debug, Clone, Default)]
pub struct NotebookPanel {
    pub rows: Vec<PanelRow>,
}

impl NotebookPanel {
    #[must_use]
    pub fn row(&self, name: &str) -> Option<&PanelRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rectangle in figure-fraction coordinates, origin at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxesRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl AxesRect {
    #[must_use]
    pub fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    #[must_use]
    pub fn top(self) -> f64 {
        self.bottom + self.height
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    /// `true` when the interiors intersect; shared edges do not count.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        const EPSILON: f64 = 1e-12;
        self.left < other.right() - EPSILON
            && other.left < self.right() - EPSILON
            && self.bottom < other.top() - EPSILON
            && other.bottom < self.top() - EPSILON
    }

    #[must_use]
    pub fn is_inside_unit_square(self) -> bool {
        self.left >= 0.0 && self.bottom >= 0.0 && self.right() <= 1.0 && self.top() <= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxesRole {
    Slider,
    RangeSlider,
    Radio,
    Play,
}

/// A widget placed inside a control figure.
#[derive(Debug, Clone)]
pub struct WidgetAxes {
    pub name: String,
    pub role: AxesRole,
    pub rect: AxesRect,
    pub item: PanelItem,
}

/// Dedicated small figure holding native plot widgets.
#[derive(Debug, Clone)]
pub struct ControlFigure {
    pub width_in: f64,
    pub height_in: f64,
    pub axes: Vec<WidgetAxes>,
}

impl ControlFigure {
    #[must_use]
    pub fn axes_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a WidgetAxes> + 'a {
        self.axes.iter().filter(move |axes| axes.name == name)
    }
}
