use crate::backend::{ControlFigure, NotebookPanel};

use super::Controls;

/// Host hook that puts composed controls on screen.
pub trait DisplaySink {
    fn show_panel(&mut self, panel: &NotebookPanel);
    fn show_figure(&mut self, figure: &ControlFigure);
}

/// Sink that only records what it was asked to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullDisplay {
    pub panels_shown: usize,
    pub figures_shown: usize,
    /// Row names of the most recent panel.
    pub last_rows: Vec<String>,
}

impl DisplaySink for NullDisplay {
    fn show_panel(&mut self, panel: &NotebookPanel) {
        self.panels_shown += 1;
        self.last_rows = panel.rows.iter().map(|row| row.name.clone()).collect();
    }

    fn show_figure(&mut self, _figure: &ControlFigure) {
        self.figures_shown += 1;
    }
}

impl Controls {
    /// Hands the registry's panel or control figures to `sink`.
    pub fn display(&self, sink: &mut dyn DisplaySink) {
        self.inner.borrow().backend.present(sink);
    }
}
