//! One-row sparkline widget for chart levels

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A sparkline over levels in `0..=1`
///
/// Unknown levels render as a blank cell so gaps stay visible.
pub struct LevelSparkline<'a> {
    levels: &'a [Option<f64>],
    /// Cells per level
    cell_width: usize,
    style: Style,
}

impl<'a> LevelSparkline<'a> {
    pub fn new(levels: &'a [Option<f64>]) -> Self {
        Self {
            levels,
            cell_width: 1,
            style: Style::default().fg(Color::Cyan),
        }
    }

    pub fn cell_width(mut self, width: usize) -> Self {
        self.cell_width = width.max(1);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn level_to_block(level: Option<f64>) -> char {
        match level {
            Some(level) if level.is_finite() => {
                let index = ((level.clamp(0.0, 1.0) * 7.0).round() as usize).min(7);
                BLOCKS[index]
            }
            _ => ' ',
        }
    }
}

impl<'a> Widget for LevelSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let cells = self
            .levels
            .iter()
            .flat_map(|level| std::iter::repeat(Self::level_to_block(*level)).take(self.cell_width))
            .take(width);

        for (i, block) in cells.enumerate() {
            let x = area.x + i as u16;
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(block).set_style(self.style);
            }
        }
    }
}
