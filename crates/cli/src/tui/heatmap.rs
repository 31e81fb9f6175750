use patterncmp_compare::grid::Grid;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use super::colormap::{ColorScale, Colormap};

const UPPER_HALF: &str = "\u{2580}";
const FULL_BLOCK: &str = "\u{2588}";

/// Nearest-neighbour heatmap of a grid. Two pixels per terminal cell (upper
/// half block: fg = top pixel, bg = bottom pixel). Row 0 of the grid is drawn
/// at the bottom so the vertical axis ascends upward.
pub struct Heatmap<'a> {
    pub grid: &'a Grid,
    pub scale: Option<ColorScale>,
    pub colormap: Colormap,
    /// (row, col) grid cell to mark.
    pub cursor: Option<(usize, usize)>,
}

impl Heatmap<'_> {
    fn pixel(&self, grid_row: usize, grid_col: usize) -> Color {
        match (self.grid.get(grid_row, grid_col), self.scale) {
            (Some(v), Some(scale)) => self.colormap.color(scale.fraction(v)),
            _ => Color::Reset,
        }
    }
}

/// Grid index covering screen position `pos` of `extent` positions.
fn sample_index(pos: usize, extent: usize, len: usize) -> usize {
    ((pos * len) / extent.max(1)).min(len.saturating_sub(1))
}

impl Widget for Heatmap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (rows, cols) = (self.grid.rows, self.grid.cols);
        if rows == 0 || cols == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let pixel_rows = area.height as usize * 2;

        for y in 0..area.height {
            let top_px = y as usize * 2;
            let bottom_px = top_px + 1;
            // Flip: last pixel row is grid row 0
            let top_row = sample_index(pixel_rows - 1 - top_px, pixel_rows, rows);
            let bottom_row = sample_index(pixel_rows - 1 - bottom_px, pixel_rows, rows);

            for x in 0..area.width {
                let col = sample_index(x as usize, width, cols);
                let top = self.pixel(top_row, col);
                let bottom = self.pixel(bottom_row, col);
                let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) else {
                    continue;
                };

                let on_cursor = self
                    .cursor
                    .is_some_and(|(r, c)| c == col && (r == top_row || r == bottom_row));
                if on_cursor {
                    cell.set_symbol("+")
                        .set_style(Style::default().fg(Color::White).bg(bottom).add_modifier(Modifier::BOLD));
                } else if top == Color::Reset && bottom == Color::Reset {
                    cell.set_symbol(" ").set_bg(Color::Reset);
                } else {
                    cell.set_symbol(UPPER_HALF).set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

/// Vertical colour bar: units label, max tick, gradient, min tick.
pub struct Colorbar<'a> {
    pub scale: Option<ColorScale>,
    pub colormap: Colormap,
    pub label: &'a str,
}

impl Colorbar<'_> {
    /// Columns needed to show the label and both ticks without clipping.
    pub fn width(&self) -> u16 {
        let ticks = self
            .scale
            .map(|s| format_tick(s.min).len().max(format_tick(s.max).len()))
            .unwrap_or(0);
        let label = unicode_width::UnicodeWidthStr::width(self.label);
        (label.max(ticks + 3).max(4)) as u16
    }
}

pub fn format_tick(v: f64) -> String {
    format!("{v:.2}")
}

impl Widget for Colorbar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 4 || area.width == 0 {
            return;
        }
        let label_style = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);
        buf.set_stringn(area.x, area.y, self.label, area.width as usize, label_style);

        let Some(scale) = self.scale else {
            buf.set_stringn(area.x, area.y + 1, "(no data)", area.width as usize, Style::default().fg(Color::DarkGray));
            return;
        };

        let bar_top = area.y + 1;
        let bar_height = area.height - 1;
        let tick_style = Style::default().fg(Color::Gray);
        let tick_x = area.x + 3;
        let tick_width = area.width.saturating_sub(3) as usize;

        for i in 0..bar_height {
            // Top of the bar is the max of the scale
            let t = if bar_height > 1 {
                1.0 - i as f64 / (bar_height - 1) as f64
            } else {
                1.0
            };
            let color = self.colormap.color(t);
            for dx in 0..2u16.min(area.width) {
                if let Some(cell) = buf.cell_mut((area.x + dx, bar_top + i)) {
                    cell.set_symbol(FULL_BLOCK).set_fg(color);
                }
            }
        }

        buf.set_stringn(tick_x, bar_top, format_tick(scale.max), tick_width, tick_style);
        buf.set_stringn(tick_x, bar_top + bar_height - 1, format_tick(scale.min), tick_width, tick_style);
    }
}
