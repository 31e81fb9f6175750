pub mod colormap;
pub mod heatmap;

use std::io::stdout;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use patterncmp_compare::grid::{Grid, GridSet};
use patterncmp_compare::model::{ComparisonResult, Statistics};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

use colormap::{ColorScale, Colormap};
use heatmap::{Colorbar, Heatmap};

const THETA_LABEL: &str = "Theta (degree)";
const PHI_LABEL: &str = "Phi (degree)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridKind {
    Predicted,
    Actual,
    Error,
}

struct Panel {
    title: &'static str,
    kind: GridKind,
    colormap: Colormap,
    units: &'static str,
    scale: Option<ColorScale>,
}

/// The comparison viewer. Built from a finished result and drawn through any
/// ratatui backend; owns no terminal.
pub struct ComparisonView<'a> {
    result: &'a ComparisonResult,
    panels: [Panel; 3],
    /// (phi row, theta col) under the cursor.
    cursor: (usize, usize),
    show_help: bool,
    should_quit: bool,
}

impl<'a> ComparisonView<'a> {
    pub fn new(result: &'a ComparisonResult) -> Self {
        let grids = &result.grids;
        let scale = |g: &Grid| g.range().map(|(lo, hi)| ColorScale::new(lo, hi));
        let panels = [
            Panel {
                title: "Predicted Pattern (Interpolated)",
                kind: GridKind::Predicted,
                colormap: Colormap::Spectral,
                units: "Gain [dB]",
                scale: scale(&grids.predicted),
            },
            Panel {
                title: "Actual Pattern (Original)",
                kind: GridKind::Actual,
                colormap: Colormap::Spectral,
                units: "Gain [dB]",
                scale: scale(&grids.actual),
            },
            Panel {
                title: "Absolute Error",
                kind: GridKind::Error,
                colormap: Colormap::Jet,
                units: "Abs Error [dB]",
                scale: scale(&grids.error),
            },
        ];
        Self {
            result,
            panels,
            cursor: (0, 0),
            show_help: false,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    fn grids(&self) -> &GridSet {
        &self.result.grids
    }

    fn grid(&self, kind: GridKind) -> &Grid {
        match kind {
            GridKind::Predicted => &self.grids().predicted,
            GridKind::Actual => &self.grids().actual,
            GridKind::Error => &self.grids().error,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            // Phi ascends upward on screen
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(-1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = (0, 0),
            KeyCode::End | KeyCode::Char('G') => {
                let last = (
                    self.grids().rows().saturating_sub(1),
                    self.grids().cols().saturating_sub(1),
                );
                self.cursor = last;
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, drow: i64, dcol: i64) {
        let (rows, cols) = (self.grids().rows(), self.grids().cols());
        if rows == 0 || cols == 0 {
            return;
        }
        let row = (self.cursor.0 as i64 + drow).clamp(0, rows as i64 - 1) as usize;
        let col = (self.cursor.1 as i64 + dcol).clamp(0, cols as i64 - 1) as usize;
        self.cursor = (row, col);
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);

        let columns = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);
        for (panel, rect) in self.panels.iter().zip(columns.iter()) {
            self.draw_panel(frame, panel, *rect);
        }

        self.draw_banner(frame, chunks[2]);
        self.draw_status(frame, chunks[3]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            " patterncmp: Antenna Pattern Comparison (MSE: {:.4}) ",
            self.result.statistics.mse
        );
        let para = Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_panel(&self, frame: &mut Frame, panel: &Panel, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", panel.title))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let grids = self.grids();
        let axis_style = Style::default().fg(Color::Gray);
        let label_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let phi_ticks = axis_ticks(&grids.phi_axis);
        let tick_width = phi_ticks
            .iter()
            .map(|s| UnicodeWidthStr::width(s.as_str()))
            .max()
            .unwrap_or(0) as u16;
        let colorbar = Colorbar {
            scale: panel.scale,
            colormap: panel.colormap,
            label: panel.units,
        };
        let cols = Layout::horizontal([
            Constraint::Length(tick_width + 1),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(colorbar.width()),
        ])
        .split(rows[1]);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(fit(&format!("^ {PHI_LABEL}"), inner.width), label_style))),
            rows[0],
        );

        // Phi ticks: max at the top, min at the bottom
        if let [min, .., max] = phi_ticks.as_slice() {
            let tick_area = cols[0];
            if tick_area.height > 0 {
                let width = tick_area.width as usize;
                let buf = frame.buffer_mut();
                buf.set_stringn(tick_area.x, tick_area.y, max, width, axis_style);
                buf.set_stringn(tick_area.x, tick_area.bottom() - 1, min, width, axis_style);
            }
        } else if let [only] = phi_ticks.as_slice() {
            frame.render_widget(Paragraph::new(Span::styled(only.clone(), axis_style)), cols[0]);
        }

        let heat_area = cols[1];
        frame.render_widget(
            Heatmap {
                grid: self.grid(panel.kind),
                scale: panel.scale,
                colormap: panel.colormap,
                cursor: Some(self.cursor),
            },
            heat_area,
        );
        frame.render_widget(colorbar, cols[3]);

        // Theta ticks under the heatmap: min left, max right
        let theta_ticks = axis_ticks(&grids.theta_axis);
        let tick_row = Rect::new(heat_area.x, rows[2].y, heat_area.width, rows[2].height);
        frame.render_widget(Paragraph::new(Line::from(spread(&theta_ticks, heat_area.width)).style(axis_style)), tick_row);

        let label = fit(THETA_LABEL, heat_area.width);
        let pad = heat_area.width.saturating_sub(UnicodeWidthStr::width(label.as_str()) as u16) / 2;
        let label_row = Rect::new(heat_area.x + pad, rows[3].y, heat_area.width - pad, rows[3].height);
        frame.render_widget(Paragraph::new(Span::styled(label, label_style)), label_row);
    }

    fn draw_banner(&self, frame: &mut Frame, area: Rect) {
        let para = Paragraph::new(Line::from(Span::styled(
            stats_banner(&self.result.statistics),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )))
        .centered();
        frame.render_widget(para, area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let grids = self.grids();
        let (row, col) = self.cursor;
        let value = |g: &Grid| match g.get(row, col) {
            Some(v) => format!("{v:.4}"),
            None => "-".into(),
        };
        let left = match (grids.phi_axis.get(row), grids.theta_axis.get(col)) {
            (Some(phi), Some(theta)) => format!(
                " Phi {phi}  Theta {theta}  predicted {}  actual {}  error {}",
                value(&grids.predicted),
                value(&grids.actual),
                value(&grids.error),
            ),
            _ => " (empty)".into(),
        };
        let right = "arrows: move  ?: help  q: quit ";

        let padding = (area.width as usize).saturating_sub(left.chars().count() + right.chars().count());
        let status = format!("{left}{:pad$}{right}", "", pad = padding);

        let para = Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Cursor",
            "  ------",
            "  arrows / hjkl    Move across Phi / Theta",
            "  Home / g         First sample",
            "  End  / G         Last sample",
            "",
            "  General",
            "  -------",
            "  q / Esc          Close viewer",
            "  ?                Toggle this help",
            "",
        ];
        let help_width: u16 = 48;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Statistics banner shown under the panels, four decimals.
pub fn stats_banner(stats: &Statistics) -> String {
    format!(
        "COMPARISON STATISTICS  |  MSE: {:.4}  |  RMSE: {:.4}  |  Mean Bias: {:.4} dB ({})",
        stats.mse, stats.rmse, stats.mean_bias, stats.bias
    )
}

fn axis_ticks(axis: &[f64]) -> Vec<String> {
    match axis {
        [] => Vec::new(),
        [only] => vec![only.to_string()],
        [first, .., last] => vec![first.to_string(), last.to_string()],
    }
}

/// Lay ticks out left-aligned, right-aligned (and nothing between).
fn spread(ticks: &[String], width: u16) -> String {
    let width = width as usize;
    match ticks {
        [] => String::new(),
        [only] => fit(only, width as u16),
        [first, .., last] => {
            let used = first.len() + last.len();
            if used + 1 > width {
                fit(first, width as u16)
            } else {
                format!("{first}{:pad$}{last}", "", pad = width - used)
            }
        }
    }
}

/// Truncate to `width` display columns.
fn fit(s: &str, width: u16) -> String {
    let width = width as usize;
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    let mut used = 0;
    s.chars()
        .take_while(|ch| {
            used += unicode_width::UnicodeWidthChar::width(*ch).unwrap_or(0);
            used <= width
        })
        .collect()
}

/// Run the viewer in the terminal until the user closes it.
pub fn run(result: &ComparisonResult) -> Result<(), String> {
    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {e}"))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).map_err(|e| format!("failed to create terminal: {e}"))?;
    let mut view = ComparisonView::new(result);
    event_loop(&mut terminal, &mut view)
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, view: &mut ComparisonView) -> Result<(), String> {
    loop {
        terminal
            .draw(|frame| view.draw(frame))
            .map_err(|e| format!("draw error: {e}"))?;

        if event::poll(Duration::from_millis(100)).map_err(|e| format!("event poll error: {e}"))? {
            if let Event::Key(key) = event::read().map_err(|e| format!("event read error: {e}"))? {
                if key.kind == KeyEventKind::Press {
                    view.handle_key(key);
                }
            }
        }

        if view.should_quit() {
            return Ok(());
        }
    }
}
