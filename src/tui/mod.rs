//! Ratatui-based terminal UI.
//!
//! Three tabs:
//! - Data: one field over a date range, as a table and a chart
//! - Analysis: two fields over their own date range, as a table and one chart
//! - Predictions: oil price and exchange rate sliders feeding the price models
//!
//! The Data and Analysis tabs each own a `RangeSelection` and go through the
//! same query pipeline as the command line.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, LineGauge, List, ListItem, ListState, Paragraph, Row, Table, Tabs},
    Terminal,
};
use tracing::debug;

use crate::app::pipeline::{run_query, FieldSelection, QueryOutput};
use crate::app::AppContext;
use crate::domain::{
    Advisory, PredictionQuery, ViewMode, EXCHANGE_RATE_MAX, EXCHANGE_RATE_MIN, EXCHANGE_RATE_STEP,
    OIL_PRICE_MAX, OIL_PRICE_MIN, OIL_PRICE_STEP,
};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::fields::FieldSpec;
use crate::range::{Handle, RangeSelection};

mod plotters_chart;

use plotters_chart::{FuelChart, SERIES_COLORS};

/// Days moved by PageUp/PageDown on date rows.
const BIG_DATE_STEP: i64 = 30;
/// Slider steps moved by PageUp/PageDown.
const BIG_SLIDER_STEP: f64 = 10.0;

/// Start the TUI.
pub fn run(ctx: &AppContext) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(ctx);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Data,
    Analysis,
    Predictions,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Data, Tab::Analysis, Tab::Predictions];

    fn title(self) -> &'static str {
        match self {
            Tab::Data => "Data",
            Tab::Analysis => "Analysis",
            Tab::Predictions => "Predictions",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Charting tabs show the projected values next to the chart.
    fn shows_table(self) -> bool {
        matches!(self, Tab::Data | Tab::Analysis)
    }

    fn rows(self) -> &'static [Setting] {
        match self {
            Tab::Data => &[
                Setting::Field(0),
                Setting::Anchor,
                Setting::Period,
                Setting::Refine(Handle::Start),
                Setting::Refine(Handle::End),
            ],
            Tab::Analysis => &[
                Setting::Field(0),
                Setting::Field(1),
                Setting::Anchor,
                Setting::Period,
                Setting::Refine(Handle::Start),
                Setting::Refine(Handle::End),
            ],
            Tab::Predictions => &[Setting::OilPrice, Setting::ExchangeRate],
        }
    }
}

/// One adjustable row of the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    /// Field slot (0 = first, 1 = second).
    Field(usize),
    Anchor,
    Period,
    Refine(Handle),
    OilPrice,
    ExchangeRate,
}

/// Range and field state of one charting tab.
#[derive(Debug, Clone)]
struct RangeView {
    mode: ViewMode,
    /// Positions within the view's label list.
    fields: [usize; 2],
    selection: RangeSelection,
}

impl RangeView {
    fn field<'c>(&self, ctx: &'c AppContext, slot: usize) -> Option<&'c FieldSpec> {
        ctx.registry.nth(self.mode, self.fields[slot])
    }

    fn query(&self, ctx: &AppContext) -> Option<QueryOutput> {
        let fields = match self.mode {
            ViewMode::Single => FieldSelection::Single(self.field(ctx, 0)?),
            ViewMode::Comparison => FieldSelection::Compare(self.field(ctx, 0)?, self.field(ctx, 1)?),
        };
        Some(run_query(ctx, &self.selection, fields))
    }
}

/// Date text being typed into one of the date rows.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DateEdit {
    target: Setting,
    input: String,
}

struct App<'a> {
    ctx: &'a AppContext,
    tab: Tab,
    data: RangeView,
    analysis: RangeView,
    prediction: PredictionQuery,
    selected_row: usize,
    editing: Option<DateEdit>,
    status: String,
}

impl<'a> App<'a> {
    fn new(ctx: &'a AppContext) -> Self {
        let selection = RangeSelection::new(&ctx.bounds);
        Self {
            ctx,
            tab: Tab::Data,
            data: RangeView {
                mode: ViewMode::Single,
                fields: [0, 0],
                selection: selection.clone(),
            },
            analysis: RangeView {
                mode: ViewMode::Comparison,
                fields: [0, 1],
                selection,
            },
            prediction: PredictionQuery::default(),
            selected_row: 0,
            editing: None,
            status: format!("{} records loaded", ctx.dataset.len()),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.prev()),
            KeyCode::Up => self.selected_row = self.selected_row.saturating_sub(1),
            KeyCode::Down => {
                self.selected_row = (self.selected_row + 1).min(self.tab.rows().len() - 1);
            }
            KeyCode::Left => self.adjust(-1, false),
            KeyCode::Right => self.adjust(1, false),
            KeyCode::PageDown => self.adjust(-1, true),
            KeyCode::PageUp => self.adjust(1, true),
            KeyCode::Enter => self.start_date_edit(),
            KeyCode::Char('r') => self.reset_refinement(),
            _ => {}
        }
        false
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.selected_row = 0;
        self.status = format!("{} tab", tab.title());
    }

    fn current_setting(&self) -> Setting {
        let rows = self.tab.rows();
        rows[self.selected_row.min(rows.len() - 1)]
    }

    fn current_view_mut(&mut self) -> Option<&mut RangeView> {
        match self.tab {
            Tab::Data => Some(&mut self.data),
            Tab::Analysis => Some(&mut self.analysis),
            Tab::Predictions => None,
        }
    }

    fn current_view(&self) -> Option<&RangeView> {
        match self.tab {
            Tab::Data => Some(&self.data),
            Tab::Analysis => Some(&self.analysis),
            Tab::Predictions => None,
        }
    }

    fn adjust(&mut self, direction: i64, big: bool) {
        let setting = self.current_setting();
        let bounds = self.ctx.bounds;

        match setting {
            Setting::OilPrice => {
                let step = OIL_PRICE_STEP * if big { BIG_SLIDER_STEP } else { 1.0 };
                self.prediction.oil_price += step * direction as f64;
                self.prediction = self.prediction.clamped();
            }
            Setting::ExchangeRate => {
                let step = EXCHANGE_RATE_STEP * if big { BIG_SLIDER_STEP } else { 1.0 };
                let rate = self.prediction.exchange_rate + step * direction as f64;
                // Keep the rate on the 0.01 grid despite float drift.
                self.prediction.exchange_rate = (rate * 100.0).round() / 100.0;
                self.prediction = self.prediction.clamped();
            }
            Setting::Field(slot) => {
                let Some(view) = self.current_view() else { return };
                let count = self.ctx.registry.labels(view.mode).len().max(1) as i64;
                let next = (view.fields[slot] as i64 + direction).rem_euclid(count) as usize;
                if let Some(view) = self.current_view_mut() {
                    view.fields[slot] = next;
                }
            }
            Setting::Anchor => {
                let days = direction * if big { BIG_DATE_STEP } else { 1 };
                if let Some(view) = self.current_view_mut() {
                    view.selection.shift_anchor(days, &bounds);
                }
            }
            Setting::Period => {
                if let Some(view) = self.current_view_mut() {
                    let period = view.selection.period();
                    view.selection
                        .set_period(if direction >= 0 { period.next() } else { period.prev() });
                }
            }
            Setting::Refine(handle) => {
                let days = direction * if big { BIG_DATE_STEP } else { 1 };
                if let Some(view) = self.current_view_mut() {
                    view.selection.nudge(handle, days, &bounds);
                }
            }
        }
        self.status = self.describe(setting);
    }

    fn reset_refinement(&mut self) {
        let bounds = self.ctx.bounds;
        if let Some(view) = self.current_view_mut() {
            // Both ends default to the resolved interval, which always validates.
            let _ = view.selection.set_refinement(None, None, &bounds);
            self.status = "Refinement cleared.".to_string();
        }
    }

    fn start_date_edit(&mut self) {
        let setting = self.current_setting();
        if !matches!(setting, Setting::Anchor | Setting::Refine(_)) {
            return;
        }
        self.editing = Some(DateEdit {
            target: setting,
            input: String::new(),
        });
        self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        let Some(edit) = self.editing.as_mut() else { return };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let edit = self.editing.take();
                if let Some(edit) = edit {
                    self.apply_date_input(edit);
                }
            }
            KeyCode::Backspace => {
                edit.input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                edit.input.push(c);
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self, edit: DateEdit) {
        let trimmed = edit.input.trim();
        let date = match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                self.status = format!("Invalid date '{trimmed}': {e}");
                return;
            }
        };

        let bounds = self.ctx.bounds;
        let Some(view) = self.current_view_mut() else { return };
        let status = match edit.target {
            Setting::Anchor => {
                view.selection.set_anchor(date, &bounds);
                if view.selection.anchor() == date {
                    format!("Anchor: {date}")
                } else {
                    format!("Anchor moved into range: {}", view.selection.anchor())
                }
            }
            Setting::Refine(handle) => {
                let current = view.selection.interval(&bounds);
                let (start, end) = match handle {
                    Handle::Start => (date, current.end),
                    Handle::End => (current.start, date),
                };
                match view.selection.set_refinement(Some(start), Some(end), &bounds) {
                    Ok(interval) => format!("Showing {interval}"),
                    Err(e) => e.to_string(),
                }
            }
            _ => return,
        };
        debug!(%date, "date entered");
        self.status = status;
    }

    fn describe(&self, setting: Setting) -> String {
        match (setting, self.current_view()) {
            (Setting::OilPrice, _) => format!("oil: {:.0} USD/bbl", self.prediction.oil_price),
            (Setting::ExchangeRate, _) => format!("USD/PLN: {:.2}", self.prediction.exchange_rate),
            (Setting::Field(slot), Some(view)) => view
                .field(self.ctx, slot)
                .map(|f| f.label.clone())
                .unwrap_or_default(),
            (Setting::Anchor, Some(view)) => format!("anchor: {}", view.selection.anchor()),
            (Setting::Period, Some(view)) => format!("period: {}", view.selection.period().display_name()),
            (Setting::Refine(_), Some(view)) => format!("showing {}", view.selection.interval(&self.ctx.bounds)),
            _ => String::new(),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(4)])
            .split(size);

        let output = self.current_view().and_then(|v| v.query(self.ctx));

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Predictions => self.draw_predictions(frame, chunks[1]),
            _ => self.draw_range_tab(frame, chunks[1], output.as_ref()),
        }
        self.draw_footer(frame, chunks[2], output.as_ref());
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled("fuel", Style::default().fg(Color::Cyan))),
            )
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_range_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect, output: Option<&QueryOutput>) {
        let settings_height = self.tab.rows().len() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(settings_height)])
            .split(area);

        if self.tab.shows_table() {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(chunks[0]);
            self.draw_table(frame, cols[0], output);
            self.draw_chart(frame, cols[1], output);
        } else {
            self.draw_chart(frame, chunks[0], output);
        }
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, output: Option<&QueryOutput>) {
        let block = Block::default().title("Values").borders(Borders::ALL);
        let Some(projection) = output.and_then(|o| o.outcome.projection()) else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let rows = projection.rows.iter().map(|row| {
            let mut cells = vec![Cell::from(row.date_label.clone())];
            cells.extend(row.display.iter().map(|v| Cell::from(v.clone())));
            Row::new(cells)
        });
        let mut widths = vec![Constraint::Length(10)];
        widths.extend(projection.series.iter().map(|_| Constraint::Min(8)));

        let mut titles = vec!["date".to_string()];
        titles.extend(projection.series.iter().map(|s| s.key.name().to_string()));
        let header = Row::new(titles).style(Style::default().fg(Color::Gray));
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, output: Option<&QueryOutput>) {
        let title = match output.and_then(|o| o.outcome.projection()) {
            Some(p) => p
                .series
                .iter()
                .map(|s| s.label.as_str())
                .collect::<Vec<_>>()
                .join(" vs "),
            None => "Chart".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(projection) = output.and_then(|o| o.outcome.projection()) else {
            let msg = Paragraph::new(Advisory::WidenRange.to_string())
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            frame.render_widget(msg, inner);
            return;
        };

        let primary = projection.points(0);
        let secondary = (projection.series.len() > 1).then(|| projection.points(1));
        let mut all = vec![primary.as_slice()];
        if let Some(s) = &secondary {
            all.push(s.as_slice());
        }
        let (_, y_bounds) = FuelChart::bounds_for(&all);
        let x_bounds = [0.0, (projection.interval.span_days() as f64).max(1.0)];

        let y_label = match projection.mode {
            ViewMode::Single => "value",
            ViewMode::Comparison => "normalized",
        };
        let widget = FuelChart {
            primary: &primary,
            secondary: secondary.as_deref(),
            start: projection.interval.start,
            x_bounds,
            y_bounds,
            y_label,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(view) = self.current_view() else { return };
        let bounds = self.ctx.bounds;
        let interval = view.selection.interval(&bounds);

        let items: Vec<ListItem> = self
            .tab
            .rows()
            .iter()
            .map(|&setting| {
                let text = match setting {
                    Setting::Field(slot) => {
                        let label = view.field(self.ctx, slot).map(|f| f.label.as_str()).unwrap_or("-");
                        let name = if slot == 0 && view.mode == ViewMode::Comparison {
                            "First"
                        } else if slot == 1 {
                            "Second"
                        } else {
                            "Field"
                        };
                        let color = Color::Rgb(SERIES_COLORS[slot].0, SERIES_COLORS[slot].1, SERIES_COLORS[slot].2);
                        return ListItem::new(Line::from(vec![
                            Span::raw(format!("{name}: ")),
                            Span::styled(label.to_string(), Style::default().fg(color)),
                        ]));
                    }
                    Setting::Anchor => format!("From: {}", view.selection.anchor()),
                    Setting::Period => format!("Period: {}", view.selection.period().display_name()),
                    Setting::Refine(Handle::Start) => format!("Show from: {}", interval.start),
                    Setting::Refine(Handle::End) => format!("Show to: {}", interval.end),
                    Setting::OilPrice | Setting::ExchangeRate => String::new(),
                };
                ListItem::new(text)
            })
            .collect();

        let title = if view.selection.is_refined() {
            "Settings (refined)"
        } else {
            "Settings"
        };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_row));
        frame.render_stateful_widget(list, area, &mut state);

        if let Some(edit) = &self.editing {
            let hint = Paragraph::new(format!("Date: {}_", edit.input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(1),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_predictions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let q = self.prediction;
        let sliders = [
            (
                format!("Crude oil price: {:.0} USD/bbl", q.oil_price),
                (q.oil_price - OIL_PRICE_MIN) / (OIL_PRICE_MAX - OIL_PRICE_MIN),
            ),
            (
                format!("USD/PLN exchange rate: {:.2}", q.exchange_rate),
                (q.exchange_rate - EXCHANGE_RATE_MIN) / (EXCHANGE_RATE_MAX - EXCHANGE_RATE_MIN),
            ),
        ];
        for (i, (label, ratio)) in sliders.into_iter().enumerate() {
            let style = if i == self.selected_row {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            let gauge = LineGauge::default()
                .block(Block::default().borders(Borders::ALL).title(label))
                .filled_style(style)
                .ratio(ratio.clamp(0.0, 1.0));
            frame.render_widget(gauge, chunks[i]);
        }

        let prediction = self.ctx.models.predict(&q);
        let text = Text::from(vec![
            Line::from(format!("Ekodiesel:    {:.2} PLN/l", prediction.diesel)),
            Line::from(format!("Eurosuper 95: {:.2} PLN/l", prediction.super95)),
        ]);
        let p = Paragraph::new(text).block(
            Block::default()
                .title("Predicted wholesale net prices")
                .borders(Borders::ALL),
        );
        frame.render_widget(p, chunks[2]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect, output: Option<&QueryOutput>) {
        let help = "Tab switch  ↑/↓ select  ←/→ adjust  PgUp/PgDn ×10  Enter edit date  r reset  q quit";
        let advisories = output.map(|o| o.advisories.as_slice()).unwrap_or_default();
        let notice = if advisories.is_empty() {
            Span::styled(self.status.as_str(), Style::default().fg(Color::Yellow))
        } else {
            let text = advisories.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" | ");
            Span::styled(text, Style::default().fg(Color::LightRed))
        };
        let lines = vec![
            Line::from(Span::styled(help, Style::default().fg(Color::Gray))),
            Line::from(notice),
        ];
        let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
