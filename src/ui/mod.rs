pub mod dashboard;
pub mod detail;
pub mod markdown;
pub mod spinner;
pub mod status_bar;
pub mod styles;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::action::{Action, Command};
use crate::app::App;

pub use dashboard::DashboardView;
pub use detail::DetailView;
pub use status_bar::StatusBar;
pub use styles::Styles;

/// One screen on the navigation stack.
///
/// `update` consumes the view and hands back its successor, so a view can
/// replace itself on a state transition. Most views return `self`.
pub trait View: Send {
    /// Called once, when the view is pushed.
    fn init(&mut self) -> Vec<Command>;

    fn update(self: Box<Self>, action: Action) -> (Box<dyn View>, Vec<Command>);

    fn render(&self, frame: &mut Frame, area: Rect);

    /// Short `key: action` hints for the status bar.
    fn key_hints(&self) -> Vec<String>;
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    match app.current_view() {
        Some(view) => view.render(frame, chunks[0]),
        None => render_centered(frame, chunks[0], Line::from("No view loaded")),
    }

    app.status_bar().render(frame, chunks[1]);
}

/// Draws a single line in the middle of `area`.
pub(crate) fn render_centered(frame: &mut Frame, area: Rect, line: Line<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(area);

    let paragraph = Paragraph::new(line)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default());
    frame.render_widget(paragraph, rows[1]);
}
