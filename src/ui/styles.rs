use ratatui::style::{Color, Modifier, Style};

/// Shared palette, built once and handed to every component by value.
#[derive(Debug, Clone, Copy)]
pub struct Styles {
    pub header: Style,
    pub status_bar: Style,
    pub selected_row: Style,
    pub normal_row: Style,
    pub issue_number: Style,
    pub issue_title: Style,
    pub muted: Style,
    pub spinner: Style,
    pub error: Style,
    pub status_loading: Style,
    pub status_error: Style,
    pub divider: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Indexed(12))
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default()
                .fg(Color::Indexed(245))
                .bg(Color::Indexed(236)),
            selected_row: Style::default()
                .fg(Color::Indexed(12))
                .add_modifier(Modifier::BOLD),
            normal_row: Style::default(),
            issue_number: Style::default().fg(Color::Indexed(241)),
            issue_title: Style::default().add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::Indexed(245)),
            spinner: Style::default().fg(Color::Indexed(205)),
            error: Style::default().fg(Color::Indexed(9)),
            status_loading: Style::default().fg(Color::Yellow).bg(Color::Indexed(236)),
            status_error: Style::default().fg(Color::Red).bg(Color::Indexed(236)),
            divider: Style::default().fg(Color::Indexed(238)),
        }
    }
}
