use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::StatusUpdate;
use crate::util::{display_width, truncate};

use super::styles::Styles;

const NETWORK_KEYWORDS: &[&str] = &[
    "dial tcp",
    "connection refused",
    "no such host",
    "i/o timeout",
    "network is unreachable",
    "timeout",
    "tls",
    "temporary failure",
    "error sending request",
    "connection reset",
];

/// Failure categories, derived from the error text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    Permission,
    NotFound,
    Api,
}

impl ErrorKind {
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if NETWORK_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            ErrorKind::Network
        } else if text.contains("401") {
            ErrorKind::Auth
        } else if text.contains("403") {
            ErrorKind::Permission
        } else if text.contains("404") {
            ErrorKind::NotFound
        } else {
            ErrorKind::Api
        }
    }

    /// Replacement text for well-known HTTP failures.
    fn guidance(self) -> Option<&'static str> {
        match self {
            ErrorKind::Auth => Some("Run gh auth login to re-authenticate"),
            ErrorKind::Permission => Some("Check your permissions for this repository"),
            ErrorKind::NotFound => Some("Repository not found"),
            ErrorKind::Network | ErrorKind::Api => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum MessageClass {
    #[default]
    Plain,
    Info,
    Loading,
    Network,
    Api,
}

impl MessageClass {
    fn prefix(self) -> &'static str {
        match self {
            MessageClass::Loading => "loading: ",
            MessageClass::Network => "network: ",
            MessageClass::Api => "api: ",
            MessageClass::Plain | MessageClass::Info => "",
        }
    }
}

/// Bottom line: repository on the left, key hints centered, latest message
/// on the right.
#[derive(Debug, Clone)]
pub struct StatusBar {
    repo_name: String,
    key_hints: Vec<String>,
    message: String,
    class: MessageClass,
    width: u16,
    styles: Styles,
}

impl StatusBar {
    pub fn new(styles: Styles) -> Self {
        Self {
            repo_name: String::new(),
            key_hints: Vec::new(),
            message: String::new(),
            class: MessageClass::Plain,
            width: 0,
            styles,
        }
    }

    pub fn set_repo_name(&mut self, name: impl Into<String>) {
        self.repo_name = name.into();
    }

    pub fn set_key_hints(&mut self, hints: Vec<String>) {
        self.key_hints = hints;
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.class = MessageClass::Plain;
    }

    pub fn set_info(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.class = MessageClass::Info;
    }

    pub fn set_loading(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.class = MessageClass::Loading;
    }

    pub fn set_error(&mut self, err: &str) {
        let text = err.trim();
        if text.is_empty() {
            self.set_message("");
            return;
        }

        let kind = ErrorKind::classify(text);
        self.class = match kind {
            ErrorKind::Network => MessageClass::Network,
            _ => MessageClass::Api,
        };
        self.message = kind.guidance().unwrap_or(text).to_string();
    }

    pub fn apply(&mut self, update: &StatusUpdate) {
        match update {
            StatusUpdate::Info(msg) => self.set_info(msg.as_str()),
            StatusUpdate::Loading(msg) => self.set_loading(msg.as_str()),
            StatusUpdate::Error(msg) => self.set_error(msg),
            StatusUpdate::Clear => self.set_message(""),
        }
    }

    pub fn message(&self) -> String {
        if self.message.is_empty() {
            return String::new();
        }
        format!("{}{}", self.class.prefix(), self.message)
    }

    pub fn key_hints(&self) -> &[String] {
        &self.key_hints
    }

    /// The bar as plain text at the stored width.
    pub fn compose(&self) -> String {
        let (left, center, right) = self.segments(self.width as usize);
        format!("{left}{center}{right}")
    }

    /// Splits the bar into left, padded center and right. The three parts
    /// together never exceed `width` columns.
    fn segments(&self, width: usize) -> (String, String, String) {
        let left = self.repo_name.clone();
        let center = self.key_hints.join(" | ");
        let right = self.message();

        if width == 0 {
            let joined = [left, center, right]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            return (joined, String::new(), String::new());
        }

        let right = truncate(&right, (width / 3).max(20).min(width));
        let right_w = display_width(&right);

        let gap = usize::from(!left.is_empty() && !right.is_empty());
        let left_max = (width / 4).max(12).min(width.saturating_sub(right_w + gap));
        let left = truncate(&left, left_max);
        let left_w = display_width(&left);

        let available = width - left_w - right_w;
        let left_gap = usize::from(!left.is_empty());
        let right_gap = usize::from(!right.is_empty());
        let center = truncate(
            &center,
            available.saturating_sub(left_gap + right_gap),
        );

        let padding = available - display_width(&center);
        let left_pad = (padding / 2).max(left_gap).min(padding);
        let right_pad = padding - left_pad;
        let center = format!(
            "{}{}{}",
            " ".repeat(left_pad),
            center,
            " ".repeat(right_pad)
        );

        (left, center, right)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (left, center, right) = self.segments(area.width as usize);
        let right_style = match self.class {
            MessageClass::Loading => self.styles.status_loading,
            MessageClass::Network | MessageClass::Api => self.styles.status_error,
            MessageClass::Plain | MessageClass::Info => self.styles.status_bar,
        };

        let line = Line::from(vec![
            Span::styled(left, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(center),
            Span::styled(right, right_style),
        ]);
        frame.render_widget(Paragraph::new(line).style(self.styles.status_bar), area);
    }
}
