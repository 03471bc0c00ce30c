use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::action::{Action, Command, FetchResult};
use crate::data::{CommentClient, IssueClient};
use crate::keys::KeyMap;
use crate::types::{Comment, CommentListResult, Issue, IssueState};
use crate::util::color::{contrast_color, hex_to_color};
use crate::util::time::{format_time, DateFormat};

use super::markdown;
use super::spinner::Spinner;
use super::styles::Styles;
use super::{render_centered, View};

/// Only the first page of comments is shown.
const COMMENT_PAGE_SIZE: usize = 25;

/// A single issue with its body and first page of comments.
pub struct DetailView {
    issue_client: IssueClient,
    comment_client: Option<CommentClient>,
    spinner: Spinner,
    styles: Styles,
    keys: KeyMap,
    date_format: DateFormat,
    issue_number: u64,
    issue: Option<Issue>,
    comments: Vec<Comment>,
    loading: bool,
    loading_comments: bool,
    error: Option<String>,
    scroll: u16,
    width: u16,
    height: u16,
}

impl DetailView {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        issue_client: IssueClient,
        comment_client: Option<CommentClient>,
        styles: Styles,
        keys: KeyMap,
        date_format: DateFormat,
        issue_number: u64,
        width: u16,
        height: u16,
    ) -> Self {
        Self {
            issue_client,
            comment_client,
            spinner: Spinner::new(styles),
            styles,
            keys,
            date_format,
            issue_number,
            issue: None,
            comments: Vec::new(),
            loading: true,
            loading_comments: false,
            error: None,
            scroll: 0,
            width,
            height,
        }
    }

    fn fetch_comments(&mut self) -> Vec<Command> {
        let Some(client) = self.comment_client.clone() else {
            return vec![Command::info(format!("Loaded issue #{}", self.issue_number))];
        };
        self.loading_comments = true;
        let number = self.issue_number;
        tracing::debug!(number, "fetching comments");

        vec![
            Command::loading("Loading comments..."),
            Command::spawn(async move {
                let result = client
                    .list(number, COMMENT_PAGE_SIZE, None)
                    .await
                    .map_err(|e| e.to_string());
                Action::CommentsLoaded { number, result }
            }),
        ]
    }

    fn on_issue(&mut self, result: FetchResult<Box<Issue>>) -> Vec<Command> {
        self.loading = false;
        self.spinner.stop();
        match result {
            Ok(issue) => {
                self.error = None;
                self.issue = Some(*issue);
                self.fetch_comments()
            }
            Err(e) => {
                tracing::warn!(number = self.issue_number, error = %e, "issue fetch failed");
                self.error = Some(format!("Error loading issue: {e}"));
                vec![Command::error(e)]
            }
        }
    }

    fn on_comments(&mut self, result: FetchResult<CommentListResult>) -> Vec<Command> {
        self.loading_comments = false;
        match result {
            Ok(result) => {
                self.comments = result.comments;
                if self.comments.is_empty() {
                    vec![Command::info("No comments")]
                } else {
                    vec![Command::info(format!("Loaded {} comments", self.comments.len()))]
                }
            }
            Err(e) => {
                tracing::warn!(number = self.issue_number, error = %e, "comment fetch failed");
                self.error = Some(format!("Error loading comments: {e}"));
                vec![Command::error(e)]
            }
        }
    }

    fn max_scroll(&self) -> u16 {
        let total = self.content_lines().len();
        let visible = usize::from(self.height);
        u16::try_from(total.saturating_sub(visible)).unwrap_or(u16::MAX)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.keys.back.matches(&key) || self.keys.quit.matches(&key) {
            return vec![Command::Action(Action::NavigateBack)];
        }

        let page = self.height.max(1);
        let max = self.max_scroll();
        if self.keys.down.matches(&key) {
            self.scroll = self.scroll.saturating_add(1).min(max);
        } else if self.keys.up.matches(&key) {
            self.scroll = self.scroll.saturating_sub(1);
        } else if self.keys.page_down.matches(&key) {
            self.scroll = self.scroll.saturating_add(page).min(max);
        } else if self.keys.page_up.matches(&key) {
            self.scroll = self.scroll.saturating_sub(page);
        } else if self.keys.go_to_top.matches(&key) {
            self.scroll = 0;
        } else if self.keys.go_to_end.matches(&key) {
            self.scroll = max;
        }
        Vec::new()
    }

    pub fn handle(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.scroll = self.scroll.min(self.max_scroll());
                Vec::new()
            }
            Action::Tick => {
                self.spinner.tick();
                Vec::new()
            }
            Action::IssueDetailLoaded { number, result } if number == self.issue_number => {
                self.on_issue(result)
            }
            Action::CommentsLoaded { number, result } if number == self.issue_number => {
                self.on_comments(result)
            }
            Action::IssueDetailLoaded { number, .. } | Action::CommentsLoaded { number, .. } => {
                tracing::debug!(number, current = self.issue_number, "dropping result for another issue");
                Vec::new()
            }
            Action::Key(key) => self.handle_key(key),
            _ => Vec::new(),
        }
    }

    fn divider(&self, ch: &str) -> Line<'static> {
        let width = usize::from(self.width.max(1));
        let text: String = ch.repeat(width).chars().take(width).collect();
        Line::from(Span::styled(text, self.styles.divider))
    }

    fn label_line(&self, issue: &Issue) -> Option<Line<'static>> {
        if issue.labels.is_empty() {
            return None;
        }
        let mut spans = Vec::new();
        for (i, label) in issue.labels.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                format!(" {} ", label.name),
                Style::default()
                    .bg(hex_to_color(&label.color))
                    .fg(contrast_color(&label.color)),
            ));
        }
        Some(Line::from(spans))
    }

    fn metadata_line(&self, issue: &Issue) -> Line<'static> {
        let mut parts = vec![
            format!("State: {}", issue.state),
            format!("Author: {}", issue.author),
            format!("Created: {}", format_time(issue.created_at, &self.date_format)),
            format!("Updated: {}", format_time(issue.updated_at, &self.date_format)),
        ];
        if let Some(milestone) = &issue.milestone {
            parts.push(format!("Milestone: {milestone}"));
        }
        if !issue.assignees.is_empty() {
            parts.push(format!("Assignees: {}", issue.assignees.join(", ")));
        }
        Line::from(Span::styled(parts.join("  "), self.styles.muted))
    }

    fn comment_lines(&self, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(Span::styled(
            format!("Comments ({})", self.comments.len()),
            self.styles.header,
        )));
        lines.push(Line::default());

        for (i, comment) in self.comments.iter().enumerate() {
            let mut header = vec![
                Span::styled(comment.author.clone(), self.styles.issue_title),
                Span::raw(" "),
                Span::styled(
                    format_time(comment.created_at, &self.date_format),
                    self.styles.muted,
                ),
            ];
            if comment.reactions > 0 {
                header.push(Span::styled(
                    format!("  {} reactions", comment.reactions),
                    self.styles.muted,
                ));
            }
            lines.push(Line::from(header));
            lines.extend(markdown::render(&comment.body, Style::default()));

            if i + 1 < self.comments.len() {
                lines.push(Line::default());
                lines.push(self.divider("- "));
                lines.push(Line::default());
            }
        }
    }

    /// The scrollable body: header, metadata, labels, description and
    /// comments. Empty until the issue has loaded.
    pub fn content_lines(&self) -> Vec<Line<'static>> {
        let Some(issue) = &self.issue else {
            return Vec::new();
        };

        let state_style = match issue.state {
            IssueState::Open => self.styles.header,
            IssueState::Closed => self.styles.muted,
        };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(issue.title.clone(), state_style),
                Span::raw(" "),
                Span::styled(format!("#{}", issue.number), self.styles.issue_number),
            ]),
            self.metadata_line(issue),
        ];
        lines.extend(self.label_line(issue));
        lines.push(Line::default());
        lines.push(self.divider("─"));
        lines.push(Line::default());

        match issue.body.as_deref() {
            Some(body) => lines.extend(markdown::render(body, Style::default())),
            None => lines.push(Line::from(Span::styled(
                "No description provided.",
                self.styles.muted,
            ))),
        }

        lines.push(Line::default());
        lines.push(self.divider("─"));
        if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(err.clone(), self.styles.error)));
        } else if self.loading_comments {
            lines.push(Line::from(Span::styled(
                "Loading comments...",
                self.styles.muted,
            )));
        } else if !self.comments.is_empty() {
            self.comment_lines(&mut lines);
        } else if self.comment_client.is_some() {
            lines.push(Line::from(Span::styled("No comments", self.styles.muted)));
        }
        lines
    }
}

impl View for DetailView {
    fn init(&mut self) -> Vec<Command> {
        self.spinner.start("Loading issue...");
        let client = self.issue_client.clone();
        let number = self.issue_number;
        tracing::debug!(number, "fetching issue");

        vec![
            Command::loading("Loading issue..."),
            Command::spawn(async move {
                let result = client
                    .get(number)
                    .await
                    .map(Box::new)
                    .map_err(|e| e.to_string());
                Action::IssueDetailLoaded { number, result }
            }),
        ]
    }

    fn update(mut self: Box<Self>, action: Action) -> (Box<dyn View>, Vec<Command>) {
        let commands = self.handle(action);
        (self, commands)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.loading {
            render_centered(frame, area, self.spinner.view());
            return;
        }
        if self.issue.is_none() {
            let msg = self.error.clone().unwrap_or_default();
            render_centered(frame, area, Line::from(Span::styled(msg, self.styles.error)));
            return;
        }

        let paragraph = Paragraph::new(self.content_lines())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn key_hints(&self) -> Vec<String> {
        vec![
            "j/k: scroll".to_string(),
            "esc: back".to_string(),
            "q: back".to_string(),
        ]
    }
}
