use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::action::{Action, Command, FetchResult};
use crate::data::{IssueClient, Paginator};
use crate::keys::KeyMap;
use crate::types::{Issue, IssueListOptions, IssueListResult, IssueState};
use crate::util::color::{contrast_color, hex_to_color};
use crate::util::time::relative_time;
use crate::util::truncate;

use super::spinner::Spinner;
use super::styles::Styles;
use super::{render_centered, View};

/// Rows per issue: title line and meta line.
const ITEM_HEIGHT: usize = 2;

/// Open issues of the repository, paged on demand.
pub struct DashboardView {
    client: IssueClient,
    paginator: Paginator,
    spinner: Spinner,
    styles: Styles,
    keys: KeyMap,
    issues: Vec<Issue>,
    selected: usize,
    loading: bool,
    loading_more: bool,
    error: Option<String>,
    title: String,
    width: u16,
    height: u16,
    /// Bumped on refresh; results from older generations are dropped.
    load_id: u64,
}

impl DashboardView {
    pub fn new(
        client: IssueClient,
        styles: Styles,
        keys: KeyMap,
        page_size: i64,
        width: u16,
        height: u16,
    ) -> Self {
        Self {
            client,
            paginator: Paginator::new(page_size),
            spinner: Spinner::new(styles),
            styles,
            keys,
            issues: Vec::new(),
            selected: 0,
            loading: true,
            loading_more: false,
            error: None,
            title: "Open Issues".to_string(),
            width,
            height,
            load_id: 0,
        }
    }

    fn selected(&self) -> Option<&Issue> {
        self.issues.get(self.selected)
    }

    fn fetch(&self, first: usize, after: Option<String>, append: bool) -> Command {
        let client = self.client.clone();
        let load_id = self.load_id;
        tracing::debug!(first, ?after, append, load_id, "fetching issues");

        Command::spawn(async move {
            let opts = IssueListOptions {
                states: vec![IssueState::Open],
                first,
                after,
                ..Default::default()
            };
            let result = client.list(opts).await.map_err(|e| e.to_string());
            if append {
                Action::IssuesPageLoaded {
                    result,
                    append,
                    load_id,
                }
            } else {
                Action::IssuesLoaded { result, load_id }
            }
        })
    }

    fn start_load(&mut self, label: &str, status: &str) -> Vec<Command> {
        self.loading = true;
        self.loading_more = false;
        self.error = None;
        self.spinner.start(label);
        vec![
            Command::loading(status),
            self.fetch(self.paginator.page_size(), None, false),
        ]
    }

    fn refresh(&mut self) -> Vec<Command> {
        self.load_id += 1;
        self.start_load("Refreshing...", "Refreshing issues...")
    }

    fn load_more(&mut self) -> Vec<Command> {
        if self.loading || self.loading_more {
            return Vec::new();
        }
        match self.paginator.next_page_request() {
            Some(req) => {
                self.loading_more = true;
                self.spinner.start("Loading more...");
                vec![
                    Command::loading("Loading more issues..."),
                    self.fetch(req.first, req.after, true),
                ]
            }
            None => vec![self.showing()],
        }
    }

    fn showing(&self) -> Command {
        Command::info(format!("Showing {} issues", self.paginator.total_loaded()))
    }

    fn on_loaded(&mut self, result: FetchResult<IssueListResult>, append: bool) -> Vec<Command> {
        if append {
            self.loading_more = false;
        } else {
            self.loading = false;
        }
        self.spinner.stop();

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, append, "issue list fetch failed");
                let msg = if append {
                    format!("Error loading more issues: {e}")
                } else {
                    format!("Error loading issues: {e}")
                };
                self.error = Some(msg);
                return vec![Command::error(e)];
            }
        };

        self.error = None;
        let count = result.issues.len();
        if append {
            self.paginator.update(&result.page_info, count);
            self.issues.extend(result.issues);
        } else {
            self.paginator.reset();
            self.paginator.update(&result.page_info, count);
            self.issues = result.issues;
            self.selected = 0;
        }
        self.update_title();
        vec![self.showing()]
    }

    fn update_title(&mut self) {
        let total = self.paginator.total_loaded();
        self.title = if self.paginator.has_next_page() {
            format!("Open Issues (showing {total}+)")
        } else {
            format!("Open Issues ({total})")
        };
    }

    fn is_current(&self, load_id: u64) -> bool {
        if load_id != self.load_id {
            tracing::debug!(load_id, current = self.load_id, "dropping stale issue list");
            return false;
        }
        true
    }

    fn page_rows(&self) -> usize {
        (usize::from(self.height.saturating_sub(2)) / ITEM_HEIGHT).max(1)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let last = self.issues.len().saturating_sub(1);

        if self.keys.open.matches(&key) {
            if let Some(issue) = self.selected() {
                return vec![Command::Action(Action::NavigateToDetail(issue.number))];
            }
        } else if self.keys.refresh.matches(&key) {
            return self.refresh();
        } else if self.keys.next_page.matches(&key) {
            return self.load_more();
        } else if self.keys.down.matches(&key) {
            self.selected = (self.selected + 1).min(last);
        } else if self.keys.up.matches(&key) {
            self.selected = self.selected.saturating_sub(1);
        } else if self.keys.page_down.matches(&key) {
            self.selected = (self.selected + self.page_rows()).min(last);
        } else if self.keys.page_up.matches(&key) {
            self.selected = self.selected.saturating_sub(self.page_rows());
        } else if self.keys.go_to_top.matches(&key) {
            self.selected = 0;
        } else if self.keys.go_to_end.matches(&key) {
            self.selected = last;
        }
        Vec::new()
    }

    /// Applies one action in place.
    pub fn handle(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Resize { width, height } => {
                self.width = width;
                self.height = height;
                Vec::new()
            }
            Action::Tick => {
                self.spinner.tick();
                Vec::new()
            }
            Action::IssuesLoaded { result, load_id } => {
                if !self.is_current(load_id) {
                    return Vec::new();
                }
                self.on_loaded(result, false)
            }
            Action::IssuesPageLoaded {
                result,
                append,
                load_id,
            } => {
                if !self.is_current(load_id) {
                    return Vec::new();
                }
                self.on_loaded(result, append)
            }
            Action::Key(key) => self.handle_key(key),
            _ => Vec::new(),
        }
    }

    fn issue_item(&self, index: usize, issue: &Issue, title_width: usize) -> ListItem<'static> {
        let selected = index == self.selected;
        let (number_style, title_style) = if selected {
            (self.styles.selected_row, self.styles.selected_row)
        } else {
            (self.styles.issue_number, self.styles.issue_title)
        };
        let cursor = if selected { "> " } else { "  " };

        let mut title = vec![
            Span::raw(cursor),
            Span::styled(format!("#{:<5}", issue.number), number_style),
            Span::raw(" "),
            Span::styled(truncate(&issue.title, title_width), title_style),
        ];
        for label in &issue.labels {
            title.push(Span::raw(" "));
            title.push(Span::styled(
                format!(" {} ", label.name),
                Style::default()
                    .bg(hex_to_color(&label.color))
                    .fg(contrast_color(&label.color)),
            ));
        }

        let mut meta = format!(
            "         {}  {}",
            issue.author,
            relative_time(issue.created_at)
        );
        if issue.comment_count > 0 {
            meta.push_str(&format!("  {} comments", issue.comment_count));
        }
        if issue.reaction_count > 0 {
            meta.push_str(&format!("  {} reactions", issue.reaction_count));
        }
        let meta_style = if selected {
            self.styles.muted
        } else {
            self.styles.issue_number
        };

        ListItem::new(Text::from(vec![
            Line::from(title),
            Line::from(Span::styled(meta, meta_style)),
        ]))
    }
}

impl View for DashboardView {
    fn init(&mut self) -> Vec<Command> {
        self.start_load("Loading issues...", "Loading issues...")
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
        if self.issues.is_empty() {
            let line = match &self.error {
                Some(err) => Line::from(Span::styled(err.clone(), self.styles.error)),
                None => Line::from(Span::styled("No open issues", self.styles.muted)),
            };
            render_centered(frame, area, line);
            return;
        }

        // a failed page load keeps the list and shows the error above it
        let (banner, list_area) = if self.error.is_some() || self.loading_more {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(area);
            (Some(chunks[0]), chunks[1])
        } else {
            (None, area)
        };
        if let Some(banner) = banner {
            let line = match &self.error {
                Some(err) => Line::from(Span::styled(err.clone(), self.styles.error)),
                None => self.spinner.view(),
            };
            frame.render_widget(line, banner);
        }

        // border(2) + cursor(2) + number(6) + space(1)
        let title_width = usize::from(list_area.width).saturating_sub(11).max(10);
        let items: Vec<ListItem> = self
            .issues
            .iter()
            .enumerate()
            .map(|(i, issue)| self.issue_item(i, issue, title_width))
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {} ", self.title),
                    self.styles.header.add_modifier(Modifier::BOLD),
                )),
        );

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    fn key_hints(&self) -> Vec<String> {
        let mut hints = vec![
            "j/k: navigate".to_string(),
            "enter: open".to_string(),
            "R: refresh".to_string(),
        ];
        if self.paginator.has_next_page() {
            hints.push("L: load more".to_string());
        }
        hints.push("q: quit".to_string());
        hints
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    use super::*;
    use crate::data::testing::MockQuerier;
    use crate::types::PageInfo;
    use crate::ui::testing::buffer_lines;

    fn issue(number: u64, title: &str) -> Issue {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        Issue {
            number,
            title: title.to_string(),
            state: IssueState::Open,
            created_at: at,
            updated_at: at,
            author: "octocat".to_string(),
            labels: Vec::new(),
            assignees: Vec::new(),
            milestone: None,
            comment_count: 0,
            reaction_count: 0,
            body: None,
        }
    }

    fn page(numbers: &[u64], has_next_page: bool) -> IssueListResult {
        IssueListResult {
            issues: numbers
                .iter()
                .map(|n| issue(*n, &format!("Issue {n}")))
                .collect(),
            page_info: PageInfo {
                has_next_page,
                end_cursor: if has_next_page { "c1".into() } else { String::new() },
            },
        }
    }

    fn view_with(querier: MockQuerier) -> DashboardView {
        let client = IssueClient::new(Arc::new(querier), "owner", "repo");
        DashboardView::new(client, Styles::default(), KeyMap::default(), 50, 80, 23)
    }

    fn view() -> DashboardView {
        view_with(MockQuerier::default())
    }

    fn key(c: char) -> Action {
        Action::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn loaded(view: &mut DashboardView, numbers: &[u64], has_next: bool) -> Vec<Command> {
        view.handle(Action::IssuesLoaded {
            result: Ok(page(numbers, has_next)),
            load_id: 0,
        })
    }

    fn info_text(commands: &[Command]) -> Option<String> {
        commands.iter().find_map(|c| match c {
            Command::Action(Action::Status(crate::action::StatusUpdate::Info(msg))) => {
                Some(msg.clone())
            }
            _ => None,
        })
    }

    #[test]
    fn init_starts_loading_and_fetches() {
        let mut v = view();
        let commands = v.init();
        assert!(v.loading);
        assert_eq!(commands.len(), 2);
        assert!(commands.iter().any(|c| matches!(c, Command::Spawn(_))));
    }

    #[tokio::test]
    async fn initial_fetch_requests_open_issues() {
        let querier = Arc::new(MockQuerier::with_response(json!({
            "repository": { "issues": {
                "nodes": [],
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            }}
        })));
        let client = IssueClient::new(querier.clone(), "owner", "repo");
        let mut v = DashboardView::new(client, Styles::default(), KeyMap::default(), 20, 80, 23);

        let spawned = v
            .init()
            .into_iter()
            .find_map(|c| match c {
                Command::Spawn(fut) => Some(fut),
                _ => None,
            })
            .unwrap();
        let action = spawned.await;

        assert!(matches!(action, Action::IssuesLoaded { result: Ok(_), load_id: 0 }));
        let vars = querier.variables();
        assert_eq!(vars["states"], json!(["OPEN"]));
        assert_eq!(vars["first"], json!(20));
    }

    #[test]
    fn successful_load_holds_items() {
        let mut v = view();
        v.init();
        let commands = loaded(&mut v, &[1, 2, 3], false);

        assert!(!v.loading);
        assert!(v.error.as_deref().is_none());
        assert_eq!(v.issues.len(), 3);
        assert_eq!(v.title, "Open Issues (3)");
        assert_eq!(info_text(&commands).as_deref(), Some("Showing 3 issues"));
    }

    #[test]
    fn failed_load_sets_error() {
        let mut v = view();
        v.init();
        let commands = v.handle(Action::IssuesLoaded {
            result: Err("API error: HTTP 500: boom".into()),
            load_id: 0,
        });

        assert!(!v.loading);
        assert!(v.issues.is_empty());
        let err = v.error.as_deref().unwrap();
        assert!(err.starts_with("Error loading issues:"), "{err}");
        assert!(commands.iter().any(|c| matches!(
            c,
            Command::Action(Action::Status(crate::action::StatusUpdate::Error(_)))
        )));
    }

    #[test]
    fn enter_opens_selected_issue() {
        let mut v = view();
        loaded(&mut v, &[42, 7], false);

        let commands = v.handle(Action::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(matches!(
            commands.as_slice(),
            [Command::Action(Action::NavigateToDetail(42))]
        ));

        v.handle(key('j'));
        let commands = v.handle(Action::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(matches!(
            commands.as_slice(),
            [Command::Action(Action::NavigateToDetail(7))]
        ));
    }

    #[test]
    fn enter_with_no_issues_does_nothing() {
        let mut v = view();
        loaded(&mut v, &[], false);
        let commands = v.handle(Action::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(commands.is_empty());
    }

    #[test]
    fn navigation_is_clamped() {
        let mut v = view();
        loaded(&mut v, &[1, 2, 3], false);

        v.handle(key('k'));
        assert_eq!(v.selected().unwrap().number, 1);
        v.handle(key('G'));
        assert_eq!(v.selected().unwrap().number, 3);
        v.handle(key('j'));
        assert_eq!(v.selected().unwrap().number, 3);
        v.handle(key('g'));
        assert_eq!(v.selected().unwrap().number, 1);
    }

    #[test]
    fn load_more_appends_and_exhausts() {
        let mut v = view();
        loaded(&mut v, &[1, 2], true);
        assert_eq!(v.title, "Open Issues (showing 2+)");
        assert!(v.key_hints().contains(&"L: load more".to_string()));

        let commands = v.handle(key('L'));
        assert!(commands.iter().any(|c| matches!(c, Command::Spawn(_))));
        // a second press while in flight is ignored
        assert!(v.handle(key('L')).is_empty());

        v.handle(Action::IssuesPageLoaded {
            result: Ok(page(&[3], false)),
            append: true,
            load_id: 0,
        });
        let numbers: Vec<u64> = v.issues.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(v.title, "Open Issues (3)");
        assert!(!v.key_hints().contains(&"L: load more".to_string()));

        let commands = v.handle(key('L'));
        assert_eq!(info_text(&commands).as_deref(), Some("Showing 3 issues"));
    }

    #[test]
    fn failed_page_keeps_items() {
        let mut v = view();
        loaded(&mut v, &[1, 2], true);
        v.handle(key('L'));
        v.handle(Action::IssuesPageLoaded {
            result: Err("dial tcp: i/o timeout".into()),
            append: true,
            load_id: 0,
        });

        assert_eq!(v.issues.len(), 2);
        assert!(v.error.as_deref().unwrap().starts_with("Error loading more issues:"));
    }

    #[test]
    fn refresh_drops_stale_results() {
        let mut v = view();
        loaded(&mut v, &[1, 2], true);
        v.handle(key('L'));

        let commands = v.handle(key('R'));
        assert!(v.loading);
        assert!(commands.iter().any(|c| matches!(c, Command::Spawn(_))));

        // the page requested before the refresh arrives late
        let commands = v.handle(Action::IssuesPageLoaded {
            result: Ok(page(&[3], false)),
            append: true,
            load_id: 0,
        });
        assert!(commands.is_empty());
        assert_eq!(v.issues.len(), 2);

        v.handle(Action::IssuesLoaded {
            result: Ok(page(&[10], false)),
            load_id: 1,
        });
        assert!(!v.loading);
        assert_eq!(v.issues.len(), 1);
        assert_eq!(v.selected().unwrap().number, 10);
    }

    #[test]
    fn resize_does_not_refetch() {
        let mut v = view();
        loaded(&mut v, &[1], false);
        let commands = v.handle(Action::Resize {
            width: 120,
            height: 40,
        });
        assert!(commands.is_empty());
        assert_eq!((v.width, v.height), (120, 40));
    }

    #[test]
    fn renders_title_and_rows() {
        let mut v = view();
        let mut issues = page(&[42], false);
        issues.issues[0].title = "Crash on startup".into();
        issues.issues[0].comment_count = 3;
        v.handle(Action::IssuesLoaded {
            result: Ok(issues),
            load_id: 0,
        });

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal
            .draw(|frame| v.render(frame, frame.area()))
            .unwrap();
        let lines = buffer_lines(terminal.backend().buffer());

        assert!(lines[0].contains("Open Issues (1)"), "{lines:?}");
        assert!(lines[1].contains("> #42"), "{lines:?}");
        assert!(lines[1].contains("Crash on startup"), "{lines:?}");
        assert!(lines[2].contains("octocat"), "{lines:?}");
        assert!(lines[2].contains("3 comments"), "{lines:?}");
    }
}
