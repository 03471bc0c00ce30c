use futures::FutureExt;

use crate::action::{Action, Command, ViewId};
use crate::keys::KeyMap;
use crate::ui::{StatusBar, Styles, View};

/// Builds the detail view for an issue number, sized to the content area.
pub type DetailFactory = Box<dyn Fn(u64, u16, u16) -> Box<dyn View> + Send>;

struct Entry {
    id: ViewId,
    view: Box<dyn View>,
}

/// Owns the view stack and the status bar. Global keys are handled here;
/// everything else goes to the view on top, except the results of spawned
/// work, which go back to the view that spawned it.
pub struct App {
    view_stack: Vec<Entry>,
    status_bar: StatusBar,
    keys: KeyMap,
    detail_factory: Option<DetailFactory>,
    next_id: u64,
    width: u16,
    height: u16,
}

impl App {
    pub fn new(styles: Styles, keys: KeyMap, repo_name: &str, width: u16, height: u16) -> Self {
        let mut status_bar = StatusBar::new(styles);
        status_bar.set_repo_name(repo_name);
        status_bar.set_width(width);

        Self {
            view_stack: Vec::new(),
            status_bar,
            keys,
            detail_factory: None,
            next_id: 0,
            width,
            height,
        }
    }

    pub fn with_detail_factory(mut self, factory: DetailFactory) -> Self {
        self.detail_factory = Some(factory);
        self
    }

    /// Pushes `view` and returns its init commands for the loop to run.
    pub fn push_view(&mut self, mut view: Box<dyn View>) -> Vec<Command> {
        let id = ViewId(self.next_id);
        self.next_id += 1;

        let commands = view.init();
        self.status_bar.set_key_hints(view.key_hints());
        self.view_stack.push(Entry { id, view });
        route(id, commands)
    }

    /// Pops the top view and returns the commands of the view it uncovers.
    /// The root view is never popped.
    pub fn pop_view(&mut self) -> Option<Vec<Command>> {
        if self.view_stack.len() <= 1 {
            return None;
        }
        self.view_stack.pop();

        // resizes only reach the top view, so the uncovered one may be stale
        let resize = Action::Resize {
            width: self.width,
            height: self.content_height(),
        };
        Some(self.delegate(resize))
    }

    pub fn current_view(&self) -> Option<&dyn View> {
        self.view_stack.last().map(|entry| entry.view.as_ref())
    }

    pub fn view_stack_len(&self) -> usize {
        self.view_stack.len()
    }

    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Rows left for views once the status bar is drawn.
    pub fn content_height(&self) -> u16 {
        self.height.saturating_sub(1)
    }

    fn refresh_key_hints(&mut self) {
        let hints = self
            .view_stack
            .last()
            .map(|entry| entry.view.key_hints())
            .unwrap_or_default();
        self.status_bar.set_key_hints(hints);
    }

    pub fn update(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.status_bar.set_width(width);
                self.delegate(Action::Resize {
                    width,
                    height: self.content_height(),
                })
            }
            Action::Key(key) if self.keys.force_quit.matches(&key) => vec![Command::Quit],
            Action::Key(key) if self.keys.quit.matches(&key) && self.view_stack.len() <= 1 => {
                vec![Command::Quit]
            }
            Action::NavigateToDetail(number) => {
                self.status_bar.set_message("");
                let view = match &self.detail_factory {
                    Some(factory) => factory(number, self.width, self.content_height()),
                    None => {
                        tracing::warn!(number, "no detail view configured");
                        return Vec::new();
                    }
                };
                self.push_view(view)
            }
            Action::NavigateBack => {
                let commands = self.pop_view().unwrap_or_default();
                self.status_bar.set_message("");
                commands
            }
            Action::Status(update) => {
                self.status_bar.apply(&update);
                Vec::new()
            }
            Action::Routed { view, action } => {
                match self.view_stack.iter().position(|entry| entry.id == view) {
                    Some(index) => self.deliver(index, *action),
                    None => {
                        tracing::debug!(?view, "dropping result for a closed view");
                        Vec::new()
                    }
                }
            }
            action => self.delegate(action),
        }
    }

    fn delegate(&mut self, action: Action) -> Vec<Command> {
        match self.view_stack.len().checked_sub(1) {
            Some(top) => self.deliver(top, action),
            None => Vec::new(),
        }
    }

    /// Runs `action` through the view at `index`. Views below the top keep
    /// their state current but do not touch the status bar.
    fn deliver(&mut self, index: usize, action: Action) -> Vec<Command> {
        let Entry { id, view } = self.view_stack.remove(index);
        let (view, commands) = view.update(action);
        self.view_stack.insert(index, Entry { id, view });
        self.refresh_key_hints();

        let commands = route(id, commands);
        if index + 1 == self.view_stack.len() {
            return commands;
        }
        commands
            .into_iter()
            .filter(|command| !matches!(command, Command::Action(Action::Status(_))))
            .collect()
    }
}

/// Addresses the output of spawned work back to the view `id`.
fn route(id: ViewId, commands: Vec<Command>) -> Vec<Command> {
    commands
        .into_iter()
        .map(|command| match command {
            Command::Spawn(fut) => Command::Spawn(
                fut.map(move |action| Action::Routed {
                    view: id,
                    action: Box::new(action),
                })
                .boxed(),
            ),
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;
    use ratatui::text::Line;
    use ratatui::{Frame, Terminal};

    use super::*;
    use crate::action::StatusUpdate;
    use crate::ui::testing::buffer_lines;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records what it receives; its name doubles as its only key hint.
    /// Its init spawns work that finishes with a `Tick`.
    struct MockView {
        name: String,
        log: Log,
    }

    impl MockView {
        fn boxed(name: &str, log: &Log) -> Box<dyn View> {
            Box::new(MockView {
                name: name.to_string(),
                log: log.clone(),
            })
        }

        fn record(&self, entry: String) {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, entry));
        }
    }

    impl View for MockView {
        fn init(&mut self) -> Vec<Command> {
            self.record("init".to_string());
            vec![
                Command::info(format!("{} ready", self.name)),
                Command::spawn(async { Action::Tick }),
            ]
        }

        fn update(self: Box<Self>, action: Action) -> (Box<dyn View>, Vec<Command>) {
            let entry = match &action {
                Action::Key(key) => format!("key {:?}", key.code),
                Action::Resize { width, height } => format!("resize {width}x{height}"),
                other => format!("{other:?}"),
            };
            self.record(entry);
            (self, Vec::new())
        }

        fn render(&self, frame: &mut Frame, area: Rect) {
            frame.render_widget(Line::from(format!("view {}", self.name)), area);
        }

        fn key_hints(&self) -> Vec<String> {
            vec![self.name.clone()]
        }
    }

    fn app() -> App {
        App::new(Styles::default(), KeyMap::default(), "owner/repo", 80, 24)
    }

    fn top(app: &App) -> String {
        app.current_view().unwrap().key_hints()[0].clone()
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Action {
        Action::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn pop_on_root_is_noop() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));

        assert!(app.pop_view().is_none());
        assert_eq!(app.view_stack_len(), 1);
        assert_eq!(top(&app), "root");
    }

    #[test]
    fn push_then_pop_returns_to_original() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));

        for n in 1..=4 {
            for i in 0..n {
                app.push_view(MockView::boxed(&format!("v{i}"), &log));
            }
            assert_eq!(app.view_stack_len(), n + 1);
            for _ in 0..n {
                assert!(app.pop_view().is_some());
            }
            assert_eq!(top(&app), "root");
            assert_eq!(app.status_bar().key_hints(), ["root".to_string()]);
        }
    }

    #[test]
    fn push_runs_init_once_and_updates_hints() {
        let log = Log::default();
        let mut app = app();
        let commands = app.push_view(MockView::boxed("root", &log));

        assert_eq!(commands.len(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["root:init".to_string()]);
        assert_eq!(app.status_bar().key_hints(), ["root".to_string()]);
    }

    #[test]
    fn ctrl_c_quits_at_any_depth() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        app.push_view(MockView::boxed("detail", &log));

        let commands = app.update(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(commands.as_slice(), [Command::Quit]));
    }

    #[test]
    fn q_quits_only_on_root() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        app.push_view(MockView::boxed("detail", &log));

        let commands = app.update(key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(commands.is_empty());
        assert!(log
            .lock()
            .unwrap()
            .contains(&"detail:key Char('q')".to_string()));

        app.update(Action::NavigateBack);
        assert_eq!(app.view_stack_len(), 1);
        let commands = app.update(key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(matches!(commands.as_slice(), [Command::Quit]));
    }

    #[test]
    fn navigate_to_detail_uses_factory() {
        let log = Log::default();
        let factory_log = log.clone();
        let mut app = app().with_detail_factory(Box::new(move |number: u64, width: u16, height: u16| {
            MockView::boxed(&format!("issue-{number}-{width}x{height}"), &factory_log)
        }));
        app.push_view(MockView::boxed("root", &log));
        app.update(Action::Status(StatusUpdate::Info("Showing 3 issues".into())));

        let commands = app.update(Action::NavigateToDetail(42));
        assert_eq!(commands.len(), 2);
        assert_eq!(app.view_stack_len(), 2);
        assert_eq!(top(&app), "issue-42-80x23");
        assert_eq!(app.status_bar().message(), "");

        app.update(Action::Status(StatusUpdate::Info("Loaded issue #42".into())));
        app.update(Action::NavigateBack);
        assert_eq!(top(&app), "root");
        assert_eq!(app.status_bar().message(), "");
    }

    #[test]
    fn navigate_without_factory_is_ignored() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        assert!(app.update(Action::NavigateToDetail(1)).is_empty());
        assert_eq!(app.view_stack_len(), 1);
    }

    #[test]
    fn resize_reaches_status_bar_and_top_view() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        app.push_view(MockView::boxed("detail", &log));

        app.update(Action::Resize {
            width: 100,
            height: 30,
        });
        assert_eq!((app.width(), app.height()), (100, 30));
        let log = log.lock().unwrap();
        assert!(log.contains(&"detail:resize 100x29".to_string()), "{log:?}");
        assert!(!log.iter().any(|e| e.starts_with("root:resize")));
    }

    #[test]
    fn back_resends_size_to_uncovered_view() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        app.push_view(MockView::boxed("detail", &log));
        app.update(Action::Resize {
            width: 100,
            height: 30,
        });

        app.update(Action::NavigateBack);
        assert!(log
            .lock()
            .unwrap()
            .contains(&"root:resize 100x29".to_string()));
    }

    fn spawned(commands: Vec<Command>) -> futures::future::BoxFuture<'static, Action> {
        commands
            .into_iter()
            .find_map(|command| match command {
                Command::Spawn(fut) => Some(fut),
                _ => None,
            })
            .expect("no spawned work")
    }

    #[tokio::test]
    async fn spawned_results_reach_covered_view() {
        let log = Log::default();
        let mut app = app();
        let root_work = spawned(app.push_view(MockView::boxed("root", &log)));
        app.push_view(MockView::boxed("detail", &log));

        let result = root_work.await;
        assert!(matches!(result, Action::Routed { .. }));
        app.update(result);

        let entries = log.lock().unwrap().clone();
        assert!(entries.contains(&"root:Tick".to_string()), "{entries:?}");
        assert!(!entries.contains(&"detail:Tick".to_string()), "{entries:?}");
        assert_eq!(top(&app), "detail");
        assert_eq!(app.status_bar().key_hints(), ["detail".to_string()]);
    }

    #[tokio::test]
    async fn results_for_popped_views_are_dropped() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        let detail_work = spawned(app.push_view(MockView::boxed("detail", &log)));
        app.update(Action::NavigateBack);

        let commands = app.update(detail_work.await);
        assert!(commands.is_empty());
        let entries = log.lock().unwrap().clone();
        assert!(!entries.iter().any(|e| e.ends_with(":Tick")), "{entries:?}");
    }

    #[tokio::test]
    async fn dashboard_page_lands_while_detail_is_open() {
        use crate::data::testing::MockQuerier;
        use crate::data::IssueClient;
        use crate::ui::DashboardView;

        let querier = MockQuerier::with_response(serde_json::json!({
            "repository": { "issues": {
                "nodes": [],
                "pageInfo": { "hasNextPage": true, "endCursor": "c1" }
            }}
        }));
        let client = IssueClient::new(Arc::new(querier), "owner", "repo");
        let dashboard =
            DashboardView::new(client, Styles::default(), KeyMap::default(), 50, 80, 23);

        let log = Log::default();
        let factory_log = log.clone();
        let mut app = app().with_detail_factory(Box::new(move |number: u64, _: u16, _: u16| {
            MockView::boxed(&format!("issue-{number}"), &factory_log)
        }));

        let first_page = spawned(app.push_view(Box::new(dashboard)));
        app.update(first_page.await);

        let next_page = spawned(app.update(key(KeyCode::Char('L'), KeyModifiers::NONE)));
        app.update(Action::NavigateToDetail(1));
        assert_eq!(app.view_stack_len(), 2);

        // the page lands on the dashboard without touching the detail's bar
        let commands = app.update(next_page.await);
        assert!(commands.is_empty(), "{commands:?}");
        assert_eq!(app.status_bar().key_hints(), ["issue-1".to_string()]);
        assert_eq!(app.status_bar().message(), "");

        app.update(Action::NavigateBack);
        let commands = app.update(key(KeyCode::Char('L'), KeyModifiers::NONE));
        assert_eq!(commands.len(), 2, "{commands:?}");
        assert!(commands.iter().any(|c| matches!(c, Command::Spawn(_))));
    }

    #[test]
    fn status_actions_stay_in_app() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        app.update(Action::Status(StatusUpdate::Error("HTTP 401: Bad credentials".into())));

        assert_eq!(app.status_bar().message(), "api: Run gh auth login to re-authenticate");
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn other_actions_are_delegated() {
        let log = Log::default();
        let mut app = app();
        app.push_view(MockView::boxed("root", &log));
        app.update(Action::Tick);
        assert!(log.lock().unwrap().contains(&"root:Tick".to_string()));
    }

    #[test]
    fn renders_top_view_above_status_bar() {
        let log = Log::default();
        let mut app = App::new(Styles::default(), KeyMap::default(), "owner/repo", 40, 4);
        app.push_view(MockView::boxed("root", &log));
        app.push_view(MockView::boxed("detail", &log));

        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        terminal.draw(|frame| crate::ui::render(frame, &app)).unwrap();
        let lines = buffer_lines(terminal.backend().buffer());

        assert!(lines[0].starts_with("view detail"), "{lines:?}");
        assert!(lines[3].starts_with("owner/repo"), "{lines:?}");
        assert!(lines[3].contains("detail"), "{lines:?}");
    }

    #[test]
    fn empty_stack_shows_placeholder() {
        let app = App::new(Styles::default(), KeyMap::default(), "owner/repo", 40, 5);
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal.draw(|frame| crate::ui::render(frame, &app)).unwrap();
        let lines = buffer_lines(terminal.backend().buffer());
        assert!(lines.iter().any(|l| l.contains("No view loaded")), "{lines:?}");
    }
}
