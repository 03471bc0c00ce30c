use std::future::Future;

use crossterm::event::KeyEvent;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;

use crate::types::{CommentListResult, Issue, IssueListResult};

/// Fetch errors travel as plain text; they are only classified by the
/// status bar.
pub type FetchResult<T> = std::result::Result<T, String>;

/// Status bar update requested by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Info(String),
    Loading(String),
    Error(String),
    Clear,
}

/// Identifies a pushed view for the lifetime of the app. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewId(pub u64);

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Tick,
    Status(StatusUpdate),

    // Navigation
    NavigateToDetail(u64),
    NavigateBack,

    // Fetch results. `load_id` is the generation the fetch was issued under.
    IssuesLoaded {
        result: FetchResult<IssueListResult>,
        load_id: u64,
    },
    IssuesPageLoaded {
        result: FetchResult<IssueListResult>,
        append: bool,
        load_id: u64,
    },
    IssueDetailLoaded {
        number: u64,
        result: FetchResult<Box<Issue>>,
    },
    CommentsLoaded {
        number: u64,
        result: FetchResult<CommentListResult>,
    },

    /// Output of work spawned by `view`, delivered to it even when it is
    /// no longer on top.
    Routed { view: ViewId, action: Box<Action> },
}

/// Side effect returned by `App` and views, executed by the main loop.
pub enum Command {
    /// Delivered back to the loop on its next turn.
    Action(Action),
    /// Detached unit of work that posts exactly one action when done.
    Spawn(BoxFuture<'static, Action>),
    Quit,
}

impl Command {
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Action> + Send + 'static,
    {
        Command::Spawn(fut.boxed())
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Command::Action(Action::Status(StatusUpdate::Info(msg.into())))
    }

    pub fn loading(msg: impl Into<String>) -> Self {
        Command::Action(Action::Status(StatusUpdate::Loading(msg.into())))
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Command::Action(Action::Status(StatusUpdate::Error(msg.into())))
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Command::Spawn(_) => f.write_str("Spawn(..)"),
            Command::Quit => f.write_str("Quit"),
        }
    }
}

/// Runs commands against the loop's action channel. Returns `true` when a
/// quit was requested.
pub fn dispatch(commands: Vec<Command>, tx: &mpsc::UnboundedSender<Action>) -> bool {
    let mut quit = false;
    for command in commands {
        match command {
            Command::Action(action) => {
                tx.send(action).ok();
            }
            Command::Spawn(fut) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tx.send(fut.await).ok();
                });
            }
            Command::Quit => quit = true,
        }
    }
    quit
}
