mod action;
mod app;
mod auth;
mod cli;
mod config;
mod data;
mod error;
mod event;
mod github;
mod keys;
mod querier;
mod tui;
mod types;
mod ui;
mod util;

use std::fs::OpenOptions;
use std::panic;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::{dispatch, Action};
use crate::app::App;
use crate::cli::Cli;
use crate::config::{Config, Defaults, Repository};
use crate::data::{CommentClient, IssueClient, UserClient};
use crate::event::Event;
use crate::github::GitHub;
use crate::keys::KeyMap;
use crate::querier::Querier;
use crate::tui::EventHandler;
use crate::ui::{DashboardView, DetailView, Styles, View};
use crate::util::time::DateFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_cli(&cli);

    let token = auth::load_token()?;
    let querier: Arc<dyn Querier> = Arc::new(GitHub::new(token)?);

    // Resolved before the terminal is taken over so failures print normally
    let repo =
        config::resolve_repository(&config.defaults.repo, &UserClient::new(querier.clone()))
            .await?;
    tracing::info!(%repo, "starting");

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(querier, repo, config.defaults).await;

    tui::restore()?;

    result
}

/// Logs go to `--log-file` when given; the terminal is owned by the UI
/// otherwise, so they are discarded.
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_env("PROBLEMAS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::sink),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(())
}

async fn run(
    querier: Arc<dyn Querier>,
    repo: Repository,
    defaults: Defaults,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;
    let (width, height) = tui::size()?;

    let styles = Styles::default();
    let keys = KeyMap::default();
    let issues = IssueClient::new(querier.clone(), &repo.owner, &repo.name);
    let comments = CommentClient::new(querier, &repo.owner, &repo.name);
    let date_format = DateFormat::parse(&defaults.date_format);

    let detail_issues = issues.clone();
    let detail_keys = keys.clone();
    let mut app = App::new(styles, keys.clone(), &repo.to_string(), width, height)
        .with_detail_factory(Box::new(move |number, width, height| -> Box<dyn View> {
            Box::new(DetailView::new(
                detail_issues.clone(),
                Some(comments.clone()),
                styles,
                detail_keys.clone(),
                date_format.clone(),
                number,
                width,
                height,
            ))
        }));

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let dashboard = DashboardView::new(
        issues,
        styles,
        keys,
        defaults.page_size,
        width,
        app.content_height(),
    );
    dispatch(app.push_view(Box::new(dashboard)), &action_tx);

    let tick_rate = Duration::from_millis(100);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    event => {
                        if let Some(action) = event.into_action() {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                let commands = app.update(action);
                if dispatch(commands, &action_tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}
