use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::data::UserClient;
use crate::error::{AppError, Result};

const APP_DIR: &str = "problemas";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// `owner/repo`; empty means the current directory's origin remote.
    pub repo: String,
    pub page_size: i64,
    /// `relative`, a strftime pattern or a Go reference layout.
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            defaults: Defaults::default(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            repo: String::new(),
            page_size: 50,
            date_format: "relative".to_string(),
        }
    }
}

/// `$XDG_CONFIG_HOME/problemas/config.toml`, else the platform config dir.
pub fn config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()?,
    };
    Some(base.join(APP_DIR).join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// A missing file yields the defaults; an unreadable or invalid one is
    /// an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Command-line values win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(repo) = &cli.repo {
            self.defaults.repo = repo.clone();
        }
        if let Some(page_size) = cli.page_size {
            self.defaults.page_size = page_size;
        }
        if let Some(date_format) = &cli.date_format {
            self.defaults.date_format = date_format.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

pub fn parse_repo(value: &str) -> Result<Repository> {
    match value.split('/').collect::<Vec<_>>().as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Repository {
            owner: owner.to_string(),
            name: name.to_string(),
        }),
        _ => Err(AppError::Repo(format!(
            "invalid repository {value:?}: expected owner/repo"
        ))),
    }
}

/// Owner and name from SSH (`git@host:owner/repo.git`), `ssh://` or HTTPS
/// remote URLs.
fn extract_repo(url: &str) -> Option<Repository> {
    let path = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':')?.1
    } else if url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with("ssh://")
    {
        let without_scheme = url.split("://").nth(1)?;
        without_scheme.split_once('/')?.1
    } else {
        return None;
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    parse_repo(path).ok()
}

fn current_remote() -> Result<Repository> {
    let output = std::process::Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()?;

    if !output.status.success() {
        return Err(AppError::Repo(
            "could not determine repository: run inside a git repository with a GitHub remote or pass --repo"
                .to_string(),
        ));
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    extract_repo(&url)
        .ok_or_else(|| AppError::Repo(format!("unrecognised origin remote {url:?}")))
}

/// Picks the repository from config or the origin remote; an owner of `@me`
/// becomes the authenticated user's login.
pub async fn resolve_repository(config_repo: &str, users: &UserClient) -> Result<Repository> {
    let mut repo = if config_repo.is_empty() {
        current_remote()?
    } else {
        parse_repo(config_repo)?
    };

    if repo.owner == "@me" {
        repo.owner = users
            .who_am_i()
            .await
            .map_err(|e| AppError::Repo(format!("resolving @me: {e}")))?;
    }
    Ok(repo)
}
