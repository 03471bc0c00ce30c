use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "problemas")]
#[command(about = "A terminal UI for triaging GitHub issues", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Repository as owner/repo (`@me/repo` for your own); defaults to the origin remote
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Issues fetched per page
    #[arg(long)]
    pub page_size: Option<i64>,

    /// `relative`, a strftime pattern (%Y-%m-%d) or a Go layout (2006-01-02)
    #[arg(long)]
    pub date_format: Option<String>,

    /// Config file (defaults to $XDG_CONFIG_HOME/problemas/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
