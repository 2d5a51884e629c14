//! Server configuration, read from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LISTS: &str = "To Do,In Progress,Review,Done";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file, or `:memory:`
    pub db_path: PathBuf,
    pub http_addr: SocketAddr,
    /// Directory for the rolling log files
    pub log_dir: PathBuf,
    /// Per-board list cap; `None` means unlimited
    pub max_lists_per_board: Option<usize>,
    /// Lists seeded into every new board, in order
    pub default_lists: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("kanban.db"),
            http_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_dir: PathBuf::from("logs"),
            max_lists_per_board: None,
            default_lists: parse_list_titles(DEFAULT_LISTS),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let http_addr = match lookup("KANBAN_HTTP_ADDR") {
            Some(addr) => addr
                .parse()
                .map_err(|e| anyhow::anyhow!("KANBAN_HTTP_ADDR '{}' is invalid: {}", addr, e))?,
            None => defaults.http_addr,
        };

        let max_lists_per_board = match lookup("KANBAN_MAX_LISTS_PER_BOARD") {
            Some(raw) if !raw.trim().is_empty() => {
                let max: usize = raw.trim().parse().map_err(|e| {
                    anyhow::anyhow!("KANBAN_MAX_LISTS_PER_BOARD '{}' is invalid: {}", raw, e)
                })?;
                Some(max)
            }
            _ => None,
        };

        Ok(Self {
            db_path: lookup("KANBAN_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            http_addr,
            log_dir: lookup("KANBAN_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            max_lists_per_board,
            default_lists: lookup("KANBAN_DEFAULT_LISTS")
                .map(|raw| parse_list_titles(&raw))
                .unwrap_or(defaults.default_lists),
        })
    }
}

fn parse_list_titles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
