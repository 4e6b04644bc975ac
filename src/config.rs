use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::persist::app_cache_dir;
use crate::state::DEFAULT_TOP_LIMIT;

const LOG_FILE: &str = "football_hub.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    pub top_limit: usize,
}

impl Config {
    /// Reads `.env.local`/`.env`, then the process environment. `--db` wins over `DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let db_path = match parse_db_path_arg(std::env::args().skip(1)) {
            Some(path) => path,
            None => {
                let url = std::env::var("DATABASE_URL")
                    .context("DATABASE_URL is not set (or pass --db <path>)")?;
                parse_database_url(&url)?
            }
        };

        let log_filter = std::env::var("HUB_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());
        let log_file = std::env::var("HUB_LOG_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| app_cache_dir().map(|dir| dir.join(LOG_FILE)));
        let top_limit = std::env::var("HUB_TOP_LIMIT")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_LIMIT)
            .clamp(1, 100);

        Ok(Self {
            db_path,
            log_filter,
            log_file,
            top_limit,
        })
    }
}

/// Accepts a bare path or a `sqlite://` / `sqlite:` URL.
pub fn parse_database_url(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("DATABASE_URL is empty"));
    }
    let path = if let Some(rest) = trimmed.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("sqlite:") {
        rest
    } else if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(anyhow!(
            "unsupported database scheme '{scheme}', expected a sqlite path"
        ));
    } else {
        trimmed
    };
    if path.is_empty() {
        return Err(anyhow!("DATABASE_URL has no path"));
    }
    Ok(Path::new(path).to_path_buf())
}

pub fn parse_db_path_arg(args: impl IntoIterator<Item = String>) -> Option<PathBuf> {
    let args = args.into_iter().collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

/// Value of `--name=value` or `--name value`.
pub fn parse_flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("--{name}=");
    let bare = format!("--{name}");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.trim().to_string());
        }
        if *arg == bare
            && let Some(next) = args.get(idx + 1)
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn database_url_forms() {
        assert_eq!(
            parse_database_url("sqlite:///tmp/hub.sqlite").unwrap(),
            PathBuf::from("/tmp/hub.sqlite")
        );
        assert_eq!(
            parse_database_url("sqlite:data/hub.db").unwrap(),
            PathBuf::from("data/hub.db")
        );
        assert_eq!(
            parse_database_url(" ./hub.db ").unwrap(),
            PathBuf::from("./hub.db")
        );
        assert!(parse_database_url("postgresql://u:p@localhost/football").is_err());
        assert!(parse_database_url("").is_err());
        assert!(parse_database_url("sqlite://").is_err());
    }

    #[test]
    fn db_arg_both_forms() {
        assert_eq!(
            parse_db_path_arg(args(&["--db=a.sqlite"])),
            Some(PathBuf::from("a.sqlite"))
        );
        assert_eq!(
            parse_db_path_arg(args(&["--seed", "3", "--db", "b.sqlite"])),
            Some(PathBuf::from("b.sqlite"))
        );
        assert_eq!(parse_db_path_arg(args(&["--db"])), None);
    }

    #[test]
    fn flag_values() {
        let a = args(&["--club=Riverside FC", "--seed", "42"]);
        assert_eq!(parse_flag_value(&a, "club").as_deref(), Some("Riverside FC"));
        assert_eq!(parse_flag_value(&a, "seed").as_deref(), Some("42"));
        assert_eq!(parse_flag_value(&a, "limit"), None);
    }
}
