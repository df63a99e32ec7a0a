use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub history: HistoryConfig,
    pub page: PageConfig,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub db_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryConfig {
    BrowserDb(PathBuf),
    UrlList(PathBuf),
    Disabled,
}

#[derive(Debug, Clone, Default)]
pub struct PageConfig {
    pub link_pattern: Option<Regex>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} and {1} cannot both be set")]
    Conflict(&'static str, &'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
