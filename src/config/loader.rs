use std::{env, path::PathBuf};

use regex::Regex;

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, HistoryConfig, LoggingConfig, PageConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            db_filename: env::var("DB_FILENAME").unwrap_or_else(|_| "decisions.db".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let history = history_from_parts(non_empty("HISTORY_DB"), non_empty("HISTORY_URLS_FILE"))?;

        let page = PageConfig {
            link_pattern: non_empty("LISTING_LINK_PATTERN")
                .map(|raw| parse_pattern(&raw))
                .transpose()?,
        };

        Ok(Self {
            directories,
            logging,
            history,
            page,
        })
    }
}

fn history_from_parts(
    browser_db: Option<String>,
    url_list: Option<String>,
) -> Result<HistoryConfig, ConfigError> {
    match (browser_db, url_list) {
        (Some(_), Some(_)) => Err(ConfigError::Conflict("HISTORY_DB", "HISTORY_URLS_FILE")),
        (Some(db), None) => Ok(HistoryConfig::BrowserDb(PathBuf::from(db))),
        (None, Some(list)) => Ok(HistoryConfig::UrlList(PathBuf::from(list))),
        (None, None) => Ok(HistoryConfig::Disabled),
    }
}

fn parse_pattern(raw: &str) -> Result<Regex, ConfigError> {
    Regex::new(raw).map_err(|err| ConfigError::Invalid {
        key: "LISTING_LINK_PATTERN",
        reason: err.to_string(),
    })
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
