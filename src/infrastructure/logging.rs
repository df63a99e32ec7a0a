use std::io::{self, IsTerminal};

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{config::AppConfig, infrastructure::directories::ResolvedPaths};

static INIT: OnceCell<()> = OnceCell::new();
static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

pub fn init_tracing(config: &AppConfig, paths: &ResolvedPaths) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(&config.logging.level));

        let file_appender = tracing_appender::rolling::daily(&paths.logs_dir, "sieve.log");
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);

        let console_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_ansi(io::stderr().is_terminal());

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        tracing::debug!(
            logs = %paths.logs_dir.display(),
            db = %paths.db_path.display(),
            "tracing initialized"
        );
        Ok(())
    })?;
    Ok(())
}

// sqlx logs every statement at info; the sieve issues one per listing.
fn fallback_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("{level},{QUIET_DIRECTIVES}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_DIRECTIVES}")))
}

const QUIET_DIRECTIVES: &str = "sqlx=warn";
