use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::{task::JoinHandle, time::timeout};

use crate::{
    classify::{DecisionStore, DryRunStore},
    cli::{Command, OutputFormat},
    config::{AppConfig, HistoryConfig},
    db::{self, decisions::DecisionRepository},
    domain::{ApplyStyle, Listing},
    history::{BrowserHistory, HistoryClient, HistoryService, HistorySource, NoHistory, VisitedUrls},
    infrastructure::directories::ResolvedPaths,
    page::PageAdapter,
    session::{PageSession, Summary},
};

pub struct SieveApp {
    paths: ResolvedPaths,
    decisions: Arc<DecisionRepository>,
    history: HistoryClient,
    history_handle: JoinHandle<()>,
    pages: PageAdapter,
    format: OutputFormat,
}

impl SieveApp {
    pub async fn initialize(config: AppConfig, paths: ResolvedPaths, format: OutputFormat) -> Result<Self> {
        let pool = db::init_pool(&paths.db_path).await?;
        let decisions = Arc::new(DecisionRepository::new(pool));

        let source = open_history_source(&config.history).await?;
        let (history, history_handle) = HistoryService::spawn(source);

        Ok(Self {
            paths,
            decisions,
            history,
            history_handle,
            pages: PageAdapter::new(&config.page),
            format,
        })
    }

    pub async fn run(self, command: Command) -> Result<()> {
        let outcome = self.dispatch(command).await;

        self.history_handle.abort();
        let shutdown_timeout = Duration::from_secs(5);
        if timeout(shutdown_timeout, self.decisions.close()).await.is_err() {
            tracing::warn!(
                target: "db",
                "decision database did not close within {:?}",
                shutdown_timeout
            );
        }
        outcome
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::Apply { page, dry_run } => self.apply(&page, dry_run).await,
            Command::Style { style, page } => self.style(style, page.as_deref()).await,
            Command::IgnoreAll { page } => self.ignore_all(&page).await,
            Command::Config => self.show_config().await,
            Command::Clear { yes } => self.clear(yes).await,
        }
    }

    async fn apply(&self, page: &Path, dry_run: bool) -> Result<()> {
        let listings = self.load_page(page).await?;
        let dry = dry_run.then(|| Arc::new(DryRunStore::new(self.decisions.clone())));
        let store: Arc<dyn DecisionStore> = match &dry {
            Some(dry) => dry.clone(),
            None => self.decisions.clone(),
        };

        let config = store.get_config().await?;
        let mut session = PageSession::new(listings, store, Arc::new(self.history.clone()));
        let result = session.apply(config.apply_style).await;
        self.render(&session, session.summary(&result))?;

        if let Some(dry) = dry {
            for (key, decision) in dry.pending() {
                println!("would record: {key} -> {}", decision.reason);
            }
        }
        if result.failed > 0 || result.unsaved > 0 {
            tracing::warn!(
                target: "session",
                failed = result.failed,
                unsaved = result.unsaved,
                "pass finished with errors; see earlier warnings"
            );
        }
        Ok(())
    }

    async fn style(&self, style: ApplyStyle, page: Option<&Path>) -> Result<()> {
        let Some(page) = page else {
            let mut config = self.decisions.get_config().await?;
            config.apply_style = style;
            self.decisions.set_config(config).await?;
            println!("style set to {style}");
            return Ok(());
        };

        let mut session = self.session(page).await?;
        let current = self.decisions.get_config().await?;
        let result = session.apply(current.apply_style).await;
        if session.change_style(style).await? {
            println!("style set to {style}");
        } else {
            println!("style already {style}");
        }
        self.render(&session, session.summary(&result))
    }

    async fn ignore_all(&self, page: &Path) -> Result<()> {
        let mut session = self.session(page).await?;
        let config = self.decisions.get_config().await?;
        session.apply(config.apply_style).await;

        let marked = session
            .mark_all_ignored()
            .await
            .context("failed to record ignored listings")?;
        println!("OK, ignored {marked} of {} listings", session.total());
        Ok(())
    }

    async fn show_config(&self) -> Result<()> {
        let config = self.decisions.get_config().await?;
        let stored = self.decisions.count().await?;
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "config": config,
                    "decisions": stored,
                    "database": self.paths.db_path.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("style: {}", config.apply_style);
                println!("decisions: {stored}");
                println!("database: {}", self.paths.db_path.display());
            }
        }
        Ok(())
    }

    async fn clear(&self, confirmed: bool) -> Result<()> {
        if !confirmed {
            bail!("refusing to clear all decisions without --yes");
        }
        self.decisions.clear_all().await?;
        println!("cleared");
        Ok(())
    }

    async fn session(&self, page: &Path) -> Result<PageSession> {
        let listings = self.load_page(page).await?;
        Ok(PageSession::new(
            listings,
            self.decisions.clone(),
            Arc::new(self.history.clone()),
        ))
    }

    async fn load_page(&self, path: &Path) -> Result<Vec<Listing>> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read page snapshot {}", path.display()))?;
        self.pages
            .parse(&raw)
            .with_context(|| format!("failed to extract listings from {}", path.display()))
    }

    fn render(&self, session: &PageSession, summary: Summary) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct Rendered<'a> {
                    summary: Summary,
                    listings: &'a [Listing],
                }
                let rendered = Rendered {
                    summary,
                    listings: session.listings(),
                };
                println!("{}", serde_json::to_string_pretty(&rendered)?);
            }
            OutputFormat::Text => println!("{}", render_text(session.listings(), summary)),
        }
        Ok(())
    }
}

fn render_text(listings: &[Listing], summary: Summary) -> String {
    let mut out = String::new();
    for listing in listings {
        let label = listing.container.reason_label().unwrap_or("");
        let style = if listing.container.is_hidden() {
            "hidden"
        } else {
            listing.container.style().unwrap_or("visible")
        };
        out.push_str(&format!("{:<10} {:<14} {}\n", label, style, listing.title));
    }
    out.push_str(&summary.to_string());
    out
}

async fn open_history_source(config: &HistoryConfig) -> Result<Arc<dyn HistorySource>> {
    let source: Arc<dyn HistorySource> = match config {
        HistoryConfig::BrowserDb(path) => {
            tracing::info!(target: "history", path = %path.display(), "using browser history database");
            Arc::new(BrowserHistory::open(path).await?)
        }
        HistoryConfig::UrlList(path) => {
            let urls = VisitedUrls::from_file(path).await?;
            if urls.is_empty() {
                tracing::warn!(target: "history", path = %path.display(), "visited URL list is empty");
            }
            tracing::info!(target: "history", path = %path.display(), urls = urls.len(), "using visited URL list");
            Arc::new(urls)
        }
        HistoryConfig::Disabled => {
            tracing::warn!(target: "history", "no history source configured; only stored decisions apply");
            Arc::new(NoHistory)
        }
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Reason, session::ApplyResult, testing::listing};

    #[test]
    fn text_output_shows_container_state() {
        let mut listings = vec![
            listing(0, "Aoba", &["https://suumo.example/chintai/a/"]),
            listing(1, "Kaede", &["https://suumo.example/chintai/b/"]),
            listing(2, "Sakura", &["https://suumo.example/chintai/c/"]),
        ];
        listings[1].container.set_style(ApplyStyle::Hide);
        listings[1].container.annotate(Reason::Ignored);
        listings[2].container.set_style(ApplyStyle::GrayOut);
        listings[2].container.annotate(Reason::Visited);
        let result = ApplyResult {
            ignored: 1,
            visited: 1,
            ..ApplyResult::default()
        };

        let text = render_text(&listings, Summary::new(&result, listings.len()));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].split_whitespace().collect::<Vec<_>>(), ["visible", "Aoba"]);
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), ["(ignored)", "hidden", "Kaede"]);
        assert!(lines[2].starts_with("(visited)"));
        assert!(lines[2].contains("opacity: 0.5"));
        assert_eq!(lines[5], "1 / 3 to check");
    }
}
