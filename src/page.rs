use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::{
    config::PageConfig,
    domain::{Listing, ListingId},
};

#[derive(Debug, Clone, Deserialize)]
pub struct PageSnapshot {
    /// Base for resolving relative links.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub listings: Vec<RawListing>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to parse page snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid page url `{url}`: {source}")]
    BadPageUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("page contains no listings")]
    NoListings,
    #[error("listing #{index} has no title")]
    MissingTitle { index: usize },
    #[error("listing #{index} ({title}) has no usable links")]
    MissingLinks { index: usize, title: String },
}

#[derive(Debug, Clone, Default)]
pub struct PageAdapter {
    link_pattern: Option<Regex>,
}

impl PageAdapter {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            link_pattern: config.link_pattern.clone(),
        }
    }

    pub fn parse(&self, raw: &str) -> Result<Vec<Listing>, PageError> {
        let snapshot: PageSnapshot = serde_json::from_str(raw)?;
        self.extract(snapshot)
    }

    pub fn extract(&self, snapshot: PageSnapshot) -> Result<Vec<Listing>, PageError> {
        let base = snapshot
            .url
            .as_deref()
            .map(|url| {
                Url::parse(url).map_err(|source| PageError::BadPageUrl {
                    url: url.to_string(),
                    source,
                })
            })
            .transpose()?;

        if snapshot.listings.is_empty() {
            return Err(PageError::NoListings);
        }

        let listings = snapshot
            .listings
            .into_iter()
            .enumerate()
            .map(|(index, raw)| self.listing(index, raw, base.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(target: "page", total = listings.len(), "listings extracted");
        Ok(listings)
    }

    fn listing(&self, index: usize, raw: RawListing, base: Option<&Url>) -> Result<Listing, PageError> {
        let title = raw
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or(PageError::MissingTitle { index })?;

        let links: Vec<Url> = raw
            .links
            .iter()
            .filter_map(|link| resolve(link, base))
            .filter(|link| self.keeps(link))
            .collect();

        if links.is_empty() {
            return Err(PageError::MissingLinks { index, title });
        }

        Ok(Listing::new(ListingId(index), title, links))
    }

    fn keeps(&self, link: &Url) -> bool {
        self.link_pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(link.as_str()))
    }
}

fn resolve(link: &str, base: Option<&Url>) -> Option<Url> {
    let parsed = match base {
        Some(base) => base.join(link),
        None => Url::parse(link),
    };
    match parsed {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::debug!(target: "page", link, error = %err, "skipping unparseable link");
            None
        }
    }
}
