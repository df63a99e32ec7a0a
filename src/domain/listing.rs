use serde::Serialize;
use url::Url;

use super::decision::{ApplyStyle, Reason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListingId(pub usize);

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub links: Vec<Url>,
    pub container: Container,
}

impl Listing {
    pub fn new(id: ListingId, title: impl Into<String>, links: Vec<Url>) -> Self {
        Self {
            id,
            title: title.into(),
            links,
            container: Container::default(),
        }
    }
}

// Only effective changes count as mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Container {
    style: Option<&'static str>,
    reason_label: Option<Reason>,
    #[serde(skip)]
    mutations: usize,
}

impl Container {
    pub fn set_style(&mut self, style: ApplyStyle) -> bool {
        let css = style.css();
        if self.style == Some(css) {
            return false;
        }
        self.style = Some(css);
        self.mutations += 1;
        true
    }

    pub fn annotate(&mut self, reason: Reason) -> bool {
        if self.reason_label.is_some() {
            return false;
        }
        self.reason_label = Some(reason);
        self.mutations += 1;
        true
    }

    pub fn style(&self) -> Option<&'static str> {
        self.style
    }

    pub fn reason_label(&self) -> Option<&'static str> {
        self.reason_label.map(|reason| reason.label())
    }

    pub fn is_hidden(&self) -> bool {
        self.style == Some(ApplyStyle::Hide.css())
    }

    #[cfg(test)]
    pub fn mutations(&self) -> usize {
        self.mutations
    }
}
