// src/tests/utils.rs
use crate::cancel::CancelToken;
use crate::domain::classify::ClassifierPolicy;
use crate::scraper::browser::Page;
use crate::scraper::{Browser, BrowseError, PageScript, SearchContext};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy)]
pub enum FailWith {
    Navigation,
    Session,
}

/// In-memory browser: serves canned markup by URL and answers 404 otherwise.
#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, String>,
    failures: HashMap<String, FailWith>,
    cancel_on: Option<(String, CancelToken)>,
    page: Option<Page>,
    pub visited: Vec<String>,
    pub snapshots: RefCell<Vec<PathBuf>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn failing(mut self, url: &str, how: FailWith) -> Self {
        self.failures.insert(url.to_string(), how);
        self
    }

    /// Trips `token` as soon as `url` is loaded.
    pub fn cancel_on(mut self, url: &str, token: &CancelToken) -> Self {
        self.cancel_on = Some((url.to_string(), token.clone()));
        self
    }
}

impl Browser for FakeBrowser {
    fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowseError> {
        self.visited.push(url.to_string());
        self.page = None;

        if let Some((trigger, token)) = &self.cancel_on {
            if trigger == url {
                token.cancel();
            }
        }

        match self.failures.get(url) {
            Some(FailWith::Navigation) => return Err(BrowseError::Navigation(format!("{url}: connection reset"))),
            Some(FailWith::Session) => return Err(BrowseError::Session("browser closed".into())),
            None => {}
        }

        let html = self.pages.get(url).ok_or_else(|| BrowseError::Status {
            status: 404,
            url: url.to_string(),
        })?;
        self.page = Some(Page::new(url, html.clone())?);
        Ok(())
    }

    fn settle(&mut self, _wait: Duration) {}

    fn evaluate(&self, script: PageScript) -> Result<Value, BrowseError> {
        let page = self.page.as_ref().ok_or(BrowseError::NoPage)?;
        Ok(page.evaluate(script))
    }

    fn screenshot(&self, path: &Path) -> Result<(), BrowseError> {
        self.page.as_ref().ok_or(BrowseError::NoPage)?;
        self.snapshots.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

pub fn test_policy() -> ClassifierPolicy {
    ClassifierPolicy::embedded().unwrap_or_else(|e| panic!("embedded policy failed to load: {e}"))
}

pub fn test_context<'a>(policy: &'a ClassifierPolicy, cancel: &'a CancelToken, max_listings: usize) -> SearchContext<'a> {
    SearchContext {
        region: "L5A 4E6",
        policy,
        max_listings,
        page_timeout: Duration::from_secs(5),
        detail_timeout: Duration::from_secs(5),
        snapshot_dir: None,
        cancel,
    }
}

/// Unique scratch directory under the system temp dir.
pub fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("studio_space_{tag}_{nanos}"))
}

pub fn kijiji_card(href: &str, title: &str, price: &str, location: &str, image: &str) -> String {
    format!(
        r#"<li data-testid="listing-card">
             <a href="{href}"><h3 data-testid="listing-title">{title}</h3></a>
             <p data-testid="listing-price">{price}</p>
             <p data-testid="listing-location">{location}</p>
             <img src="{image}">
           </li>"#
    )
}

pub fn craigslist_row(href: &str, title: &str, price: &str) -> String {
    format!(
        r#"<li class="cl-search-result">
             <a class="posting-title" href="{href}"><span class="label">{title}</span></a>
             <span class="priceinfo">{price}</span>
           </li>"#
    )
}

pub fn results_page(cards: &[String]) -> String {
    format!("<html><body><ol>{}</ol></body></html>", cards.join("\n"))
}
