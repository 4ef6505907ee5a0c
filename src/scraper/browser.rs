// browser.rs
use crate::cancel::CancelToken;
use crate::config::Renderer;
use crate::scraper::BrowseError;
use rand::Rng;
use reqwest::blocking::Client;
use scraper::Html;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const ZENROWS_ENDPOINT: &str = "https://api.zenrows.com/v1/";

/// Page-scoped extraction logic: runs against the loaded DOM and the URL the
/// page was loaded from, and returns whatever structured data it found.
pub type PageScript = fn(&Html, &Url) -> Value;

/// The browsing capability the pipeline drives.
///
/// One navigation is in flight at a time; `evaluate` and `screenshot` act on
/// the most recently loaded page.
pub trait Browser {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowseError>;

    /// Gives the page time to finish loading dynamic content.
    fn settle(&mut self, wait: Duration) {
        std::thread::sleep(wait);
    }

    fn evaluate(&self, script: PageScript) -> Result<Value, BrowseError>;

    /// Diagnostic capture of the current page. Never affects results.
    fn screenshot(&self, path: &Path) -> Result<(), BrowseError>;
}

/// A loaded page: where it came from and its markup.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub html: String,
}

impl Page {
    pub fn new(url: &str, html: impl Into<String>) -> Result<Self, BrowseError> {
        let url = Url::parse(url).map_err(|e| BrowseError::Navigation(format!("{url}: {e}")))?;
        Ok(Self {
            url,
            html: html.into(),
        })
    }

    pub fn evaluate(&self, script: PageScript) -> Value {
        let document = Html::parse_document(&self.html);
        script(&document, &self.url)
    }
}

/// Blocking HTTP implementation of [`Browser`].
///
/// `Direct` fetches the raw markup; `ZenRows` goes through a rendering proxy
/// so script-built result pages come back populated.
pub struct HttpBrowser {
    client: Client,
    renderer: Renderer,
    zenrows_key: Option<String>,
    cancel: CancelToken,
    page: Option<Page>,
}

const MAX_RENDER_ATTEMPTS: u64 = 5;
const MAX_BACKOFF_SECS: u64 = 10;
const JITTER_MAX_SECS: u64 = 2;

/// What the render loop does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    GiveUp,
    Wait(Duration),
}

/// Retry policy for rendered fetches. `remaining` is what is left of the
/// page timeout, which covers every attempt and every wait together.
pub fn next_render_step(err: &BrowseError, attempt: u64, remaining: Duration, jitter_secs: u64) -> RetryStep {
    match err {
        // A page that answers 4xx will answer the same way next time.
        BrowseError::Status { status: 400..=499, .. } => RetryStep::GiveUp,
        BrowseError::Timeout(_) | BrowseError::Session(_) | BrowseError::Cancelled => RetryStep::GiveUp,
        _ if attempt >= MAX_RENDER_ATTEMPTS => RetryStep::GiveUp,
        _ => {
            let wait = Duration::from_secs(std::cmp::min(2 * attempt, MAX_BACKOFF_SECS) + jitter_secs);
            if wait >= remaining {
                RetryStep::GiveUp
            } else {
                RetryStep::Wait(wait)
            }
        }
    }
}

impl HttpBrowser {
    /// `cancel` is polled before each request and during retry waits.
    pub fn new(renderer: Renderer, cancel: CancelToken) -> Result<Self, BrowseError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(360))
            .build()
            .map_err(|e| BrowseError::Session(e.to_string()))?;

        let zenrows_key = match renderer {
            Renderer::Direct => None,
            Renderer::Zenrows => Some(std::env::var("ZENROWS_API_KEY").map_err(|_| {
                BrowseError::Session("ZENROWS_API_KEY environment variable not set".into())
            })?),
        };

        Ok(Self {
            client,
            renderer,
            zenrows_key,
            cancel,
            page: None,
        })
    }

    fn check_cancel(&self) -> Result<(), BrowseError> {
        if self.cancel.is_cancelled() {
            Err(BrowseError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn fetch_direct(&self, url: &str, timeout: Duration) -> Result<String, BrowseError> {
        let resp = self.client.get(url).timeout(timeout).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BrowseError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.text()?)
    }

    fn fetch_rendered(&self, url: &str, timeout: Duration, api_key: &str) -> Result<String, BrowseError> {
        let deadline = Instant::now() + timeout;
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.check_cancel()?;

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BrowseError::Timeout(format!("{url}: page timeout used up after {} attempts", attempt - 1)));
            }

            let start = Instant::now();
            let err = match self.try_fetch_rendered(url, remaining, api_key) {
                Ok(html) => {
                    debug!(attempt, elapsed = ?start.elapsed(), "rendered {url}");
                    return Ok(html);
                }
                Err(e) => e,
            };

            let left = deadline.saturating_duration_since(Instant::now());
            let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECS);
            match next_render_step(&err, attempt, left, jitter) {
                RetryStep::GiveUp => return Err(err),
                RetryStep::Wait(wait) => {
                    warn!(attempt, elapsed = ?start.elapsed(), ?wait, "render of {url} failed: {err}");
                    if !self.cancel.sleep(wait) {
                        return Err(BrowseError::Cancelled);
                    }
                }
            }
        }
    }

    fn try_fetch_rendered(&self, url: &str, timeout: Duration, api_key: &str) -> Result<String, BrowseError> {
        let mut params = HashMap::new();
        params.insert("url", url.to_string());
        params.insert("apikey", api_key.to_string());
        params.insert("js_render", "true".to_string());
        params.insert("original_status", "true".to_string());

        let resp = self
            .client
            .get(ZENROWS_ENDPOINT)
            .query(&params)
            .timeout(timeout)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;

        if status.as_u16() == 401 || status.as_u16() == 402 {
            return Err(BrowseError::Session(format!("render proxy refused the API key: {text}")));
        }
        if !status.is_success() {
            return Err(BrowseError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if text.starts_with('{') {
            if let Ok(json) = serde_json::from_str::<Value>(&text) {
                if json.get("code").is_some() {
                    return Err(BrowseError::Navigation(format!("render proxy error: {text}")));
                }
            }
        }

        Ok(text)
    }
}

impl Browser for HttpBrowser {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowseError> {
        self.page = None;
        self.check_cancel()?;

        let html = match (self.renderer, self.zenrows_key.as_deref()) {
            (Renderer::Zenrows, Some(key)) => self.fetch_rendered(url, timeout, key)?,
            _ => self.fetch_direct(url, timeout)?,
        };

        self.page = Some(Page::new(url, html)?);
        Ok(())
    }

    fn evaluate(&self, script: PageScript) -> Result<Value, BrowseError> {
        let page = self.page.as_ref().ok_or(BrowseError::NoPage)?;
        Ok(page.evaluate(script))
    }

    fn screenshot(&self, path: &Path) -> Result<(), BrowseError> {
        let page = self.page.as_ref().ok_or(BrowseError::NoPage)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| BrowseError::Extraction(e.to_string()))?;
        }
        std::fs::write(path, &page.html).map_err(|e| BrowseError::Extraction(e.to_string()))
    }
}
