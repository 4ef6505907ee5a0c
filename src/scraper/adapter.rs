// adapter.rs
use crate::cancel::CancelToken;
use crate::domain::classify::ClassifierPolicy;
use crate::domain::listing::{Listing, ListingCandidate};
use crate::domain::listing_set::ListingSet;
use crate::domain::normalize::{candidate_from_fields, into_listing, parse_raw_results, RawFields};
use crate::domain::patterns::{extract_address, extract_price, truncate_chars, PriceKind};
use crate::errors::PipelineError;
use crate::scraper::browser::Browser;
use crate::scraper::scripts;
use crate::scraper::sources::{SearchUrl, SourceKind};
use crate::scraper::BrowseError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const DETAIL_SETTLE: Duration = Duration::from_secs(2);
const MAX_DETAIL_ADDRESS_CHARS: usize = 150;

/// Everything a source needs for one run besides the browser.
pub struct SearchContext<'a> {
    pub region: &'a str,
    pub policy: &'a ClassifierPolicy,
    pub max_listings: usize,
    pub page_timeout: Duration,
    pub detail_timeout: Duration,
    pub snapshot_dir: Option<&'a Path>,
    pub cancel: &'a CancelToken,
}

/// What the detail script hands back.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailData {
    pub images: Vec<String>,
    pub body_text: String,
    pub address: String,
}

impl SourceKind {
    /// Runs every search variant for this source and returns the listings
    /// that survived classification, deduplicated within the source.
    ///
    /// A variant that fails to load or extract is logged and skipped; only
    /// a session failure or cancellation ends the source early.
    pub fn fetch_listings(
        &self,
        browser: &mut dyn Browser,
        ctx: &SearchContext<'_>,
    ) -> Result<ListingSet, PipelineError> {
        info!(source = self.name(), "🔎 Searching {}...", self.name());
        let mut listings = ListingSet::new();

        for (idx, search) in self.search_urls().iter().enumerate() {
            ctx.cancel.check()?;

            let candidates = match self.fetch_candidates(browser, search, idx + 1, ctx) {
                Ok(c) => c,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(source = self.name(), url = %search.url, "Search page failed: {e}");
                    continue;
                }
            };

            for candidate in candidates {
                if listings.contains(&candidate.href) {
                    continue;
                }
                if !self.accepts(&candidate, ctx.policy) {
                    continue;
                }
                listings.insert(into_listing(candidate, *self, search.transaction, ctx.region));
            }
        }

        Ok(listings)
    }

    /// Loads one results page and pulls up to `max_listings` candidates off it.
    pub fn fetch_candidates(
        &self,
        browser: &mut dyn Browser,
        search: &SearchUrl,
        page_no: usize,
        ctx: &SearchContext<'_>,
    ) -> Result<Vec<ListingCandidate>, BrowseError> {
        browser.navigate(&search.url, ctx.page_timeout)?;
        browser.settle(self.settle_time());

        if let Some(dir) = ctx.snapshot_dir {
            let path = dir.join(format!("{}_{page_no}.html", self.slug()));
            if let Err(e) = browser.screenshot(&path) {
                debug!("Snapshot {} failed: {e}", path.display());
            }
        }

        let raw = browser.evaluate(self.card_script())?;
        let results = parse_raw_results(&raw);
        info!(source = self.name(), cards = results.len(), "Results page returned cards");

        let title_key = self.field_keys().title;
        let has_title = |fields: &&RawFields| fields.get(title_key).is_some_and(|t| !t.trim().is_empty());
        let capped: Vec<&RawFields> = if self.drops_untitled_before_cap() {
            results.iter().filter(has_title).take(ctx.max_listings).collect()
        } else {
            results.iter().take(ctx.max_listings).collect()
        };

        Ok(capped
            .into_iter()
            .filter_map(|fields| candidate_from_fields(*self, fields))
            .collect())
    }

    /// Applies the classifiers this source uses.
    pub fn accepts(&self, candidate: &ListingCandidate, policy: &ClassifierPolicy) -> bool {
        if self.checks_residential() && policy.is_residential(&candidate.title, &candidate.href) {
            debug!("Skipping residential listing: {}", candidate.title);
            return false;
        }
        if !policy.is_suitable(&candidate.title) {
            debug!("Skipping unsuitable listing: {}", candidate.title);
            return false;
        }
        true
    }

    /// Visits a listing's own page for more images, prices and a better address.
    pub fn enrich_detail(
        &self,
        browser: &mut dyn Browser,
        listing: &mut Listing,
        ctx: &SearchContext<'_>,
    ) -> Result<(), BrowseError> {
        browser.navigate(&listing.listing_url, ctx.detail_timeout)?;
        browser.settle(DETAIL_SETTLE);

        let raw = browser.evaluate(scripts::detail_page)?;
        let detail: DetailData =
            serde_json::from_value(raw).map_err(|e| BrowseError::Extraction(e.to_string()))?;

        apply_detail(listing, detail);
        Ok(())
    }
}

/// Merges detail-page data into a listing without overwriting what discovery found.
pub fn apply_detail(listing: &mut Listing, detail: DetailData) {
    for url in &detail.images {
        listing.push_image(url);
    }

    listing.fill_rental_cost(extract_price(&detail.body_text, PriceKind::Rent));
    listing.fill_purchase_cost(extract_price(&detail.body_text, PriceKind::Sale));

    if listing.address_is_placeholder {
        let address = detail.address.trim();
        let refined = if !address.is_empty() {
            Some(truncate_chars(address, MAX_DETAIL_ADDRESS_CHARS))
        } else {
            extract_address(&detail.body_text)
        };
        if let Some(a) = refined {
            listing.address = a;
            listing.address_is_placeholder = false;
        }
    }
}
