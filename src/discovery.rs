// discovery.rs
use crate::domain::listing::Listing;
use crate::domain::listing_set::ListingSet;
use crate::errors::PipelineError;
use crate::scraper::{Browser, SearchContext, SourceKind};
use tracing::{debug, info, warn};

/// Searches each source in turn and returns the combined listings, first seen
/// first, with duplicate URLs across sources dropped.
///
/// One source failing does not stop the others. Cancellation or a broken
/// browser session ends the run and nothing collected so far is returned.
pub fn discover(
    browser: &mut dyn Browser,
    sources: &[SourceKind],
    ctx: &SearchContext<'_>,
) -> Result<Vec<Listing>, PipelineError> {
    info!(region = ctx.region, "Starting search for studio space near {}", ctx.region);
    let mut all = ListingSet::new();

    for source in sources {
        ctx.cancel.check()?;

        match run_source(browser, *source, ctx) {
            Ok(found) => {
                let count = found.len();
                let added = all.extend(found);
                info!(source = source.name(), count, added, "{}: found {count} listings", source.name());
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(source = source.name(), "{} search failed, continuing with others: {e}", source.name());
            }
        }
    }

    info!(total = all.len(), "Found {} total listings across all sources", all.len());
    Ok(all.into_vec())
}

/// Collects one source's listings, then enriches the first few from their
/// detail pages. Enrichment failures leave the listing as discovered.
fn run_source(
    browser: &mut dyn Browser,
    source: SourceKind,
    ctx: &SearchContext<'_>,
) -> Result<ListingSet, PipelineError> {
    let mut listings = source.fetch_listings(browser, ctx)?;

    for listing in listings.first_n_mut(source.detail_cap()) {
        ctx.cancel.check()?;

        if let Err(e) = source.enrich_detail(browser, listing, ctx) {
            if e.is_fatal() {
                return Err(e.into());
            }
            debug!(source = source.name(), url = %listing.listing_url, "Could not scrape detail page: {e}");
        }
    }

    Ok(listings)
}
