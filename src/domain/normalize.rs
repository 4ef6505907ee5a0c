// src/domain/normalize.rs

use crate::domain::listing::{is_http_url, Listing, ListingCandidate};
use crate::scraper::sources::{SourceKind, Transaction};
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// One card as returned by an extraction script: field name -> text.
pub type RawFields = HashMap<String, String>;

/// Flattens a script result into string maps.
/// Anything that is not an array of objects yields nothing; non-object items
/// are skipped and non-string values are stringified.
pub fn parse_raw_results(value: &Value) -> Vec<RawFields> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| {
                    let text = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), text)
                })
                .collect()
        })
        .collect()
}

/// Builds a candidate from a source's raw card.
///
/// Cards with a blank title, or whose link cannot be resolved against the
/// source's base URL, are dropped here.
pub fn candidate_from_fields(source: SourceKind, fields: &RawFields) -> Option<ListingCandidate> {
    let keys = source.field_keys();
    let field = |key: &str| fields.get(key).map(|s| s.trim().to_string()).unwrap_or_default();

    let title = field(keys.title);
    if title.is_empty() {
        return None;
    }

    let base = Url::parse(source.base_url()).ok()?;
    let href = resolve_href(&base, &field(keys.href))?;

    Some(ListingCandidate {
        title,
        price: field(keys.price),
        location: field(keys.location),
        href,
        image_url: field(keys.image),
        source: source.name().to_string(),
    })
}

/// Resolves a card link; absolute links pass through unchanged.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let joined = base.join(href).ok()?;
    match joined.scheme() {
        "http" | "https" => Some(joined.to_string()),
        _ => None,
    }
}

/// Turns a candidate that passed classification into a listing.
pub fn into_listing(
    candidate: ListingCandidate,
    source: SourceKind,
    transaction: Transaction,
    region: &str,
) -> Listing {
    let (address, address_is_placeholder) = if candidate.location.is_empty() {
        (source.fallback_address(region), true)
    } else {
        (candidate.location, false)
    };

    let mut listing = Listing {
        address,
        listing_url: candidate.href,
        source: candidate.source,
        description: candidate.title,
        address_is_placeholder,
        ..Listing::default()
    };

    if !candidate.price.is_empty() {
        match transaction {
            Transaction::Lease => listing.rental_cost = Some(candidate.price),
            Transaction::Sale => listing.purchase_cost = Some(candidate.price),
        }
    }

    if is_http_url(&candidate.image_url) {
        listing.image_urls.push(candidate.image_url);
    }

    listing
}
