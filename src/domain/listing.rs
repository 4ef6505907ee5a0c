// src/domain/listing.rs

use serde::{Deserialize, Serialize};

/// Upper bound on remote images kept per listing.
pub const MAX_IMAGES: usize = 8;

/// A raw card pulled off a search results page, before classification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingCandidate {
    pub title: String,
    pub price: String,
    pub location: String,
    pub href: String,
    pub image_url: String,
    pub source: String,
}

/// A classified, deduplicated listing handed back to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub address: String,
    pub rental_cost: Option<String>,
    pub purchase_cost: Option<String>,
    pub listing_url: String,
    pub source: String,
    pub description: String,
    pub image_urls: Vec<String>,
    pub local_image_paths: Vec<String>,

    // Set when `address` is the source's fallback rather than scraped text.
    #[serde(skip)]
    pub address_is_placeholder: bool,
}

impl Listing {
    /// Appends an image URL if it is absolute HTTP(S), not already present,
    /// and the listing is still under `MAX_IMAGES`. Returns whether it was added.
    pub fn push_image(&mut self, url: &str) -> bool {
        if self.image_urls.len() >= MAX_IMAGES || !is_http_url(url) {
            return false;
        }
        if self.image_urls.iter().any(|u| u == url) {
            return false;
        }
        self.image_urls.push(url.to_string());
        true
    }

    /// Fills the rental cost only when nothing was found yet.
    pub fn fill_rental_cost(&mut self, cost: Option<String>) {
        if is_blank(&self.rental_cost) {
            if let Some(c) = cost.filter(|c| !c.trim().is_empty()) {
                self.rental_cost = Some(c);
            }
        }
    }

    /// Fills the purchase cost only when nothing was found yet.
    pub fn fill_purchase_cost(&mut self, cost: Option<String>) {
        if is_blank(&self.purchase_cost) {
            if let Some(c) = cost.filter(|c| !c.trim().is_empty()) {
                self.purchase_cost = Some(c);
            }
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// True for absolute `http`/`https` URLs with a host.
pub fn is_http_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host().is_some(),
        Err(_) => false,
    }
}
