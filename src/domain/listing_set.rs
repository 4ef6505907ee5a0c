// src/domain/listing_set.rs

use crate::domain::listing::Listing;
use indexmap::IndexMap;

/// Listings keyed by URL, iterated in the order they were first seen.
#[derive(Debug, Default, Clone)]
pub struct ListingSet {
    by_url: IndexMap<String, Listing>,
}

impl ListingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    /// Inserts unless a listing with the same URL is already present.
    /// The first listing seen for a URL wins; returns `false` for duplicates.
    pub fn insert(&mut self, listing: Listing) -> bool {
        if listing.listing_url.is_empty() || self.by_url.contains_key(&listing.listing_url) {
            return false;
        }
        self.by_url.insert(listing.listing_url.clone(), listing);
        true
    }

    /// Merges another set into this one, keeping existing entries on conflict.
    /// Returns how many listings were actually added.
    pub fn extend(&mut self, other: ListingSet) -> usize {
        let mut added = 0;
        for listing in other.into_vec() {
            if self.insert(listing) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    /// Mutable access to the first `n` listings in insertion order.
    pub fn first_n_mut(&mut self, n: usize) -> impl Iterator<Item = &mut Listing> {
        self.by_url.values_mut().take(n)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.by_url.values()
    }

    pub fn into_vec(self) -> Vec<Listing> {
        self.by_url.into_values().collect()
    }
}
