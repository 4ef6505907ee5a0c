// src/tests/pipeline_tests/detail_tests.rs
use crate::cancel::CancelToken;
use crate::domain::listing::{Listing, MAX_IMAGES};
use crate::scraper::adapter::{apply_detail, DetailData};
use crate::scraper::{BrowseError, SourceKind};
use crate::tests::utils::*;

fn placeholder_listing() -> Listing {
    Listing {
        listing_url: "https://toronto.craigslist.org/tor/off/d/studio/7700003.html".into(),
        source: "Craigslist".into(),
        description: "Photo studio sublet".into(),
        address: "GTA, Ontario".into(),
        address_is_placeholder: true,
        ..Listing::default()
    }
}

#[test]
fn placeholder_address_falls_back_to_street_line_in_body() {
    let mut listing = placeholder_listing();
    apply_detail(
        &mut listing,
        DetailData {
            body_text: "Photo studio sublet\n45 Sterling Rd, Unit 2 · Toronto\nLease: $1,600 per month".into(),
            ..DetailData::default()
        },
    );

    assert_eq!(listing.address, "45 Sterling Rd, Unit 2");
    assert!(!listing.address_is_placeholder);
    assert_eq!(listing.rental_cost.as_deref(), Some("$1,600 per month"));
}

#[test]
fn scraped_address_is_never_replaced() {
    let mut listing = Listing {
        address: "Liberty Village, Toronto".into(),
        ..placeholder_listing()
    };
    listing.address_is_placeholder = false;

    apply_detail(
        &mut listing,
        DetailData {
            address: "1 Atlantic Ave".into(),
            body_text: "99 Elsewhere St".into(),
            ..DetailData::default()
        },
    );

    assert_eq!(listing.address, "Liberty Village, Toronto");
}

#[test]
fn detail_address_is_truncated() {
    let mut listing = placeholder_listing();
    apply_detail(
        &mut listing,
        DetailData {
            address: "x".repeat(400),
            ..DetailData::default()
        },
    );
    assert_eq!(listing.address.chars().count(), 150);
}

#[test]
fn detail_images_respect_the_cap() {
    let mut listing = placeholder_listing();
    listing.image_urls.push("https://img.example/thumb.jpg".into());

    apply_detail(
        &mut listing,
        DetailData {
            images: (0..12).map(|i| format!("https://img.example/{i}.jpg")).collect(),
            ..DetailData::default()
        },
    );

    assert_eq!(listing.image_urls.len(), MAX_IMAGES);
    assert_eq!(listing.image_urls[0], "https://img.example/thumb.jpg");
}

#[test]
fn missing_detail_page_leaves_listing_as_found() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 20);

    let mut listing = placeholder_listing();
    let before = listing.clone();
    let mut browser = FakeBrowser::new();

    let err = SourceKind::Craigslist
        .enrich_detail(&mut browser, &mut listing, &ctx)
        .unwrap_err();

    assert!(matches!(err, BrowseError::Status { status: 404, .. }));
    assert!(!err.is_fatal());
    assert_eq!(listing, before);
}
