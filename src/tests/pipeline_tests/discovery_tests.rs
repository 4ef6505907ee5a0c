// src/tests/pipeline_tests/discovery_tests.rs
use crate::cancel::CancelToken;
use crate::discovery::discover;
use crate::errors::PipelineError;
use crate::scraper::{BrowseError, SourceKind};
use crate::tests::utils::*;

const STUDIO_PATH: &str = "/v-commercial-office-space/mississauga/bright-studio/1700001";

fn first_search(source: SourceKind) -> String {
    source.search_urls()[0].url.clone()
}

fn studio_detail_page() -> &'static str {
    r#"<html><body>
         <h1>Bright Photography Studio Warehouse Unit</h1>
         <div class="listing-address">123 Dundas St W, Mississauga</div>
         <img src="https://img.example/studio1.jpg" width="800" height="600">
         <img src="https://img.example/logo.png">
         <img src="https://img.example/tiny.jpg" width="40" height="40">
         <div class="gallery"><img data-src="https://img.example/studio2.jpg"></div>
         <p>Rent: $2,400/month plus utilities. 18 ft ceilings, drive-in door.</p>
         <script>var tracking = "$9,999,999";</script>
       </body></html>"#
}

#[test]
fn kijiji_listing_is_classified_resolved_and_enriched() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 20);

    let results = results_page(&[
        kijiji_card(STUDIO_PATH, "Bright Photography Studio Warehouse Unit", "$2,400", "", "https://img.example/thumb1.jpg"),
        kijiji_card("/v-apartments-condos/toronto/2-bed/1700002", "Spacious 2 Bedroom Apartment", "$2,100", "Toronto", ""),
        kijiji_card("/v-commercial-office-space/toronto/salon/1700003", "Hair salon chair rental available", "$500", "Toronto", ""),
        kijiji_card("/v-commercial-office-space/toronto/office/1700004", "Office", "$900", "Toronto", ""),
    ]);
    let detail_url = format!("https://www.kijiji.ca{STUDIO_PATH}");

    let mut browser = FakeBrowser::new()
        .with_page(&first_search(SourceKind::Kijiji), &results)
        .with_page(&detail_url, studio_detail_page());

    let found = discover(&mut browser, &[SourceKind::Kijiji], &ctx).unwrap();

    assert_eq!(found.len(), 1);
    let listing = &found[0];
    assert_eq!(listing.listing_url, detail_url);
    assert_eq!(listing.source, "Kijiji");
    assert_eq!(listing.description, "Bright Photography Studio Warehouse Unit");
    // card price is kept; the detail page only fills gaps
    assert_eq!(listing.rental_cost.as_deref(), Some("$2,400"));
    assert_eq!(listing.purchase_cost, None);
    assert_eq!(listing.address, "123 Dundas St W, Mississauga");
    assert_eq!(
        listing.image_urls,
        vec![
            "https://img.example/thumb1.jpg",
            "https://img.example/studio1.jpg",
            "https://img.example/studio2.jpg",
        ]
    );
    assert!(listing.local_image_paths.is_empty());
    assert!(browser.visited.contains(&detail_url));
}

#[test]
fn duplicate_urls_across_sources_keep_the_first() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 20);

    let shared = "https://shared.example/listing/1";
    let mut browser = FakeBrowser::new()
        .with_page(
            &first_search(SourceKind::Kijiji),
            &results_page(&[kijiji_card(shared, "Creative warehouse studio A", "$1,900", "Etobicoke, ON", "")]),
        )
        .with_page(
            &first_search(SourceKind::Craigslist),
            &results_page(&[
                craigslist_row(shared, "Creative warehouse studio B", "$1,950"),
                craigslist_row("https://toronto.craigslist.org/tor/off/d/loft/7700001.html", "Sunny loft space for creatives", "$2,200"),
            ]),
        );

    let found = discover(&mut browser, &[SourceKind::Kijiji, SourceKind::Craigslist], &ctx).unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].listing_url, shared);
    assert_eq!(found[0].description, "Creative warehouse studio A");
    assert_eq!(found[0].source, "Kijiji");
    assert_eq!(found[1].source, "Craigslist");
    assert_eq!(found[1].address, "GTA, Ontario");
    assert_eq!(found[1].rental_cost.as_deref(), Some("$2,200"));
}

#[test]
fn a_broken_source_does_not_stop_the_others() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 20);

    let mut browser = FakeBrowser::new()
        .failing(&first_search(SourceKind::Kijiji), FailWith::Navigation)
        .with_page(
            &first_search(SourceKind::Craigslist),
            &results_page(&[craigslist_row(
                "https://toronto.craigslist.org/tor/off/d/studio/7700002.html",
                "Photo studio with cyc wall",
                "$1,500",
            )]),
        );

    let found = discover(&mut browser, &[SourceKind::Kijiji, SourceKind::Craigslist], &ctx).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source, "Craigslist");
}

#[test]
fn session_failure_ends_the_run() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 20);

    let mut browser = FakeBrowser::new().failing(&first_search(SourceKind::Kijiji), FailWith::Session);

    let err = discover(&mut browser, &[SourceKind::Kijiji, SourceKind::Craigslist], &ctx).unwrap_err();

    assert!(matches!(err, PipelineError::Browse(BrowseError::Session(_))));
    assert_eq!(browser.visited, vec![first_search(SourceKind::Kijiji)]);
}

#[test]
fn cancelled_before_start_visits_nothing() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    cancel.cancel();
    let ctx = test_context(&policy, &cancel, 20);

    let mut browser = FakeBrowser::new();
    let err = discover(&mut browser, &SourceKind::ALL, &ctx).unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
    assert!(browser.visited.is_empty());
}

#[test]
fn cancellation_mid_source_discards_partial_results() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 20);

    let search = first_search(SourceKind::Kijiji);
    let mut browser = FakeBrowser::new()
        .with_page(
            &search,
            &results_page(&[kijiji_card(STUDIO_PATH, "Bright Photography Studio Warehouse Unit", "$2,400", "Mississauga", "")]),
        )
        .cancel_on(&search, &cancel);

    let err = discover(&mut browser, &[SourceKind::Kijiji], &ctx).unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(browser.visited, vec![search]);
}

#[test]
fn per_page_cap_limits_cards_taken() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 2);

    let cards: Vec<String> = (1..=4)
        .map(|i| {
            kijiji_card(
                &format!("/v-commercial-office-space/toronto/unit-{i}/170010{i}"),
                &format!("Industrial warehouse unit {i}"),
                "",
                "Toronto, ON",
                "",
            )
        })
        .collect();
    let mut browser = FakeBrowser::new().with_page(&first_search(SourceKind::Kijiji), &results_page(&cards));

    let found = discover(&mut browser, &[SourceKind::Kijiji], &ctx).unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].description, "Industrial warehouse unit 1");
    assert_eq!(found[1].description, "Industrial warehouse unit 2");
    assert_eq!(found[0].rental_cost, None);
}

#[test]
fn spacelist_sale_page_fills_purchase_cost_and_skips_residential_check() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 20);

    let sale = SourceKind::Spacelist.search_urls()[1].clone();
    assert_eq!(sale.transaction, crate::scraper::sources::Transaction::Sale);

    let html = r#"<html><body>
        <article class="listing">
          <a href="/l/toronto/555"><h3>Condo unit photography studio</h3></a>
          <span class="price">$650,000</span>
          <span class="address">55 Mill St, Toronto</span>
        </article>
      </body></html>"#;
    let mut browser = FakeBrowser::new().with_page(&sale.url, html);

    let found = discover(&mut browser, &[SourceKind::Spacelist], &ctx).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].listing_url, "https://www.spacelist.ca/l/toronto/555");
    assert_eq!(found[0].source, "Spacelist.ca");
    assert_eq!(found[0].purchase_cost.as_deref(), Some("$650,000"));
    assert_eq!(found[0].rental_cost, None);
    assert_eq!(found[0].address, "55 Mill St, Toronto");
}

#[test]
fn snapshots_are_taken_per_results_page() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let dir = temp_dir("snapshots");
    let mut ctx = test_context(&policy, &cancel, 20);
    ctx.snapshot_dir = Some(dir.as_path());

    let mut browser = FakeBrowser::new().with_page(&first_search(SourceKind::Craigslist), &results_page(&[]));

    let found = discover(&mut browser, &[SourceKind::Craigslist], &ctx).unwrap();

    assert!(found.is_empty());
    assert_eq!(*browser.snapshots.borrow(), vec![dir.join("craigslist_1.html")]);
}

#[test]
fn spacelist_untitled_wrappers_do_not_use_up_the_page_cap() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 1);

    let html = r#"<html><body>
        <article><a href="/l/toronto/1"><img></a></article>
        <article class="listing">
          <a href="/l/toronto/2"><h3>Creative warehouse studio unit</h3></a>
        </article>
      </body></html>"#;
    let mut browser = FakeBrowser::new().with_page(&first_search(SourceKind::Spacelist), html);

    let found = discover(&mut browser, &[SourceKind::Spacelist], &ctx).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].listing_url, "https://www.spacelist.ca/l/toronto/2");
    assert_eq!(found[0].address, "Near L5A 4E6");
}

#[test]
fn kijiji_counts_untitled_cards_against_the_page_cap() {
    let policy = test_policy();
    let cancel = CancelToken::new();
    let ctx = test_context(&policy, &cancel, 1);

    let cards = vec![
        kijiji_card("/v-commercial-office-space/toronto/x/1700201", "", "$1,000", "Toronto", ""),
        kijiji_card("/v-commercial-office-space/toronto/y/1700202", "Industrial warehouse unit", "", "Toronto", ""),
    ];
    let mut browser = FakeBrowser::new().with_page(&first_search(SourceKind::Kijiji), &results_page(&cards));

    let found = discover(&mut browser, &[SourceKind::Kijiji], &ctx).unwrap();

    assert!(found.is_empty());
}
