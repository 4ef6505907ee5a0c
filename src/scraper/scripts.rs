// scripts.rs
//
// Page scripts run against a loaded page. Site markup is not ours, so every
// script tries several selector strategies and quietly skips cards it cannot
// read.

use crate::domain::listing::{is_http_url, MAX_IMAGES};
use crate::domain::patterns::truncate_chars;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::{json, Value};
use url::Url;

const MIN_IMAGE_PX: u32 = 80;
const BODY_TEXT_CHARS: usize = 5000;

const BLOCKED_IMAGE_WORDS: &[&str] = &[
    "logo", "icon", "favicon", "pixel", "tracking", "google", "facebook", "analytics", "badge",
];

const GALLERY_IMAGES: &str = r#"[class*="gallery"] img, [class*="photo"] img, [class*="image"] img, [class*="slider"] img, [class*="carousel"] img, [class*="hero"] img"#;

const ADDRESS_ELEMENTS: &str = r#"[class*="address"], [itemprop="address"], [data-testid*="address"], address, [class*="Address"]"#;

const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "br", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "section",
    "article", "header", "footer", "address", "dd", "dt",
];

pub fn kijiji_cards(doc: &Html, _page: &Url) -> Value {
    let mut results = Vec::new();
    let Some(cards) = selector(r#"[data-testid="listing-card"], [data-listing-id], li.regular-ad"#) else {
        return Value::Array(results);
    };

    for card in doc.select(&cards) {
        let link = first_in(card, r#"a[href*="/v-"]"#).or_else(|| first_in(card, "a[href]"));
        let title = text_of(first_in(card, r#"h3, [data-testid="listing-title"], a[class*="title"]"#));
        let price = text_of(first_in(
            card,
            r#"[data-testid="listing-price"], p[class*="price"], span[class*="price"]"#,
        ));
        let location = text_of(first_in(
            card,
            r#"[data-testid="listing-location"], span[class*="location"], p[class*="location"]"#,
        ));

        if title.is_empty() && price.is_empty() {
            continue;
        }

        results.push(json!({
            "href": attr_of(link, "href"),
            "title": title,
            "price": price,
            "location": location,
            "image": attr_of(first_in(card, r#"img[src*="http"]"#), "src"),
        }));
    }

    Value::Array(results)
}

pub fn spacelist_cards(doc: &Html, _page: &Url) -> Value {
    let mut results = Vec::new();
    let Some(cards) = selector(r#"[class*="listing"], [class*="property"], [class*="card"], article, .search-result"#)
    else {
        return Value::Array(results);
    };

    for card in doc.select(&cards) {
        let link = first_in(card, r#"a[href*="/l/"], a[href*="/listing"], a[href]"#);
        let title = first_in(card, r#"h2, h3, [class*="title"], [class*="name"]"#);
        if link.is_none() && title.is_none() {
            continue;
        }

        results.push(json!({
            "href": attr_of(link, "href"),
            "title": text_of(title),
            "price": text_of(first_in(card, r#"[class*="price"], [class*="rate"], [class*="Price"]"#)),
            "address": text_of(first_in(card, r#"[class*="address"], [class*="location"], [class*="Address"]"#)),
            "image": attr_of(first_in(card, r#"img[src*="http"]"#), "src"),
        }));
    }

    Value::Array(results)
}

pub fn craigslist_cards(doc: &Html, _page: &Url) -> Value {
    let mut results = Vec::new();
    let Some(rows) = selector(".cl-search-result, li.result-row, .result-info") else {
        return Value::Array(results);
    };

    for row in doc.select(&rows) {
        let link = first_in(row, r#"a[href*="craigslist"], a.posting-title, a.result-title, a[href]"#);
        let title_el = first_in(row, ".posting-title .label, .result-title, a .label, .title");
        if link.is_none() && title_el.is_none() {
            continue;
        }

        let title = match title_el {
            Some(el) => inner_text(el),
            None => text_of(link),
        };

        results.push(json!({
            "href": attr_of(link, "href"),
            "title": title,
            "price": text_of(first_in(row, ".priceinfo, .result-price, .price")),
            "location": text_of(first_in(row, ".meta .subreddit, .result-hood, .nearby")),
            "image": attr_of(first_in(row, r#"img[src*="http"]"#), "src"),
        }));
    }

    Value::Array(results)
}

/// Pulls gallery images, a prefix of the body text and an address-like
/// element from a listing's own page.
pub fn detail_page(doc: &Html, _page: &Url) -> Value {
    let mut images: Vec<String> = Vec::new();

    if let Some(all) = selector(r#"img[src*="http"]"#) {
        for img in doc.select(&all) {
            let src = img.value().attr("src").unwrap_or_default();
            if is_http_url(src)
                && is_large_enough(img)
                && !is_blocked_image(src)
                && !images.iter().any(|i| i == src)
            {
                images.push(src.to_string());
            }
        }
    }

    if let Some(gallery) = selector(GALLERY_IMAGES) {
        for img in doc.select(&gallery) {
            let src = img
                .value()
                .attr("src")
                .filter(|s| !s.is_empty())
                .or_else(|| img.value().attr("data-src"))
                .unwrap_or_default();
            if is_http_url(src) && !images.iter().any(|i| i == src) {
                images.push(src.to_string());
            }
        }
    }

    images.truncate(MAX_IMAGES);

    let body_text = selector("body")
        .and_then(|s| doc.select(&s).next())
        .map(|body| truncate_chars(&inner_text(body), BODY_TEXT_CHARS))
        .unwrap_or_default();

    let address = selector(ADDRESS_ELEMENTS)
        .and_then(|s| doc.select(&s).next())
        .map(inner_text)
        .unwrap_or_default();

    json!({
        "images": images,
        "bodyText": body_text,
        "address": address,
    })
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_in<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    let found = scope.select(&sel).next();
    found
}

fn text_of(el: Option<ElementRef<'_>>) -> String {
    el.map(inner_text).unwrap_or_default()
}

fn attr_of(el: Option<ElementRef<'_>>, name: &str) -> String {
    el.and_then(|e| e.value().attr(name))
        .unwrap_or_default()
        .to_string()
}

/// Rendered-text approximation: visible text with line breaks at block
/// elements and whitespace collapsed within each line.
pub fn inner_text(el: ElementRef<'_>) -> String {
    let mut buf = String::new();
    collect_text(el, &mut buf);

    buf.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(el: ElementRef<'_>, buf: &mut String) {
    for child in el.children() {
        match child.value() {
            // source line breaks are just whitespace; only blocks break lines
            Node::Text(text) => buf.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c })),
            Node::Element(e) => {
                let tag = e.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&tag);
                if block {
                    buf.push('\n');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, buf);
                }
                if block {
                    buf.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Images with declared dimensions must clear the minimum on both axes.
/// Undeclared dimensions are not known until render, so they pass.
fn is_large_enough(img: ElementRef<'_>) -> bool {
    let dim = |name: &str| {
        img.value()
            .attr(name)
            .map(|v| v.trim().trim_end_matches("px").trim())
            .and_then(|v| v.parse::<u32>().ok())
    };

    dim("width").map_or(true, |w| w > MIN_IMAGE_PX) && dim("height").map_or(true, |h| h > MIN_IMAGE_PX)
}

fn is_blocked_image(src: &str) -> bool {
    let lower = src.to_lowercase();
    BLOCKED_IMAGE_WORDS.iter().any(|w| lower.contains(w))
}
