// src/domain/patterns.rs

use regex::Regex;
use std::sync::LazyLock;

/// Which side of the transaction a price pattern should look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Rent,
    Sale,
}

// Ordered most specific first; the first pattern that matches wins.
static RENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\$[\d,]+(?:\.\d{2})?\s*/\s*(?:mo(?:nth)?|yr|year)",
        r"(?i)\$[\d,]+(?:\.\d{2})?\s*/\s*(?:sf|sqft|sq\.?\s*ft)",
        r"(?i)\$[\d,]+(?:\.\d{2})?\s*(?:per\s+(?:month|year|sf|sqft))",
        r"(?i)(?:rent|lease)[:\s]*\$[\d,]+(?:\.\d{2})?",
        r"(?i)\$[\d,]+(?:\.\d{2})?\s*/mo",
    ])
});

static SALE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\$[\d,]+(?:\.\d{2})?\s*(?:asking|sale|purchase)",
        r"(?i)(?:price|asking|sale)[:\s]*\$[\d,]+(?:\.\d{2})?",
        // $500,000 or $1,200,000 and up
        r"\$\d{1,3}(?:,\d{3}){2,}",
    ])
});

static STREET_LINE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\d+\s+\w+\s+(St|Ave|Rd|Dr|Blvd|Cres|Way|Ct|Ln|Pl|Street|Avenue|Road|Drive|Boulevard)",
    ])
});

const MAX_ADDRESS_CHARS: usize = 120;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

/// Finds the first price-looking fragment of `text` for the given kind.
pub fn extract_price(text: &str, kind: PriceKind) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let patterns = match kind {
        PriceKind::Rent => &*RENT_PATTERNS,
        PriceKind::Sale => &*SALE_PATTERNS,
    };

    patterns
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_string())
}

/// Finds the first line of `text` that reads like a street address.
pub fn extract_address(text: &str) -> Option<String> {
    text.split(['\n', '\r', '·', '|'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| STREET_LINE.iter().any(|re| re.is_match(line)))
        .map(|line| truncate_chars(line, MAX_ADDRESS_CHARS))
}

/// Cuts `s` to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
