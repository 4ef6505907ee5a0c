// sources.rs
use crate::scraper::browser::PageScript;
use crate::scraper::scripts;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The sites we know how to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Kijiji,
    Spacelist,
    Craigslist,
}

/// Whether a search page lists space for lease or for sale. Decides which
/// cost field the card's price lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Lease,
    Sale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUrl {
    pub url: String,
    pub transaction: Transaction,
}

impl SearchUrl {
    fn lease(url: String) -> Self {
        Self {
            url,
            transaction: Transaction::Lease,
        }
    }
}

/// Names of the fields a source's card script emits.
#[derive(Debug, Clone, Copy)]
pub struct FieldKeys {
    pub title: &'static str,
    pub price: &'static str,
    pub location: &'static str,
    pub href: &'static str,
    pub image: &'static str,
}

// Commercial & office space category, one row per region:
// (region slug, location code, keywords)
const KIJIJI_SEARCHES: &[(&str, &str, &[&str])] = &[
    (
        "city-of-toronto",
        "1700273",
        &[
            "photography+studio",
            "photo+studio",
            "photography",
            "creative+studio",
            "studio+space",
            "studio+rental",
            "studio+for+rent",
            "warehouse",
            "loft",
            "industrial+unit",
            "production+space",
            "commercial+unit",
        ],
    ),
    (
        "mississauga-peel-region",
        "1700276",
        &["photography+studio", "studio+space", "warehouse", "industrial+unit", "commercial+unit"],
    ),
    (
        "markham-york-region",
        "1700274",
        &["photography+studio", "studio+space", "warehouse", "industrial+unit", "commercial+unit"],
    ),
    (
        "oakville-halton-region",
        "1700277",
        &["studio+space", "warehouse", "commercial+unit"],
    ),
    (
        "hamilton",
        "1700242",
        &["studio+space", "warehouse", "industrial+unit", "commercial+unit"],
    ),
    (
        "oshawa-durham-region",
        "1700275",
        &["studio+space", "warehouse", "commercial+unit"],
    ),
    ("kitchener-waterloo", "1700212", &["studio+space", "warehouse"]),
    (
        "ontario",
        "9004",
        &[
            "photography+studio",
            "photo+studio",
            "creative+studio",
            "warehouse+space",
            "industrial+unit",
        ],
    ),
];

// (transaction, location, keywords)
const SPACELIST_SEARCHES: &[(Transaction, &str, &str)] = &[
    (Transaction::Lease, "Toronto+ON", "photography+studio"),
    (Transaction::Sale, "Toronto+ON", "photography+studio"),
    (Transaction::Lease, "Toronto+ON", "studio"),
    (Transaction::Lease, "Mississauga+ON", "photography+studio"),
    (Transaction::Sale, "Mississauga+ON", "photography+studio"),
    (Transaction::Lease, "Mississauga+ON", "studio"),
    (Transaction::Lease, "Hamilton+ON", "studio"),
    (Transaction::Lease, "Markham+ON", "studio"),
    (Transaction::Lease, "Vaughan+ON", "studio"),
    (Transaction::Lease, "Brampton+ON", "studio"),
    (Transaction::Lease, "Oakville+ON", "studio"),
    (Transaction::Lease, "Kitchener+ON", "studio"),
];

// Offices & commercial section, per city site: (subdomain, queries)
const CRAIGSLIST_SEARCHES: &[(&str, &[&str])] = &[
    (
        "toronto",
        &[
            "photography+studio",
            "photo+studio",
            "creative+studio",
            "studio+space",
            "warehouse+space",
            "industrial+unit",
            "loft+space",
            "commercial+space",
        ],
    ),
    ("hamilton", &["studio+space", "warehouse+space", "commercial+space"]),
];

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Kijiji, SourceKind::Spacelist, SourceKind::Craigslist];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Kijiji => "Kijiji",
            SourceKind::Spacelist => "Spacelist.ca",
            SourceKind::Craigslist => "Craigslist",
        }
    }

    /// Short lowercase tag used in file names.
    pub fn slug(&self) -> &'static str {
        match self {
            SourceKind::Kijiji => "kijiji",
            SourceKind::Spacelist => "spacelist",
            SourceKind::Craigslist => "craigslist",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            SourceKind::Kijiji => "https://www.kijiji.ca",
            SourceKind::Spacelist => "https://www.spacelist.ca",
            SourceKind::Craigslist => "https://toronto.craigslist.org",
        }
    }

    pub fn field_keys(&self) -> FieldKeys {
        let location = match self {
            SourceKind::Spacelist => "address",
            SourceKind::Kijiji | SourceKind::Craigslist => "location",
        };
        FieldKeys {
            title: "title",
            price: "price",
            location,
            href: "href",
            image: "image",
        }
    }

    /// Address used when a card carries no location text.
    pub fn fallback_address(&self, region: &str) -> String {
        match self {
            SourceKind::Kijiji => "Mississauga / Peel Region, ON".to_string(),
            SourceKind::Spacelist => format!("Near {region}"),
            SourceKind::Craigslist => "GTA, Ontario".to_string(),
        }
    }

    /// Spacelist only carries commercial inventory, so the residential check
    /// is skipped there.
    pub fn checks_residential(&self) -> bool {
        !matches!(self, SourceKind::Spacelist)
    }

    /// Spacelist's card selector also matches untitled wrapper elements, so
    /// those are dropped before the per-page cap is applied.
    pub fn drops_untitled_before_cap(&self) -> bool {
        matches!(self, SourceKind::Spacelist)
    }

    pub fn settle_time(&self) -> Duration {
        match self {
            SourceKind::Kijiji | SourceKind::Spacelist => Duration::from_secs(3),
            SourceKind::Craigslist => Duration::from_secs(2),
        }
    }

    /// How many of this source's listings get a detail-page visit.
    pub fn detail_cap(&self) -> usize {
        match self {
            SourceKind::Spacelist => 6,
            SourceKind::Kijiji | SourceKind::Craigslist => 8,
        }
    }

    pub fn card_script(&self) -> PageScript {
        match self {
            SourceKind::Kijiji => scripts::kijiji_cards,
            SourceKind::Spacelist => scripts::spacelist_cards,
            SourceKind::Craigslist => scripts::craigslist_cards,
        }
    }

    /// Every keyword/region/transaction combination queried for this source,
    /// in the order they are visited.
    pub fn search_urls(&self) -> Vec<SearchUrl> {
        let base = self.base_url();
        match self {
            SourceKind::Kijiji => KIJIJI_SEARCHES
                .iter()
                .flat_map(|(region, code, keywords)| {
                    keywords.iter().map(move |kw| {
                        SearchUrl::lease(format!(
                            "{base}/b-commercial-office-space/{region}/{kw}/k0c40l{code}"
                        ))
                    })
                })
                .collect(),
            SourceKind::Spacelist => SPACELIST_SEARCHES
                .iter()
                .map(|(transaction, location, keywords)| {
                    let kind = match transaction {
                        Transaction::Lease => "lease",
                        Transaction::Sale => "sale",
                    };
                    SearchUrl {
                        url: format!("{base}/search?type={kind}&location={location}&keywords={keywords}"),
                        transaction: *transaction,
                    }
                })
                .collect(),
            SourceKind::Craigslist => CRAIGSLIST_SEARCHES
                .iter()
                .flat_map(|(city, queries)| {
                    queries.iter().map(move |q| {
                        SearchUrl::lease(format!("https://{city}.craigslist.org/search/off?query={q}"))
                    })
                })
                .collect(),
        }
    }
}
