//! English Wikipedia "On this day" fetcher.
//!
//! Scrapes the Events section of pages like
//! `https://en.wikipedia.org/wiki/January_1`. Wikipedia has shipped two
//! heading structures over the years (`<h2 id="Events">` and
//! `<span id="Events">` inside an `h2`/`h3`), so both are recognized.
//! Entries that don't match the `YEAR – description` pattern are skipped.

use crate::error::FetchError;
use crate::fetchers::{categorize, list_item_texts, next_list_after, Fetcher};
use crate::filter::filter_positive;
use crate::models::Anniversary;
use crate::retry::RetryPolicy;
use crate::utils::truncate_chars;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const BASE_URL: &str = "https://en.wikipedia.org/wiki";
const USER_AGENT: &str = concat!("AnniversaryDaily/", env!("CARGO_PKG_VERSION"), " (daily app generator)");
const TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESULTS: usize = 15;
const TITLE_CHARS: usize = 100;

/// Wikipedia format: "YEAR – Event description", sometimes era-qualified
/// ("44 BC – ...") or approximate ("c. 250 – ...").
static EVENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:c\.\s*)?(\d+)\s*(BCE|CE|BC|AD)?\s*[–-]\s*(.+)").unwrap());

static HEADING_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2#Events, h3#Events").unwrap());
static SPAN_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span#Events").unwrap());

/// Category keyword tables, checked in order; first hit wins.
const CATEGORY_TABLES: &[(&str, &[&str])] = &[
    ("scientific", &["discover", "invent", "patent", "experiment", "theory", "scientist"]),
    ("political", &["war", "treaty", "president", "king", "queen", "empire", "revolution"]),
    ("cultural", &["paint", "publish", "compose", "artist", "writer", "museum", "film"]),
    ("historical", &["found", "establish", "birth", "death", "assassin"]),
];

pub struct WikipediaFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl WikipediaFetcher {
    pub fn new(retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self { client, retry })
    }
}

#[async_trait]
impl Fetcher for WikipediaFetcher {
    fn name(&self) -> &'static str {
        "WikipediaFetcher"
    }

    #[instrument(level = "info", skip_all, fields(date = %target_date))]
    async fn fetch(&self, target_date: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
        // e.g. https://en.wikipedia.org/wiki/January_1
        let url = format!("{BASE_URL}/{}_{}", target_date.format("%B"), target_date.day());
        debug!(%url, "Fetching Wikipedia page");

        let body = self
            .retry
            .run("wikipedia_en_fetch", || async {
                self.client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await
            })
            .await?;

        Ok(parse_events(&body, target_date))
    }
}

/// Extract, filter and cap event entries from a page body.
fn parse_events(body: &str, target_date: NaiveDate) -> Vec<Anniversary> {
    let document = Html::parse_document(body);

    let Some(heading) = find_events_heading(&document) else {
        warn!("No 'Events' section found on Wikipedia page");
        return vec![];
    };
    let Some(list) = next_list_after(&heading) else {
        warn!("No events list found after heading");
        return vec![];
    };

    let mut anniversaries = Vec::new();
    for text in list_item_texts(&list) {
        if let Some(ann) = parse_event_item(&text, target_date) {
            anniversaries.push(ann);
        } else {
            debug!(entry = %truncate_chars(text.trim(), 60), "Skipping unparsable event entry");
        }
    }
    info!(count = anniversaries.len(), "Parsed events from Wikipedia");

    let positive = filter_positive(anniversaries);
    info!(count = positive.len(), "Events after negative-topic filter");

    positive.into_iter().take(MAX_RESULTS).collect()
}

fn find_events_heading(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&HEADING_SEL).next().or_else(|| {
        // Older markup: <h2><span id="Events">Events</span></h2>
        document.select(&SPAN_SEL).next().and_then(|span| {
            span.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| matches!(el.value().name(), "h2" | "h3"))
        })
    })
}

/// Parse one list entry. Returns None when the text doesn't follow the
/// `YEAR – description` shape.
fn parse_event_item(text: &str, target_date: NaiveDate) -> Option<Anniversary> {
    let caps = EVENT_RE.captures(text.trim())?;

    let mut year: i32 = caps.get(1)?.as_str().parse().ok()?;
    if matches!(caps.get(2).map(|m| m.as_str()), Some("BCE") | Some("BC")) {
        year = -year;
    }
    let description = caps.get(3)?.as_str().trim().to_string();

    let title = truncate_chars(&description, TITLE_CHARS);
    let category = categorize(&description.to_lowercase(), CATEGORY_TABLES);

    Some(Anniversary::new(
        target_date,
        title,
        description,
        category,
        year,
        "Wikipedia",
    ))
}
