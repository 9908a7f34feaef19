//! Anniversary sources.
//!
//! Each source implements [`Fetcher`] and produces candidate
//! [`Anniversary`] records for a date. Sources are tried in priority
//! order by the [`FetcherManager`]:
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Wikipedia (en) | [`wikipedia`] | HTML scraping of "On this day" pages |
//! | Wikipedia (ja) | [`wikipedia_ja`] | HTML scraping, Japan-related entries first |
//! | Static data | [`fallback`] | Per-language JSON keyed by MM-DD |
//!
//! Every fetcher filters its output through the negative-topic filter
//! before returning, so the manager only ever sees publishable candidates.

pub mod fallback;
pub mod wikipedia;
pub mod wikipedia_ja;

use crate::error::FetchError;
use crate::models::Anniversary;
use async_trait::async_trait;
use chrono::NaiveDate;
use ego_tree::NodeRef;
use scraper::{ElementRef, Node};
use tracing::{info, instrument, warn};

/// A source of anniversary candidates for a date.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Source name used in logs and aggregate errors.
    fn name(&self) -> &'static str;

    /// Cheap precondition check; unavailable fetchers are skipped.
    fn is_available(&self) -> bool {
        true
    }

    /// Fetch candidates for the given date. An empty list is not an
    /// error; the manager treats it as "try the next source".
    async fn fetch(&self, target_date: NaiveDate) -> Result<Vec<Anniversary>, FetchError>;
}

/// Tries fetchers in order and returns the first non-empty result.
pub struct FetcherManager {
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl FetcherManager {
    pub fn new(fetchers: Vec<Box<dyn Fetcher>>) -> Self {
        Self { fetchers }
    }

    /// Fetch anniversaries using the fallback chain.
    ///
    /// Per-fetcher failures are logged and swallowed; only exhausting
    /// every source produces an error.
    #[instrument(level = "info", skip_all, fields(date = %target_date))]
    pub async fn fetch_anniversaries(
        &self,
        target_date: NaiveDate,
    ) -> Result<Vec<Anniversary>, FetchError> {
        let mut tried = Vec::new();

        for fetcher in &self.fetchers {
            let name = fetcher.name();
            tried.push(name.to_string());

            if !fetcher.is_available() {
                info!(fetcher = name, "Fetcher not available, skipping");
                continue;
            }

            info!(fetcher = name, "Trying fetcher");
            match fetcher.fetch(target_date).await {
                Ok(anniversaries) if !anniversaries.is_empty() => {
                    info!(
                        fetcher = name,
                        count = anniversaries.len(),
                        "Fetched anniversaries"
                    );
                    return Ok(anniversaries);
                }
                Ok(_) => {
                    warn!(fetcher = name, "Fetcher returned no anniversaries");
                }
                Err(e) => {
                    warn!(fetcher = name, error = %e, "Fetcher failed");
                }
            }
        }

        Err(FetchError::AllSourcesFailed { tried })
    }
}

/// Find the first `<ul>` in document order after `heading`.
///
/// Wikipedia wraps the events list differently across page revisions
/// (direct sibling, or nested inside a wrapper div), so this walks the
/// heading's following siblings, descending into each, then climbs to the
/// parent and repeats.
pub(crate) fn next_list_after<'a>(heading: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    fn find_ul(node: NodeRef<'_, Node>) -> Option<ElementRef<'_>> {
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "ul" {
                return Some(el);
            }
        }
        node.children().find_map(find_ul)
    }

    let mut scope: NodeRef<'a, Node> = **heading;
    loop {
        for sibling in scope.next_siblings() {
            if let Some(ul) = find_ul(sibling) {
                return Some(ul);
            }
        }
        scope = scope.parent()?;
    }
}

/// Direct `<li>` children of a list element, as concatenated text.
pub(crate) fn list_item_texts(list: &ElementRef<'_>) -> Vec<String> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "li")
        .map(|li| li.text().collect::<String>())
        .collect()
}

/// First category whose keyword table matches the description; tables are
/// checked in a fixed order and the first hit wins.
pub(crate) fn categorize(description: &str, tables: &[(&'static str, &[&str])]) -> &'static str {
    for (category, keywords) in tables {
        if keywords.iter().any(|kw| description.contains(kw)) {
            return category;
        }
    }
    "historical"
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FailingFetcher;

    #[async_trait]
    impl Fetcher for FailingFetcher {
        fn name(&self) -> &'static str {
            "FailingFetcher"
        }
        async fn fetch(&self, _d: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
            Err(FetchError::Markup("boom".into()))
        }
    }

    struct EmptyFetcher;

    #[async_trait]
    impl Fetcher for EmptyFetcher {
        fn name(&self) -> &'static str {
            "EmptyFetcher"
        }
        async fn fetch(&self, _d: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
            Ok(vec![])
        }
    }

    struct OneFetcher;

    #[async_trait]
    impl Fetcher for OneFetcher {
        fn name(&self) -> &'static str {
            "OneFetcher"
        }
        async fn fetch(&self, date: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
            Ok(vec![Anniversary::new(
                date,
                "x",
                "x event",
                "historical",
                1900,
                "Test",
            )])
        }
    }

    /// Records whether it was ever invoked; must stay untouched once an
    /// earlier fetcher succeeds.
    struct TrippedFetcher(&'static AtomicBool);

    #[async_trait]
    impl Fetcher for TrippedFetcher {
        fn name(&self) -> &'static str {
            "TrippedFetcher"
        }
        async fn fetch(&self, _d: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    struct UnavailableFetcher(&'static AtomicBool);

    #[async_trait]
    impl Fetcher for UnavailableFetcher {
        fn name(&self) -> &'static str {
            "UnavailableFetcher"
        }
        fn is_available(&self) -> bool {
            false
        }
        async fn fetch(&self, _d: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_first_non_empty_wins_and_stops() {
        static TRIPPED: AtomicBool = AtomicBool::new(false);
        let manager = FetcherManager::new(vec![
            Box::new(FailingFetcher),
            Box::new(EmptyFetcher),
            Box::new(OneFetcher),
            Box::new(TrippedFetcher(&TRIPPED)),
        ]);
        let result = manager.fetch_anniversaries(date()).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "x");
        assert!(!TRIPPED.load(Ordering::SeqCst), "fetcher after the winner ran");
    }

    #[tokio::test]
    async fn test_all_failing_is_aggregate_error() {
        let manager =
            FetcherManager::new(vec![Box::new(FailingFetcher), Box::new(EmptyFetcher)]);
        let err = manager.fetch_anniversaries(date()).await.unwrap_err();
        match err {
            FetchError::AllSourcesFailed { tried } => {
                assert_eq!(tried, vec!["FailingFetcher", "EmptyFetcher"]);
            }
            other => panic!("expected AllSourcesFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unavailable_fetcher_skipped() {
        static PROBED: AtomicBool = AtomicBool::new(false);
        let manager = FetcherManager::new(vec![
            Box::new(UnavailableFetcher(&PROBED)),
            Box::new(OneFetcher),
        ]);
        let result = manager.fetch_anniversaries(date()).await.unwrap();
        assert_eq!(result.len(), 1);
        assert!(!PROBED.load(Ordering::SeqCst));
    }

    #[test]
    fn test_next_list_after_direct_sibling() {
        let html = Html::parse_document(
            "<html><body><h2 id=\"Events\">Events</h2><ul><li>a</li></ul></body></html>",
        );
        let sel = Selector::parse("h2").unwrap();
        let heading = html.select(&sel).next().unwrap();
        let list = next_list_after(&heading).unwrap();
        assert_eq!(list_item_texts(&list), vec!["a"]);
    }

    #[test]
    fn test_next_list_after_wrapped_in_div() {
        let html = Html::parse_document(
            "<html><body><h2 id=\"Events\">Events</h2><div><p>intro</p><ul><li>a</li><li>b</li></ul></div></body></html>",
        );
        let sel = Selector::parse("h2").unwrap();
        let heading = html.select(&sel).next().unwrap();
        let list = next_list_after(&heading).unwrap();
        assert_eq!(list_item_texts(&list).len(), 2);
    }

    #[test]
    fn test_next_list_after_heading_in_wrapper() {
        // Heading wrapped in its own container; the list hangs off the
        // container's sibling, reachable only by climbing to the parent.
        let html = Html::parse_document(
            "<html><body><div class=\"mw-heading\"><h2 id=\"Events\">Events</h2></div><ul><li>a</li></ul></body></html>",
        );
        let sel = Selector::parse("h2").unwrap();
        let heading = html.select(&sel).next().unwrap();
        let list = next_list_after(&heading).unwrap();
        assert_eq!(list_item_texts(&list), vec!["a"]);
    }

    #[test]
    fn test_no_list_returns_none() {
        let html =
            Html::parse_document("<html><body><h2 id=\"Events\">Events</h2></body></html>");
        let sel = Selector::parse("h2").unwrap();
        let heading = html.select(&sel).next().unwrap();
        assert!(next_list_after(&heading).is_none());
    }

    #[test]
    fn test_categorize_first_table_wins() {
        let tables: &[(&'static str, &[&str])] = &[
            ("scientific", &["discover"]),
            ("political", &["president"]),
        ];
        assert_eq!(
            categorize("the president discovers a comet", tables),
            "scientific"
        );
        assert_eq!(categorize("nothing matches here", tables), "historical");
    }
}
