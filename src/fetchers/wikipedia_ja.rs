//! Japanese Wikipedia "On this day" fetcher.
//!
//! Scrapes the できごと section of pages like
//! `https://ja.wikipedia.org/wiki/1月1日` and reorders results so
//! Japan-related entries come first (the Japanese edition lists world
//! events too, but the Japanese site favors domestic history).

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
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const BASE_URL: &str = "https://ja.wikipedia.org/wiki";
const USER_AGENT: &str = concat!("AnniversaryDaily/", env!("CARGO_PKG_VERSION"), " (daily app generator)");
const TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESULTS: usize = 15;
const TITLE_CHARS: usize = 50;

const EVENTS_HEADING_ID: &str = "できごと";

/// Japanese Wikipedia format: "1945年 - IMFと世界銀行が設立された"
static EVENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)年\s*[-–]\s*(.+)").unwrap());

static H2_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());

/// Entries matching any of these sort before the rest (stable otherwise).
const JAPAN_KEYWORDS: &[&str] = &[
    "日本", "japan", "東京", "tokyo", "江戸", "edo",
    "京都", "kyoto", "大阪", "osaka",
    "幕府", "shogunate", "明治", "meiji", "大正", "taisho",
    "昭和", "showa", "平成", "heisei", "令和", "reiwa",
    "将軍", "shogun", "サムライ", "samurai", "侍",
    "作動", "sado", "和", "記念日", "の日",
];

const CATEGORY_TABLES: &[(&str, &[&str])] = &[
    ("scientific", &["発見", "発明", "特許", "実験", "理論", "科学者"]),
    ("political", &["戦争", "条約", "大統領", "天皇", "首相", "帝国", "革命", "政治"]),
    ("cultural", &["絵画", "出版", "作曲", "芸術家", "作家", "美術館", "映画"]),
    ("historical", &["設立", "創設", "誕生", "死去", "暗殺"]),
];

pub struct WikipediaJaFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl WikipediaJaFetcher {
    pub fn new(retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self { client, retry })
    }
}

#[async_trait]
impl Fetcher for WikipediaJaFetcher {
    fn name(&self) -> &'static str {
        "WikipediaJaFetcher"
    }

    #[instrument(level = "info", skip_all, fields(date = %target_date))]
    async fn fetch(&self, target_date: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
        // e.g. https://ja.wikipedia.org/wiki/1月1日
        let url = format!("{BASE_URL}/{}月{}日", target_date.month(), target_date.day());
        debug!(%url, "Fetching Japanese Wikipedia page");

        let body = self
            .retry
            .run("wikipedia_ja_fetch", || async {
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

fn parse_events(body: &str, target_date: NaiveDate) -> Vec<Anniversary> {
    let document = Html::parse_document(body);

    let heading = document
        .select(&H2_SEL)
        .find(|h| h.value().id() == Some(EVENTS_HEADING_ID))
        .or_else(|| {
            document
                .select(&H2_SEL)
                .find(|h| h.text().collect::<String>().contains(EVENTS_HEADING_ID))
        });
    let Some(heading) = heading else {
        warn!("No 'できごと' section found on Japanese Wikipedia page");
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
            debug!(entry = %truncate_chars(text.trim(), 40), "Skipping unparsable event entry");
        }
    }
    info!(count = anniversaries.len(), "Parsed events from Japanese Wikipedia");

    let prioritized = prioritize_japan_related(anniversaries);
    let positive = filter_positive(prioritized);
    info!(count = positive.len(), "Events after negative-topic filter");

    positive.into_iter().take(MAX_RESULTS).collect()
}

/// Stable partition: Japan-related entries first, original order kept
/// within each half.
fn prioritize_japan_related(anniversaries: Vec<Anniversary>) -> Vec<Anniversary> {
    let (mut japan, other): (Vec<_>, Vec<_>) = anniversaries.into_iter().partition(|ann| {
        let text = format!("{} {}", ann.title, ann.description).to_lowercase();
        JAPAN_KEYWORDS.iter().any(|kw| text.contains(kw))
    });
    info!(
        japan_related = japan.len(),
        other = other.len(),
        "Prioritized Japan-related events"
    );
    japan.extend(other);
    japan
}

fn parse_event_item(text: &str, target_date: NaiveDate) -> Option<Anniversary> {
    let caps = EVENT_RE.captures(text.trim())?;

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let description = caps.get(2)?.as_str().trim().to_string();

    let title = truncate_chars(&description, TITLE_CHARS);
    let category = categorize(&description, CATEGORY_TABLES);

    Some(Anniversary::new(
        target_date,
        title,
        description,
        category,
        year,
        "Wikipedia (ja)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    #[test]
    fn test_parse_japanese_event() {
        let ann = parse_event_item("1890年 - 日本初の路面電車が開業。", date()).unwrap();
        assert_eq!(ann.year, 1890);
        assert_eq!(ann.description, "日本初の路面電車が開業。");
        assert_eq!(ann.source, "Wikipedia (ja)");
    }

    #[test]
    fn test_parse_ascii_hyphen_variant() {
        let ann = parse_event_item("1950年 - 図書館が開館。", date()).unwrap();
        assert_eq!(ann.year, 1950);
    }

    #[test]
    fn test_unparsable_entry_skipped() {
        assert!(parse_event_item("できごとの概要", date()).is_none());
    }

    #[test]
    fn test_title_truncated_on_multibyte() {
        let description = "あ".repeat(80);
        let entry = format!("1900年 - {description}");
        let ann = parse_event_item(&entry, date()).unwrap();
        assert_eq!(ann.title.chars().count(), TITLE_CHARS + 3);
        assert!(ann.title.ends_with("..."));
    }

    #[test]
    fn test_categorizer_japanese_tables() {
        let ann = parse_event_item("1901年 - 新元素が発見される。", date()).unwrap();
        assert_eq!(ann.category, "scientific");

        let ann = parse_event_item("1920年 - 新しい美術館が開館する。", date()).unwrap();
        assert_eq!(ann.category, "cultural");
    }

    #[test]
    fn test_japan_related_sorted_first() {
        let input = vec![
            parse_event_item("1886年 - ある大学が創立される。", date()).unwrap(),
            parse_event_item("1890年 - 東京で博覧会が開かれる。", date()).unwrap(),
            parse_event_item("1895年 - ある橋が完成する。", date()).unwrap(),
            parse_event_item("1900年 - 京都に図書館が開館。", date()).unwrap(),
        ];
        let ordered = prioritize_japan_related(input);
        let years: Vec<i32> = ordered.iter().map(|a| a.year).collect();
        assert_eq!(years, vec![1890, 1900, 1886, 1895]);
    }

    #[test]
    fn test_parse_events_heading_by_id() {
        let body = "<html><body><h2 id=\"できごと\">できごと</h2>\
                    <ul><li>1872年 - 新橋駅と横浜駅の間に鉄道が開業。</li></ul></body></html>";
        let events = parse_events(body, date());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].year, 1872);
    }

    #[test]
    fn test_parse_events_heading_by_text() {
        let body = "<html><body><h2><span>できごと</span></h2>\
                    <ul><li>1958年 - 東京タワーが完成する。</li></ul></body></html>";
        let events = parse_events(body, date());
        assert_eq!(events.len(), 1);
    }
}
