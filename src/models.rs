//! Data models shared across the pipeline.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Anniversary`]: one historical event candidate tied to a calendar day
//! - [`GeneratedApp`]: the HTML/CSS/JS bundle produced for a selected anniversary
//! - [`AppMetadata`]: the `metadata.json` document written next to each app
//! - [`AppRecord`]: a published app as rediscovered by scanning the docs tree

use crate::config::Language;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A historical anniversary or commemorative day.
///
/// Constructed by a fetcher, passed through the content filter, scored
/// during selection, and finally consumed by the generator. The
/// `interest_score` starts at 0.0 and is written exactly once, by
/// deterministic selection.
#[derive(Debug, Clone)]
pub struct Anniversary {
    /// The calendar date this anniversary applies to.
    pub date: NaiveDate,
    /// Short title, derived from the description by the fetcher.
    pub title: String,
    /// Full event description.
    pub description: String,
    /// One of "historical", "commemorative", "cultural", "scientific",
    /// "political"; "historical" when nothing else matched.
    pub category: String,
    /// Year of the original event. Negative for BCE.
    pub year: i32,
    /// Which fetcher produced this record ("Wikipedia", "Wikipedia (ja)", "Fallback").
    pub source: String,
    /// Heuristic interest score in [0, 1].
    pub interest_score: f64,
}

impl Anniversary {
    pub fn new(
        date: NaiveDate,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        year: i32,
        source: impl Into<String>,
    ) -> Self {
        Self {
            date,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            year,
            source: source.into(),
            interest_score: 0.0,
        }
    }

    /// Years elapsed between the event and the anniversary date.
    pub fn years_ago(&self) -> i32 {
        use chrono::Datelike;
        self.date.year() - self.year
    }
}

impl fmt::Display for Anniversary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} years ago)",
            self.title,
            self.year,
            self.years_ago()
        )
    }
}

/// A generated web application for one anniversary.
///
/// Invariant: `html`, `css` and `js` are non-empty and have passed the
/// structural checks in [`crate::generator::validate`] before a value of
/// this type leaves the generator.
#[derive(Debug)]
pub struct GeneratedApp {
    pub html: String,
    pub css: String,
    pub js: String,
    /// Free-form metadata the model returned in its `<metadata>` block.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub anniversary: Anniversary,
    pub language: Language,
    pub generated_at: DateTime<Local>,
    /// Extended thinking trace, empty unless enabled in config.
    pub thinking: String,
}

impl GeneratedApp {
    /// The display title: the model's `app_title` if present, otherwise
    /// the anniversary title.
    pub fn app_title(&self) -> &str {
        self.metadata
            .get("app_title")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.anniversary.title)
    }
}

/// The anniversary portion of `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnniversaryMeta {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub category: String,
    pub source: String,
}

impl From<&Anniversary> for AnniversaryMeta {
    fn from(ann: &Anniversary) -> Self {
        Self {
            title: ann.title.clone(),
            description: ann.description.clone(),
            year: ann.year,
            category: ann.category.clone(),
            source: ann.source.clone(),
        }
    }
}

/// The `metadata.json` document written into every app directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// ISO date the app was published for.
    pub date: String,
    pub anniversary: AnniversaryMeta,
    /// Free-form metadata from the generator.
    #[serde(default)]
    pub app: serde_json::Map<String, serde_json::Value>,
    pub generated_at: String,
    pub generator_version: String,
}

impl AppMetadata {
    pub fn new(app: &GeneratedApp, target_date: NaiveDate) -> Self {
        Self {
            date: target_date.to_string(),
            anniversary: AnniversaryMeta::from(&app.anniversary),
            app: app.metadata.clone(),
            generated_at: app.generated_at.to_rfc3339(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A published app rediscovered by scanning the docs tree.
#[derive(Debug, Clone)]
pub struct AppRecord {
    /// Path of the app directory relative to the docs root, e.g. `en/2026/01-15`.
    pub path: PathBuf,
    pub metadata: AppMetadata,
    /// Year directory name, e.g. `2026`.
    pub year: String,
    /// Date directory name, e.g. `01-15`.
    pub date: String,
    /// Language directory name, `ja` or `en`.
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_anniversary() -> Anniversary {
        Anniversary::new(
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            "First transatlantic telephone call",
            "The first official transatlantic telephone call is made between New York and London.",
            "scientific",
            1926,
            "Wikipedia",
        )
    }

    #[test]
    fn test_years_ago() {
        let ann = sample_anniversary();
        assert_eq!(ann.years_ago(), 100);
    }

    #[test]
    fn test_years_ago_bce() {
        let mut ann = sample_anniversary();
        ann.year = -44;
        assert_eq!(ann.years_ago(), 2070);
    }

    #[test]
    fn test_display_format() {
        let ann = sample_anniversary();
        let s = ann.to_string();
        assert!(s.contains("First transatlantic telephone call"));
        assert!(s.contains("(1926, 100 years ago)"));
    }

    #[test]
    fn test_metadata_shape() {
        let ann = sample_anniversary();
        let mut meta_map = serde_json::Map::new();
        meta_map.insert("app_title".into(), serde_json::json!("Hello Across the Sea"));

        let app = GeneratedApp {
            html: "<html><body></body></html>".into(),
            css: "body{}".into(),
            js: "console.log(1);".into(),
            metadata: meta_map,
            anniversary: ann.clone(),
            language: Language::En,
            generated_at: Local::now(),
            thinking: String::new(),
        };

        let meta = AppMetadata::new(&app, ann.date);
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["date"], "2026-01-15");
        assert_eq!(json["anniversary"]["year"], 1926);
        assert_eq!(json["anniversary"]["source"], "Wikipedia");
        assert_eq!(json["app"]["app_title"], "Hello Across the Sea");
        assert_eq!(json["generator_version"], env!("CARGO_PKG_VERSION"));
        assert!(json["generated_at"].as_str().is_some());
    }

    #[test]
    fn test_metadata_roundtrip() {
        let raw = r#"{
            "date": "2026-01-01",
            "anniversary": {
                "title": "T", "description": "D", "year": 1900,
                "category": "historical", "source": "Fallback"
            },
            "app": {"app_title": "New Year"},
            "generated_at": "2026-01-01T09:00:00+09:00",
            "generator_version": "0.1.0"
        }"#;
        let meta: AppMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.anniversary.year, 1900);
        assert_eq!(meta.app["app_title"], "New Year");
    }

    #[test]
    fn test_app_title_fallback() {
        let ann = sample_anniversary();
        let app = GeneratedApp {
            html: "<html><body></body></html>".into(),
            css: "body{}".into(),
            js: "x".into(),
            metadata: serde_json::Map::new(),
            anniversary: ann,
            language: Language::En,
            generated_at: Local::now(),
            thinking: String::new(),
        };
        assert_eq!(app.app_title(), "First transatlantic telephone call");
    }
}
