//! App directory writing and rediscovery.
//!
//! The filesystem is the durable store: each app lives in
//! `docs/<lang>/<year>/<MM-DD>/` as four files, and the listing pages are
//! rebuilt by rescanning those directories. A second run on the same day
//! overwrites the existing directory rather than versioning it.

use crate::config::Language;
use crate::error::PublishError;
use crate::models::{AppMetadata, AppRecord, GeneratedApp};
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

pub struct FilePublisher {
    docs_root: PathBuf,
}

impl FilePublisher {
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
        }
    }

    /// Write an app bundle to its dated directory and return the path.
    #[instrument(level = "info", skip_all, fields(language = %app.language, date = %target_date))]
    pub async fn save_app(
        &self,
        app: &GeneratedApp,
        target_date: NaiveDate,
    ) -> Result<PathBuf, PublishError> {
        let app_dir = self
            .docs_root
            .join(app.language.code())
            .join(target_date.year().to_string())
            .join(target_date.format("%m-%d").to_string());
        fs::create_dir_all(&app_dir).await?;

        fs::write(app_dir.join("index.html"), &app.html).await?;
        debug!(bytes = app.html.len(), "Wrote index.html");
        fs::write(app_dir.join("style.css"), &app.css).await?;
        debug!(bytes = app.css.len(), "Wrote style.css");
        fs::write(app_dir.join("app.js"), &app.js).await?;
        debug!(bytes = app.js.len(), "Wrote app.js");

        let metadata = AppMetadata::new(app, target_date);
        let metadata_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(app_dir.join("metadata.json"), metadata_json).await?;

        info!(path = %app_dir.display(), "Saved app");
        Ok(app_dir)
    }

    /// Scan the docs tree and return every published app for a language.
    ///
    /// App directories without a readable `metadata.json` are skipped
    /// with a warning; they exist but cannot be listed.
    #[instrument(level = "info", skip_all, fields(language = %language))]
    pub fn collect_apps(&self, language: Language) -> Result<Vec<AppRecord>, PublishError> {
        let lang_dir = self.docs_root.join(language.code());
        let mut apps = Vec::new();

        if !lang_dir.is_dir() {
            return Ok(apps);
        }

        for year_dir in sorted_subdirs(&lang_dir)? {
            let year = dir_name(&year_dir);
            // Year directories are 2000-2099; anything else is an asset dir.
            if !year.starts_with('2') || year.len() != 4 {
                continue;
            }

            for app_dir in sorted_subdirs(&year_dir)? {
                let date = dir_name(&app_dir);
                if !date.contains('-') {
                    continue;
                }

                let metadata_path = app_dir.join("metadata.json");
                if !metadata_path.is_file() {
                    warn!(path = %app_dir.display(), "No metadata.json in app directory, skipping");
                    continue;
                }
                let metadata: AppMetadata = match std::fs::read_to_string(&metadata_path)
                    .map_err(PublishError::from)
                    .and_then(|raw| serde_json::from_str(&raw).map_err(PublishError::from))
                {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %metadata_path.display(), error = %e, "Failed to read metadata, skipping");
                        continue;
                    }
                };

                apps.push(AppRecord {
                    path: PathBuf::from(language.code()).join(&year).join(&date),
                    metadata,
                    year: year.clone(),
                    date,
                    language: language.code().to_string(),
                });
            }
        }

        info!(
            count = apps.len(),
            latest = apps.last().map(|a| a.date.as_str()).unwrap_or("-"),
            "Collected published apps"
        );
        Ok(apps)
    }
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    Ok(subdirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Anniversary;
    use chrono::Local;

    fn app(language: Language) -> GeneratedApp {
        GeneratedApp {
            html: "<!DOCTYPE html><html><body>hi</body></html>".into(),
            css: "body { margin: 0; }".into(),
            js: "console.log('hi');".into(),
            metadata: serde_json::Map::new(),
            anniversary: Anniversary::new(
                NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                "Telephone call",
                "The first transatlantic call is made.",
                "scientific",
                1926,
                "Wikipedia",
            ),
            language,
            generated_at: Local::now(),
            thinking: String::new(),
        }
    }

    #[tokio::test]
    async fn test_save_app_writes_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

        let app_dir = publisher.save_app(&app(Language::En), date).await.unwrap();
        assert!(app_dir.ends_with("en/2026/01-15"));
        for file in ["index.html", "style.css", "app.js", "metadata.json"] {
            assert!(app_dir.join(file).is_file(), "missing {file}");
        }

        let raw = std::fs::read_to_string(app_dir.join("metadata.json")).unwrap();
        let metadata: AppMetadata = serde_json::from_str(&raw).unwrap();
        assert_eq!(metadata.date, "2026-01-15");
        assert_eq!(metadata.anniversary.year, 1926);
    }

    #[tokio::test]
    async fn test_save_app_overwrites_same_day() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

        publisher.save_app(&app(Language::En), date).await.unwrap();
        let mut second = app(Language::En);
        second.html = "<!DOCTYPE html><html><body>second</body></html>".into();
        let app_dir = publisher.save_app(&second, date).await.unwrap();

        let html = std::fs::read_to_string(app_dir.join("index.html")).unwrap();
        assert!(html.contains("second"));
    }

    #[tokio::test]
    async fn test_collect_apps_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path());

        publisher
            .save_app(&app(Language::En), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
            .await
            .unwrap();
        publisher
            .save_app(&app(Language::En), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap())
            .await
            .unwrap();
        publisher
            .save_app(&app(Language::Ja), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
            .await
            .unwrap();

        let en = publisher.collect_apps(Language::En).unwrap();
        assert_eq!(en.len(), 2);
        assert!(en.iter().all(|a| a.language == "en"));
        assert_eq!(en[0].year, "2025");
        assert_eq!(en[1].date, "01-15");
        assert_eq!(en[1].path, PathBuf::from("en/2026/01-15"));

        let ja = publisher.collect_apps(Language::Ja).unwrap();
        assert_eq!(ja.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_apps_skips_dir_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path());

        publisher
            .save_app(&app(Language::En), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
            .await
            .unwrap();
        // A half-written app directory with no metadata document.
        std::fs::create_dir_all(dir.path().join("en/2026/01-16")).unwrap();
        std::fs::write(dir.path().join("en/2026/01-16/index.html"), "x").unwrap();

        let en = publisher.collect_apps(Language::En).unwrap();
        assert_eq!(en.len(), 1);
    }

    #[test]
    fn test_collect_apps_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path());
        assert!(publisher.collect_apps(Language::En).unwrap().is_empty());
    }
}
