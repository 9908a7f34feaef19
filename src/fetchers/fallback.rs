//! Static-data fallback fetcher.
//!
//! Last resort when the live sources fail: a per-language JSON document
//! keyed by `"MM-DD"`, with a list of `{title, description, year,
//! category?}` entries per day. The file is read once and cached for the
//! process lifetime. Malformed entries are skipped with a warning rather
//! than failing the whole source.

use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::filter::filter_positive;
use crate::models::Anniversary;
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct FallbackEvent {
    title: String,
    description: String,
    year: i32,
    #[serde(default = "default_category")]
    category: String,
}

fn default_category() -> String {
    "historical".to_string()
}

type FallbackData = HashMap<String, Vec<serde_json::Value>>;

pub struct FallbackFetcher {
    data_file: PathBuf,
    data: OnceCell<FallbackData>,
}

impl FallbackFetcher {
    pub fn new(data_file: PathBuf) -> Self {
        Self {
            data_file,
            data: OnceCell::new(),
        }
    }

    /// Load and cache the data file. Errors degrade to an empty map so a
    /// broken file behaves like one with no entries for any date.
    fn load_data(&self) -> &FallbackData {
        self.data.get_or_init(|| {
            match std::fs::read_to_string(&self.data_file) {
                Ok(raw) => match serde_json::from_str(&raw) {
                    Ok(data) => {
                        debug!(path = %self.data_file.display(), "Loaded fallback data");
                        data
                    }
                    Err(e) => {
                        error!(path = %self.data_file.display(), error = %e, "Failed to parse fallback data");
                        HashMap::new()
                    }
                },
                Err(e) => {
                    error!(path = %self.data_file.display(), error = %e, "Fallback data file not readable");
                    HashMap::new()
                }
            }
        })
    }
}

#[async_trait]
impl Fetcher for FallbackFetcher {
    fn name(&self) -> &'static str {
        "FallbackFetcher"
    }

    fn is_available(&self) -> bool {
        self.data_file.exists()
    }

    #[instrument(level = "info", skip_all, fields(date = %target_date))]
    async fn fetch(&self, target_date: NaiveDate) -> Result<Vec<Anniversary>, FetchError> {
        let data = self.load_data();

        let key = target_date.format("%m-%d").to_string();
        let Some(events) = data.get(&key) else {
            warn!(%key, "No fallback data for date");
            return Ok(vec![]);
        };

        let mut anniversaries = Vec::new();
        for raw in events {
            match serde_json::from_value::<FallbackEvent>(raw.clone()) {
                Ok(event) => anniversaries.push(Anniversary::new(
                    target_date,
                    event.title,
                    event.description,
                    event.category,
                    event.year,
                    "Fallback",
                )),
                Err(e) => {
                    warn!(error = %e, entry = %raw, "Malformed fallback event, skipping");
                }
            }
        }
        info!(count = anniversaries.len(), "Loaded events from fallback data");

        let positive = filter_positive(anniversaries);
        info!(count = positive.len(), "Events after negative-topic filter");
        Ok(positive)
    }
}
