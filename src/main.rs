//! # Anniversary Daily
//!
//! A daily automation pipeline that fetches "on this day" historical
//! anniversaries, selects the most interesting one per language, asks
//! Claude to build a small self-contained web app about it, and publishes
//! the result to a static site tracked in git.
//!
//! ## Pipeline
//!
//! For each language (Japanese first, then English):
//! 1. **Fetch**: Wikipedia "on this day" page, falling back to static JSON
//! 2. **Filter**: drop war/violence/tragedy topics
//! 3. **Select**: AI-assisted choice (or the deterministic scorer)
//! 4. **Generate**: one Claude call, parsed into HTML/CSS/JS + metadata
//! 5. **Publish**: write `docs/<lang>/<year>/<MM-DD>/`
//!
//! Then the listing pages are rebuilt from the docs tree and the changes
//! are committed (and optionally pushed). One language failing does not
//! stop the other; only a run where nothing was produced exits nonzero.
//!
//! ## Usage
//!
//! ```sh
//! ANTHROPIC_API_KEY=... anniversary_daily
//! anniversary_daily --reindex          # rebuild listing pages only
//! ```
//!
//! The daily cadence comes from the invoking scheduler (cron); exit codes
//! 1-4 tell it which stage failed.

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod config;
mod error;
mod fetchers;
mod filter;
mod generator;
mod models;
mod notify;
mod publishers;
mod retry;
mod selector;
mod utils;

use api::ClaudeClient;
use cli::Cli;
use config::{Config, Language};
use error::exit_code;
use fetchers::{fallback::FallbackFetcher, wikipedia::WikipediaFetcher, wikipedia_ja::WikipediaJaFetcher, Fetcher, FetcherManager};
use generator::AppGenerator;
use models::Anniversary;
use publishers::{files::FilePublisher, git::GitPublisher, indexes::IndexGenerator};
use retry::RetryPolicy;
use selector::AiSelector;
use utils::ensure_writable_dir;

/// A failed run: which stage broke, what happened, what to tell cron.
struct RunFailure {
    stage: &'static str,
    detail: String,
    code: u8,
}

impl RunFailure {
    fn new(stage: &'static str, code: u8, detail: impl ToString) -> Self {
        Self {
            stage,
            detail: detail.to_string(),
            code,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("anniversary_daily starting up");

    let args = Cli::parse();
    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %args.config.display(), error = %e, "Failed to load configuration");
            return ExitCode::from(exit_code::FETCH_FAILED);
        }
    };

    let result = run(&args, &config).await;

    let elapsed = start_time.elapsed();
    info!(secs = elapsed.as_secs(), millis = elapsed.subsec_millis(), "Execution complete");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(stage = failure.stage, detail = %failure.detail, "Run failed");
            if config.email.enabled {
                if let Err(e) =
                    notify::send_error_report(&config.email, failure.stage, &failure.detail).await
                {
                    warn!(error = %e, "Failed to send error report");
                }
            }
            ExitCode::from(failure.code)
        }
    }
}

async fn run(args: &Cli, config: &Config) -> Result<(), RunFailure> {
    let docs_dir = args.docs_dir.to_string_lossy().into_owned();
    if let Err(e) = ensure_writable_dir(&docs_dir).await {
        return Err(RunFailure::new(
            "setup",
            exit_code::FILE_OPERATIONS_FAILED,
            format!("docs directory is not writable: {e}"),
        ));
    }

    let file_publisher = FilePublisher::new(&args.docs_dir);
    let index_generator = IndexGenerator::new(&args.docs_dir, args.data_dir.join("templates"));

    if args.reindex {
        info!("Reindex mode: rebuilding listing pages only");
        return update_indexes(&file_publisher, &index_generator).await;
    }

    let Some(api_key) = args.api_key.clone() else {
        return Err(RunFailure::new(
            "setup",
            exit_code::FETCH_FAILED,
            "no API key: pass --api-key or set ANTHROPIC_API_KEY",
        ));
    };
    let api = ClaudeClient::new(api_key, config.claude.model.clone()).map_err(|e| {
        RunFailure::new(
            "setup",
            exit_code::FETCH_FAILED,
            format!("failed to build HTTP client: {e}"),
        )
    })?;

    let target_date = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!(date = %target_date, model = %api.model(), "Starting daily run");

    // ---- Generate one app per language ----
    let mut published: Vec<Anniversary> = Vec::new();
    let mut first_failure: Option<RunFailure> = None;

    for language in Language::all() {
        info!(%language, "Generating app");
        match generate_language_app(args, config, &api, &file_publisher, target_date, language)
            .await
        {
            Ok(anniversary) => {
                info!(%language, %anniversary, "Published app");
                published.push(anniversary);
            }
            Err(failure) => {
                error!(%language, stage = failure.stage, detail = %failure.detail, "Language run failed");
                first_failure.get_or_insert(failure);
            }
        }
    }

    if published.is_empty() {
        // Both languages failed; surface the first failure to the scheduler.
        return Err(first_failure.unwrap_or_else(|| {
            RunFailure::new("fetch", exit_code::FETCH_FAILED, "no app was generated")
        }));
    }

    // ---- Rebuild listing pages ----
    update_indexes(&file_publisher, &index_generator).await?;

    // ---- Commit and push ----
    let git = GitPublisher::new(".", &config.git);
    if let Err(e) = git.commit_and_push(&published[0]).await {
        return Err(RunFailure::new(
            "git",
            exit_code::GIT_OPERATIONS_FAILED,
            e,
        ));
    }
    info!("Git operations completed");

    info!(apps = published.len(), "Daily run completed successfully");
    Ok(())
}

/// Fetch, select, generate and save one language's app.
async fn generate_language_app(
    args: &Cli,
    config: &Config,
    api: &ClaudeClient,
    file_publisher: &FilePublisher,
    target_date: NaiveDate,
    language: Language,
) -> Result<Anniversary, RunFailure> {
    let manager = build_fetcher_manager(config, &args.data_dir, language)?;

    let candidates = manager.fetch_anniversaries(target_date).await.map_err(|e| {
        RunFailure::new("fetch", exit_code::FETCH_FAILED, e)
    })?;
    info!(count = candidates.len(), "Fetched candidates");

    let selected = if config.selection.use_ai {
        AiSelector::new(api).select(&candidates, language).await
    } else {
        selector::select_best(&candidates, target_date.year(), Some(language))
    }
    .map_err(|e| RunFailure::new("fetch", exit_code::FETCH_FAILED, e))?;
    info!(%selected, "Selected anniversary");

    let app = AppGenerator::new(api, config)
        .generate(&selected, language)
        .await
        .map_err(|e| RunFailure::new("generation", exit_code::GENERATION_FAILED, e))?;

    file_publisher
        .save_app(&app, target_date)
        .await
        .map_err(|e| RunFailure::new("files", exit_code::FILE_OPERATIONS_FAILED, e))?;

    Ok(selected)
}

fn build_fetcher_manager(
    config: &Config,
    data_dir: &Path,
    language: Language,
) -> Result<FetcherManager, RunFailure> {
    let retry = RetryPolicy::from(&config.retry);
    let fallback_file = data_dir.join(format!("fallback_anniversaries_{}.json", language.code()));

    let live: Box<dyn Fetcher> = match language {
        Language::Ja => Box::new(WikipediaJaFetcher::new(retry).map_err(client_build_failure)?),
        Language::En => Box::new(WikipediaFetcher::new(retry).map_err(client_build_failure)?),
    };
    Ok(FetcherManager::new(vec![
        live,
        Box::new(FallbackFetcher::new(fallback_file)),
    ]))
}

fn client_build_failure(e: reqwest::Error) -> RunFailure {
    RunFailure::new(
        "fetch",
        exit_code::FETCH_FAILED,
        format!("failed to build HTTP client: {e}"),
    )
}

async fn update_indexes(
    file_publisher: &FilePublisher,
    index_generator: &IndexGenerator,
) -> Result<(), RunFailure> {
    let to_failure =
        |e: error::PublishError| RunFailure::new("index", exit_code::FILE_OPERATIONS_FAILED, e);

    let apps_ja = file_publisher.collect_apps(Language::Ja).map_err(to_failure)?;
    let apps_en = file_publisher.collect_apps(Language::En).map_err(to_failure)?;
    index_generator
        .update_all(&apps_ja, &apps_en)
        .await
        .map_err(to_failure)?;
    info!(ja = apps_ja.len(), en = apps_en.len(), "Updated indexes");
    Ok(())
}
