//! Listing-page generation.
//!
//! Two kinds of pages are rebuilt from scratch on every run:
//!
//! - per-language `index.html`, rendered from
//!   `data/templates/index_template.html` by placeholder substitution
//!   (`{{APP_CARDS}}`, `{{YEAR_LINKS}}`, `{{TOTAL_APPS}}`,
//!   `{{YEARS_COVERED}}`, `{{LAST_UPDATED}}`, `{{LANG_SWITCHER}}`)
//! - the root `index.html` language selector, emitted inline with the
//!   per-language app counts (valid even when both counts are zero)
//!
//! The template ships with English UI strings; a hand-maintained
//! translation table swaps them for Japanese on the `ja` page.

use crate::config::Language;
use crate::error::PublishError;
use crate::models::AppRecord;
use chrono::Local;
use itertools::Itertools;
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Most recent apps shown on a language page.
const HOMEPAGE_CARDS: usize = 20;

/// English UI strings and their Japanese counterparts, applied to the
/// rendered `ja` page. Order matters: longer phrases first so partial
/// phrases don't clobber them.
const JA_TRANSLATIONS: &[(&str, &str)] = &[
    ("Daily web apps celebrating historical anniversaries", "毎日、歴史的記念日を祝うWebアプリ"),
    ("A new interactive web app every day", "毎日新しいインタラクティブWebアプリ"),
    ("Apps Created", "作成アプリ数"),
    ("Years Covered", "対象年数"),
    ("Last Updated", "最終更新"),
    ("Recent Apps", "最近のアプリ"),
    ("Browse by year", "年別に見る"),
    ("View App →", "アプリを見る →"),
];

pub struct IndexGenerator {
    docs_root: PathBuf,
    template_dir: PathBuf,
}

impl IndexGenerator {
    pub fn new(docs_root: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
            template_dir: template_dir.into(),
        }
    }

    /// Rebuild every listing page.
    #[instrument(level = "info", skip_all, fields(ja = apps_ja.len(), en = apps_en.len()))]
    pub async fn update_all(
        &self,
        apps_ja: &[AppRecord],
        apps_en: &[AppRecord],
    ) -> Result<(), PublishError> {
        if !apps_ja.is_empty() {
            self.generate_language_index(apps_ja, Language::Ja).await?;
        }
        if !apps_en.is_empty() {
            self.generate_language_index(apps_en, Language::En).await?;
        }
        self.generate_root_index(apps_ja.len(), apps_en.len())
            .await?;
        info!("Index pages updated");
        Ok(())
    }

    async fn generate_language_index(
        &self,
        apps: &[AppRecord],
        language: Language,
    ) -> Result<(), PublishError> {
        let template_path = self.template_dir.join("index_template.html");
        let template = match fs::read_to_string(&template_path).await {
            Ok(t) => t,
            Err(e) => {
                // A missing template only costs the listing page, not the run.
                error!(path = %template_path.display(), error = %e, "Index template not found, skipping language index");
                return Ok(());
            }
        };

        // Most recent first, by the date stored in metadata.
        let sorted: Vec<&AppRecord> = apps
            .iter()
            .sorted_by(|a, b| b.metadata.date.cmp(&a.metadata.date))
            .collect();

        let mut cards = String::new();
        for app in sorted.iter().take(HOMEPAGE_CARDS) {
            cards.push_str(&app_card(app));
            cards.push('\n');
        }

        let mut year_links = String::new();
        for year in apps.iter().map(|a| a.year.as_str()).unique().sorted().rev() {
            let count = apps.iter().filter(|a| a.year == year).count();
            let _ = writeln!(
                year_links,
                "<a href=\"{year}/index.html\" class=\"year-link\">{year} ({count})</a>"
            );
        }

        let years_covered = apps.iter().map(|a| a.year.as_str()).unique().count();
        let lang_switcher = match language {
            Language::Ja => "<a href=\"../en/index.html\" class=\"lang-switcher\">English</a>",
            Language::En => "<a href=\"../ja/index.html\" class=\"lang-switcher\">日本語</a>",
        };

        let mut html = template
            .replace("{{APP_CARDS}}", &cards)
            .replace("{{YEAR_LINKS}}", &year_links)
            .replace("{{TOTAL_APPS}}", &apps.len().to_string())
            .replace("{{YEARS_COVERED}}", &years_covered.to_string())
            .replace("{{LAST_UPDATED}}", &Local::now().format("%Y-%m-%d").to_string())
            .replace("{{LANG_SWITCHER}}", lang_switcher);

        if language == Language::Ja {
            html = translate_to_japanese(html);
        }

        let lang_dir = self.docs_root.join(language.code());
        fs::create_dir_all(&lang_dir).await?;
        let index_path = lang_dir.join("index.html");
        fs::write(&index_path, html).await?;
        info!(path = %index_path.display(), "Generated language index");
        Ok(())
    }

    async fn generate_root_index(&self, ja_count: usize, en_count: usize) -> Result<(), PublishError> {
        let html = root_index_html(ja_count, en_count);
        fs::create_dir_all(&self.docs_root).await?;
        let index_path = self.docs_root.join("index.html");
        fs::write(&index_path, html).await?;
        info!(path = %index_path.display(), "Generated root index");
        Ok(())
    }
}

fn translate_to_japanese(mut html: String) -> String {
    for (en, ja) in JA_TRANSLATIONS {
        html = html.replace(en, ja);
    }
    html
}

fn app_card(app: &AppRecord) -> String {
    let anniversary = &app.metadata.anniversary;
    let description = crate::utils::truncate_chars(&anniversary.description, 150);
    let date_display = chrono::NaiveDate::parse_from_str(&app.metadata.date, "%Y-%m-%d")
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| app.metadata.date.clone());
    let title = app
        .metadata
        .app
        .get("app_title")
        .and_then(|v| v.as_str())
        .unwrap_or(&anniversary.title);

    // The card links relative to the language index, so the language
    // prefix is stripped from the stored path.
    let href = app
        .path
        .strip_prefix(&app.language)
        .unwrap_or(&app.path)
        .to_string_lossy()
        .replace('\\', "/");

    format!(
        r#"<div class="app-card" data-date="{date}">
    <div class="app-card-header">
        <span class="app-date">{date_display}</span>
        <span class="app-category">{category}</span>
    </div>
    <h3 class="app-title">{title}</h3>
    <p class="app-description">{description}</p>
    <div class="app-card-footer">
        <span class="app-year">{year}</span>
        <a href="{href}/index.html" class="app-link">View App →</a>
    </div>
</div>"#,
        date = app.metadata.date,
        date_display = date_display,
        category = anniversary.category,
        title = title,
        description = description,
        year = anniversary.year,
        href = href,
    )
}

fn root_index_html(ja_count: usize, en_count: usize) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Anniversary Daily</title>
    <meta name="description" content="Daily web apps celebrating historical anniversaries in Japanese and English">
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
        }}
        .container {{ text-align: center; padding: 2rem; max-width: 800px; }}
        h1 {{ font-size: 3rem; margin-bottom: 1rem; }}
        .subtitle {{ font-size: 1.25rem; opacity: 0.9; margin-bottom: 3rem; }}
        .language-selector {{ display: flex; gap: 2rem; justify-content: center; flex-wrap: wrap; }}
        .language-card {{
            background: rgba(255, 255, 255, 0.1);
            border: 2px solid rgba(255, 255, 255, 0.2);
            border-radius: 1rem;
            padding: 2rem;
            min-width: 250px;
            transition: all 0.3s;
            text-decoration: none;
            color: white;
            display: block;
        }}
        .language-card:hover {{
            transform: translateY(-8px);
            background: rgba(255, 255, 255, 0.2);
        }}
        .language-name {{ font-size: 1.5rem; font-weight: 600; margin-bottom: 0.5rem; }}
        .language-count {{ font-size: 1rem; opacity: 0.8; }}
        .footer {{ margin-top: 4rem; opacity: 0.8; font-size: 0.9rem; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>🎉 Anniversary Daily</h1>
        <p class="subtitle">Daily web apps celebrating historical anniversaries</p>
        <p class="subtitle">毎日、歴史的記念日を祝う自動生成Webアプリ</p>

        <div class="language-selector">
            <a href="ja/index.html" class="language-card">
                <div class="language-name">日本語</div>
                <div class="language-count">{ja_count} アプリ</div>
            </a>

            <a href="en/index.html" class="language-card">
                <div class="language-name">English</div>
                <div class="language-count">{en_count} apps</div>
            </a>
        </div>

        <div class="footer">
            <p>AI-generated daily, one anniversary per language</p>
        </div>
    </div>
</body>
</html>
"#
    )
}
