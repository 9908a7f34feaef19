//! Web-app generation via the Claude API.
//!
//! The model is asked for a self-contained app as four tagged blocks
//! (`<html_file>`, `<css_file>`, `<js_file>`, optional `<metadata>`).
//! Blocks are extracted with non-greedy dot-all regexes; the first match
//! of each tag wins. Missing html/css/js is a hard failure naming the
//! absent blocks; malformed metadata degrades to an empty map.

pub mod prompts;
pub mod validate;

use crate::api::ClaudeClient;
use crate::config::{Config, Language};
use crate::error::GenerateError;
use crate::models::{Anniversary, GeneratedApp};
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

static HTML_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<html_file>(.*?)</html_file>").unwrap());
static CSS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<css_file>(.*?)</css_file>").unwrap());
static JS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<js_file>(.*?)</js_file>").unwrap());
static METADATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<metadata>(.*?)</metadata>").unwrap());

pub struct AppGenerator<'a> {
    api: &'a ClaudeClient,
    config: &'a Config,
}

impl<'a> AppGenerator<'a> {
    pub fn new(api: &'a ClaudeClient, config: &'a Config) -> Self {
        Self { api, config }
    }

    /// Generate a complete web app for an anniversary.
    #[instrument(level = "info", skip_all, fields(title = %anniversary.title, %language))]
    pub async fn generate(
        &self,
        anniversary: &Anniversary,
        language: Language,
    ) -> Result<GeneratedApp, GenerateError> {
        let prompt = prompts::generation_prompt(anniversary, language);
        debug!(prompt_chars = prompt.chars().count(), "Built generation prompt");

        let thinking_budget = self
            .config
            .claude
            .extended_thinking
            .then_some(self.config.claude.thinking_budget);
        if thinking_budget.is_some() {
            info!("Extended thinking enabled");
        }

        let reply = self
            .api
            .ask(&prompt, self.config.claude.max_tokens, thinking_budget)
            .await?;

        let app = parse_reply(&reply.text, anniversary, language, reply.thinking)?;
        validate_app(&app)?;

        if !app.thinking.is_empty() {
            debug!(thinking_chars = app.thinking.chars().count(), "Captured thinking trace");
        }
        info!(app_title = %app.app_title(), "Generated app");
        Ok(app)
    }
}

/// Extract the tagged blocks from the model's reply.
fn parse_reply(
    text: &str,
    anniversary: &Anniversary,
    language: Language,
    thinking: String,
) -> Result<GeneratedApp, GenerateError> {
    let html = HTML_RE.captures(text).map(|c| c[1].trim().to_string());
    let css = CSS_RE.captures(text).map(|c| c[1].trim().to_string());
    let js = JS_RE.captures(text).map(|c| c[1].trim().to_string());

    let mut missing = Vec::new();
    if html.is_none() {
        missing.push("HTML");
    }
    if css.is_none() {
        missing.push("CSS");
    }
    if js.is_none() {
        missing.push("JS");
    }
    if !missing.is_empty() {
        return Err(GenerateError::MissingBlocks { missing });
    }

    let metadata = match METADATA_RE.captures(text) {
        Some(caps) => match serde_json::from_str::<serde_json::Value>(caps[1].trim()) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => {
                warn!("Metadata block is not a JSON object, ignoring");
                serde_json::Map::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse metadata JSON, ignoring");
                serde_json::Map::new()
            }
        },
        None => serde_json::Map::new(),
    };

    Ok(GeneratedApp {
        html: html.unwrap_or_default(),
        css: css.unwrap_or_default(),
        js: js.unwrap_or_default(),
        metadata,
        anniversary: anniversary.clone(),
        language,
        generated_at: Local::now(),
        thinking,
    })
}

/// Enforce the artifact invariants: the three files must be non-empty and
/// the HTML structurally plausible. Everything else only warns.
fn validate_app(app: &GeneratedApp) -> Result<(), GenerateError> {
    if app.html.is_empty() {
        return Err(GenerateError::EmptyFile("HTML"));
    }
    if app.css.is_empty() {
        return Err(GenerateError::EmptyFile("CSS"));
    }
    if app.js.is_empty() {
        return Err(GenerateError::EmptyFile("JS"));
    }

    if !validate::html_structure(&app.html) {
        return Err(GenerateError::InvalidHtml);
    }
    if !validate::css_has_rule(&app.css) {
        warn!("Generated CSS has no recognizable rule");
    }
    if validate::has_external_dependencies(&app.html) {
        warn!("Generated HTML references external resources; app may not work offline");
    }
    for (name, content, limit_kb) in [
        ("HTML", &app.html, 100),
        ("CSS", &app.css, 50),
        ("JS", &app.js, 100),
    ] {
        if !validate::within_size(content, limit_kb) {
            warn!(file = name, limit_kb, "Generated file exceeds size budget");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ann() -> Anniversary {
        Anniversary::new(
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            "Telephone call",
            "The first transatlantic call is made.",
            "scientific",
            1926,
            "Wikipedia",
        )
    }

    fn reply(html: &str, css: &str, js: &str, metadata: Option<&str>) -> String {
        let mut out = format!(
            "Here is your app.\n<html_file>{html}</html_file>\n<css_file>{css}</css_file>\n<js_file>{js}</js_file>\n"
        );
        if let Some(m) = metadata {
            out.push_str(&format!("<metadata>{m}</metadata>\n"));
        }
        out
    }

    const GOOD_HTML: &str = "<!DOCTYPE html><html><head></head><body><h1>hi</h1></body></html>";

    #[test]
    fn test_parse_reply_extracts_all_blocks() {
        let text = reply(
            GOOD_HTML,
            "body { margin: 0; }",
            "console.log('hi');",
            Some(r#"{"app_title": "Call Me", "theme": "retro"}"#),
        );
        let app = parse_reply(&text, &ann(), Language::En, String::new()).unwrap();
        assert_eq!(app.html, GOOD_HTML);
        assert_eq!(app.css, "body { margin: 0; }");
        assert_eq!(app.metadata["app_title"], "Call Me");
        assert_eq!(app.app_title(), "Call Me");
        validate_app(&app).unwrap();
    }

    #[test]
    fn test_parse_reply_names_missing_blocks() {
        let text = "<css_file>body{}</css_file>";
        let err = parse_reply(text, &ann(), Language::En, String::new()).unwrap_err();
        match err {
            GenerateError::MissingBlocks { missing } => {
                assert_eq!(missing, vec!["HTML", "JS"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_metadata_degrades_to_empty() {
        let text = reply(GOOD_HTML, "body{}", "let x;", Some("{not valid json"));
        let app = parse_reply(&text, &ann(), Language::En, String::new()).unwrap();
        assert!(app.metadata.is_empty());
    }

    #[test]
    fn test_missing_metadata_block_is_fine() {
        let text = reply(GOOD_HTML, "body{}", "let x;", None);
        let app = parse_reply(&text, &ann(), Language::En, String::new()).unwrap();
        assert!(app.metadata.is_empty());
    }

    #[test]
    fn test_duplicate_blocks_first_wins() {
        let text = format!(
            "<html_file>{GOOD_HTML}</html_file><html_file>second</html_file>\
             <css_file>a{{}}</css_file><js_file>x</js_file>"
        );
        let app = parse_reply(&text, &ann(), Language::En, String::new()).unwrap();
        assert_eq!(app.html, GOOD_HTML);
    }

    #[test]
    fn test_validate_rejects_empty_css() {
        let text = reply(GOOD_HTML, "", "let x;", None);
        let app = parse_reply(&text, &ann(), Language::En, String::new()).unwrap();
        assert!(matches!(
            validate_app(&app),
            Err(GenerateError::EmptyFile("CSS"))
        ));
    }

    #[test]
    fn test_validate_rejects_html_without_body() {
        let text = reply(
            "<!DOCTYPE html><html><head><title>t</title></head></html>",
            "body{}",
            "let x;",
            None,
        );
        let app = parse_reply(&text, &ann(), Language::En, String::new()).unwrap();
        assert!(matches!(validate_app(&app), Err(GenerateError::InvalidHtml)));
    }
}
