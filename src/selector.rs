//! Anniversary selection.
//!
//! Two strategies live here:
//!
//! - [`score_candidates`] / [`select_best`]: a deterministic heuristic
//!   over recency, category, description richness and Japan relevance.
//!   Scoring is a pure function; the winning candidate gets its
//!   `interest_score` written once on the way out.
//! - [`AiSelector`]: delegates the choice to the model with a
//!   locale-specific prompt and parses a `SELECTED: <index>` reply,
//!   failing open to the first candidate on any error.

use crate::api::ClaudeClient;
use crate::config::Language;
use crate::models::Anniversary;
use crate::utils::{truncate_chars, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("cannot select from an empty candidate list")]
    EmptyInput,
}

/// Bilingual keywords marking Japan-related content for the relevance bonus.
const JAPAN_KEYWORDS: &[&str] = &[
    "日本", "japan", "japanese",
    "東京", "tokyo",
    "江戸", "edo",
    "京都", "kyoto",
    "大阪", "osaka",
    "天皇", "emperor",
    "幕府", "shogunate",
    "明治", "meiji",
    "大正", "taisho",
    "昭和", "showa",
    "平成", "heisei",
    "令和", "reiwa",
    "将軍", "shogun",
    "サムライ", "samurai",
    "侍",
];

/// Compute interest scores for all candidates. Pure: the input is not
/// mutated, and equal inputs give equal outputs.
pub fn score_candidates(
    candidates: &[Anniversary],
    current_year: i32,
    language: Option<Language>,
) -> Vec<f64> {
    candidates
        .iter()
        .map(|ann| interest_score(ann, current_year, language))
        .collect()
}

fn interest_score(ann: &Anniversary, current_year: i32, language: Option<Language>) -> f64 {
    let mut score: f64 = 0.0;

    // Round-number anniversaries read better; only the largest matching
    // tier counts (a centenary is also a multiple of 50, 25 and 10).
    let years_ago = current_year - ann.year;
    score += if years_ago % 100 == 0 {
        0.4
    } else if years_ago % 50 == 0 {
        0.3
    } else if years_ago % 25 == 0 {
        0.2
    } else if years_ago % 10 == 0 {
        0.1
    } else {
        0.0
    };

    score += match ann.category.to_lowercase().as_str() {
        "historical" => 0.3,
        "cultural" => 0.25,
        "scientific" => 0.25,
        "political" => 0.2,
        "commemorative" => 0.15,
        _ => 0.1,
    };

    let desc_chars = ann.description.chars().count();
    score += if desc_chars > 500 {
        0.2
    } else if desc_chars > 250 {
        0.15
    } else if desc_chars > 100 {
        0.1
    } else {
        0.0
    };

    if language == Some(Language::Ja) {
        let text = format!("{} {}", ann.title, ann.description).to_lowercase();
        if let Some(keyword) = JAPAN_KEYWORDS.iter().find(|kw| text.contains(*kw)) {
            debug!(%keyword, title = %ann.title, "Japan-related keyword matched");
            score += 0.5;
        }
    }

    score.min(1.0)
}

/// Pick the highest-scoring candidate. Ties resolve to the earliest
/// candidate. The winner is returned with its score filled in.
pub fn select_best(
    candidates: &[Anniversary],
    current_year: i32,
    language: Option<Language>,
) -> Result<Anniversary, SelectError> {
    let scores = score_candidates(candidates, current_year, language);

    let mut best_index = 0;
    let mut best_score = f64::MIN;
    for (i, &score) in scores.iter().enumerate() {
        if score > best_score {
            best_index = i;
            best_score = score;
        }
    }

    let mut best = candidates.get(best_index).cloned().ok_or(SelectError::EmptyInput)?;
    best.interest_score = best_score;
    info!(
        title = %best.title,
        score = format!("{:.2}", best.interest_score),
        year = best.year,
        category = %best.category,
        "Selected anniversary"
    );
    Ok(best)
}

static SELECTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SELECTED:\s*(\d+)").unwrap());
static ANY_INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

/// AI-assisted selection: ask the model to pick the most compelling
/// candidate for the target audience.
pub struct AiSelector<'a> {
    api: &'a ClaudeClient,
}

impl<'a> AiSelector<'a> {
    pub fn new(api: &'a ClaudeClient) -> Self {
        Self { api }
    }

    /// Choose one candidate. Single-element lists skip the API round
    /// trip; any API or parse failure falls back to the first candidate.
    #[instrument(level = "info", skip_all, fields(count = candidates.len(), %language))]
    pub async fn select(
        &self,
        candidates: &[Anniversary],
        language: Language,
    ) -> Result<Anniversary, SelectError> {
        let first = candidates.first().cloned().ok_or(SelectError::EmptyInput)?;
        if candidates.len() == 1 {
            return Ok(first);
        }

        info!("Asking the model to select an anniversary");
        let prompt = match language {
            Language::Ja => selection_prompt_ja(candidates),
            Language::En => selection_prompt_en(candidates),
        };

        match self.api.ask(&prompt, 1000, None).await {
            Ok(reply) => {
                debug!(reply = %truncate_for_log(&reply.text, 300), "Selection reply");
                let index = parse_selection_reply(&reply.text, candidates.len());
                let selected = candidates[index].clone();
                info!(index, title = %selected.title, "Model selected anniversary");
                Ok(selected)
            }
            Err(e) => {
                error!(error = %e, "AI selection failed, falling back to first candidate");
                Ok(first)
            }
        }
    }
}

/// Parse the model's pick. Prefers an explicit `SELECTED: n` line, then
/// the first bare integer anywhere in the reply; anything else (or an
/// out-of-range index) resolves to 0.
fn parse_selection_reply(reply: &str, candidate_count: usize) -> usize {
    if let Some(caps) = SELECTED_RE.captures(reply) {
        if let Ok(index) = caps[1].parse::<usize>() {
            if index < candidate_count {
                return index;
            }
        }
    }

    if let Some(caps) = ANY_INT_RE.captures(reply) {
        if let Ok(index) = caps[1].parse::<usize>() {
            if index < candidate_count {
                return index;
            }
        }
    }

    warn!(reply = %truncate_for_log(reply, 200), "Could not parse selection reply, using index 0");
    0
}

fn candidate_listing(candidates: &[Anniversary], label: &str) -> String {
    let mut out = String::new();
    for (i, ann) in candidates.iter().enumerate() {
        let _ = writeln!(out, "{i}. {} ({})", ann.title, ann.year);
        let _ = writeln!(out, "   {label}: {}...", truncate_chars(&ann.description, 200));
        let _ = writeln!(out);
    }
    out
}

fn selection_prompt_en(candidates: &[Anniversary]) -> String {
    format!(
        "You are a curator creating engaging web apps for a global English-speaking audience.\n\
         Select ONE anniversary from the list below that would make the most compelling\n\
         interactive web application.\n\n\
         Selection criteria, in priority order:\n\
         1. Positive topics - uplifting, constructive events (inventions, discoveries, cultural achievements)\n\
         2. Global significance - events that shaped world history or culture positively\n\
         3. Storytelling potential - rich narratives of inspiration or transformation\n\
         4. Uniqueness - surprising or lesser-known positive stories\n\
         5. Visual appeal - events that suit engaging interactive presentation\n\n\
         IMPORTANT: avoid war, violence, tragedy and other negative events.\n\n\
         Candidates:\n{listing}\n\
         Reply with the index of the best candidate (0 to {max}) in exactly this format:\n\n\
         SELECTED: [number]\n\
         REASON: [one or two sentences]\n",
        listing = candidate_listing(candidates, "Description"),
        max = candidates.len() - 1,
    )
}

fn selection_prompt_ja(candidates: &[Anniversary]) -> String {
    format!(
        "あなたは日本の読者向けにWebアプリを作るキュレーターです。\n\
         以下の歴史的記念日の中から、日本の読者が最も興味を持ちそうなものを1つ選んでください。\n\n\
         選択基準(優先度順):\n\
         1. ポジティブな話題 - 発明、発見、文化的達成など明るく前向きな出来事を優先\n\
         2. 日本との関連性 - 日本の歴史、文化、人物、場所に関係するもの\n\
         3. 日本への影響 - 日本に大きな影響を与えた出来事\n\
         4. 興味深さ - 日本の読者が面白いと感じる独自性や意外性\n\
         5. 教育的価値 - 学べる歴史的意義があるもの\n\n\
         重要: 戦争、暴力、悲劇的な出来事は避けてください。\n\n\
         候補:\n{listing}\n\
         最も適切な候補の番号(0から{max})を、必ず次の形式で回答してください:\n\n\
         SELECTED: [番号]\n\
         REASON: [選択理由を1〜2文で]\n",
        listing = candidate_listing(candidates, "説明"),
        max = candidates.len() - 1,
    )
}
