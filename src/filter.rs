//! Negative-topic filter.
//!
//! The site celebrates anniversaries, so candidates touching war, violence,
//! disaster or death vocabulary are dropped before selection. English
//! keywords match on word boundaries; Japanese keywords match as
//! substrings (Japanese has no word delimiters to anchor on). Every
//! fetcher runs its results through this filter, fallback data included.

use crate::models::Anniversary;
use once_cell::sync::Lazy;
use regex::Regex;

const NEGATIVE_KEYWORDS_EN: &[&str] = &[
    "war", "battle", "massacre", "bomb", "attack", "assassin", "kill", "death", "die",
    "murder", "terror", "blitz", "raid", "invasion", "occupation", "genocide", "slave",
    "weapon", "nuclear", "atomic", "disaster", "crash", "sink", "fire", "explosion",
    "conflict", "revolutionary", "revolt", "coup", "siege", "surrender", "treaty",
    "military", "naval", "army", "soldier", "wounded",
];

const NEGATIVE_KEYWORDS_JA: &[&str] = &[
    "戦争", "戦", "戦い", "合戦", "虐殺", "爆弾", "爆撃", "空襲", "攻撃", "暗殺", "殺", "死",
    "殺害", "テロ", "襲撃", "侵略", "占領", "奴隷", "兵器", "核", "原爆", "災害", "事故",
    "墜落", "沈没", "火災", "爆発", "紛争", "革命", "反乱", "クーデター", "包囲", "降伏",
    "条約", "軍", "海軍", "陸軍", "兵士", "軍縮", "破棄", "軍備",
];

static NEGATIVE_EN_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = NEGATIVE_KEYWORDS_EN.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("static keyword regex")
});

/// Whether an anniversary is free of negative-topic vocabulary.
pub fn is_positive(anniversary: &Anniversary) -> bool {
    let text = format!("{} {}", anniversary.title, anniversary.description).to_lowercase();

    if NEGATIVE_EN_RE.is_match(&text) {
        return false;
    }
    !NEGATIVE_KEYWORDS_JA.iter().any(|kw| text.contains(kw))
}

/// Keep only positive-topic anniversaries, preserving order.
pub fn filter_positive(anniversaries: Vec<Anniversary>) -> Vec<Anniversary> {
    anniversaries.into_iter().filter(is_positive).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ann(title: &str, description: &str) -> Anniversary {
        Anniversary::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            title,
            description,
            "historical",
            1900,
            "Wikipedia",
        )
    }

    #[test]
    fn test_positive_event_passes() {
        assert!(is_positive(&ann(
            "Telephone demonstrated",
            "The telephone is demonstrated in public for the first time."
        )));
    }

    #[test]
    fn test_war_vocabulary_rejected() {
        assert!(!is_positive(&ann(
            "End of the war",
            "The war ends after six years."
        )));
    }

    #[test]
    fn test_word_boundary_matching() {
        // "warsaw" contains "war" but not on a word boundary.
        assert!(is_positive(&ann(
            "Warsaw hosts a music festival",
            "A festival opens in Warsaw to widespread acclaim."
        )));
        // "diet" contains "die" but not as a word.
        assert!(is_positive(&ann(
            "Imperial Diet convenes",
            "The Diet convenes its first ordinary session."
        )));
    }

    #[test]
    fn test_japanese_substring_matching() {
        assert!(!is_positive(&ann(
            "関ヶ原の合戦",
            "天下分け目の合戦が行われる。"
        )));
        assert!(is_positive(&ann(
            "東京タワー完成",
            "東京タワーが完成し、一般公開が始まる。"
        )));
    }

    #[test]
    fn test_filter_preserves_order() {
        let input = vec![
            ann("A", "peaceful event one"),
            ann("B", "a battle occurs"),
            ann("C", "peaceful event two"),
        ];
        let filtered = filter_positive(input);
        let titles: Vec<&str> = filtered.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn test_filter_idempotent() {
        let input = vec![
            ann("A", "a library opens"),
            ann("B", "an invasion begins"),
            ann("C", "a bridge is completed"),
        ];
        let once = filter_positive(input);
        let titles_once: Vec<String> = once.iter().map(|a| a.title.clone()).collect();
        let twice = filter_positive(once);
        let titles_twice: Vec<String> = twice.iter().map(|a| a.title.clone()).collect();
        assert_eq!(titles_once, titles_twice);
    }
}
