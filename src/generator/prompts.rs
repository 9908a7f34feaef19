//! Generation prompts.
//!
//! One prompt per language, sharing the same output contract: the model
//! must answer with `<html_file>`, `<css_file>`, `<js_file>` and an
//! optional `<metadata>` block of JSON. The contract text is kept in one
//! place so the parser and the prompts cannot drift apart silently.

use crate::config::Language;
use crate::models::Anniversary;

/// Shared output-format instructions appended to every generation prompt.
const OUTPUT_CONTRACT: &str = "\
Respond with exactly these tagged blocks and nothing else outside them:

<html_file>
(complete index.html; link style.css and app.js with relative paths)
</html_file>

<css_file>
(complete style.css)
</css_file>

<js_file>
(complete app.js)
</js_file>

<metadata>
{\"app_title\": \"short display title\", \"app_description\": \"one sentence\", \"interaction_type\": \"e.g. timeline, quiz, simulation\"}
</metadata>

Requirements:
- The app must be fully self-contained: no CDN scripts, no external stylesheets, no remote images.
- Use only vanilla HTML, CSS and JavaScript.
- Make it interactive and playful, not a static article.
- Keep the page responsive and usable on a phone.
";

pub fn generation_prompt(anniversary: &Anniversary, language: Language) -> String {
    match language {
        Language::En => generation_prompt_en(anniversary),
        Language::Ja => generation_prompt_ja(anniversary),
    }
}

fn generation_prompt_en(ann: &Anniversary) -> String {
    format!(
        "You are a creative web developer. Build a small, delightful, interactive web app\n\
         celebrating this historical anniversary for a global English-speaking audience.\n\n\
         Anniversary: {title}\n\
         Date: {date}\n\
         Original year: {year} ({years_ago} years ago)\n\
         Category: {category}\n\
         Details: {description}\n\n\
         Choose an interaction that fits the event (a timeline to scrub, a thing to launch,\n\
         a quiz, a simulation) and teach the visitor something they will remember.\n\n\
         {contract}",
        title = ann.title,
        date = ann.date.format("%B %-d, %Y"),
        year = ann.year,
        years_ago = ann.years_ago(),
        category = ann.category,
        description = ann.description,
        contract = OUTPUT_CONTRACT,
    )
}

fn generation_prompt_ja(ann: &Anniversary) -> String {
    format!(
        "あなたはクリエイティブなWeb開発者です。日本の読者向けに、この歴史的記念日を\n\
         祝う小さくて楽しいインタラクティブWebアプリを作ってください。\n\n\
         記念日: {title}\n\
         日付: {date}\n\
         出来事の年: {year}年({years_ago}年前)\n\
         カテゴリ: {category}\n\
         詳細: {description}\n\n\
         出来事に合ったインタラクション(タイムライン、クイズ、シミュレーションなど)を\n\
         選び、訪問者の記憶に残る体験にしてください。UIの文章はすべて日本語で書いてください。\n\n\
         {contract}",
        title = ann.title,
        date = ann.date.format("%Y年%m月%d日"),
        year = ann.year,
        years_ago = ann.years_ago(),
        category = ann.category,
        description = ann.description,
        contract = OUTPUT_CONTRACT,
    )
}
