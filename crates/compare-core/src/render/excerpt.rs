//! Illustrative excerpts for the section comparison view
//!
//! Picks sentences from a document that look related to a section title.
//! Display flavor only; match scores and risks come from the analysis.

use lazy_static::lazy_static;
use regex::Regex;

/// Sentences returned per excerpt
pub const EXCERPT_SENTENCES: usize = 3;

/// Sentences this short or shorter are ignored
const MIN_SENTENCE_CHARS: usize = 10;

lazy_static! {
    /// Sentence terminators, including the CJK full stop and line breaks
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?。\n]+").unwrap();
}

/// Topic keyword sets, keyed by a fragment of the section title.
/// English and Korean terms side by side.
pub const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "confidential",
        &["confidential", "proprietary", "secret", "기밀", "비밀"],
    ),
    (
        "termination",
        &["terminat", "expire", "expiration", "해지", "종료", "만료"],
    ),
    ("term", &["term", "period", "duration", "years", "기간", "존속"]),
    (
        "return",
        &["return", "destroy", "destruction", "delete", "반환", "파기", "폐기"],
    ),
    (
        "obligation",
        &["shall", "must", "obligat", "agree", "의무", "하여야"],
    ),
    (
        "governing law",
        &["governing law", "jurisdiction", "court", "laws of", "준거법", "관할", "법원"],
    ),
    (
        "remed",
        &["remed", "injunct", "damages", "breach", "손해배상", "구제", "위반"],
    ),
    (
        "non-solicit",
        &["solicit", "employ", "hire", "personnel", "권유", "채용", "인력"],
    ),
    (
        "disclos",
        &["disclos", "third part", "reveal", "공개", "개시", "제3자"],
    ),
    ("purpose", &["purpose", "evaluat", "business relationship", "목적", "검토"]),
];

/// Split text into trimmed sentences longer than the minimum length
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Union of keyword sets whose topic fragment appears in `title`
pub fn keywords_for_title(title: &str) -> Vec<&'static str> {
    let title = title.to_lowercase();
    let mut keywords: Vec<&'static str> = Vec::new();
    for (topic, words) in TOPIC_KEYWORDS {
        if title.contains(topic) {
            for word in *words {
                if !keywords.contains(word) {
                    keywords.push(*word);
                }
            }
        }
    }
    keywords
}

fn score(sentence: &str, keywords: &[&str]) -> usize {
    let lower = sentence.to_lowercase();
    keywords.iter().filter(|k| lower.contains(*k)).count()
}

/// Pick up to [`EXCERPT_SENTENCES`] sentences of `text` related to `title`.
///
/// Sentences are ranked by how many topic keywords they contain and
/// returned in document order. When nothing matches, a window of the
/// sentence list offset by `section_index` is returned instead, wrapping
/// around the end of the document.
pub fn excerpt_for_section<'a>(title: &str, text: &'a str, section_index: usize) -> Vec<&'a str> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let keywords = keywords_for_title(title);
    let mut scored: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (i, score(s, &keywords)))
        .filter(|&(_, score)| score > 0)
        .collect();

    if scored.is_empty() {
        let count = EXCERPT_SENTENCES.min(sentences.len());
        let start = (section_index * EXCERPT_SENTENCES) % sentences.len();
        return (0..count)
            .map(|offset| sentences[(start + offset) % sentences.len()])
            .collect();
    }

    // Highest score first, earlier sentence wins ties
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(EXCERPT_SENTENCES);
    scored.sort_by_key(|&(i, _)| i);
    scored.into_iter().map(|(i, _)| sentences[i]).collect()
}
