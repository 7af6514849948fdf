use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a single page field (title, H1, meta description) matches the
/// target keyword.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FieldMatch {
    /// The full keyword phrase appears as a substring.
    pub exact_match: bool,
    /// Every significant keyword token appears somewhere, in any order.
    pub partial_match: bool,
    pub matched_word_count: usize,
    pub total_word_count: usize,
}

/// Target-keyword presence and density across the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct KeywordAnalysis {
    pub keyword: String,
    pub title_match: FieldMatch,
    pub h1_match: FieldMatch,
    pub meta_match: FieldMatch,
    pub exact_density_pct: f64,
    pub partial_density_pct: f64,
}

/// Analyze keyword relevance against the given page fields and body text.
///
/// Matching is lexical: tokens of three letters or more are checked by pure
/// substring containment, so "cat" matches inside "category". That looseness
/// is intentional and pinned by tests; tightening it changes reported
/// densities for existing users.
pub fn analyze_keyword(
    keyword: &str,
    title: &str,
    h1_joined: &str,
    meta_description: &str,
    body_text: &str,
    body_word_count: usize,
) -> KeywordAnalysis {
    let keyword = keyword.trim().to_lowercase();
    let keyword_words: Vec<&str> = keyword
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .collect();

    let title_match = match_field(&keyword, &keyword_words, &title.to_lowercase());
    let h1_match = match_field(&keyword, &keyword_words, &h1_joined.to_lowercase());
    let meta_match = match_field(&keyword, &keyword_words, &meta_description.to_lowercase());

    let body = body_text.to_lowercase();
    let exact_count = if keyword.is_empty() {
        0
    } else {
        match Regex::new(&regex::escape(&keyword)) {
            Ok(re) => re.find_iter(&body).count(),
            Err(_) => 0,
        }
    };
    // Tokens can double-count when they overlap; this mirrors how densities
    // were historically reported.
    let partial_count: usize = keyword_words.iter().map(|w| body.matches(w).count()).sum();

    KeywordAnalysis {
        keyword,
        title_match,
        h1_match,
        meta_match,
        exact_density_pct: density(exact_count, body_word_count),
        partial_density_pct: density(partial_count, body_word_count),
    }
}

fn match_field(keyword: &str, keyword_words: &[&str], text: &str) -> FieldMatch {
    let exact_match = !keyword.is_empty() && text.contains(keyword);
    let matched_word_count = keyword_words.iter().filter(|w| text.contains(*w)).count();
    let partial_match = !keyword_words.is_empty() && matched_word_count == keyword_words.len();
    FieldMatch {
        exact_match,
        partial_match,
        matched_word_count,
        total_word_count: keyword_words.len(),
    }
}

/// Occurrences per body word as a percentage, two decimal places. Zero-word
/// bodies yield 0 rather than dividing by zero.
fn density(count: usize, body_word_count: usize) -> f64 {
    if body_word_count == 0 {
        return 0.0;
    }
    let pct = count as f64 / body_word_count as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}
