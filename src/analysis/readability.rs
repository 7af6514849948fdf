/// Approximate Flesch Reading Ease for a body of text.
///
/// `206.835 - 1.015 * (words/sentences) - 84.6 * (syllables/words)`, clamped
/// to [0, 100] and rounded to the nearest integer. Sentences are non-empty
/// segments split on `.`, `!` and `?`; syllables are approximated by the
/// number of vowel groups across the whole text. Empty text scores 0.
pub fn flesch_reading_ease(text: &str) -> u32 {
    let sentence_count = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    let word_count = text.split_whitespace().count();

    if sentence_count == 0 || word_count == 0 {
        return 0;
    }

    let syllable_count = count_vowel_groups(text);

    let words = word_count as f64;
    let score = 206.835
        - 1.015 * (words / sentence_count as f64)
        - 84.6 * (syllable_count as f64 / words);

    score.clamp(0.0, 100.0).round() as u32
}

/// Maximal runs of `[aeiou]`, case-insensitive, counted text-wide.
fn count_vowel_groups(text: &str) -> usize {
    let mut groups = 0;
    let mut in_group = false;
    for c in text.chars() {
        if matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u') {
            if !in_group {
                groups += 1;
                in_group = true;
            }
        } else {
            in_group = false;
        }
    }
    groups
}
