//! Fuzzy matching of spoken callsigns.

use std::collections::HashMap;


/// Dice coefficient of the character bigrams of two strings, ignoring whitespace.
///
/// Identical strings score 1 and strings without a common bigram score 0.
#[must_use]
pub fn similarity(first: &str, second: &str) -> f64 {
    let first: Vec<char> = first.chars().filter(|ch| !ch.is_whitespace()).collect();
    let second: Vec<char> = second.chars().filter(|ch| !ch.is_whitespace()).collect();

    if first == second {
        return 1.0;
    }
    if first.len() < 2 || second.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), u32> = HashMap::new();
    for pair in first.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_default() += 1;
    }

    let mut intersection = 0u32;
    for pair in second.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1]))
            && *count > 0
        {
            *count -= 1;
            intersection += 1;
        }
    }

    #[expect(clippy::cast_precision_loss, reason = "transcript tokens are short")]
    let total = (first.len() + second.len() - 2) as f64;
    f64::from(intersection) * 2.0 / total
}

/// The candidate most similar to `target` with its score.
///
/// The earliest candidate wins ties.
/// Returns `None` if there are no candidates.
pub fn best_match<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let score = similarity(target, candidate);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best
}
