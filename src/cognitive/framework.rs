//! Text helpers shared by the heuristic analysis path.

use std::collections::HashMap;

const STOPWORDS: &[&str] = &[
    "the", "and", "or", "a", "an", "to", "of", "in", "on", "for", "with", "is", "are", "be",
    "this", "that", "we", "our", "should", "whether", "it", "by", "at", "as", "from", "into",
    "vs", "versus", "do", "not", "will", "can", "us",
];

pub(crate) fn split_sentences(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    for ch in s.chars() {
        cur.push(ch);
        if (ch == '.' || ch == '!' || ch == '?') && !cur.trim().is_empty() {
            out.push(cur.trim().to_string());
            cur.clear();
        }
    }
    if !cur.trim().is_empty() {
        out.push(cur.trim().to_string());
    }
    out
}

/// Most frequent non-stopword tokens; ties broken alphabetically so output is stable.
pub(crate) fn top_keywords(s: &str, n: usize) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for w in s
        .split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 2)
    {
        if STOPWORDS.contains(&w.as_str()) {
            continue;
        }
        *freq.entry(w).or_insert(0) += 1;
    }
    let mut v: Vec<(String, usize)> = freq.into_iter().collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v.into_iter().take(n).map(|(k, _)| k).collect()
}

/// Trim, drop blanks and case-insensitive duplicates, cap length.
pub(crate) fn dedup_capped(items: impl IntoIterator<Item = String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
            continue;
        }
        out.push(trimmed.to_string());
        if out.len() >= cap {
            break;
        }
    }
    out
}

/// Shorten to at most `max` characters on a char boundary.
pub(crate) fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_stable_and_skip_stopwords() {
        let kws = top_keywords("Launch the product. The product launch needs budget.", 3);
        assert_eq!(kws, vec!["launch", "product", "budget"]);
    }

    #[test]
    fn sentences_split_on_terminators() {
        assert_eq!(
            split_sentences("One. Two? Three"),
            vec!["One.", "Two?", "Three"]
        );
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn dedup_respects_cap_and_case() {
        let out = dedup_capped(
            vec!["A".into(), "a".into(), " ".into(), "b".into(), "c".into()],
            2,
        );
        assert_eq!(out, vec!["A", "b"]);
    }

    #[test]
    fn clip_keeps_short_strings() {
        assert_eq!(clip("abc", 5), "abc");
        assert_eq!(clip("abcdef", 4).chars().count(), 4);
    }
}
