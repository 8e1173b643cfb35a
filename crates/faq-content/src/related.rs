/// Related-content suggestions.
///
/// One scoring implementation serves every call site. Weights:
/// - +10 shared category (slug equality, both sides defined)
/// - +3 per keyword of the current item matching any candidate keyword by
///   case-insensitive substring containment in either direction
/// - +1 per word of the current item's display text (longer than 3
///   characters, whitespace-tokenized, case-insensitive) occurring verbatim
///   among the candidate's words; every occurrence counts
///
/// An editor-curated list on the current item overrides scoring entirely.
/// Ties keep candidate input order; the sort is stable by contract.
use crate::model::{is_displayable, ContentItem};

pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Pick up to `max_results` related items for `current`.
///
/// When `manual` is non-empty it takes absolute precedence: its displayable
/// entries are returned in their given order and scoring is skipped, even if
/// none of them survive validation. Otherwise candidates are scored,
/// stably sorted descending, and truncated. `current` is excluded from the
/// candidate pool by identifier. Pure; never panics; empty inputs yield an
/// empty result.
pub fn suggest_related<'a, T: ContentItem>(
    current: &T,
    manual: &'a [T],
    candidates: &'a [T],
    max_results: usize,
) -> Vec<&'a T> {
    if !manual.is_empty() {
        return manual
            .iter()
            .filter(|m| is_displayable(*m))
            .take(max_results)
            .collect();
    }

    let mut scored: Vec<(&'a T, u32)> = candidates
        .iter()
        .filter(|c| c.id() != current.id() && is_displayable(*c))
        .map(|c| (c, relevance_score(current, c)))
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(max_results)
        .map(|(item, _)| item)
        .collect()
}

/// Score one candidate against the current item.
pub fn relevance_score<T: ContentItem + ?Sized>(current: &T, candidate: &T) -> u32 {
    let mut score = 0u32;

    if let (Some(current_cat), Some(candidate_cat)) =
        (current.category_slug(), candidate.category_slug())
    {
        if current_cat == candidate_cat {
            score += 10;
        }
    }

    let candidate_keywords: Vec<String> = candidate
        .keywords()
        .iter()
        .map(|k| k.to_lowercase())
        .collect();
    for keyword in current.keywords() {
        let keyword = keyword.to_lowercase();
        if candidate_keywords
            .iter()
            .any(|ck| ck.contains(&keyword) || keyword.contains(ck.as_str()))
        {
            score += 3;
        }
    }

    let current_text = current.display_text().unwrap_or_default().to_lowercase();
    let candidate_text = candidate.display_text().unwrap_or_default().to_lowercase();
    let candidate_words: Vec<&str> = candidate_text.split_whitespace().collect();
    for word in current_text.split_whitespace() {
        if word.chars().count() > 3 && candidate_words.contains(&word) {
            score += 1;
        }
    }

    score
}
