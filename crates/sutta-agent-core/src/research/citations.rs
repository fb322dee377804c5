//! Citation extraction from synthesized answer text
//!
//! A document counts as cited when its id appears in the answer as a
//! standalone token: case-insensitive, bounded by non-alphanumeric
//! characters, and not continued by `.<digit>` (so `sn12` is not found
//! inside `sn12.2`).
//!
//! This is a heuristic. Ids that are also ordinary words are cited when
//! the word appears, and ids written differently from the index
//! (`MN 10` for `mn10`) are missed.

use crate::search::Passage;

/// Ids of `candidates` mentioned in `answer`, ordered by first occurrence
pub fn extract_cited_ids<'a, I>(answer: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let haystack = answer.to_lowercase();
    let mut found: Vec<(usize, String)> = Vec::new();

    for id in candidates {
        if id.is_empty() || found.iter().any(|(_, f)| f == id) {
            continue;
        }
        if let Some(pos) = first_standalone_match(&haystack, &id.to_lowercase()) {
            found.push((pos, id.to_string()));
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    found.into_iter().map(|(_, id)| id).collect()
}

/// Distinct document ids among passages, in discovery order
pub fn document_ids(passages: &[Passage]) -> Vec<&str> {
    let mut ids: Vec<&str> = Vec::new();
    for p in passages {
        if !ids.contains(&p.document_id.as_str()) {
            ids.push(&p.document_id);
        }
    }
    ids
}

fn first_standalone_match(haystack: &str, needle: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(needle) {
        let start = from + rel;
        let end = start + needle.len();
        if bounded_before(haystack, start) && bounded_after(haystack, end) {
            return Some(start);
        }
        // Advance by one char so overlapping matches are still considered
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

fn bounded_before(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}

fn bounded_after(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    match rest.next() {
        None => true,
        Some('.') => !rest.next().is_some_and(|c| c.is_ascii_digit()),
        Some(c) => !c.is_alphanumeric(),
    }
}
