//! Snippet extraction for search results

/// Extracted snippet with metadata
#[derive(Debug, Clone)]
pub struct Snippet {
    pub snippet: String,
    pub start_pos: usize,
    pub end_pos: usize,
}

const ELLIPSIS: &str = "...";

/// Extract a relevant snippet from content.
///
/// `max_length` counts characters and bounds the whole snippet, ellipses
/// included. `start_pos` and `end_pos` are byte offsets into `content`.
pub fn extract_snippet(content: &str, query: &str, max_length: Option<usize>) -> Snippet {
    let max_len = max_length.unwrap_or(300);
    let chars: Vec<(usize, char)> = content.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(content.len(), |&(b, _)| b);

    // If content is short enough, return it all
    if chars.len() <= max_len {
        return Snippet {
            snippet: content.to_string(),
            start_pos: 0,
            end_pos: content.len(),
        };
    }

    let ellipses = 2 * ELLIPSIS.len();
    if max_len <= ellipses {
        let end = byte_at(max_len);
        return Snippet {
            snippet: content[..end].to_string(),
            start_pos: 0,
            end_pos: end,
        };
    }

    let budget = max_len - ellipses;
    let center = find_query_position(content, query);

    // Calculate window in chars
    let start = center.saturating_sub(budget / 2);
    let end = (start + budget).min(chars.len());
    let start = end.saturating_sub(budget);

    let (start, end) = shrink_to_word_boundaries(&chars, start, end, budget);
    let (start_pos, end_pos) = (byte_at(start), byte_at(end));

    let mut snippet = content[start_pos..end_pos].trim().to_string();
    if start > 0 {
        snippet = format!("{}{}", ELLIPSIS, snippet);
    }
    if end < chars.len() {
        snippet.push_str(ELLIPSIS);
    }

    Snippet {
        snippet,
        start_pos,
        end_pos,
    }
}

/// Truncate to at most `max_chars` characters, appending "..." when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", text[..idx].trim_end(), ELLIPSIS),
        None => text.to_string(),
    }
}

/// Char index of the query (or its first matching term) in content
fn find_query_position(content: &str, query: &str) -> usize {
    // Lowercasing can expand a char, so remember where each lowered char came from
    let mut content_lower = String::with_capacity(content.len());
    let mut origin = Vec::with_capacity(content.len());
    for (i, c) in content.chars().enumerate() {
        for lc in c.to_lowercase() {
            content_lower.push(lc);
            origin.push(i);
        }
    }
    let query_lower = query.to_lowercase();

    let to_char_index = |byte: usize| origin[content_lower[..byte].chars().count()];

    // Try to find exact match first
    if !query_lower.trim().is_empty() {
        if let Some(pos) = content_lower.find(query_lower.trim()) {
            return to_char_index(pos);
        }
    }

    // Try individual terms
    query_lower
        .split_whitespace()
        .filter(|t| t.chars().count() >= 3)
        .find_map(|term| content_lower.find(term))
        .map_or(0, to_char_index)
}

/// Pull a cut window inward to whitespace. Each edge moves by a bounded
/// slack, and edges at the content bounds stay put.
fn shrink_to_word_boundaries(
    chars: &[(usize, char)],
    start: usize,
    end: usize,
    budget: usize,
) -> (usize, usize) {
    let slack = (budget / 10).max(16).min(budget / 4);
    let is_space = |i: usize| chars[i].1.is_whitespace();

    let mut new_start = start;
    if start > 0 && !is_space(start - 1) {
        if let Some(offset) = (start..(start + slack).min(end)).position(is_space) {
            new_start = start + offset + 1;
        }
    }

    let mut new_end = end;
    if end < chars.len() && !is_space(end) {
        if let Some(offset) = (new_start..end).rev().take(slack).position(is_space) {
            new_end = end - offset - 1;
        }
    }

    (new_start, new_end)
}
