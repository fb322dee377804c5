//! Bounded evidence digests for LLM prompts

use crate::search::{truncate_chars, Passage};

/// Character limits for a digest
#[derive(Debug, Clone, Copy)]
pub struct DigestLimits {
    /// Total characters across all entries
    pub char_budget: usize,
    /// Characters of passage text per entry
    pub passage_char_limit: usize,
}

impl Default for DigestLimits {
    fn default() -> Self {
        Self {
            char_budget: 12_000,
            passage_char_limit: 1_500,
        }
    }
}

/// Render the most relevant passages into a prompt section.
///
/// Passages are taken by score, highest first, with later discoveries
/// winning ties. Entries are added while they fit the budget; the first
/// entry is always kept, cut down to the budget if needed. Returns an
/// empty string for no passages.
pub fn build_digest(passages: &[Passage], limits: DigestLimits) -> String {
    let mut ranked: Vec<(usize, &Passage)> = passages.iter().enumerate().collect();
    ranked.sort_by(|(ia, a), (ib, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| ib.cmp(ia))
    });

    let mut digest = String::new();
    let mut used = 0usize;

    for (_, passage) in ranked {
        let entry = render_entry(passage, limits.passage_char_limit);
        let entry_len = entry.chars().count();
        let separator = if digest.is_empty() { 0 } else { 2 };

        if used + separator + entry_len > limits.char_budget {
            if digest.is_empty() {
                digest = truncate_to(&entry, limits.char_budget);
            }
            break;
        }

        if separator > 0 {
            digest.push_str("\n\n");
        }
        digest.push_str(&entry);
        used += separator + entry_len;
    }

    digest
}

fn render_entry(passage: &Passage, passage_char_limit: usize) -> String {
    let header = if passage.position().is_empty() {
        format!("[{}] {}", passage.document_id, passage.title())
    } else {
        format!(
            "[{}] {} ({})",
            passage.document_id,
            passage.title(),
            passage.position()
        )
    };
    format!(
        "{}\n{}",
        header.trim_end(),
        truncate_chars(passage.text.trim(), passage_char_limit)
    )
}

/// Cut to exactly `max_chars` characters without splitting a char
fn truncate_to(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
