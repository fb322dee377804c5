//! Long-term answer memory storage

use super::vectors::{bytes_to_embedding, embedding_to_bytes};
use super::Database;
use crate::error::Result;
use crate::research::SynthesizedAnswer;
use chrono::Utc;
use rusqlite::params;

/// A persisted answer together with the question it was produced for
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    pub id: String,
    pub question: String,
    pub question_embedding: Vec<f32>,
    pub answer: SynthesizedAnswer,
    pub created_at: String,
}

impl Database {
    /// Append a memory record. Never updates existing rows, so near-duplicate
    /// questions produce separate records.
    pub fn insert_memory_record(
        &self,
        question: &str,
        question_embedding: &[f32],
        answer: &SynthesizedAnswer,
    ) -> Result<String> {
        let id = generate_memory_id();
        let now = Utc::now().to_rfc3339();
        let answer_json = serde_json::to_string(answer)?;

        self.conn.execute(
            "INSERT INTO memory_records (id, question, question_hash, embedding, answer, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                question,
                question_hash(question),
                embedding_to_bytes(question_embedding),
                answer_json,
                now
            ],
        )?;

        Ok(id)
    }

    /// All memory records, oldest first
    pub fn get_memory_records(&self) -> Result<Vec<MemoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, question, embedding, answer, created_at
             FROM memory_records ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt
            .query_map([], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // One undecodable answer must not hide the rest of memory
        let records = rows
            .into_iter()
            .filter_map(|record| match record {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable memory record: {}", e);
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// Most recent record whose normalized question matches exactly
    pub fn find_memory_by_question(&self, question: &str) -> Result<Option<MemoryRecord>> {
        let result = self.conn.query_row(
            "SELECT id, question, embedding, answer, created_at
             FROM memory_records WHERE question_hash = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![question_hash(question)],
            row_to_record,
        );

        match result {
            Ok(Ok(record)) => Ok(Some(record)),
            Ok(Err(e)) => {
                tracing::warn!("Skipping unreadable memory record for {:?}: {}", question, e);
                Ok(None)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every memory record. Returns the number removed.
    pub fn clear_memory_records(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM memory_records", [])?;
        Ok(rows)
    }

    /// Count memory records
    pub fn count_memory_records(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM memory_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Row decode result; the inner error is an answer that failed to deserialize
type RawRecord = Result<MemoryRecord>;

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<RawRecord> {
    let id: String = row.get(0)?;
    let question: String = row.get(1)?;
    let embedding: Vec<u8> = row.get(2)?;
    let answer_json: String = row.get(3)?;
    let created_at: String = row.get(4)?;

    Ok(serde_json::from_str::<SynthesizedAnswer>(&answer_json)
        .map(|answer| MemoryRecord {
            id,
            question,
            question_embedding: bytes_to_embedding(&embedding),
            answer,
            created_at,
        })
        .map_err(Into::into))
}

/// Hash of the normalized question (lowercased, whitespace collapsed)
pub fn question_hash(question: &str) -> String {
    let normalized = normalize_question(question);
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

pub(crate) fn normalize_question(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn generate_memory_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    let pid = std::process::id();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mixed = timestamp ^ (pid as u128 * 6_364_136_223_846_793_005) ^ ((seq as u128) << 32);

    format!("mem-{:016x}{:016x}", (mixed >> 64) as u64, mixed as u64)
}
