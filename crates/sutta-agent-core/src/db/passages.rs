//! Passage storage for the similarity index

use super::vectors::{bytes_to_embedding, embedding_to_bytes};
use super::Database;
use crate::error::Result;
use crate::search::{Passage, PassageMetadata};
use chrono::Utc;
use rusqlite::params;

impl Database {
    /// Insert (or replace) a passage and its embedding
    pub fn insert_passage(&self, passage: &Passage, model: &str, embedding: &[f32]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO passages (id, document_id, title, position, text, model, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                passage.id,
                passage.document_id,
                passage.metadata.title,
                passage.metadata.position,
                passage.text,
                model,
                embedding_to_bytes(embedding),
                now
            ],
        )?;
        Ok(())
    }

    /// Get all passage embeddings for similarity search
    pub fn get_passage_embeddings(&self) -> Result<Vec<(String, Vec<f32>)>> {
        let mut stmt = self.conn.prepare("SELECT id, embedding FROM passages")?;

        let results = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                Ok((id, bytes_to_embedding(&bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Load passages for scored ids, preserving the given order.
    /// Ids that no longer exist are skipped.
    pub fn get_scored_passages(&self, scored: &[(String, f32)]) -> Result<Vec<Passage>> {
        let mut stmt = self.conn.prepare(
            "SELECT document_id, title, position, text FROM passages WHERE id = ?1",
        )?;

        let mut passages = Vec::with_capacity(scored.len());
        for (id, score) in scored {
            let result = stmt.query_row(params![id], |row| {
                Ok(Passage {
                    id: id.clone(),
                    document_id: row.get(0)?,
                    metadata: PassageMetadata {
                        title: row.get(1)?,
                        position: row.get(2)?,
                    },
                    text: row.get(3)?,
                    score: *score as f64,
                })
            });

            match result {
                Ok(p) => passages.push(p),
                Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(passages)
    }

    /// Count indexed passages
    pub fn count_passages(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM passages", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
