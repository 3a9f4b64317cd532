use pdfqa_core::error::AppError;
use pdfqa_core::ingest::Chunk;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::index::EmbeddingIndex;

pub(crate) mod similarity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Top-`top_k` chunks by cosine similarity, best first, with anything scoring
/// below `similarity_floor` dropped. An empty result means nothing relevant.
pub fn retrieve(
    index: &EmbeddingIndex,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
    similarity_floor: f32,
) -> Result<Vec<RetrievedChunk>, AppError> {
    let q = query.trim();
    if q.is_empty() {
        return Err(AppError::invalid_input(
            "AI_RETRIEVAL_FAILED",
            "Query must not be empty",
        ));
    }
    if top_k == 0 {
        return Err(AppError::invalid_input(
            "AI_RETRIEVAL_FAILED",
            "top_k must be at least 1",
        ));
    }

    let qv = embedder.embed(index.model(), q)?;
    if qv.len() as u32 != index.dims() {
        return Err(AppError::model(
            "AI_RETRIEVAL_FAILED",
            "Query embedding dims do not match index dims",
        )
        .with_details(format!("index_dims={}; query_dims={}", index.dims(), qv.len())));
    }

    let qnorm = similarity::l2_norm(&qv);
    if qnorm == 0.0 {
        log::warn!("query embedding has zero norm; nothing can match");
        return Ok(Vec::new());
    }

    let mut hits: Vec<(usize, f32)> = Vec::new();
    for (i, entry) in index.entries.iter().enumerate() {
        if entry.norm == 0.0 {
            continue;
        }
        let score = similarity::cosine_similarity(&qv, &entry.vector, qnorm, entry.norm);
        hits.push((i, score));
    }

    // Best first; ties go to the earlier chunk.
    hits.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(index.entries[a.0].chunk.ordinal.cmp(&index.entries[b.0].chunk.ordinal))
    });
    hits.truncate(top_k);

    let out: Vec<RetrievedChunk> = hits
        .into_iter()
        .filter(|(_, score)| *score >= similarity_floor)
        .map(|(i, score)| RetrievedChunk {
            chunk: index.entries[i].chunk.clone(),
            score,
        })
        .collect();

    log::debug!(
        "retrieved {} chunk(s) for query (top_k={top_k}, floor={similarity_floor})",
        out.len()
    );
    Ok(out)
}
