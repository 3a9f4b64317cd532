use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_id: String,
    pub ordinal: u32,
    pub text: String,
    pub text_sha256: String,
    pub token_count: u32,
    // Half-open token range within the document.
    pub start_token: u32,
    pub end_token: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestedDocument {
    pub document_sha256: String,
    pub char_count: u64,
    pub chunks: Vec<Chunk>,
}
