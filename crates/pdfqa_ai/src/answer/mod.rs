//! Answer Generator: context assembly, prompting and output parsing.

use pdfqa_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::llm::{Llm, SamplingOptions};
use crate::retrieve::RetrievedChunk;

mod prompts;

pub use prompts::{qa_prompt, ANSWER_MARKER, CANNOT_FIND_ANSWER};

pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found in the PDF document.";
pub const UNABLE_TO_GENERATE: &str = "Unable to generate a response from the PDF document.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    Generated,
    /// Nothing cleared the similarity floor; the model was not invoked.
    NoRelevantContext,
    /// The model produced nothing after the answer marker.
    EmptyGeneration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerSource {
    pub chunk_id: String,
    pub ordinal: u32,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub kind: AnswerKind,
    pub text: String,
    pub sources: Vec<AnswerSource>,
}

impl Answer {
    fn no_relevant_context() -> Self {
        Self {
            kind: AnswerKind::NoRelevantContext,
            text: NO_RELEVANT_INFORMATION.to_string(),
            sources: Vec::new(),
        }
    }
}

/// Text of the first `max_chunks` retrieved chunks, each followed by a blank line.
pub fn build_context(retrieved: &[RetrievedChunk], max_chunks: usize) -> String {
    let mut context = String::new();
    for hit in retrieved.iter().take(max_chunks) {
        context.push_str(&hit.chunk.text);
        context.push_str("\n\n");
    }
    context
}

/// Text after the final answer marker (the whole output when there is none), trimmed.
pub fn parse_answer(raw: &str) -> Option<String> {
    let tail = match raw.rfind(ANSWER_MARKER) {
        Some(pos) => &raw[pos + ANSWER_MARKER.len()..],
        None => raw,
    };
    let answer = tail.trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}

pub fn generate_answer(
    llm: &dyn Llm,
    model: &str,
    sampling: &SamplingOptions,
    retrieved: &[RetrievedChunk],
    question: &str,
    context_chunks: usize,
) -> Result<Answer, AppError> {
    let context = build_context(retrieved, context_chunks);
    if context.trim().is_empty() {
        log::debug!("no context cleared the similarity floor; skipping generation");
        return Ok(Answer::no_relevant_context());
    }

    let sources = retrieved
        .iter()
        .take(context_chunks)
        .map(|hit| AnswerSource {
            chunk_id: hit.chunk.chunk_id.clone(),
            ordinal: hit.chunk.ordinal,
            score: hit.score,
        })
        .collect::<Vec<_>>();

    let prompt = qa_prompt(&context, question);
    let raw = llm.generate(model, &prompt, sampling).map_err(|e| {
        AppError::model("AI_GENERATION_FAILED", "Failed to generate an answer")
            .with_details(format!("model={model}; err={e}"))
            .with_retryable(e.retryable)
    })?;

    Ok(match parse_answer(&raw) {
        Some(text) => Answer {
            kind: AnswerKind::Generated,
            text,
            sources,
        },
        None => Answer {
            kind: AnswerKind::EmptyGeneration,
            text: UNABLE_TO_GENERATE.to_string(),
            sources,
        },
    })
}
