use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use pdfqa_ai::answer::{
    generate_answer, AnswerKind, ANSWER_MARKER, NO_RELEVANT_INFORMATION, UNABLE_TO_GENERATE,
};
use pdfqa_ai::llm::{Llm, SamplingOptions};
use pdfqa_ai::retrieve::RetrievedChunk;
use pdfqa_core::config::ChunkingConfig;
use pdfqa_core::error::{AppError, ErrorKind};
use pdfqa_core::ingest::chunk_text;

/// Echoes the prompt followed by a canned continuation, like a causal LM.
struct EchoLlm {
    continuation: String,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_sampling: Mutex<Option<SamplingOptions>>,
}

impl EchoLlm {
    fn new(continuation: &str) -> Self {
        Self {
            continuation: continuation.to_string(),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_sampling: Mutex::new(None),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Llm for EchoLlm {
    fn generate(
        &self,
        _model: &str,
        prompt: &str,
        sampling: &SamplingOptions,
    ) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_sampling.lock().unwrap() = Some(*sampling);
        Ok(format!("{prompt}{}", self.continuation))
    }
}

fn hits(texts: &[&str]) -> Vec<RetrievedChunk> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut chunk = chunk_text(t, &ChunkingConfig::default()).remove(0);
            chunk.ordinal = i as u32;
            RetrievedChunk {
                chunk,
                score: 0.9 - i as f32 * 0.1,
            }
        })
        .collect()
}

#[test]
fn empty_context_skips_the_model_and_is_idempotent() {
    let llm = EchoLlm::new(" should never be seen");
    let sampling = SamplingOptions::default();

    let first = generate_answer(&llm, "mock", &sampling, &[], "Anything?", 2).unwrap();
    let second = generate_answer(&llm, "mock", &sampling, &[], "Anything?", 2).unwrap();

    assert_eq!(llm.call_count(), 0);
    assert_eq!(first.kind, AnswerKind::NoRelevantContext);
    assert_eq!(first.text, NO_RELEVANT_INFORMATION);
    assert_eq!(first, second);
}

#[test]
fn echoed_prompt_and_marker_are_stripped() {
    let llm = EchoLlm::new("  The capital of France is Paris.\n");
    let retrieved = hits(&["The capital of France is Paris."]);

    let answer = generate_answer(
        &llm,
        "mock",
        &SamplingOptions::default(),
        &retrieved,
        "What is the capital of France?",
        2,
    )
    .unwrap();

    assert_eq!(llm.call_count(), 1);
    assert_eq!(answer.kind, AnswerKind::Generated);
    assert_eq!(answer.text, "The capital of France is Paris.");
    assert!(!answer.text.contains(ANSWER_MARKER));
    assert!(!answer.text.contains("PDF content:"));
    assert_eq!(answer.sources.len(), 1);
}

#[test]
fn only_the_first_n_chunks_reach_the_prompt() {
    let llm = EchoLlm::new("ok");
    let retrieved = hits(&["first passage", "second passage", "third passage"]);

    let answer = generate_answer(
        &llm,
        "mock",
        &SamplingOptions::default(),
        &retrieved,
        "Which passages?",
        2,
    )
    .unwrap();

    let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("first passage"));
    assert!(prompt.contains("second passage"));
    assert!(!prompt.contains("third passage"));
    assert!(prompt.contains("Question: Which passages?"));
    assert_eq!(
        answer.sources.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn sampling_options_are_passed_through() {
    let llm = EchoLlm::new("ok");
    let sampling = SamplingOptions {
        max_new_tokens: 64,
        temperature: 0.7,
        top_p: 0.5,
        repetition_penalty: 1.1,
    };
    generate_answer(&llm, "mock", &sampling, &hits(&["text"]), "q?", 1).unwrap();
    assert_eq!(*llm.last_sampling.lock().unwrap(), Some(sampling));
}

#[test]
fn blank_generation_falls_back_to_fixed_message() {
    let llm = EchoLlm::new("   \n");
    let answer = generate_answer(
        &llm,
        "mock",
        &SamplingOptions::default(),
        &hits(&["some text"]),
        "q?",
        2,
    )
    .unwrap();
    assert_eq!(answer.kind, AnswerKind::EmptyGeneration);
    assert_eq!(answer.text, UNABLE_TO_GENERATE);
}

#[test]
fn model_failure_is_typed_not_stringified() {
    struct Broken;
    impl Llm for Broken {
        fn generate(
            &self,
            _model: &str,
            _prompt: &str,
            _sampling: &SamplingOptions,
        ) -> Result<String, AppError> {
            Err(AppError::model("AI_GENERATION_FAILED", "Failed to call generation endpoint")
                .with_retryable(true))
        }
    }

    let err = generate_answer(
        &Broken,
        "mock",
        &SamplingOptions::default(),
        &hits(&["some text"]),
        "q?",
        2,
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ModelInvocation);
    assert!(err.retryable);
    assert!(err.user_message().starts_with("Error processing your question"));
}
