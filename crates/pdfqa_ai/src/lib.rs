pub mod answer;
pub mod embeddings;
pub mod index;
pub mod llm;
pub mod ollama;
pub mod retrieve;
pub mod session;

pub use session::{Services, Session};
