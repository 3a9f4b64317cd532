use pdfqa_ai::answer::{Answer, AnswerKind};
use pdfqa_ai::index::IndexStatus;
use pdfqa_core::ingest::IngestedDocument;

use crate::OutputFormat;

pub fn answer(answer: &Answer, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(answer)?),
        OutputFormat::Plain => {
            println!("{}", answer.text);
            if answer.kind == AnswerKind::Generated && !answer.sources.is_empty() {
                let refs = answer
                    .sources
                    .iter()
                    .map(|s| format!("#{} ({:.2})", s.ordinal, s.score))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("\nsources: {refs}");
            }
        }
    }
    Ok(())
}

pub fn status(status: &IndexStatus, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => eprintln!("{}", serde_json::to_string(status)?),
        OutputFormat::Plain if status.ready => eprintln!(
            "PDF processed: {} chunks indexed with {}",
            status.chunk_count,
            status.model.as_deref().unwrap_or("unknown model")
        ),
        OutputFormat::Plain => eprintln!("No PDF processed yet"),
    }
    Ok(())
}

pub fn chunks(doc: &IngestedDocument, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(doc)?),
        OutputFormat::Plain => {
            for c in &doc.chunks {
                println!(
                    "--- chunk {} (tokens {}..{}, {} tokens)",
                    c.ordinal, c.start_token, c.end_token, c.token_count
                );
                println!("{}", c.text);
            }
            println!("--- {} chunks, {} chars", doc.chunks.len(), doc.char_count);
        }
    }
    Ok(())
}
