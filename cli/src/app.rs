use std::fs;
use std::path::Path;

use anyhow::Context;
use pdfqa_core::config::RagConfig;
use pdfqa_core::error::AppError;

/// Configuration from `path` (or defaults), with command-line overrides applied.
pub fn load_config(
    path: Option<&Path>,
    top_k: Option<usize>,
    floor: Option<f32>,
) -> Result<RagConfig, AppError> {
    let mut cfg = match path {
        Some(p) => RagConfig::load(p)?,
        None => RagConfig::default(),
    };
    if let Some(k) = top_k {
        cfg.retrieval.top_k = k;
        // Keep the prompt bound consistent with a smaller K.
        cfg.generation.context_chunks = cfg.generation.context_chunks.min(k.max(1));
    }
    if let Some(f) = floor {
        cfg.retrieval.similarity_floor = f;
    }
    cfg.validate()?;
    Ok(cfg)
}

pub fn read_pdf(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Line printed to stderr when a command fails. Pipeline errors use the same
/// wording the interactive shell shows inline.
pub fn failure_text(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(e) => e.user_message(),
        None => format!("Error: {err:#}"),
    }
}

/// One line of input to the interactive shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Empty,
    Quit,
    Status,
    Load(&'a Path),
    /// `:load` without a path.
    LoadUsage,
    Question(&'a str),
}

pub const LOAD_USAGE: &str = "usage: :load <path-to-pdf>";

pub fn parse_chat_line(line: &str) -> ChatCommand<'_> {
    let input = line.trim();
    match input {
        "" => ChatCommand::Empty,
        ":quit" | ":q" => ChatCommand::Quit,
        ":status" => ChatCommand::Status,
        ":load" => ChatCommand::LoadUsage,
        _ => match input
            .strip_prefix(":load")
            .filter(|rest| rest.starts_with(char::is_whitespace))
        {
            Some(rest) => ChatCommand::Load(Path::new(rest.trim())),
            None => ChatCommand::Question(input),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfqa_core::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn overrides_are_applied_and_validated() {
        let cfg = load_config(None, Some(1), Some(0.25)).expect("config");
        assert_eq!(cfg.retrieval.top_k, 1);
        assert_eq!(cfg.generation.context_chunks, 1);
        assert_eq!(cfg.retrieval.similarity_floor, 0.25);

        let err = load_config(None, Some(0), None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml")), None, None)
            .unwrap_err();
        assert_eq!(err.code, "CONFIG_READ_FAILED");
    }

    #[test]
    fn pipeline_failures_use_the_user_message() {
        let err = anyhow::Error::new(AppError::parse(
            "PDF_PARSE_FAILED",
            "File is not a readable PDF document",
        ));
        assert_eq!(
            failure_text(&err),
            "Error processing PDF: File is not a readable PDF document"
        );

        let err = anyhow::Error::new(AppError::model("LLM_UNAVAILABLE", "model is down"));
        assert_eq!(failure_text(&err), "Error processing your question: model is down");
    }

    #[test]
    fn other_failures_keep_their_context_chain() {
        let err = anyhow::anyhow!("No such file").context("failed to read a.pdf");
        assert_eq!(failure_text(&err), "Error: failed to read a.pdf: No such file");
    }

    #[test]
    fn parses_shell_commands() {
        assert_eq!(parse_chat_line("   "), ChatCommand::Empty);
        assert_eq!(parse_chat_line(":q"), ChatCommand::Quit);
        assert_eq!(parse_chat_line(" :quit \n"), ChatCommand::Quit);
        assert_eq!(parse_chat_line(":status"), ChatCommand::Status);
        assert_eq!(
            parse_chat_line(":load  docs/report.pdf "),
            ChatCommand::Load(Path::new("docs/report.pdf"))
        );
        assert_eq!(
            parse_chat_line("What is the capital of France?"),
            ChatCommand::Question("What is the capital of France?")
        );
    }

    #[test]
    fn bare_load_asks_for_a_path() {
        assert_eq!(parse_chat_line(":load"), ChatCommand::LoadUsage);
        assert_eq!(parse_chat_line(":load   "), ChatCommand::LoadUsage);
        assert_eq!(parse_chat_line(":loaded yet?"), ChatCommand::Question(":loaded yet?"));
    }
}
