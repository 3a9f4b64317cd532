mod app;
mod render;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pdfqa_ai::ollama::OllamaClient;
use pdfqa_ai::{Services, Session};
use pdfqa_core::config::RagConfig;
use pdfqa_core::ingest::{ingest_document, PdfExtractor};

use crate::app::ChatCommand;

#[derive(Parser)]
#[command(name = "pdfqa", about = "Ask questions about a PDF document", version)]
struct Cli {
    /// TOML configuration file (default: built-in settings)
    #[arg(long, global = true, env = "PDFQA_CONFIG")]
    config: Option<PathBuf>,

    /// Number of chunks to retrieve per question
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Minimum similarity score for a retrieved chunk
    #[arg(long, global = true)]
    floor: Option<f32>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Process a PDF and answer one question about it
    Ask {
        /// PDF file to read
        pdf: PathBuf,
        /// Question about the PDF content
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Process a PDF, then answer one question per line from stdin
    Chat {
        /// PDF file to read (or use `:load <path>` later)
        pdf: Option<PathBuf>,
    },

    /// Show the chunks a PDF is split into (no models are contacted)
    Chunks {
        /// PDF file to read
        pdf: PathBuf,
    },

    /// Check that the local model endpoint is reachable
    Health,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}", app::failure_text(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = app::load_config(cli.config.as_deref(), cli.top_k, cli.floor)?;

    match cli.command {
        Command::Ask { pdf, question } => {
            let services = Services::local(&cfg)?;
            let mut session = Session::new();
            process(&mut session, &services, &cfg, &pdf, cli.format)?;
            let answer = session.answer_question(&services, &cfg, &question.join(" "))?;
            render::answer(&answer, cli.format)?;
        }
        Command::Chat { pdf } => {
            let services = Services::local(&cfg)?;
            chat(&services, &cfg, pdf.as_deref(), cli.format)?;
        }
        Command::Chunks { pdf } => {
            let bytes = app::read_pdf(&pdf)?;
            let extractor = match cfg.models.temp_dir.clone() {
                Some(dir) => PdfExtractor::with_temp_dir(dir),
                None => PdfExtractor::new(),
            };
            let doc = ingest_document(&extractor, &bytes, &cfg.chunking)?;
            render::chunks(&doc, cli.format)?;
        }
        Command::Health => {
            let client = OllamaClient::new(&cfg.models.base_url)?;
            client
                .health_check()
                .map_err(|e| anyhow::anyhow!("model endpoint check failed: {e}"))?;
            println!("ok: {}", client.base_url());
        }
    }
    Ok(())
}

fn process(
    session: &mut Session,
    services: &Services,
    cfg: &RagConfig,
    pdf: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let bytes = app::read_pdf(pdf)?;
    let status = session.process_document(services, cfg, &bytes)?;
    render::status(&status, format)
}

fn chat(
    services: &Services,
    cfg: &RagConfig,
    pdf: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut session = Session::new();
    if let Some(pdf) = pdf {
        load_inline(&mut session, services, cfg, pdf, format);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match app::parse_chat_line(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Quit => break,
            ChatCommand::Status => render::status(&session.status(), format)?,
            ChatCommand::LoadUsage => eprintln!("{}", app::LOAD_USAGE),
            ChatCommand::Load(path) => load_inline(&mut session, services, cfg, path, format),
            ChatCommand::Question(question) => {
                match session.answer_question(services, cfg, question) {
                    Ok(answer) => render::answer(&answer, format)?,
                    Err(e) => {
                        log::debug!("question failed: {e:?}");
                        eprintln!("{}", e.user_message());
                    }
                }
            }
        }
    }
    Ok(())
}

// Failures are shown inline; the session stays usable.
fn load_inline(
    session: &mut Session,
    services: &Services,
    cfg: &RagConfig,
    pdf: &Path,
    format: OutputFormat,
) {
    let bytes = match app::read_pdf(pdf) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error processing PDF: {e:#}");
            return;
        }
    };
    match session.process_document(services, cfg, &bytes) {
        Ok(status) => {
            if let Err(e) = render::status(&status, format) {
                eprintln!("{e:#}");
            }
        }
        Err(e) => eprintln!("{}", e.user_message()),
    }
}
