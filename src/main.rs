use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lectern_cli::{display_banner, run_chat_loop};
use lectern_core::{MatchPolicy, PipelineConfig, PromptTemplate};
use lectern_export::{export_markdown, ExportConfig, NoteExporter};
use lectern_gemini::GeminiClient;
use lectern_rag::{NotesPipeline, PhraseClassifier};

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Turn lecture transcripts into notes, chat with them, and export notes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate notes from a transcript
    Notes(NotesArgs),
    /// Ask questions about a transcript
    Chat(ChatArgs),
    /// Export markdown notes to PDF or cleaned-up markdown
    Export(ExportArgs),
}

#[derive(Args)]
struct NotesArgs {
    /// Transcript text file
    transcript: PathBuf,

    /// Prompt template file; must contain {context}
    #[arg(short, long)]
    template: PathBuf,

    /// Write notes here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep the session open for follow-up questions
    #[arg(long)]
    chat: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args)]
struct ChatArgs {
    /// Transcript text file
    transcript: PathBuf,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args)]
struct ExportArgs {
    /// Markdown notes file
    notes: PathBuf,

    #[arg(short, long, value_enum, default_value_t = ExportFormat::Pdf)]
    format: ExportFormat,

    /// Output file; markdown goes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Pdf,
    Markdown,
}

#[derive(Args)]
struct PipelineArgs {
    /// Characters per transcript chunk
    #[arg(long, env = "LECTERN_CHUNK_SIZE", default_value_t = 1000)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "LECTERN_CHUNK_OVERLAP", default_value_t = 200)]
    chunk_overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, env = "LECTERN_RETRIEVER_K", default_value_t = 5)]
    retriever_k: usize,

    /// Sampling temperature for note generation
    #[arg(long, env = "LECTERN_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// How no-answer phrases are matched: substring, whole-word or exact
    #[arg(long, env = "LECTERN_MATCH_POLICY", default_value = "substring", value_parser = parse_match_policy)]
    match_policy: MatchPolicy,

    /// Directory for session indexes; the system temp directory when unset
    #[arg(long, env = "LECTERN_INDEX_DIR")]
    index_dir: Option<PathBuf>,
}

impl PipelineArgs {
    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            retriever_k: self.retriever_k,
            llm_temperature: self.temperature,
        }
    }

    fn pipeline(&self) -> Result<NotesPipeline<GeminiClient, GeminiClient>> {
        let client = Arc::new(GeminiClient::from_env()?);
        let pipeline = NotesPipeline::new(client.clone(), client)?
            .with_classifier(PhraseClassifier::new(self.match_policy)?);

        Ok(match &self.index_dir {
            Some(dir) => pipeline.with_index_root(dir),
            None => pipeline,
        })
    }
}

fn parse_match_policy(s: &str) -> std::result::Result<MatchPolicy, String> {
    MatchPolicy::from_str(s).ok_or_else(|| format!("unknown match policy '{}'", s))
}

async fn read_text(path: &Path, what: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {} {}", what, path.display()))
}

async fn run_notes(args: NotesArgs) -> Result<()> {
    let transcript = read_text(&args.transcript, "transcript").await?;
    let template = PromptTemplate::new(read_text(&args.template, "template").await?)?;
    let config = args.pipeline.config();
    let pipeline = args.pipeline.pipeline()?;

    let (notes, session) = pipeline.generate_notes(&transcript, &template, &config).await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, export_markdown(&notes))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Notes written to {}", "✓".green(), path.display());
        }
        None => println!("{}", notes),
    }

    if args.chat {
        display_banner();
        run_chat_loop(&pipeline, &session).await?;
    } else {
        session.close().await?;
    }

    Ok(())
}

async fn run_chat(args: ChatArgs) -> Result<()> {
    let transcript = read_text(&args.transcript, "transcript").await?;
    let config = args.pipeline.config();
    let pipeline = args.pipeline.pipeline()?;

    let session = pipeline.build_session(&transcript, &config).await?;
    info!(session_id = %session.id(), "Chat session started");

    display_banner();
    run_chat_loop(&pipeline, &session).await?;
    Ok(())
}

async fn run_export(args: ExportArgs) -> Result<()> {
    let notes = read_text(&args.notes, "notes").await?;

    match args.format {
        ExportFormat::Markdown => {
            let markdown = export_markdown(&notes);
            match &args.output {
                Some(path) => tokio::fs::write(path, markdown)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", markdown),
            }
        }
        ExportFormat::Pdf => {
            let Some(path) = &args.output else {
                bail!("PDF export needs --output <path>");
            };
            let exporter = NoteExporter::from_config(ExportConfig::from_env());
            let pdf = exporter.export_pdf(&notes).await?;
            tokio::fs::write(path, &pdf)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} PDF written to {} ({} bytes)", "✓".green(), path.display(), pdf.len());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lectern=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Notes(args) => run_notes(args).await,
        Commands::Chat(args) => run_chat(args).await,
        Commands::Export(args) => run_export(args).await,
    }
}
