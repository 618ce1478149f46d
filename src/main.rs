//! Passage Chunker - Main Entry Point
//!
//! Runs the chunking HTTP service or chunks files from the command line.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passage_chunker::api::{self, handlers::AppState};
use passage_chunker::batch::{BatchConfig, BatchProcessor};
use passage_chunker::chunkers::{Chunker, ContextChunker};
use passage_chunker::output::{CompletionClient, Note, DEFAULT_ORGANIZE_PROMPT};
use passage_chunker::processing::{
    chapter_dir, split_into_chapters, write_chapter, write_chunks, write_word_frequencies,
};
use passage_chunker::types::{ChunkResponse, DocumentItem, ServiceConfig};

/// Split long documents into budget-sized chunks with context carry-over.
#[derive(Parser)]
#[command(name = "passage-chunker", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chunking service.
    Serve {
        /// Port to listen on (defaults to $PORT or 3017)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Chunk a text file and print or save the chunks.
    Chunk {
        /// Input text file
        file: PathBuf,

        /// Maximum characters per chunk
        #[arg(long, short = 'm', allow_negative_numbers = true)]
        max_chars: Option<i64>,

        /// Write one Markdown file per chunk into this directory
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,

        /// Print the chunks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a book into chapter files, chunking each chapter.
    Split {
        /// Input text file
        file: PathBuf,

        /// Output directory
        #[arg(long, short = 'o', default_value = "output")]
        output_dir: PathBuf,

        /// Maximum characters per chunk
        #[arg(long, short = 'm', allow_negative_numbers = true)]
        max_chars: Option<i64>,
    },

    /// Chunk a file, organize each chunk with the completion service, and
    /// turn the result into a note.
    Organize {
        /// Input Markdown or text file
        file: PathBuf,

        /// Maximum characters per chunk
        #[arg(long, short = 'm', allow_negative_numbers = true)]
        max_chars: Option<i64>,
    },

    /// Turn an already organized file into a note.
    Convert {
        /// Input Markdown file
        file: PathBuf,
    },

    /// Count word frequencies and save them as JSON next to the file.
    Words {
        /// Input text file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "passage_chunker=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ServiceConfig::from_env();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Chunk {
            file,
            max_chars,
            output_dir,
            json,
        } => run_chunk(&config, &file, max_chars, output_dir.as_deref(), json),
        Commands::Split {
            file,
            output_dir,
            max_chars,
        } => run_split(&config, &file, &output_dir, max_chars).await,
        Commands::Organize { file, max_chars } => run_organize(&config, &file, max_chars).await,
        Commands::Convert { file } => run_convert(&config, &file).await,
        Commands::Words { file } => {
            let (path, frequencies) = write_word_frequencies(&file)?;
            println!("{} distinct words saved to {}", frequencies.len(), path.display());
            Ok(())
        }
    }
}

async fn serve(config: ServiceConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.port);

    info!("Starting Passage Chunker v{}", env!("CARGO_PKG_VERSION"));
    info!("Default budget: {} chars", config.default_max_chars);

    let state = Arc::new(AppState::new(config));
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn read_input(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chunk".to_string())
}

fn run_chunk(
    config: &ServiceConfig,
    file: &Path,
    max_chars: Option<i64>,
    output_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let chunk_config = config.chunk_config_for(max_chars)?;
    let text = read_input(file)?;
    let chunks = ContextChunker::new().chunk(&text, &chunk_config)?;

    info!(file = %file.display(), chunks = chunks.len(), "Chunked file");

    if let Some(dir) = output_dir {
        let paths = write_chunks(dir, &file_stem(file), &chunks)?;
        info!(files = paths.len(), dir = %dir.display(), "Saved chunks");
    } else if json {
        let response = ChunkResponse::new(chunk_config.max_chars, chunks);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        for chunk in &chunks {
            println!(
                "----- chunk {} ({} chars, {}) -----",
                chunk.chunk_index + 1,
                chunk.char_count,
                chunk.kind
            );
            println!("{}\n", chunk.content);
        }
    }

    Ok(())
}

async fn run_split(
    config: &ServiceConfig,
    file: &Path,
    output_dir: &Path,
    max_chars: Option<i64>,
) -> Result<()> {
    let chunk_config = config.chunk_config_for(max_chars)?;
    let text = read_input(file)?;
    let book = split_into_chapters(&text);

    if book.is_empty() {
        anyhow::bail!("No chapter headings found in {}", file.display());
    }

    let items: Vec<DocumentItem> = book
        .chapters
        .iter()
        .map(|chapter| {
            DocumentItem::new(chapter.content.as_str()).with_title(chapter.title.as_str())
        })
        .collect();

    let processor = BatchProcessor::new(
        Arc::new(ContextChunker::new()),
        BatchConfig {
            concurrency: config.batch_concurrency,
            continue_on_error: false,
        },
    );
    let (documents, result) = processor.process_batch(items, &chunk_config).await?;

    for (chapter, document) in book.chapters.iter().zip(&documents) {
        write_chapter(output_dir, &book.name, chapter)?;
        let dir = chapter_dir(output_dir, &book.name, chapter);
        write_chunks(&dir, "chunk", &document.chunks)?;
    }

    info!(
        book = %book.name,
        chapters = book.chapters.len(),
        chunks = result.total_chunks,
        output = %output_dir.display(),
        "Split book"
    );

    Ok(())
}

async fn run_organize(config: &ServiceConfig, file: &Path, max_chars: Option<i64>) -> Result<()> {
    let chunk_config = config.chunk_config_for(max_chars)?;
    let text = read_input(file)?;
    let chunks = ContextChunker::new().chunk(&text, &chunk_config)?;

    let client = CompletionClient::new(config.completion.clone())?;
    let organized = client.organize(DEFAULT_ORGANIZE_PROMPT, &chunks).await?;
    let organized_text = organized.text();

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    let path = dir.join(format!("{}_organized.md", timestamp));
    fs::write(&path, &organized_text)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), chunks = chunks.len(), "Saved organized content");

    let note = if organized.available {
        client.convert_to_note(&organized_text).await
    } else {
        Note::plain(&organized_text)
    };
    write_note(dir, &timestamp, &note)
}

async fn run_convert(config: &ServiceConfig, file: &Path) -> Result<()> {
    let text = read_input(file)?;
    let client = CompletionClient::new(config.completion.clone())?;

    let note = if client.health_check().await? {
        client.convert_to_note(&text).await
    } else {
        warn!(
            api_url = %client.settings().api_url,
            "Completion service unavailable, note will hold the text unchanged"
        );
        Note::plain(&text)
    };

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    write_note(file.parent().unwrap_or_else(|| Path::new(".")), &timestamp, &note)
}

fn write_note(dir: &Path, timestamp: &str, note: &Note) -> Result<()> {
    let path = dir.join(format!("{}_xiaohongshu.md", timestamp));
    fs::write(&path, note.render())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), tags = note.tags.len(), "Saved note");
    Ok(())
}
