//! docqa CLI - upload PDFs and ask questions about them
//!
//! # Commands
//!
//! ```bash
//! # Copy a PDF into the upload directory and index it
//! docqa upload report.pdf
//!
//! # Re-index every PDF in the upload directory
//! docqa process
//!
//! # Ask a question against everything indexed so far
//! docqa ask "What color is the sky?"
//!
//! # Preview extraction and chunking without touching the index
//! docqa chunk report.pdf --query "sky"
//!
//! # Interactive session
//! docqa shell
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docqa_lib::{
    answer::AnswerService,
    chunk::{ChunkMetadata, Chunker, FixedSizeChunker},
    config::{Config, DEFAULT_CONFIG_FILE},
    embed::{embedder_for, Embedder},
    extract::{PdfExtractor, TextExtractor},
    llm::GroqProvider,
    pipeline::{self, IngestReport, Ingestor},
    search::SearchEngine,
    store::{DiskStore, MemoryStore},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about your PDF documents")]
#[command(version)]
struct Cli {
    /// JSON configuration file holding GROQ_API_KEY
    #[arg(short, long, env = "DOCQA_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a PDF into the upload directory and index it
    Upload {
        /// PDF file to upload
        input: PathBuf,

        /// Re-index every PDF in the upload directory, not just this one
        /// (previously indexed files get duplicate records)
        #[arg(long)]
        all: bool,
    },

    /// Index every PDF in the upload directory
    Process,

    /// Answer a question from the indexed documents
    Ask {
        /// The question
        question: String,

        /// Number of chunks to retrieve (defaults to the configured top_k)
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Extract and chunk a PDF without indexing it
    Chunk {
        /// PDF file to chunk
        input: PathBuf,

        /// Rank the chunks against this query in memory
        #[arg(short, long)]
        query: Option<String>,

        /// Number of ranked chunks to show
        #[arg(short, long, default_value = "3")]
        k: usize,
    },

    /// Interactive session: type questions, `:upload <pdf>`, `:process` or `:quit`
    Shell,
}

fn open_ingestor<'a>(
    config: &Config,
    embedder: &'a mut dyn Embedder,
) -> Result<Ingestor<FixedSizeChunker, &'a mut dyn Embedder, DiskStore>> {
    let store = DiskStore::open_or_create(&config.vectorstore_dir, embedder.model_name(), embedder.dimension())?;
    let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?;
    Ok(Ingestor::new(chunker, SearchEngine::new(embedder, store)))
}

fn upload(config: &Config, embedder: &mut dyn Embedder, input: &Path, all: bool) -> Result<()> {
    let uploaded = pipeline::upload(input, &config.upload_dir)?;
    println!("Uploaded '{}' to {}", input.display(), config.upload_dir.display());

    let mut ingestor = open_ingestor(config, embedder)?;
    if all {
        let report = ingestor.process_directory(&config.upload_dir)?;
        print_report(&report);
        if !report.is_success() {
            bail!("{} document(s) failed to process", report.failed.len());
        }
    } else {
        let summary = ingestor.process_file(&uploaded)?;
        println!(
            "Processed '{}': {} characters, {} chunks. Ready for questions.",
            summary.name, summary.characters, summary.chunks
        );
    }
    Ok(())
}

fn process(config: &Config, embedder: &mut dyn Embedder) -> Result<()> {
    let mut ingestor = open_ingestor(config, embedder)?;
    let report = ingestor
        .process_directory(&config.upload_dir)
        .with_context(|| format!("cannot read upload directory {}", config.upload_dir.display()))?;
    print_report(&report);
    if !report.is_success() {
        bail!("{} document(s) failed to process", report.failed.len());
    }
    Ok(())
}

fn print_report(report: &IngestReport) {
    for doc in &report.processed {
        println!("  ok    {} ({} chunks)", doc.name, doc.chunks);
    }
    for (path, err) in &report.failed {
        println!("  error {}: {err}", path.display());
    }
    println!(
        "Processed {} document(s), {} chunks stored.",
        report.processed.len(),
        report.total_chunks()
    );
}

fn ask(config: &Config, embedder: &mut dyn Embedder, question: &str, k: Option<usize>) -> Result<String> {
    // a missing index fails before the LLM client is built
    let store = DiskStore::open(&config.vectorstore_dir)?;
    let llm = GroqProvider::new(config.api_key()?.to_string(), config.model.clone())?;

    let mut service = AnswerService::new(SearchEngine::new(embedder, store), llm)
        .with_top_k(k.unwrap_or(config.top_k))
        .with_temperature(config.temperature);
    Ok(service.answer(question)?)
}

fn chunk_preview(config: &Config, input: &Path, query: Option<&str>, k: usize) -> Result<()> {
    let document = PdfExtractor::new().extract(input)?;
    let text = document.require_text()?;
    let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?;
    let chunks = chunker.chunk(text, ChunkMetadata::for_source(document.name.clone()));

    println!(
        "Chunked '{}' ({} chars) into {} chunks using {} strategy (size {}, overlap {}):\n",
        document.name,
        text.chars().count(),
        chunks.len(),
        chunker.name(),
        chunker.chunk_size(),
        chunker.overlap()
    );

    let Some(query) = query else {
        for (i, chunk) in chunks.iter().enumerate() {
            println!("--- Chunk {} ({} chars, id: {}) ---", i + 1, chunk.content.chars().count(), &chunk.id[..8]);
            println!("{}\n", preview(&chunk.content, 200));
        }
        return Ok(());
    };

    let embedder = embedder_for(&config.embedding_model)?;
    let mut engine = SearchEngine::new(embedder, MemoryStore::new());
    engine.add(&chunks)?;
    println!("Searching: '{query}' (k={k})\n");
    for (i, result) in engine.retrieve(query, k)?.iter().enumerate() {
        println!("#{} (score: {:.4}, offset {})", i + 1, result.score, result.chunk.metadata.position);
        println!("---");
        println!("{}\n", preview(&result.chunk.content, 300));
    }
    Ok(())
}

fn preview(content: &str, max_chars: usize) -> String {
    let mut out: String = content.chars().take(max_chars).collect();
    if content.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

fn shell(config: &Config) -> Result<()> {
    println!("Loading embedding model '{}'...", config.embedding_model);
    let mut embedder = embedder_for(&config.embedding_model)?;
    println!("Ask a question, or use :upload <pdf>, :process, :quit");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();

        let outcome = match line.split_once(' ').unwrap_or((line, "")) {
            ("", _) => {
                println!("Please enter a question.");
                continue;
            }
            (":quit" | ":q", _) => break,
            (":upload", path) if !path.trim().is_empty() => {
                upload(config, &mut *embedder, Path::new(path.trim()), false)
            }
            (":upload", _) => {
                println!("usage: :upload <pdf>");
                continue;
            }
            (":process", _) => process(config, &mut *embedder),
            _ => ask(config, &mut *embedder, line, None).map(|answer| println!("\n{answer}\n")),
        };
        if let Err(e) = outcome {
            // the session survives a failed command
            println!("Error: {e:#}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    info!(config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Upload { input, all } => {
            let mut embedder = embedder_for(&config.embedding_model)?;
            upload(&config, &mut *embedder, &input, all)?;
        }

        Commands::Process => {
            let mut embedder = embedder_for(&config.embedding_model)?;
            process(&config, &mut *embedder)?;
        }

        Commands::Ask { question, k } => {
            if !config.vectorstore_dir.exists() {
                bail!(
                    "vector store not found at {}; please process a document first",
                    config.vectorstore_dir.display()
                );
            }
            let mut embedder = embedder_for(&config.embedding_model)?;
            let answer = ask(&config, &mut *embedder, &question, k)?;
            println!("{answer}");
        }

        Commands::Chunk { input, query, k } => {
            chunk_preview(&config, &input, query.as_deref(), k)?;
        }

        Commands::Shell => shell(&config)?,
    }

    Ok(())
}
