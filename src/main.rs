use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pdfqa_cli::{
    ChatCommand, QuestionAnswerer, confirm, display_banner, handle_input_with_history,
    print_answer, print_help, print_indexing_result, print_sources,
};
use pdfqa_core::{EmbeddingProvider, IndexSpec, LLMProvider, RAGEngine, VectorStore};
use pdfqa_drive::{DriveClient, LocalDirectorySource};
use pdfqa_gemini::{GeminiClient, GeminiConfig};
use pdfqa_pinecone::{PineconeClient, PineconeConfig};
use pdfqa_rag::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, IndexingConfig, LocalVectorStore, PdfIndexer,
    PdfRagEngine,
};

#[derive(Parser)]
#[command(name = "pdfqa")]
#[command(about = "Ask questions about the PDFs in a Drive folder or local directory", long_about = None)]
struct Cli {
    /// Where passages are stored
    #[arg(long, value_enum, default_value_t = StoreKind::Pinecone, global = true)]
    store: StoreKind,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreKind {
    Pinecone,
    /// In-process store, lost on exit
    Memory,
}

impl StoreKind {
    fn name(self) -> &'static str {
        match self {
            StoreKind::Pinecone => "pinecone",
            StoreKind::Memory => "memory",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Index every PDF in a Google Drive folder
    Index {
        /// Drive folder ID
        #[arg(long, env = "DRIVE_FOLDER_ID")]
        folder: String,

        #[command(flatten)]
        chunking: ChunkArgs,
    },
    /// Index every PDF under a local directory
    IndexLocal {
        dir: PathBuf,

        #[command(flatten)]
        chunking: ChunkArgs,
    },
    /// Ask a single question
    Ask {
        question: String,

        /// Passages retrieved per question
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },
    /// Interactive question answering
    Chat {
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Index this directory before the session starts
        #[arg(long)]
        index_local: Option<PathBuf>,
    },
    /// Show index statistics
    Stats,
    /// Delete every indexed passage
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Clone)]
struct ChunkArgs {
    /// Maximum characters per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Chunks sent per upsert request
    #[arg(long, default_value_t = 1)]
    batch_size: usize,
}

impl From<ChunkArgs> for IndexingConfig {
    fn from(args: ChunkArgs) -> Self {
        Self {
            chunk_size: args.chunk_size,
            chunk_overlap: args.chunk_overlap,
            batch_size: args.batch_size,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let gemini_config = GeminiConfig::from_env().context("Gemini is not configured")?;

    match cli.store {
        StoreKind::Pinecone => {
            let pinecone_config =
                PineconeConfig::from_env_for_embeddings(gemini_config.embed_dimensions)
                    .context("Pinecone is not configured")?;
            let mut store = PineconeClient::new(pinecone_config)?;
            store.connect().await.context("Failed to connect to Pinecone")?;
            run(cli.command, gemini_config, Arc::new(store), cli.store).await
        }
        StoreKind::Memory => {
            let mut store = LocalVectorStore::new();
            let spec = IndexSpec {
                dimension: gemini_config.embed_dimensions,
                ..Default::default()
            };
            store.ensure_index(&spec).await?;
            run(cli.command, gemini_config, Arc::new(store), cli.store).await
        }
    }
}

async fn run<V: VectorStore + 'static>(
    command: Commands,
    gemini_config: GeminiConfig,
    store: Arc<V>,
    store_kind: StoreKind,
) -> Result<()> {
    let embedder = Arc::new(GeminiClient::new(gemini_config.clone())?);
    let chat_model = GeminiClient::new(gemini_config)?;
    debug!(
        store = store_kind.name(),
        embed_model = EmbeddingProvider::model_id(embedder.as_ref()),
        "Clients ready"
    );

    match command {
        Commands::Index { folder, chunking } => {
            let drive = DriveClient::from_env().context("Google Drive is not configured")?;
            let indexer = PdfIndexer::with_config(embedder, store, chunking.into())?;

            println!("{} Indexing Drive folder {}...", "📥".blue(), folder.bold());
            let result = indexer.index_location(&drive, &folder).await?;
            print_indexing_result(&result);
        }
        Commands::IndexLocal { dir, chunking } => {
            index_directory(&dir, embedder, store, chunking.into()).await?;
        }
        Commands::Ask { question, top_k } => {
            let engine = PdfRagEngine::new(embedder, store);
            let answerer = QuestionAnswerer::new(chat_model, engine).with_top_k(top_k);

            let answer = answerer.answer(&question).await?;
            print_answer(&answer);
        }
        Commands::Chat { top_k, index_local } => {
            if let Some(dir) = index_local {
                index_directory(&dir, embedder.clone(), store.clone(), IndexingConfig::default())
                    .await?;
            }

            let engine = PdfRagEngine::new(embedder, store);
            let answerer = QuestionAnswerer::new(chat_model, engine).with_top_k(top_k);
            run_chat(&answerer, store_kind).await?;
        }
        Commands::Stats => {
            let engine = PdfRagEngine::new(embedder, store);
            let stats = engine.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Reset { yes } => {
            if !yes && !confirm("Delete every indexed passage?")? {
                println!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
            store.delete_all().await?;
            println!("{} Index cleared", "🗑️".yellow());
        }
    }

    Ok(())
}

async fn index_directory<V: VectorStore + 'static>(
    dir: &Path,
    embedder: Arc<GeminiClient>,
    store: Arc<V>,
    config: IndexingConfig,
) -> Result<()> {
    let source = LocalDirectorySource::new(dir);
    let indexer = PdfIndexer::with_config(embedder, store, config)?;

    println!("{} Indexing {}...", "📥".blue(), dir.display().to_string().bold());
    let result = indexer.index_location(&source, "").await?;
    print_indexing_result(&result);
    Ok(())
}

async fn run_chat<L: LLMProvider, R: RAGEngine>(
    answerer: &QuestionAnswerer<L, R>,
    store_kind: StoreKind,
) -> Result<()> {
    let vector_count = match answerer.rag().stats().await {
        Ok(stats) => stats["vector_count"].as_u64().map(|c| c as usize),
        Err(_) => None,
    };
    display_banner(store_kind.name(), vector_count);

    let mut history = Vec::new();
    let mut last_sources = Vec::new();

    loop {
        let input = handle_input_with_history(&mut history).await?;

        match ChatCommand::parse(&input) {
            ChatCommand::Empty => continue,
            ChatCommand::Help => print_help(),
            ChatCommand::Sources => print_sources(&last_sources),
            ChatCommand::Clear => {
                history.clear();
                last_sources.clear();
                println!("{}", "History cleared.".dimmed());
            }
            ChatCommand::Exit => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            ChatCommand::Ask(question) => {
                println!("{} Searching your PDFs...", "🤖".blue());

                match answerer.answer(&question).await {
                    Ok(answer) => {
                        print_answer(&answer);
                        last_sources = answer.sources;
                    }
                    Err(e) => println!("{} {}", "❌".red(), e.to_string().red()),
                }
            }
        }
    }

    Ok(())
}
