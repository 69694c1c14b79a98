use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use question_bank_core::{
    highlight, parse_topic_lines, search, CorpusStore, DocumentStatus, LopdfExtractor,
    MatchReason, QuestionKind, QuestionPipeline, SearchRequest, SegmenterOptions, TopicStore,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Parser)]
#[command(name = "qbank", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Corpus snapshot file
    #[arg(long, default_value = "question_bank.json")]
    store: PathBuf,

    /// Learned-topic snapshot file
    #[arg(long, default_value = "learned_topics.json")]
    topics: PathBuf,

    /// Admin password, required by mutating commands
    #[arg(long, env = "QBANK_PASSWORD")]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Store raw papers unprocessed; the id is the file name.
    Ingest {
        /// PDF files to store
        #[arg(long, required = true, num_args = 1..)]
        file: Vec<PathBuf>,
    },
    /// Run the extraction pipeline over stored papers.
    Process {
        /// Document ids to process (default: every unprocessed one)
        #[arg(long)]
        id: Vec<String>,
    },
    /// Re-derive one paper's question set, replacing the previous one.
    Reprocess {
        #[arg(long)]
        id: String,
    },
    /// Remove a paper and its derived questions.
    Remove {
        #[arg(long)]
        id: String,
    },
    /// List stored papers with status and question counts.
    List,
    /// Import `topic, keyword, keyword, ...` lines into the thesaurus.
    ImportTopics {
        /// CSV file of topic lines
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the merged thesaurus.
    Topics,
    /// Search the corpus by keyword or topic.
    Search {
        #[arg(long)]
        query: String,
        /// Also match diagram-bearing questions against diagram vocabulary.
        #[arg(long, default_value_t = false)]
        include_diagrams: bool,
    },
}

fn require_admin(provided: Option<&str>) -> anyhow::Result<()> {
    let expected =
        std::env::var("QBANK_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

    match provided {
        Some(password) if password == expected => Ok(()),
        _ => bail!("admin password required (pass --password or set QBANK_PASSWORD)"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut store = CorpusStore::open(&cli.store)
        .with_context(|| format!("could not open corpus store {}", cli.store.display()))?;
    let mut topics = TopicStore::open(&cli.topics)
        .with_context(|| format!("could not open topic store {}", cli.topics.display()))?;

    info!(started_at = %Utc::now().to_rfc3339(), "qbank boot");

    match cli.command {
        Command::Ingest { file } => {
            require_admin(cli.password.as_deref())?;

            for path in file {
                let document_id = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("path has no file name: {}", path.display()))?;
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("could not read {}", path.display()))?;

                store
                    .put(&document_id, bytes)
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;
                println!("stored {document_id} (unprocessed)");
            }
        }
        Command::Process { id } => {
            require_admin(cli.password.as_deref())?;
            let ids = if id.is_empty() {
                store.unprocessed_ids()
            } else {
                id
            };
            run_pipeline(&mut store, &ids)?;
        }
        Command::Reprocess { id } => {
            require_admin(cli.password.as_deref())?;
            run_pipeline(&mut store, &[id])?;
        }
        Command::Remove { id } => {
            require_admin(cli.password.as_deref())?;
            match store
                .remove(&id)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?
            {
                Some(document) => {
                    println!("removed {id} ({} questions)", document.questions.len())
                }
                None => println!("no such document: {id}"),
            }
        }
        Command::List => {
            for document in store.all().values() {
                let status = match document.status() {
                    DocumentStatus::Ready => "ready",
                    DocumentStatus::Unprocessed => "unprocessed",
                };
                println!(
                    "{}  subject={}  status={}  questions={}",
                    document.document_id,
                    document.subject,
                    status,
                    document.questions.len()
                );
            }
        }
        Command::ImportTopics { file } => {
            require_admin(cli.password.as_deref())?;
            let input = std::fs::read_to_string(&file)
                .with_context(|| format!("could not read {}", file.display()))?;
            let parsed = parse_topic_lines(&input);
            let imported = topics
                .import(parsed)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            println!("imported {imported} topics");
        }
        Command::Topics => {
            for (topic, keywords) in topics.thesaurus().merged() {
                println!("{topic}: {}", keywords.join(", "));
            }
        }
        Command::Search {
            query,
            include_diagrams,
        } => {
            let request = SearchRequest {
                query,
                include_diagrams,
            };
            let results = search(&store, topics.thesaurus(), &request)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("query: {}", results.query);
            println!("{} questions found", results.total);

            for subject in results.subjects {
                println!("== {} ==", subject.subject);
                for document in subject.documents {
                    println!("-- {} ({} questions)", document.document_id, document.matches.len());
                    for hit in document.matches {
                        let reason = match hit.reason {
                            MatchReason::DirectText => "direct",
                            MatchReason::RelatedContent => "related",
                            MatchReason::DiagramKeyword => "diagram",
                        };
                        let kind = match hit.question.kind {
                            QuestionKind::Standard => "standard",
                            QuestionKind::MultipleChoice => "multiple-choice",
                            QuestionKind::Structured => "structured",
                        };
                        println!(
                            "q{} page={} kind={kind} reason={reason}",
                            hit.question.number, hit.question.page
                        );
                        println!("  {}", highlight(&hit.question.text_clean, &results.query));
                        if hit.question.has_diagram {
                            println!(
                                "  [page carries {} diagram region(s)]",
                                hit.question.diagrams.len()
                            );
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn run_pipeline(store: &mut CorpusStore, ids: &[String]) -> anyhow::Result<()> {
    if ids.is_empty() {
        println!("nothing to process");
        return Ok(());
    }

    let pipeline = QuestionPipeline::new(SegmenterOptions::default())
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;
    let extractor = LopdfExtractor;

    info!(document_count = ids.len(), "processing documents");
    let report = pipeline.process_corpus(store, &extractor, ids);

    for processed in &report.processed {
        println!(
            "processed {}: {} questions",
            processed.document_id, processed.question_count
        );
    }
    for skipped in &report.skipped {
        warn!(document_id = %skipped.document_id, reason = %skipped.reason, "skipped document");
        println!("skipped {}: {}", skipped.document_id, skipped.reason);
    }
    for error in &report.persist_errors {
        warn!(%error, "persist failure, in-memory state retained");
    }

    if !report.persist_errors.is_empty() {
        bail!(
            "{} document(s) processed but the snapshot could not be written; retry to persist",
            report.persist_errors.len()
        );
    }

    Ok(())
}
