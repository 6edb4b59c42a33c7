use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::SessionClient;
use shared::domain::DocumentId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(about = "Client for the EcoIntel document-intelligence service")]
struct Args {
    /// Base URL of the remote service; falls back to ECOINTEL_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List uploaded documents and their processing status.
    List,
    /// Show session statistics.
    Stats,
    /// Upload a document (.pdf, .txt, .md, .markdown).
    Upload { path: PathBuf },
    /// Delete a document by id.
    Delete { document_id: String },
    /// Ask a single question against the ready documents.
    Query { question: String },
    /// Show recent query history recorded by the service.
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Interactive multi-turn chat session.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let server_url = args
        .server_url
        .or_else(|| std::env::var("ECOINTEL_SERVER_URL").ok())
        .ok_or_else(|| anyhow!("pass --server-url or set ECOINTEL_SERVER_URL"))?;
    let client = SessionClient::new(server_url);

    match args.command {
        Command::List => {
            client.refresh_documents().await?;
            let documents = client.documents().await;
            if documents.is_empty() {
                println!("no documents uploaded yet");
            }
            for record in documents {
                println!(
                    "{:<12} {:<32} {:>10} B  {:>4} chunks  {:>7} tokens  {}",
                    record.status.as_str(),
                    record.filename,
                    record.file_size,
                    record.chunk_count,
                    record.total_tokens,
                    record.id
                );
            }
        }
        Command::Stats => {
            client.refresh_documents().await?;
            let stats = client.stats().await;
            println!("documents:       {}", stats.total_documents);
            println!("ready documents: {}", stats.ready_documents);
            match stats.total_queries {
                Some(count) => println!("total queries:   {count}"),
                None => println!("total queries:   unknown"),
            }
        }
        Command::Upload { path } => {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("path {path:?} has no usable file name"))?
                .to_string();
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {path:?}"))?;
            let record = client.upload_document(&filename, bytes).await?;
            println!(
                "uploaded {} ({}): status={} chunks={} tokens={}",
                record.filename,
                record.id,
                record.status.as_str(),
                record.chunk_count,
                record.total_tokens
            );
        }
        Command::Delete { document_id } => {
            client.refresh_documents().await?;
            let document_id = DocumentId(document_id);
            client.delete_document(&document_id).await?;
            println!("deleted {document_id}");
        }
        Command::Query { question } => {
            client.refresh_documents().await?;
            let turn = client.submit_question(&question).await?;
            print_answer(&turn);
        }
        Command::History { limit } => {
            let entries = client.fetch_query_history(limit).await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Chat => {
            if let Err(err) = client.refresh_documents().await {
                warn!("initial document fetch failed: {err}");
            }
            let stats = client.stats().await;
            println!(
                "{} ready documents. Ask a question; empty line exits.",
                stats.ready_documents
            );
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                print!("> ");
                std::io::stdout().flush()?;
                let Some(line) = lines.next_line().await? else {
                    break;
                };
                let question = line.trim().to_string();
                if question.is_empty() {
                    break;
                }
                match client.submit_question(&question).await {
                    Ok(turn) => print_answer(&turn),
                    Err(err) => println!("error: {err}"),
                }
            }
        }
    }

    Ok(())
}

fn print_answer(turn: &client_core::ConversationTurn) {
    println!("{}", turn.content);
    for source in &turn.sources {
        println!("  source: {} (chunk {})", source.filename, source.chunk_index);
    }
}
