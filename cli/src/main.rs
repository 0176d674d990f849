mod client;

use std::io::{Read, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::client::{AdminClient, ApiError, ContactForm};

/// Operator console for a folio backend.
#[derive(Debug, Parser)]
#[command(name = "folio-admin", version, about)]
struct Cli {
    /// Base URL of the folio API.
    #[arg(long, env = "FOLIO_API_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List collection names.
    Collections,
    /// List the documents of a collection.
    List { collection: String },
    /// Create a document, then show the refreshed collection.
    Create {
        collection: String,
        /// Inline JSON, `@path` to read a file, or `-` for stdin.
        body: String,
    },
    /// Delete a document, then show the refreshed collection.
    Delete { collection: String, id: String },
    /// Show received contact messages, newest first.
    Inbox {
        #[arg(long, default_value_t = 0)]
        skip: u64,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Submit a contact message.
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli, &mut std::io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, out: &mut (dyn Write + Send)) -> anyhow::Result<()> {
    let client = AdminClient::new(&cli.base_url)?;

    match cli.command {
        Command::Collections => {
            // A failed listing is reported and shown as empty, like the admin panel does.
            let names = client.list_collections().await.unwrap_or_else(|e| {
                eprintln!("error: failed to list collections: {e}");
                Vec::new()
            });
            if names.is_empty() {
                writeln!(out, "(no collections)")?;
            }
            for name in names {
                writeln!(out, "{name}")?;
            }
        }
        Command::List { collection } => {
            show_documents(&client, &collection, out).await?;
        }
        Command::Create { collection, body } => {
            let body = read_body(&body)?;
            let created = client.create_document(&collection, body).await?;
            writeln!(
                out,
                "created {}",
                created.get("id").and_then(Value::as_str).unwrap_or("?")
            )?;
            show_documents(&client, &collection, out).await?;
        }
        Command::Delete { collection, id } => {
            client.delete_document(&collection, &id).await?;
            writeln!(out, "deleted {id}")?;
            show_documents(&client, &collection, out).await?;
        }
        Command::Inbox { skip, limit } => {
            let page = client.inbox(skip, limit).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&page)?)?;
        }
        Command::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let form = ContactForm {
                name,
                email,
                subject,
                message,
            };
            match client.submit_contact(&form).await {
                Ok(receipt) => {
                    writeln!(
                        out,
                        "{}",
                        receipt["message"].as_str().unwrap_or("Message sent")
                    )?;
                    if let Some(id) = receipt["data"]["id"].as_str() {
                        writeln!(out, "id: {id}")?;
                    }
                }
                Err(e) if e.is_input_problem() => {
                    anyhow::bail!("please fix the form and resubmit: {e}")
                }
                Err(e @ (ApiError::Server { .. } | ApiError::Transport(_))) => {
                    anyhow::bail!("server or network problem, try again later: {e}")
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

/// Fetch and print a collection. Issued after every mutation response.
async fn show_documents(
    client: &AdminClient,
    collection: &str,
    out: &mut (dyn Write + Send),
) -> anyhow::Result<()> {
    let documents = client.list_documents(collection).await?;
    writeln!(out, "{collection}: {} document(s)", documents.len())?;
    for document in &documents {
        writeln!(out, "{}", serde_json::to_string_pretty(document)?)?;
    }
    Ok(())
}

/// Resolve the `create` body argument: inline text, `@path`, or `-` for stdin.
fn read_body(arg: &str) -> anyhow::Result<String> {
    if arg == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read body from stdin")?;
        return Ok(body);
    }

    if let Some(path) = arg.strip_prefix('@') {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read body from '{path}'"));
    }

    Ok(arg.to_string())
}
