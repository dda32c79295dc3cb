use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scds",
    about = "Slowly-changing document store: versioned JSON documents with history",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to scds.toml (default: ./scds.toml if present)
    #[arg(short, long, global = true, env = "SCDS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a document under a key
    Put(DocumentArgs),
    /// Show an object, optionally as of a version or time
    Get(GetArgs),
    /// List all keys
    Keys,
    /// Show the revision history of a key
    Log(KeyArgs),
    /// Check a document against the configured schemas without storing it
    Validate(DocumentArgs),
    /// Check the stored history of a key for consistency
    Verify(KeyArgs),
    /// Serve the HTTP API
    Http(HttpArgs),
    /// Print the effective configuration
    Config,
    /// Subscribe email addresses to change notifications
    Subscribe(EmailArgs),
    /// Remove email addresses from change notifications
    Unsubscribe(EmailArgs),
    /// List subscribers
    Subscribers,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
}

#[derive(Args)]
pub struct DocumentArgs {
    pub key: String,
    /// JSON object; read from stdin when omitted
    pub json: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
    /// Specific version to get
    #[arg(long, conflicts_with = "time")]
    pub version: Option<u64>,
    /// Object as of a time: duration ago (`90m`), date, or UNIX seconds
    #[arg(long)]
    pub time: Option<String>,
}

#[derive(Args)]
pub struct HttpArgs {
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args)]
pub struct EmailArgs {
    #[arg(required = true)]
    pub emails: Vec<String>,
}
