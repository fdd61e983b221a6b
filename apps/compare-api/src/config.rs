//! Command-line and environment configuration

use clap::Parser;

use crate::upstream::chat::{DEFAULT_CHAT_URL, DEFAULT_MODEL};
use crate::upstream::document_parse::DEFAULT_DOCUMENT_PARSE_URL;

/// Command-line arguments for the comparison server
#[derive(Parser, Debug, Clone)]
#[command(name = "compare-api")]
#[command(about = "NDA comparison API backed by document-parse and chat-completion services")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3001")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// API key for the document-parse and chat services.
    /// Requests that need it fail with a configuration error when unset.
    #[arg(long, env = "UPSTAGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat model used for the comparison
    #[arg(long, env = "UPSTAGE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Document-digitization endpoint
    #[arg(long, env = "UPSTAGE_DOCUMENT_PARSE_URL", default_value = DEFAULT_DOCUMENT_PARSE_URL)]
    pub document_parse_url: String,

    /// Chat-completion endpoint
    #[arg(long, env = "UPSTAGE_CHAT_URL", default_value = DEFAULT_CHAT_URL)]
    pub chat_url: String,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "50")]
    pub max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// API key with blank values treated as absent
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }
}
