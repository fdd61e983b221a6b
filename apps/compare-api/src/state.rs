//! Application state for the comparison API

use std::sync::Arc;

use crate::config::Args;
use crate::upstream::{ChatCompletion, DocumentParser, UpstageChat, UpstageDocumentParser};

/// Shared handles to the upstream services
pub struct AppState {
    pub parser: Arc<dyn DocumentParser>,
    pub chat: Arc<dyn ChatCompletion>,
    pub model: String,
}

impl AppState {
    pub fn new(
        parser: Arc<dyn DocumentParser>,
        chat: Arc<dyn ChatCompletion>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            parser,
            chat,
            model: model.into(),
        }
    }

    /// Build HTTP-backed upstream clients from configuration
    pub fn from_args(args: &Args) -> Self {
        let client = reqwest::Client::new();
        let api_key = args.api_key();

        if api_key.is_none() {
            tracing::warn!(
                "UPSTAGE_API_KEY is not set; uploads will fail and analyses will use fallback data"
            );
        }

        let parser = UpstageDocumentParser::new(client.clone(), api_key.clone())
            .with_url(&args.document_parse_url);
        let chat = UpstageChat::new(client, api_key).with_url(&args.chat_url);

        Self::new(Arc::new(parser), Arc::new(chat), &args.model)
    }
}
