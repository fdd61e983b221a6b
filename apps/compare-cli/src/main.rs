//! nda-compare
//!
//! Uploads a reference NDA and a customer NDA to the comparison API, runs
//! the analysis and prints the report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use compare_core::{
    build_report, render_report, ComparisonSession, FileUpload, HttpCompareClient, Orchestrator,
    OrchestratorConfig, SlotStatus,
};
use shared_types::DocumentRole;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for nda-compare
#[derive(Parser, Debug)]
#[command(name = "nda-compare")]
#[command(about = "Compare a customer NDA against your reference NDA")]
struct Args {
    /// Your standard NDA (PDF, DOC or DOCX)
    reference: PathBuf,

    /// The counterparty's NDA (PDF, DOC or DOCX)
    customer: PathBuf,

    /// Base URL of the comparison API
    #[arg(long, env = "COMPARE_SERVER", default_value = "http://localhost:3001")]
    server: String,

    /// Pause while analysis progress is shown, in milliseconds
    #[arg(long, default_value = "1500")]
    progress_delay_ms: u64,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the session snapshot to this file after the analysis
    #[arg(long)]
    save_session: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let reference = FileUpload::from_path(&args.reference)
        .await
        .with_context(|| format!("reading {}", args.reference.display()))?;
    let customer = FileUpload::from_path(&args.customer)
        .await
        .with_context(|| format!("reading {}", args.customer.display()))?;

    let orchestrator = Orchestrator::new(
        Arc::new(HttpCompareClient::new(&args.server)),
        ComparisonSession::new(),
        OrchestratorConfig {
            progress_delay: Duration::from_millis(args.progress_delay_ms),
        },
    );

    info!(server = %args.server, "Uploading documents");
    let (reference_status, customer_status) = tokio::join!(
        orchestrator.upload(DocumentRole::ReferenceNda, reference),
        orchestrator.upload(DocumentRole::CustomerNda, customer),
    );

    for (role, status) in [
        (DocumentRole::ReferenceNda, reference_status),
        (DocumentRole::CustomerNda, customer_status),
    ] {
        if status != SlotStatus::Success {
            let reason = orchestrator
                .with_session(|s| s.slot(role).error.clone())
                .unwrap_or_else(|| format!("upload {:?}", status));
            bail!("{}: {}", role.label(), reason);
        }
        let pages = orchestrator
            .with_session(|s| s.document(role).map(|d| d.parsed_content.pages))
            .unwrap_or(0);
        eprintln!("{} uploaded ({} pages)", role.label(), pages);
    }

    let result = orchestrator
        .compare(|label| eprintln!("{}", label))
        .await
        .context("comparison failed")?;

    let report = orchestrator.with_session(|s| {
        build_report(
            &result,
            s.document(DocumentRole::ReferenceNda),
            s.document(DocumentRole::CustomerNda),
        )
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if let Some(path) = &args.save_session {
        let snapshot = serde_json::to_string_pretty(&orchestrator.snapshot())?;
        tokio::fs::write(path, snapshot)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Session saved");
    }

    Ok(())
}
