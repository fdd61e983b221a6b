//! Client side of an NDA comparison
//!
//! Holds the two upload slots, drives uploads and the analysis against the
//! comparison API, and turns the result into display views.

pub mod cancel;
pub mod client;
pub mod orchestrator;
pub mod render;
pub mod session;

pub use cancel::CancellationToken;
pub use client::{ClientError, CompareApi, FileUpload, HttpCompareClient};
pub use orchestrator::{
    CompareError, Orchestrator, OrchestratorConfig, ANALYSIS_ABANDONED, ANALYSIS_PROGRESS_LABELS,
};
pub use render::{build_report, render_report, ReportView};
pub use session::{
    AnalysisStatus, ComparisonSession, SessionError, SessionSnapshot, SlotStatus, UploadSlot,
    UploadTicket,
};
