//! Async driver for a comparison session
//!
//! Wraps a [`ComparisonSession`] and a [`CompareApi`] so uploads for the two
//! slots can run concurrently, each with its own cancellation token, while
//! every state change goes through the session.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use shared_types::{AnalysisResult, DocumentRole};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{ClientError, CompareApi, FileUpload};
use crate::session::{ComparisonSession, SessionError, SessionSnapshot, SlotStatus};

/// Labels shown while the analysis request is in flight. Cosmetic only:
/// the work is a single request.
pub const ANALYSIS_PROGRESS_LABELS: &[&str] = &[
    "Extracting document structure...",
    "Matching sections...",
    "Identifying risks...",
    "Generating summary...",
];

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Pause before the analyze request while progress labels are shown
    pub progress_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            progress_delay: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("analysis request failed: {0}")]
    Client(#[from] ClientError),
}

/// Recorded as the analysis error when `compare` is dropped mid-flight
pub const ANALYSIS_ABANDONED: &str = "Analysis was interrupted before it completed";

fn lock_session(session: &Mutex<ComparisonSession>) -> MutexGuard<'_, ComparisonSession> {
    // State transitions never panic mid-update, so a poisoned lock still
    // holds a consistent session
    session.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks the analysis failed if `compare` is dropped before it settles,
/// so the session does not stay stuck in `analyzing`
struct PendingAnalysis<'a> {
    session: &'a Mutex<ComparisonSession>,
    generation: u64,
    settled: bool,
}

impl PendingAnalysis<'_> {
    fn settle(mut self, outcome: Result<AnalysisResult, String>) {
        self.settled = true;
        lock_session(self.session).settle_analysis(self.generation, outcome);
    }
}

impl Drop for PendingAnalysis<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if lock_session(self.session).settle_analysis(self.generation, Err(ANALYSIS_ABANDONED.to_string())) {
            warn!("Analysis dropped before completion");
        }
    }
}

/// Drives uploads and the analysis against one session
pub struct Orchestrator<A: CompareApi> {
    api: Arc<A>,
    session: Mutex<ComparisonSession>,
    config: OrchestratorConfig,
}

impl<A: CompareApi> Orchestrator<A> {
    pub fn new(api: Arc<A>, session: ComparisonSession, config: OrchestratorConfig) -> Self {
        Self {
            api,
            session: Mutex::new(session),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ComparisonSession> {
        lock_session(&self.session)
    }

    /// Run `f` against the current session state
    pub fn with_session<R>(&self, f: impl FnOnce(&ComparisonSession) -> R) -> R {
        f(&self.lock())
    }

    pub fn status(&self, role: DocumentRole) -> SlotStatus {
        self.lock().status(role)
    }

    pub fn can_compare(&self) -> bool {
        self.lock().can_compare()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Upload `file` into the slot for `role` and return the status this
    /// request settled the slot in.
    ///
    /// If [`cancel`](Self::cancel), [`reset`](Self::reset) or a newer upload
    /// for the same slot fires while the request is in flight, the request
    /// is dropped, whatever it would have returned is discarded, and
    /// [`SlotStatus::Cancelled`] is returned.
    pub async fn upload(&self, role: DocumentRole, file: FileUpload) -> SlotStatus {
        let ticket = self.lock().begin_upload(role, file.file_name.clone());
        let token = ticket.token().clone();

        info!(role = %role, file_name = %file.file_name, "Upload started");

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.api.upload(role, file) => Some(result),
        };

        let Some(result) = outcome else {
            info!(role = %role, "Upload cancelled");
            return SlotStatus::Cancelled;
        };

        let result = result.map_err(|e| {
            warn!(role = %role, "Upload failed: {}", e);
            e.to_string()
        });
        let mut session = self.lock();
        if session.complete_upload(&ticket, result) {
            session.status(role)
        } else {
            SlotStatus::Cancelled
        }
    }

    /// Cancel the in-flight upload for `role`
    pub fn cancel(&self, role: DocumentRole) -> bool {
        self.lock().cancel_upload(role)
    }

    /// Cancel anything in flight for `role` and clear the slot
    pub fn reset(&self, role: DocumentRole) {
        self.lock().reset_slot(role);
    }

    /// Compare the two uploaded documents.
    ///
    /// `progress` receives each label in [`ANALYSIS_PROGRESS_LABELS`] while
    /// the configured delay elapses; then the analyze request is sent.
    ///
    /// Dropping the returned future before it resolves leaves the session
    /// in the analysis `error` state with [`ANALYSIS_ABANDONED`].
    pub async fn compare(&self, mut progress: impl FnMut(&str)) -> Result<AnalysisResult, CompareError> {
        let (request, generation) = {
            let mut session = self.lock();
            let request = session.begin_analysis()?;
            (request, session.analysis_generation())
        };
        let pending = PendingAnalysis {
            session: &self.session,
            generation,
            settled: false,
        };

        let step = self.config.progress_delay / ANALYSIS_PROGRESS_LABELS.len() as u32;
        for label in ANALYSIS_PROGRESS_LABELS {
            progress(label);
            if !step.is_zero() {
                tokio::time::sleep(step).await;
            }
        }

        match self.api.analyze(&request).await {
            Ok(result) => {
                if result.is_degraded() {
                    warn!("Comparison completed with fallback data");
                }
                pending.settle(Ok(result.clone()));
                Ok(result)
            }
            Err(e) => {
                pending.settle(Err(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Clear both documents and the result
    pub fn new_comparison(&self) {
        self.lock().new_comparison();
    }
}
