//! Session-scoped comparison state
//!
//! A [`ComparisonSession`] owns the two upload slots and the analysis state
//! for one comparison page. It is a plain state machine: async callers
//! obtain an [`UploadTicket`] when a request starts and hand it back with
//! the outcome. Outcomes for cancelled or superseded tickets are dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{AnalysisResult, AnalyzeRequest, DocumentRole, UploadedDocument};
use thiserror::Error;

use crate::cancel::CancellationToken;

/// Lifecycle of one upload slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Idle,
    Uploading,
    Success,
    Error,
    Cancelled,
}

/// Lifecycle of the analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Idle,
    Analyzing,
    Result,
    Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("both documents must be uploaded before comparing (reference: {reference:?}, customer: {customer:?})")]
    DocumentsNotReady {
        reference: SlotStatus,
        customer: SlotStatus,
    },

    #[error("an analysis is already in progress")]
    AnalysisInFlight,
}

/// Handle for one in-flight upload
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub role: DocumentRole,
    generation: u64,
    token: CancellationToken,
}

impl UploadTicket {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// One of the two document slots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlot {
    pub role: DocumentRole,
    pub status: SlotStatus,
    pub file_name: Option<String>,
    pub document: Option<UploadedDocument>,
    pub error: Option<String>,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    token: Option<CancellationToken>,
}

impl UploadSlot {
    fn new(role: DocumentRole) -> Self {
        Self {
            role,
            status: SlotStatus::Idle,
            file_name: None,
            document: None,
            error: None,
            generation: 0,
            token: None,
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    fn clear(&mut self) {
        self.cancel_in_flight();
        self.generation += 1;
        self.status = SlotStatus::Idle;
        self.file_name = None;
        self.document = None;
        self.error = None;
    }

    pub fn is_ready(&self) -> bool {
        self.status == SlotStatus::Success && self.document.is_some()
    }
}

/// Serializable copy of a session, for handing state between pages.
///
/// In-flight uploads and analyses are not carried over.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub created_at: DateTime<Utc>,
    pub reference: UploadSlot,
    pub customer: UploadSlot,
    pub analysis: Option<AnalysisResult>,
}

/// State for one comparison: two upload slots and one analysis
#[derive(Debug)]
pub struct ComparisonSession {
    created_at: DateTime<Utc>,
    reference: UploadSlot,
    customer: UploadSlot,
    analysis_status: AnalysisStatus,
    analysis: Option<AnalysisResult>,
    analysis_error: Option<String>,
    analysis_generation: u64,
}

impl Default for ComparisonSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonSession {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            reference: UploadSlot::new(DocumentRole::ReferenceNda),
            customer: UploadSlot::new(DocumentRole::CustomerNda),
            analysis_status: AnalysisStatus::Idle,
            analysis: None,
            analysis_error: None,
            analysis_generation: 0,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn slot(&self, role: DocumentRole) -> &UploadSlot {
        match role {
            DocumentRole::ReferenceNda => &self.reference,
            DocumentRole::CustomerNda => &self.customer,
        }
    }

    fn slot_mut(&mut self, role: DocumentRole) -> &mut UploadSlot {
        match role {
            DocumentRole::ReferenceNda => &mut self.reference,
            DocumentRole::CustomerNda => &mut self.customer,
        }
    }

    pub fn status(&self, role: DocumentRole) -> SlotStatus {
        self.slot(role).status
    }

    pub fn document(&self, role: DocumentRole) -> Option<&UploadedDocument> {
        self.slot(role).document.as_ref()
    }

    /// Start an upload for `role`. Any request already in flight for that
    /// slot is cancelled and its outcome will be ignored.
    pub fn begin_upload(&mut self, role: DocumentRole, file_name: impl Into<String>) -> UploadTicket {
        let slot = self.slot_mut(role);
        slot.clear();

        let token = CancellationToken::new();
        slot.status = SlotStatus::Uploading;
        slot.file_name = Some(file_name.into());
        slot.token = Some(token.clone());

        UploadTicket {
            role,
            generation: slot.generation,
            token,
        }
    }

    /// Apply the outcome of an upload.
    ///
    /// Returns `false` and leaves state untouched when the ticket was
    /// cancelled or superseded by a newer upload or reset.
    pub fn complete_upload(
        &mut self,
        ticket: &UploadTicket,
        outcome: Result<UploadedDocument, String>,
    ) -> bool {
        let slot = self.slot_mut(ticket.role);
        if ticket.token.is_cancelled()
            || slot.generation != ticket.generation
            || slot.status != SlotStatus::Uploading
        {
            tracing::debug!(role = %ticket.role, "Discarding stale upload outcome");
            return false;
        }

        slot.token = None;
        match outcome {
            Ok(document) => {
                slot.status = SlotStatus::Success;
                slot.document = Some(document);
                slot.error = None;
            }
            Err(message) => {
                slot.status = SlotStatus::Error;
                slot.document = None;
                slot.error = Some(message);
            }
        }
        true
    }

    /// Cancel the in-flight upload for `role`, if any.
    ///
    /// Returns `true` when a request was cancelled. The other slot and any
    /// analysis in flight are unaffected.
    pub fn cancel_upload(&mut self, role: DocumentRole) -> bool {
        let slot = self.slot_mut(role);
        if slot.status != SlotStatus::Uploading {
            return false;
        }
        slot.cancel_in_flight();
        slot.status = SlotStatus::Cancelled;
        true
    }

    /// "Change file" / "try again": cancel anything in flight and return
    /// the slot to idle
    pub fn reset_slot(&mut self, role: DocumentRole) {
        self.slot_mut(role).clear();
    }

    pub fn analysis_status(&self) -> AnalysisStatus {
        self.analysis_status
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn analysis_error(&self) -> Option<&str> {
        self.analysis_error.as_deref()
    }

    /// True iff both slots hold a document and no analysis is running
    pub fn can_compare(&self) -> bool {
        self.reference.is_ready()
            && self.customer.is_ready()
            && self.analysis_status != AnalysisStatus::Analyzing
    }

    /// Move to `analyzing` and build the request from both documents
    pub fn begin_analysis(&mut self) -> Result<AnalyzeRequest, SessionError> {
        if self.analysis_status == AnalysisStatus::Analyzing {
            return Err(SessionError::AnalysisInFlight);
        }
        let (Some(reference), Some(customer)) = (
            self.reference.document.as_ref().filter(|_| self.reference.is_ready()),
            self.customer.document.as_ref().filter(|_| self.customer.is_ready()),
        ) else {
            return Err(SessionError::DocumentsNotReady {
                reference: self.reference.status,
                customer: self.customer.status,
            });
        };

        let request = AnalyzeRequest::new(reference.text(), customer.text());
        self.analysis_generation += 1;
        self.analysis_status = AnalysisStatus::Analyzing;
        self.analysis = None;
        self.analysis_error = None;
        Ok(request)
    }

    /// Identifies the most recent [`begin_analysis`](Self::begin_analysis)
    pub fn analysis_generation(&self) -> u64 {
        self.analysis_generation
    }

    /// Store the outcome of the analysis started at `generation`.
    ///
    /// Returns `false` and changes nothing when that analysis is no longer
    /// the one running, e.g. after "New Comparison".
    pub fn settle_analysis(&mut self, generation: u64, outcome: Result<AnalysisResult, String>) -> bool {
        if generation != self.analysis_generation || self.analysis_status != AnalysisStatus::Analyzing {
            return false;
        }
        self.complete_analysis(outcome);
        true
    }

    /// Store the analysis outcome. Ignored unless an analysis is running.
    pub fn complete_analysis(&mut self, outcome: Result<AnalysisResult, String>) {
        if self.analysis_status != AnalysisStatus::Analyzing {
            return;
        }
        match outcome {
            Ok(result) => {
                self.analysis_status = AnalysisStatus::Result;
                self.analysis = Some(result);
            }
            Err(message) => {
                self.analysis_status = AnalysisStatus::Error;
                self.analysis_error = Some(message);
            }
        }
    }

    /// "New Comparison": cancel uploads in flight and clear everything
    pub fn new_comparison(&mut self) {
        self.reference.clear();
        self.customer.clear();
        self.analysis_generation += 1;
        self.analysis_status = AnalysisStatus::Idle;
        self.analysis = None;
        self.analysis_error = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            created_at: self.created_at,
            reference: self.reference.clone(),
            customer: self.customer.clone(),
            analysis: self.analysis.clone(),
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// A slot captured mid-upload comes back idle.
    pub fn restore(snapshot: SessionSnapshot) -> Self {
        let settle = |mut slot: UploadSlot, role: DocumentRole| {
            slot.role = role;
            slot.token = None;
            if slot.status == SlotStatus::Uploading
                || (slot.status == SlotStatus::Success && slot.document.is_none())
            {
                slot = UploadSlot::new(role);
            }
            slot
        };

        let analysis_status = if snapshot.analysis.is_some() {
            AnalysisStatus::Result
        } else {
            AnalysisStatus::Idle
        };

        Self {
            created_at: snapshot.created_at,
            reference: settle(snapshot.reference, DocumentRole::ReferenceNda),
            customer: settle(snapshot.customer, DocumentRole::CustomerNda),
            analysis_status,
            analysis: snapshot.analysis,
            analysis_error: None,
            analysis_generation: 0,
        }
    }
}
