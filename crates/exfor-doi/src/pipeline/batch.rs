//! Batch driver over every record lacking a DOI.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{MatchContext, match_record};
use crate::diagnostics::{DiagnosticEvent, FailureKind};
use crate::error::{StoreResult, error_chain};
use crate::models::{AcceptedMatch, CandidateMatch, SourceRecord};
use crate::store::ArtifactStore;

/// Cooperative stop request, checked between records.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Register an interrupt: the first one requests a stop, any later one
    /// asks for an immediate exit.
    #[must_use]
    pub fn interrupt(&self) -> InterruptAction {
        if self.0.swap(true, Ordering::SeqCst) {
            InterruptAction::ForceQuit
        } else {
            InterruptAction::Stop
        }
    }

    /// Handle Ctrl-C for the rest of the process. Must be called inside a
    /// Tokio runtime.
    ///
    /// The first Ctrl-C stops the batch after the current entry, a second one
    /// exits with status 130 without waiting for the in-flight request. The
    /// handler is installed before this returns.
    pub async fn listen_for_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let signal = self.clone();
        let handle = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                match signal.interrupt() {
                    InterruptAction::Stop => {
                        tracing::warn!("Interrupt received, stopping after the current entry");
                    }
                    InterruptAction::ForceQuit => {
                        tracing::error!("Second interrupt, exiting without saving");
                        std::process::exit(130);
                    }
                }
            }
        });
        // let the task poll once so the handler is registered
        tokio::task::yield_now().await;
        handle
    }
}

/// What an interrupt should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Finish the current entry, then persist and return.
    Stop,
    /// Leave immediately.
    ForceQuit,
}

/// Summary of one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Records given to the driver.
    pub total: usize,
    /// Records that were queried.
    pub processed: usize,
    /// Records without title or first author.
    pub skipped: usize,
    /// Queried records that produced no candidate (including failed requests).
    pub unmatched: usize,
    /// Records that failed unexpectedly.
    pub failed: usize,
    /// Most-probable candidate per matched record, in processing order.
    pub candidates: Vec<CandidateMatch>,
    /// Accepted subset, sorted by entry id.
    pub accepted: Vec<AcceptedMatch>,
    /// True when the run stopped before the last record.
    pub interrupted: bool,
}

/// Runs the matching pipeline over a table and persists the results.
pub struct BatchDriver<'a> {
    ctx: &'a MatchContext,
    store: &'a ArtifactStore,
    stop: StopSignal,
}

impl<'a> BatchDriver<'a> {
    #[must_use]
    pub fn new(ctx: &'a MatchContext, store: &'a ArtifactStore, stop: StopSignal) -> Self {
        Self { ctx, store, stop }
    }

    /// Process `records` in order, then write the candidate and accepted tables.
    ///
    /// Per-record failures never abort the run. Only failing to write the
    /// final artifacts is an error.
    pub async fn run(&self, records: &[SourceRecord]) -> StoreResult<BatchReport> {
        let audit = self.store.audit_log();
        let mut report = BatchReport { total: records.len(), ..Default::default() };

        for (index, record) in records.iter().enumerate() {
            if self.stop.is_triggered() {
                report.interrupted = true;
                tracing::warn!(index, total = report.total, "Batch interrupted");
                break;
            }

            tracing::info!(index, total = report.total, entry = %record.entry_id, "Processing entry");

            match match_record(self.ctx, record).await {
                Ok(result) => {
                    report.processed += 1;
                    if let Err(e) = audit.append(&result.candidates) {
                        tracing::warn!(
                            entry = %record.entry_id,
                            error = %error_chain(&e),
                            "Could not append audit history"
                        );
                    }
                    match result.most_probable {
                        Some(best) => report.candidates.push(best),
                        None => report.unmatched += 1,
                    }
                }
                Err(e) if e.is_expected() => {
                    report.skipped += 1;
                    tracing::debug!(entry = %record.entry_id, reason = %e, "Skipping entry");
                }
                Err(e) => {
                    report.failed += 1;
                    self.ctx.diagnostics.record(DiagnosticEvent::new(
                        e.entry_id(),
                        FailureKind::Unexpected,
                        error_chain(&e),
                    ));
                }
            }
        }

        self.store.write_candidates(&report.candidates)?;

        report.accepted = self.ctx.acceptance().apply(&report.candidates);
        self.store.write_accepted(&report.accepted)?;

        tracing::info!(
            processed = report.processed,
            skipped = report.skipped,
            unmatched = report.unmatched,
            failed = report.failed,
            most_probable = report.candidates.len(),
            accepted = report.accepted.len(),
            interrupted = report.interrupted,
            "Batch finished"
        );

        Ok(report)
    }
}
