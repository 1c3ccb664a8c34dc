//! Background expiration of stale pending documents
//!
//! A sweep runs immediately when the scheduler starts and then once per
//! interval. Each stale document is expired in its own transaction; a failure
//! on one document is logged and counted but never stops the sweep.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::config::ExpirationConfig;
use crate::error::{AppError, Result};
use crate::models::{Document, DocumentStatus, HistoryAction, NewHistoryEntry, SYSTEM_ACTOR_ID};
use crate::store::Store;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Stale pending documents found
    pub examined: usize,
    /// Documents moved to expired
    pub expired: usize,
    /// Documents resolved by someone else before the sweep reached them
    pub skipped: usize,
    /// Documents whose transition failed
    pub failed: usize,
}

#[derive(Clone)]
pub struct ExpirationScheduler {
    store: Store,
    config: ExpirationConfig,
}

impl ExpirationScheduler {
    pub fn new(store: Store, config: ExpirationConfig) -> Self {
        Self { store, config }
    }

    /// Expire every document that has been pending for at least the configured age
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let cutoff = self.config.cutoff(now).ok_or_else(|| {
            AppError::Internal(format!(
                "expiration max age of {} days is out of range",
                self.config.max_age_days
            ))
        })?;
        let stale = self.store.list_stale_pending(cutoff).await?;

        let mut report = SweepReport::default();
        if stale.is_empty() {
            tracing::debug!("No documents to expire");
            return Ok(report);
        }

        tracing::info!(count = stale.len(), "Found documents to expire");
        let actor_id = self.system_actor().await;

        for doc in &stale {
            report.examined += 1;
            match self.expire(doc, actor_id).await {
                Ok(true) => {
                    report.expired += 1;
                    tracing::info!(document_id = %doc.id, title = %doc.title, "Document expired");
                }
                Ok(false) => {
                    report.skipped += 1;
                    tracing::debug!(document_id = %doc.id, "Document resolved before expiry");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(document_id = %doc.id, error = %e, "Failed to expire document");
                }
            }
        }

        Ok(report)
    }

    async fn expire(&self, doc: &Document, actor_id: Uuid) -> Result<bool> {
        let entry = NewHistoryEntry::new(
            doc.id,
            actor_id,
            HistoryAction::Expired,
            format!(
                "Document automatically expired after {} days of pending status",
                self.config.max_age_days
            ),
        );

        self.store
            .transition_from_pending(doc.id, DocumentStatus::Expired, None, &entry)
            .await
    }

    /// The super-admin the sweep acts as, or the system actor when there is none
    async fn system_actor(&self) -> Uuid {
        match self.store.first_super_admin().await {
            Ok(Some(admin)) => admin.id,
            Ok(None) => {
                tracing::warn!("No super-admin found, recording expirations as system actor");
                SYSTEM_ACTOR_ID
            }
            Err(e) => {
                tracing::warn!(error = %e, "Super-admin lookup failed, recording expirations as system actor");
                SYSTEM_ACTOR_ID
            }
        }
    }

    async fn run_sweep(&self) {
        tracing::debug!("Checking for expired documents");
        match self.sweep_once(Utc::now()).await {
            Ok(report) if report.examined > 0 => {
                tracing::info!(
                    examined = report.examined,
                    expired = report.expired,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Expiration sweep finished"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Expiration sweep failed"),
        }
    }

    /// Start the periodic sweep on the runtime.
    ///
    /// The stop signal is only observed between sweeps, so a sweep in
    /// progress always runs to completion.
    pub fn spawn(self) -> ExpirationHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = self.config.interval();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(interval_secs = interval.as_secs(), "Expiration scheduler started");

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => self.run_sweep().await,
                }
            }

            tracing::info!("Expiration scheduler stopped");
        });

        ExpirationHandle { stop_tx, join }
    }
}

/// Handle to a running scheduler
pub struct ExpirationHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ExpirationHandle {
    /// Signal the scheduler to stop and wait for it to exit
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Expiration scheduler task failed");
        }
    }
}
