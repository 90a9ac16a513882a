use crate::browser::PageSession;
use crate::config::NotifyGating;
use crate::engine::new_leads;
use crate::lead::extractor::Extractor;
use crate::lead::types::{Lead, PersistedRow, TIMESTAMP_FORMAT};
use crate::notify::{DispatchReport, Notifier};
use crate::store::LeadStore;
use anyhow::Result;
use std::sync::Arc;

/// What happened on the store side of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Nothing to write (no cards, or no unseen names).
    NothingNew,
    /// Identity read failed; nothing was written or notified.
    ReadFailed,
    Appended(usize),
    /// Batch dropped. There is no retry queue.
    AppendFailed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub extracted: usize,
    /// Names of leads that were new this cycle, in snapshot order.
    pub new_names: Vec<String>,
    pub store: StoreOutcome,
    /// `None` when no dispatch happened.
    pub notifications: Option<DispatchReport>,
}

impl CycleReport {
    fn empty(extracted: usize, store: StoreOutcome) -> Self {
        Self {
            extracted,
            new_names: Vec::new(),
            store,
            notifications: None,
        }
    }
}

/// Extract → read identities → dedup → append + notify, strictly in
/// sequence except for the notification fan-out.
pub struct Pipeline {
    extractor: Extractor,
    store: Arc<dyn LeadStore>,
    notifier: Notifier,
    gating: NotifyGating,
}

impl Pipeline {
    pub fn new(
        extractor: Extractor,
        store: Arc<dyn LeadStore>,
        notifier: Notifier,
        gating: NotifyGating,
    ) -> Self {
        Self {
            extractor,
            store,
            notifier,
            gating,
        }
    }

    /// One full cycle against the current page. `Err` only when extraction
    /// itself fails; store and webhook failures are logged and reported.
    pub async fn run_cycle(&self, page: &dyn PageSession) -> Result<CycleReport> {
        let fresh = self.extractor.extract(page).await?;
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        Ok(self.process(fresh, &timestamp).await)
    }

    /// Everything after extraction, with the row timestamp supplied.
    pub async fn process(&self, fresh: Vec<Lead>, timestamp: &str) -> CycleReport {
        let extracted = fresh.len();
        if fresh.is_empty() {
            tracing::info!("no cards on page");
            return CycleReport::empty(0, StoreOutcome::NothingNew);
        }

        let known = match self.store.read_identities().await {
            Ok(known) => known,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "store read failed, skipping cycle");
                return CycleReport::empty(extracted, StoreOutcome::ReadFailed);
            }
        };

        let fresh_leads = new_leads(fresh, &known);
        tracing::debug!(extracted, known = known.len(), new = fresh_leads.len(), "deduplicated");
        if fresh_leads.is_empty() {
            return CycleReport::empty(extracted, StoreOutcome::NothingNew);
        }

        for lead in &fresh_leads {
            tracing::info!(name = %lead.name, kind = %lead.kind, "new lead");
        }
        let new_names: Vec<String> = fresh_leads.iter().map(|l| l.name.clone()).collect();
        let rows: Vec<PersistedRow> = fresh_leads
            .iter()
            .map(|l| PersistedRow::from_lead(l, timestamp))
            .collect();

        let (store, notifications) = match self.gating {
            NotifyGating::Independent => {
                let report = self.notifier.dispatch(&fresh_leads).await;
                (self.append(rows).await, Some(report))
            }
            NotifyGating::AfterPersist => {
                let store = self.append(rows).await;
                let report = match store {
                    StoreOutcome::Appended(_) => Some(self.notifier.dispatch(&fresh_leads).await),
                    _ => {
                        tracing::warn!(count = fresh_leads.len(), "append failed, notifications withheld");
                        None
                    }
                };
                (store, report)
            }
        };

        CycleReport {
            extracted,
            new_names,
            store,
            notifications,
        }
    }

    async fn append(&self, rows: Vec<PersistedRow>) -> StoreOutcome {
        let count = rows.len();
        match self.store.append_rows(rows).await {
            Ok(()) => {
                tracing::info!(count, "new leads saved");
                StoreOutcome::Appended(count)
            }
            Err(e) => {
                tracing::error!(count, error = %format!("{:#}", e), "store append failed, batch dropped");
                StoreOutcome::AppendFailed(count)
            }
        }
    }
}
