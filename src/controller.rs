use crate::browser::PageSession;
use crate::pipeline::{Pipeline, StoreOutcome};
use crate::scheduler::Scheduler;
use std::time::Duration;

/// Loop states after the session is authenticated.
///
/// ```text
/// Polling ─ok──▶ Idle ─▶ Refresh ─▶ Polling
///    └──err──▶ Reload ─▶ Backoff ─▶ Polling
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Polling,
    Idle,
    Refresh,
    Reload,
    Backoff,
}

#[derive(Debug, Clone, Copy)]
pub struct LoopTimings {
    /// Sleep after a successful cycle.
    pub poll_interval: Duration,
    /// Sleep after an extraction failure and reload.
    pub retry_delay: Duration,
    /// How long a refresh waits for the listing to reappear.
    pub wait_timeout: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub cycles: u64,
    pub extraction_failures: u64,
    pub new_leads: u64,
    pub store_failures: u64,
}

/// Owns the page and drives the poll cadence. Never gives up on its own:
/// every per-cycle failure is logged and retried; only the stop signal ends
/// `run`.
pub struct LoopController<P: PageSession> {
    page: P,
    pipeline: Pipeline,
    listing_selector: String,
    timings: LoopTimings,
    scheduler: Scheduler,
}

impl<P: PageSession> LoopController<P> {
    pub fn new(
        page: P,
        pipeline: Pipeline,
        listing_selector: &str,
        timings: LoopTimings,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            page,
            pipeline,
            listing_selector: listing_selector.to_string(),
            timings,
            scheduler,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    /// Run until cancelled. A cycle already in progress finishes before the
    /// stop signal is honoured; sleeps, reloads and waits are interrupted.
    pub async fn run(&mut self) -> LoopSummary {
        let mut summary = LoopSummary::default();
        let mut state = LoopState::Polling;
        tracing::info!(interval_s = self.timings.poll_interval.as_secs(), "polling started");

        while !self.scheduler.is_cancelled() {
            state = match state {
                LoopState::Polling => self.poll(&mut summary).await,
                LoopState::Idle => {
                    if !self.scheduler.sleep(self.timings.poll_interval).await {
                        break;
                    }
                    LoopState::Refresh
                }
                LoopState::Refresh => {
                    self.refresh().await;
                    LoopState::Polling
                }
                LoopState::Reload => {
                    match self.scheduler.until_cancelled(self.page.reload()).await {
                        Some(Err(e)) => tracing::warn!(error = %format!("{:#}", e), "reload after failure failed"),
                        Some(Ok(())) => {}
                        None => break,
                    }
                    LoopState::Backoff
                }
                LoopState::Backoff => {
                    if !self.scheduler.sleep(self.timings.retry_delay).await {
                        break;
                    }
                    LoopState::Polling
                }
            };
        }

        tracing::info!(
            cycles = summary.cycles,
            failures = summary.extraction_failures,
            new_leads = summary.new_leads,
            "polling stopped"
        );
        summary
    }

    async fn poll(&mut self, summary: &mut LoopSummary) -> LoopState {
        tracing::debug!("checking cards");
        match self.pipeline.run_cycle(&self.page).await {
            Ok(report) => {
                summary.cycles += 1;
                summary.new_leads += report.new_names.len() as u64;
                if matches!(report.store, StoreOutcome::ReadFailed | StoreOutcome::AppendFailed(_)) {
                    summary.store_failures += 1;
                }
                LoopState::Idle
            }
            Err(e) => {
                summary.extraction_failures += 1;
                tracing::warn!(
                    error = %format!("{:#}", e),
                    retry_in_s = self.timings.retry_delay.as_secs(),
                    "extraction failed (page refreshing?), reloading"
                );
                LoopState::Reload
            }
        }
    }

    /// Reload and wait for the listing. Failures fall through to the next
    /// poll, which reloads again if the page is still broken.
    async fn refresh(&mut self) {
        match self.scheduler.until_cancelled(self.page.reload()).await {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                tracing::warn!(error = %format!("{:#}", e), "refresh failed");
                return;
            }
            None => return,
        }
        let wait = self
            .page
            .wait_visible(&self.listing_selector, self.timings.wait_timeout);
        if let Some(Err(e)) = self.scheduler.until_cancelled(wait).await {
            tracing::warn!(error = %format!("{:#}", e), "listing not visible after refresh");
        }
    }
}
