pub mod message;
pub mod webhook;

use crate::config::{NotifyConfig, WebhookConfig};
use crate::engine::Priority;
use crate::lead::types::Lead;
use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use message::{format_lead_message, OutboundMessage};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// How `Notifier::dispatch` treats the per-lead delivery tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Spawn and return immediately; outcomes only reach the log.
    FireAndForget,
    /// Spawn, then wait for every task and count outcomes.
    Wait,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub dispatched: usize,
    /// Only known in `DispatchMode::Wait`.
    pub delivered: Option<usize>,
    pub failed: Option<usize>,
}

pub struct Notifier {
    sink: Arc<dyn MessageSink>,
    recipient: String,
    instance_id: String,
    high_revenue_keywords: Vec<String>,
    timeout: Duration,
    mode: DispatchMode,
}

impl Notifier {
    pub fn new(
        sink: Arc<dyn MessageSink>,
        webhook: &WebhookConfig,
        notify: &NotifyConfig,
        mode: DispatchMode,
    ) -> Self {
        Self {
            sink,
            recipient: webhook.recipient.clone(),
            instance_id: webhook.instance_id.clone(),
            high_revenue_keywords: notify.high_revenue_keywords.clone(),
            timeout: webhook.timeout(),
            mode,
        }
    }

    pub fn message_for(&self, lead: &Lead) -> OutboundMessage {
        let priority = Priority::from_revenue(&lead.revenue_bracket, &self.high_revenue_keywords);
        OutboundMessage {
            recipient: self.recipient.clone(),
            text: format_lead_message(lead, priority),
            instance_id: self.instance_id.clone(),
        }
    }

    /// One independent, time-bounded delivery task per lead. No ordering
    /// between tasks, no retries, and in-flight tasks are not cancelled
    /// on shutdown.
    pub async fn dispatch(&self, leads: &[Lead]) -> DispatchReport {
        let handles: Vec<_> = leads
            .iter()
            .map(|lead| {
                let sink = self.sink.clone();
                let message = self.message_for(lead);
                let name = lead.name.clone();
                let timeout = self.timeout;
                tokio::spawn(async move { deliver(sink, message, name, timeout).await })
            })
            .collect();

        let dispatched = handles.len();
        match self.mode {
            DispatchMode::FireAndForget => DispatchReport {
                dispatched,
                delivered: None,
                failed: None,
            },
            DispatchMode::Wait => {
                let delivered = join_all(handles)
                    .await
                    .into_iter()
                    .filter(|r| matches!(r, Ok(true)))
                    .count();
                DispatchReport {
                    dispatched,
                    delivered: Some(delivered),
                    failed: Some(dispatched - delivered),
                }
            }
        }
    }
}

async fn deliver(
    sink: Arc<dyn MessageSink>,
    message: OutboundMessage,
    name: String,
    timeout: Duration,
) -> bool {
    match tokio::time::timeout(timeout, sink.send(&message)).await {
        Ok(Ok(())) => {
            tracing::info!(name = %name, "notification delivered");
            true
        }
        Ok(Err(e)) => {
            tracing::error!(name = %name, error = %format!("{:#}", e), "notification failed");
            false
        }
        Err(_) => {
            tracing::error!(name = %name, timeout_ms = timeout.as_millis() as u64, "notification timed out");
            false
        }
    }
}
