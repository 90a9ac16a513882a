// Shared fakes for the integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use lead_watch::browser::PageSession;
use lead_watch::config::{NotifyConfig, NotifyGating, PortalConfig, WebhookConfig};
use lead_watch::lead::auction_cards::AuctionCards;
use lead_watch::lead::extractor::Extractor;
use lead_watch::lead::types::PersistedRow;
use lead_watch::notify::message::OutboundMessage;
use lead_watch::notify::{DispatchMode, MessageSink, Notifier};
use lead_watch::pipeline::Pipeline;
use lead_watch::scheduler::ShutdownSender;
use lead_watch::store::LeadStore;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Scripted page. Each `evaluate` pops the next snapshot; once the script
/// runs dry it returns an empty listing and fires the stop signal, if any.
#[derive(Default)]
pub struct FakePage {
    snapshots: Mutex<VecDeque<Result<Value, String>>>,
    calls: Mutex<Vec<String>>,
    stop_when_drained: Mutex<Option<ShutdownSender>>,
    fail_wait_for: Option<String>,
}

impl FakePage {
    pub fn new(snapshots: Vec<Result<Value, String>>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots.into()),
            ..Default::default()
        }
    }

    pub fn stop_when_drained(self, tx: ShutdownSender) -> Self {
        *self.stop_when_drained.lock().unwrap() = Some(tx);
        self
    }

    pub fn fail_wait_for(mut self, selector: &str) -> Self {
        self.fail_wait_for = Some(selector.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate:{}", url));
        Ok(())
    }

    async fn wait_visible(&self, selector: &str, _timeout: Duration) -> Result<()> {
        self.record(format!("wait:{}", selector));
        if self.fail_wait_for.as_deref() == Some(selector) {
            bail!("timed out waiting for {}", selector);
        }
        Ok(())
    }

    async fn send_keys(&self, selector: &str, text: &str) -> Result<()> {
        self.record(format!("keys:{}:{}", selector, text));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(format!("click:{}", selector));
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value> {
        self.record("evaluate".to_string());
        let next = self.snapshots.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(msg)) => Err(anyhow!(msg)),
            None => {
                if let Some(tx) = self.stop_when_drained.lock().unwrap().take() {
                    let _ = tx.send(true);
                }
                Ok(json!([]))
            }
        }
    }

    async fn reload(&self) -> Result<()> {
        self.record("reload".to_string());
        Ok(())
    }
}

/// In-memory sheet. Successful appends become visible to the next read.
#[derive(Default)]
pub struct FakeStore {
    pub rows: Mutex<Vec<Vec<Value>>>,
    pub appends: Mutex<Vec<Vec<PersistedRow>>>,
    pub reads: AtomicUsize,
    pub fail_read: AtomicBool,
    pub fail_append: AtomicBool,
}

impl FakeStore {
    pub fn with_names(names: &[&str]) -> Self {
        let rows = names
            .iter()
            .map(|n| vec![json!("01/01/2024 09:00"), json!(n), json!("Lead")])
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn appends(&self) -> Vec<Vec<PersistedRow>> {
        self.appends.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadStore for FakeStore {
    async fn read_rows(&self) -> Result<Vec<Vec<Value>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_read.load(Ordering::SeqCst) {
            bail!("503 Service Unavailable");
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn append_rows(&self, rows: Vec<PersistedRow>) -> Result<()> {
        if self.fail_append.load(Ordering::SeqCst) {
            bail!("429 Too Many Requests");
        }
        {
            let mut stored = self.rows.lock().unwrap();
            for row in rows.iter().cloned() {
                stored.push(row.into_cells().into_iter().map(Value::String).collect());
            }
        }
        self.appends.lock().unwrap().push(rows);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn card(name: &str, revenue: &str) -> Value {
    json!({
        "name": name,
        "type": "Leilão",
        "revenue_bracket": revenue,
        "segment": "Varejo",
        "product": "Crédito",
        "channel": "Online",
        "price": "R$ 150,00",
        "remaining_time": "02:15:00",
    })
}

pub fn webhook_config() -> WebhookConfig {
    WebhookConfig {
        url: "http://localhost/unused".to_string(),
        recipient: "group:42".to_string(),
        instance_id: "inst-7".to_string(),
        timeout_ms: 500,
    }
}

pub fn portal_config() -> PortalConfig {
    PortalConfig {
        target_url: "https://portal.test/leads".to_string(),
        login_email: "ops@example.com".to_string(),
        email_selector: "#email".to_string(),
        password_selector: "#password".to_string(),
        submit_selector: "button[type='submit']".to_string(),
        listing_selector: "#cards".to_string(),
        wait_timeout_s: 1,
    }
}

/// Pipeline over the fakes. Notifications are awaited so tests can count them.
pub fn pipeline(store: Arc<FakeStore>, sink: Arc<RecordingSink>, gating: NotifyGating) -> Pipeline {
    let notifier = Notifier::new(sink, &webhook_config(), &NotifyConfig::default(), DispatchMode::Wait);
    Pipeline::new(Extractor::new(Box::new(AuctionCards::new())), store, notifier, gating)
}

/// One HTTP request as received by `MockHttp`.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    /// Path plus query, as sent on the request line.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Local HTTP/1.1 server answering with canned `(status, body)` responses,
/// one connection per response, in order.
pub struct MockHttp {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockHttp {
    pub async fn start(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = requests.clone();
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                if let Some(request) = read_request(&mut socket).await {
                    captured.lock().unwrap().push(request);
                }
                let reply = format!(
                    "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(CapturedRequest {
        method,
        target,
        headers,
        body,
    })
}
