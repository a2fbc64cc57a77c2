use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{error::TransportError, form::record::FormRecord};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Acknowledgement returned by the endpoint. Body is not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgement {
    pub status: u16,
}

/// Request/response channel: the caller blocks until the record is
/// acknowledged, rejected, or the wait times out.
pub trait AckTransport {
    fn deliver(&self, record: &FormRecord) -> Result<Acknowledgement, TransportError>;
}

// ============================================================================
// HTTP webhook (JSON body)
// ============================================================================

pub struct WebhookTransport {
    pub endpoint: String,
    pub timeout_ms: u64,
    client: reqwest::blocking::Client,
}

impl WebhookTransport {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            timeout_ms,
            client,
        })
    }
}

impl AckTransport for WebhookTransport {
    fn deliver(&self, record: &FormRecord) -> Result<Acknowledgement, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, fields = record.len(), "posting record");

        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout_ms)
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(Acknowledgement {
            status: status.as_u16(),
        })
    }
}

// ============================================================================
// Mock transport (for testing without a live endpoint)
// ============================================================================

/// Records every delivered record and replays scripted results.
/// Succeeds with status 200 once the script runs out.
#[derive(Clone, Default)]
pub struct MockAckTransport {
    script: Arc<Mutex<VecDeque<Result<Acknowledgement, TransportError>>>>,
    delivered: Arc<Mutex<Vec<FormRecord>>>,
}

impl MockAckTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next delivery.
    pub fn respond_with(self, result: Result<Acknowledgement, TransportError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
        self
    }

    pub fn delivered(&self) -> Vec<FormRecord> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().map(|d| d.len()).unwrap_or(0)
    }
}

impl AckTransport for MockAckTransport {
    fn deliver(&self, record: &FormRecord) -> Result<Acknowledgement, TransportError> {
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(record.clone());
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or(Ok(Acknowledgement { status: 200 }))
    }
}
