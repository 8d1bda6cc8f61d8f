use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use telgen_core::record::{RecordDraft, TelemetryRecord};
use telgen_core::{Result, TelgenError};
use telgen_publish::sink::{DeliveryReceipt, EventSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
}

/// In-memory sink standing in for the broker. Records every send and can be
/// told to start failing after a number of accepted messages.
#[derive(Default)]
pub struct MemorySink {
    sent: Mutex<Vec<SentMessage>>,
    fail_after: Mutex<Option<usize>>,
    flushes: AtomicUsize,
    closes: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `accepted` sends, then fail every send after that.
    pub fn fail_after(&self, accepted: usize) {
        *self.fail_after.lock().unwrap() = Some(accepted);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn send(&self, topic: &str, key: &str, payload: &[u8]) -> Result<DeliveryReceipt> {
        let mut sent = self.sent.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if sent.len() >= limit {
                return Err(TelgenError::Publish(format!(
                    "delivery to {topic} failed: broker unavailable"
                )));
            }
        }
        let offset = sent.len() as i64;
        sent.push(SentMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_vec(),
        });
        Ok(DeliveryReceipt {
            topic: topic.to_string(),
            partition: 0,
            offset,
        })
    }

    async fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// The fixed-parameter record used across integration tests.
pub fn sample_record() -> TelemetryRecord {
    RecordDraft::new("chat-api", "gpt-4", 1000.0, 100, 200, 0.015)
        .with_request_id("req-1700000000000-4242")
        .build()
}
