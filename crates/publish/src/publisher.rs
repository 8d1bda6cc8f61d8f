use std::sync::Arc;

use telgen_core::record::TelemetryRecord;
use telgen_core::{Result, TelgenError};
use tracing::{error, info};

use crate::sink::{DeliveryReceipt, EventSink};

/// Serializes records and submits them to a sink, keyed by request id.
#[derive(Clone)]
pub struct Publisher {
    sink: Arc<dyn EventSink>,
    topic: String,
}

impl Publisher {
    pub fn new(sink: Arc<dyn EventSink>, topic: impl Into<String>) -> Self {
        Self {
            sink,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn publish(&self, record: &TelemetryRecord) -> Result<DeliveryReceipt> {
        let payload = serde_json::to_vec(record).map_err(|e| {
            TelgenError::Serialize(format!("failed to encode telemetry record: {e}"))
        })?;

        match self
            .sink
            .send(&self.topic, &record.request_id, &payload)
            .await
        {
            Ok(receipt) => {
                info!(
                    request_id = %record.request_id,
                    topic = %receipt.topic,
                    partition = receipt.partition,
                    offset = receipt.offset,
                    "delivered telemetry record"
                );
                Ok(receipt)
            }
            Err(err) => {
                error!(
                    request_id = %record.request_id,
                    error = %err,
                    "failed to deliver telemetry record"
                );
                Err(err)
            }
        }
    }

    /// Flush pending deliveries and close the sink. Called once before exit.
    pub async fn shutdown(&self) -> Result<()> {
        self.sink.flush().await?;
        self.sink.close().await?;
        info!("producer closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use telgen_core::record::RecordDraft;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, String, Vec<u8>)>>,
        fail_sends: AtomicBool,
        flushes: AtomicUsize,
        closes: AtomicUsize,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn send(&self, topic: &str, key: &str, payload: &[u8]) -> Result<DeliveryReceipt> {
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(TelgenError::Publish("broker unavailable".to_string()));
            }
            let mut sent = self.sent.lock().unwrap();
            let offset = sent.len() as i64;
            sent.push((topic.to_string(), key.to_string(), payload.to_vec()));
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

    fn record() -> TelemetryRecord {
        RecordDraft::new("chat-api", "gpt-4", 1000.0, 100, 200, 0.015)
            .with_request_id("req-1700000000000-4242")
            .build()
    }

    #[tokio::test]
    async fn publishes_serialized_record_keyed_by_request_id() {
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(sink.clone(), "llm.telemetry");

        let receipt = publisher.publish(&record()).await.unwrap();
        assert_eq!(receipt.topic, "llm.telemetry");
        assert_eq!(receipt.offset, 0);

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (topic, key, payload) = &sent[0];
        assert_eq!(topic, "llm.telemetry");
        assert_eq!(key, "req-1700000000000-4242");

        let value: serde_json::Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(value["service_name"], "chat-api");
        assert_eq!(value["model_name"], "gpt-4");
        assert_eq!(value["total_tokens"], 300);
        assert!(value.get("prompt_text").is_none());
        assert!(value.get("response_text").is_none());
    }

    #[tokio::test]
    async fn propagates_delivery_failure() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail_sends.store(true, Ordering::SeqCst);
        let publisher = Publisher::new(sink.clone(), "llm.telemetry");

        let err = publisher.publish(&record()).await.unwrap_err();
        assert!(matches!(err, TelgenError::Publish(_)));
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn shutdown_flushes_then_closes_once() {
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(sink.clone(), "llm.telemetry");

        publisher.publish(&record()).await.unwrap();
        publisher.shutdown().await.unwrap();

        assert_eq!(sink.flushes.load(Ordering::SeqCst), 1);
        assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
    }
}
