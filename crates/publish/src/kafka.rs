use std::time::Duration;

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use telgen_core::config::Config;
use telgen_core::{Result, TelgenError};
use tracing::info;

use crate::sink::{DeliveryReceipt, EventSink};

/// Kafka-backed sink. Configured for full acknowledgment with a small bounded
/// retry count and a single in-flight request per connection, so retried
/// deliveries keep their order.
pub struct KafkaSink {
    producer: FutureProducer,
    ack_timeout: Duration,
}

impl KafkaSink {
    pub fn new(config: &Config) -> Result<Self> {
        let brokers = config.brokers.join(",");
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &brokers)
            .set("acks", "all")
            .set("retries", config.delivery_retries.to_string())
            .set("max.in.flight.requests.per.connection", "1")
            .set(
                "message.timeout.ms",
                config.message_timeout.as_millis().to_string(),
            )
            .set("socket.keepalive.enable", "true")
            .create()
            .map_err(|e| TelgenError::Config(format!("failed to create Kafka producer: {e}")))?;

        info!(brokers = %brokers, "connected to Kafka brokers");

        Ok(Self {
            producer,
            ack_timeout: config.ack_timeout,
        })
    }
}

#[async_trait]
impl EventSink for KafkaSink {
    async fn send(&self, topic: &str, key: &str, payload: &[u8]) -> Result<DeliveryReceipt> {
        let record = FutureRecord::to(topic).key(key).payload(payload);
        let delivery = self.producer.send(record, Timeout::Never);

        match tokio::time::timeout(self.ack_timeout, delivery).await {
            Ok(Ok((partition, offset))) => Ok(DeliveryReceipt {
                topic: topic.to_string(),
                partition,
                offset,
            }),
            Ok(Err((err, _message))) => Err(TelgenError::Publish(format!(
                "delivery to {topic} failed: {err}"
            ))),
            Err(_) => Err(TelgenError::Timeout(format!(
                "no acknowledgment from {topic} within {:?}",
                self.ack_timeout
            ))),
        }
    }

    async fn flush(&self) -> Result<()> {
        self.producer
            .flush(Timeout::After(self.ack_timeout))
            .map_err(|e| TelgenError::Publish(format!("flush failed: {e}")))
    }

    async fn close(&self) -> Result<()> {
        // rdkafka tears the connection down on drop; a final flush is the
        // barrier that guarantees nothing is left in flight before that.
        self.flush().await
    }
}
