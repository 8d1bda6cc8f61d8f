use async_trait::async_trait;
use telgen_core::Result;

/// Broker acknowledgment for one delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// The narrow delivery capability the publisher writes to. Implementations
/// own connection state; `flush` and `close` must be safe to call once at
/// shutdown with no sends in flight afterwards.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, topic: &str, key: &str, payload: &[u8]) -> Result<DeliveryReceipt>;

    async fn flush(&self) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
