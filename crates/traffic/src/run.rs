use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use telgen_core::Result;
use telgen_core::config::Config;
use telgen_publish::publisher::Publisher;
use tracing::{info, warn};

use crate::sample;
use crate::shape::AnomalyShape;

/// How many events each batch produces and how fast. Lifted from the loaded
/// config so the loops stay independent of the config layer.
#[derive(Debug, Clone)]
pub struct TrafficPlan {
    pub normal_events: usize,
    pub anomalous_events: usize,
    pub normal_pace: Duration,
    pub anomalous_pace: Duration,
}

impl TrafficPlan {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            normal_events: cfg.normal_events,
            anomalous_events: cfg.anomalous_events,
            normal_pace: cfg.normal_pace,
            anomalous_pace: cfg.anomalous_pace,
        }
    }
}

pub async fn run_normal(publisher: &Publisher, count: usize, pace: Duration) -> Result<()> {
    info!(count, "simulating normal traffic");
    let mut rng = StdRng::from_entropy();
    for _ in 0..count {
        let record = sample::normal_record(&mut rng);
        publisher.publish(&record).await?;
        tokio::time::sleep(pace).await;
    }
    Ok(())
}

pub async fn run_anomalous(publisher: &Publisher, count: usize, pace: Duration) -> Result<()> {
    info!(count, "simulating anomalous traffic");
    let mut rng = StdRng::from_entropy();
    for index in 0..count {
        let shape = AnomalyShape::sample(&mut rng);
        let record = sample::anomalous_record(&mut rng, shape, index);
        publisher.publish(&record).await?;
        warn!(shape = %shape, "sent anomalous event");
        tokio::time::sleep(pace).await;
    }
    Ok(())
}

/// One batch: the normal loop, then the anomalous loop. A delivery failure
/// aborts the batch and surfaces the error.
pub async fn run_batch(publisher: &Publisher, plan: &TrafficPlan) -> Result<()> {
    run_normal(publisher, plan.normal_events, plan.normal_pace).await?;
    run_anomalous(publisher, plan.anomalous_events, plan.anomalous_pace).await
}

/// Repeats batches until cancelled, sleeping `batch_pause` between them. No
/// backpressure or rate adaptation; pacing is fixed.
pub async fn run_continuous(
    publisher: &Publisher,
    plan: &TrafficPlan,
    batch_pause: Duration,
) -> Result<()> {
    info!("running in continuous mode (ctrl-c to stop)");
    loop {
        run_batch(publisher, plan).await?;
        info!(pause = ?batch_pause, "waiting before next batch");
        tokio::time::sleep(batch_pause).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use telgen_core::TelgenError;
    use testkit::MemorySink;

    use super::*;

    fn plan(normal: usize, anomalous: usize) -> TrafficPlan {
        TrafficPlan {
            normal_events: normal,
            anomalous_events: anomalous,
            normal_pace: Duration::ZERO,
            anomalous_pace: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn batch_publishes_both_profiles() {
        let sink = Arc::new(MemorySink::new());
        let publisher = Publisher::new(sink.clone(), "llm.telemetry");

        run_batch(&publisher, &plan(4, 2)).await.unwrap();

        let sent = sink.sent();
        assert_eq!(sent.len(), 6);
        let anomalous = sent
            .iter()
            .filter(|m| {
                let value: serde_json::Value = serde_json::from_slice(&m.payload).unwrap();
                value
                    .get("metadata")
                    .and_then(|md| md.get("anomaly_type"))
                    .is_some()
            })
            .count();
        assert_eq!(anomalous, 2);
    }

    #[tokio::test]
    async fn delivery_failure_aborts_the_loop() {
        let sink = Arc::new(MemorySink::new());
        sink.fail_after(2);
        let publisher = Publisher::new(sink.clone(), "llm.telemetry");

        let err = run_normal(&publisher, 5, Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, TelgenError::Publish(_)));
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn anomalous_events_use_anomaly_sessions() {
        let sink = Arc::new(MemorySink::new());
        let publisher = Publisher::new(sink.clone(), "llm.telemetry");

        run_anomalous(&publisher, 3, Duration::ZERO).await.unwrap();

        for (index, message) in sink.sent().iter().enumerate() {
            let value: serde_json::Value = serde_json::from_slice(&message.payload).unwrap();
            assert_eq!(value["session_id"], format!("session-anomaly-{index}"));
            assert_eq!(value["user_id"], "user-suspicious");
        }
    }
}
