mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use telgen_core::config::{self, Config};
use telgen_publish::kafka::KafkaSink;
use telgen_publish::publisher::Publisher;
use telgen_traffic::run::{self, TrafficPlan};

use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "telgen")]
#[command(about = "Synthetic LLM telemetry producer for Kafka pipelines")]
struct Cli {
    #[arg(long, help = "Comma-separated list of Kafka brokers")]
    brokers: Option<String>,

    #[arg(long, help = "Kafka topic name")]
    topic: Option<String>,

    #[arg(long, help = "Number of normal events per batch")]
    normal_events: Option<usize>,

    #[arg(long, help = "Number of anomalous events per batch")]
    anomalous_events: Option<usize>,

    #[arg(long, help = "Keep generating batches until interrupted")]
    continuous: bool,

    #[arg(long, help = "Config file path")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing();

    let cfg = load_config(&cli).context("load config")?;

    let sink = Arc::new(KafkaSink::new(&cfg).context("create Kafka producer")?);
    let publisher = Publisher::new(sink, cfg.topic.clone());
    let plan = TrafficPlan::from_config(&cfg);

    let result = tokio::select! {
        res = drive(&publisher, &plan, cfg.batch_pause, cli.continuous) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
    };

    let shutdown = publisher.shutdown().await;
    result?;
    shutdown.context("flush and close producer")?;
    Ok(())
}

async fn drive(
    publisher: &Publisher,
    plan: &TrafficPlan,
    batch_pause: Duration,
    continuous: bool,
) -> telgen_core::Result<()> {
    if continuous {
        run::run_continuous(publisher, plan, batch_pause).await
    } else {
        run::run_batch(publisher, plan).await?;
        tracing::info!("finished generating events");
        Ok(())
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => Config::load_with_file(path)?,
        None => Config::load()?,
    };

    if let Some(v) = &cli.brokers {
        cfg.brokers = config::parse_brokers(v)?;
    }
    if let Some(v) = &cli.topic {
        cfg.topic = v.clone();
    }
    if let Some(v) = cli.normal_events {
        cfg.normal_events = v;
    }
    if let Some(v) = cli.anomalous_events {
        cfg.anomalous_events = v;
    }

    Ok(cfg)
}
