use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelgenError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub brokers: Vec<String>,
    pub topic: String,
    pub normal_events: usize,
    pub anomalous_events: usize,
    pub ack_timeout: Duration,
    pub message_timeout: Duration,
    pub delivery_retries: u32,
    pub normal_pace: Duration,
    pub anomalous_pace: Duration,
    pub batch_pause: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topic: "llm.telemetry".to_string(),
            normal_events: 20,
            anomalous_events: 5,
            ack_timeout: Duration::from_secs(10),
            message_timeout: Duration::from_secs(10),
            delivery_retries: 3,
            normal_pace: Duration::from_millis(100),
            anomalous_pace: Duration::from_millis(500),
            batch_pause: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_with_file(&config_file_path())
    }

    pub fn load_with_file(path: &Path) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(file_overrides) = load_file_overrides(path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    brokers: Option<String>,
    topic: Option<String>,
    normal_events: Option<usize>,
    anomalous_events: Option<usize>,
    ack_timeout: Option<String>,
    message_timeout: Option<String>,
    delivery_retries: Option<u32>,
    normal_pace: Option<String>,
    anomalous_pace: Option<String>,
    batch_pause: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("TELGEN_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("telgen/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| TelgenError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| TelgenError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let normal_events = parse_env_usize("TELGEN_NORMAL_EVENTS")?;
    let anomalous_events = parse_env_usize("TELGEN_ANOMALOUS_EVENTS")?;
    let delivery_retries = match env::var("TELGEN_DELIVERY_RETRIES") {
        Ok(v) => Some(v.parse::<u32>().map_err(|e| {
            TelgenError::Config(format!("bad TELGEN_DELIVERY_RETRIES in environment: {e}"))
        })?),
        Err(_) => None,
    };

    Ok(ConfigOverrides {
        brokers: env::var("TELGEN_BROKERS").ok(),
        topic: env::var("TELGEN_TOPIC").ok(),
        normal_events,
        anomalous_events,
        ack_timeout: env::var("TELGEN_ACK_TIMEOUT").ok(),
        message_timeout: env::var("TELGEN_MESSAGE_TIMEOUT").ok(),
        delivery_retries,
        normal_pace: env::var("TELGEN_NORMAL_PACE").ok(),
        anomalous_pace: env::var("TELGEN_ANOMALOUS_PACE").ok(),
        batch_pause: env::var("TELGEN_BATCH_PAUSE").ok(),
    })
}

fn parse_env_usize(key: &str) -> Result<Option<usize>> {
    match env::var(key) {
        Ok(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|e| TelgenError::Config(format!("bad {key} in environment: {e}"))),
        Err(_) => Ok(None),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.brokers {
        cfg.brokers = parse_brokers(&v)
            .map_err(|e| TelgenError::Config(format!("bad brokers in {source}: {e} (value={v})")))?;
    }
    if let Some(v) = overrides.topic {
        cfg.topic = v;
    }
    if let Some(v) = overrides.normal_events {
        cfg.normal_events = v;
    }
    if let Some(v) = overrides.anomalous_events {
        cfg.anomalous_events = v;
    }
    if let Some(v) = overrides.ack_timeout {
        cfg.ack_timeout = parse_duration(&v, "ack_timeout", source)?;
    }
    if let Some(v) = overrides.message_timeout {
        cfg.message_timeout = parse_duration(&v, "message_timeout", source)?;
    }
    if let Some(v) = overrides.delivery_retries {
        cfg.delivery_retries = v;
    }
    if let Some(v) = overrides.normal_pace {
        cfg.normal_pace = parse_duration(&v, "normal_pace", source)?;
    }
    if let Some(v) = overrides.anomalous_pace {
        cfg.anomalous_pace = parse_duration(&v, "anomalous_pace", source)?;
    }
    if let Some(v) = overrides.batch_pause {
        cfg.batch_pause = parse_duration(&v, "batch_pause", source)?;
    }
    Ok(())
}

fn parse_duration(raw: &str, field: &str, source: &str) -> Result<Duration> {
    humantime::parse_duration(raw)
        .map_err(|e| TelgenError::Config(format!("bad {field} in {source}: {e} (value={raw})")))
}

pub fn parse_brokers(raw: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in raw.split(',') {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return Err(TelgenError::Config(
                "broker list entries cannot be empty".to_string(),
            ));
        }
        out.push(trimmed.to_string());
    }
    if out.is_empty() {
        return Err(TelgenError::Config(
            "broker list cannot be empty".to_string(),
        ));
    }
    Ok(out)
}
