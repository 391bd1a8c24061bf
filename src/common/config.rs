use std::time::Duration;

use tracing::warn;

use crate::common::DATA_SOURCE_ID_DEFAULT;

const POLL_INTERVAL_SECONDS_DEFAULT: u64 = 10;
const MAX_WAIT_SECONDS_DEFAULT: u64 = 600;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_source_id: String,
    pub knowledge_base_id: Option<String>,
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Empty ids count as unset; invalid durations fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_source_id = lookup("DATA_SOURCE_ID")
            .filter(|id| !id.is_empty())
            .unwrap_or(DATA_SOURCE_ID_DEFAULT.into());
        let knowledge_base_id = lookup("KNOWLEDGE_BASE_ID").filter(|id| !id.is_empty());

        let poll_interval = seconds(
            "POLL_INTERVAL_SECONDS",
            lookup("POLL_INTERVAL_SECONDS"),
            POLL_INTERVAL_SECONDS_DEFAULT,
        );
        let max_wait = seconds(
            "MAX_WAIT_SECONDS",
            lookup("MAX_WAIT_SECONDS"),
            MAX_WAIT_SECONDS_DEFAULT,
        );

        Self {
            data_source_id,
            knowledge_base_id,
            poll_interval,
            max_wait,
        }
    }
}

fn seconds(name: &str, value: Option<String>, default: u64) -> Duration {
    let Some(value) = value else {
        return Duration::from_secs(default);
    };

    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!("Invalid value for {}: {:?}, using {}s", name, value, default);
            Duration::from_secs(default)
        }
    }
}
