use std::{str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use ledoc_client::{Endpoint, DEFAULT_WS_PORT};

pub const AUTOSAVE_DELAY: Duration = Duration::from_secs(2);
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(3);
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What happens to local edits made while the socket is not open
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OfflineEdits {
    /// Edits are silently dropped
    #[default]
    Drop,

    /// Only the latest content is kept while connecting, and sent once the
    /// socket opens
    QueueLatest,
}

impl FromStr for OfflineEdits {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<OfflineEdits> {
        match s {
            "drop" => Ok(OfflineEdits::Drop),
            "queue-latest" => Ok(OfflineEdits::QueueLatest),
            _ => Err(anyhow!(
                "unknown offline edits policy {s:?}, expected drop or queue-latest"
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the HTTP API, eg. `https://app.example.com`
    pub host: String,
    pub ws_port: u16,
    pub offline_edits: OfflineEdits,
    pub autosave_delay: Duration,
    pub highlight_duration: Duration,
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(host: String) -> ClientConfig {
        ClientConfig {
            host,
            ws_port: DEFAULT_WS_PORT,
            offline_edits: OfflineEdits::default(),
            autosave_delay: AUTOSAVE_DELAY,
            highlight_duration: HIGHLIGHT_DURATION,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Reads `LEDOC_HOST` (required), `LEDOC_WS_PORT` and
    /// `LEDOC_OFFLINE_EDITS` from the environment
    pub fn from_env() -> anyhow::Result<ClientConfig> {
        ClientConfig::from_vars(|k| std::env::var(k).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<ClientConfig> {
        let host = var("LEDOC_HOST").context("retrieving LEDOC_HOST environment variable")?;
        let mut cfg = ClientConfig::new(host);
        if let Some(port) = var("LEDOC_WS_PORT") {
            cfg.ws_port = port
                .parse()
                .with_context(|| format!("parsing LEDOC_WS_PORT {port:?}"))?;
        }
        if let Some(policy) = var("LEDOC_OFFLINE_EDITS") {
            cfg.offline_edits = policy.parse().context("parsing LEDOC_OFFLINE_EDITS")?;
        }
        Ok(cfg)
    }

    pub fn endpoint(&self) -> anyhow::Result<Endpoint> {
        Endpoint::parse(&self.host, self.ws_port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = ClientConfig::from_vars(vars(&[("LEDOC_HOST", "https://x.example")])).unwrap();
        assert_eq!(cfg.ws_port, 8000);
        assert_eq!(cfg.offline_edits, OfflineEdits::Drop);
        assert_eq!(cfg.autosave_delay, Duration::from_secs(2));
        assert_eq!(cfg.highlight_duration, Duration::from_secs(3));
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert!(cfg.endpoint().unwrap().is_secure());
    }

    #[test]
    fn overrides() {
        let cfg = ClientConfig::from_vars(vars(&[
            ("LEDOC_HOST", "http://localhost:5173"),
            ("LEDOC_WS_PORT", "9001"),
            ("LEDOC_OFFLINE_EDITS", "queue-latest"),
        ]))
        .unwrap();
        assert_eq!(cfg.ws_port, 9001);
        assert_eq!(cfg.offline_edits, OfflineEdits::QueueLatest);
    }

    #[test]
    fn errors() {
        assert!(ClientConfig::from_vars(vars(&[])).is_err());
        assert!(ClientConfig::from_vars(vars(&[
            ("LEDOC_HOST", "http://localhost"),
            ("LEDOC_WS_PORT", "port"),
        ]))
        .is_err());
        assert!("sometimes".parse::<OfflineEdits>().is_err());
    }
}
