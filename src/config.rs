//! Minimal runtime configuration: site identity, listen port, idle timeout,
//! and the static peer list. Loaded from TOML; this crate carries no
//! backend settings of its own since it ships no Persistence/Identity/
//! Policy implementations — wiring those is left to the binary's caller.

use serde::Deserialize;

fn default_port() -> u16 {
    119
}

fn default_idle_timeout_secs() -> u64 {
    600
}

fn default_site_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

#[derive(Debug, Deserialize, Clone)]
pub struct PeerConfig {
    pub label: String,
    pub address: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default, alias = "peer")]
    pub peers: Vec<PeerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            site_name: default_site_name(),
            idle_timeout_secs: default_idle_timeout_secs(),
            peers: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents do not
    /// parse as valid `Config` TOML.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read configuration file {path:?}: {e}"))?;
        let cfg: Config = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse configuration file {path:?}: {e}"))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_file_omits_fields() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.port, 119);
        assert_eq!(cfg.idle_timeout_secs, 600);
        assert!(cfg.peers.is_empty());
    }

    #[test]
    fn peers_parse_from_table_array() {
        let cfg: Config = toml::from_str(
            r#"
            port = 1119

            [[peer]]
            label = "alice"
            address = "alice.example:119"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, 1119);
        assert_eq!(cfg.peers.len(), 1);
        assert_eq!(cfg.peers[0].label, "alice");
        assert!(!cfg.peers[0].disabled);
    }
}
