use serde::Deserialize;
use std::path::Path;

/// Receiver mode. TESTING accepts any bind address and never attempts a
/// multicast join, so loopback tests run without network setup.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum IngestMode {
    #[default]
    Normal,
    Testing,
}

impl IngestMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NORMAL" => Some(IngestMode::Normal),
            "TESTING" => Some(IngestMode::Testing),
            _ => None,
        }
    }
}

/// What to do with frames larger than a ring slot.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JumboMode {
    #[default]
    Truncate,
    Drop,
}

#[derive(Deserialize, Debug)]
pub struct GatewayConfig {
    /// UDP bind address, `host:port`. A multicast group address triggers a
    /// group join in NORMAL mode.
    #[serde(default = "defaults::bind")]
    pub bind: String,
    /// IPv4 interface address for the multicast join. Unset joins on the
    /// unspecified interface.
    #[serde(default)]
    pub interface: Option<String>,
    /// Socket receive buffer request; values below the default are raised.
    #[serde(default = "defaults::recv_buffer_bytes")]
    pub recv_buffer_bytes: usize,
    #[serde(default)]
    pub mode: IngestMode,

    #[serde(default = "defaults::shm_name")]
    pub shm_name: String,
    #[serde(default = "defaults::slot_size")]
    pub slot_size: usize,
    #[serde(default = "defaults::slot_count")]
    pub slot_count: usize,
    #[serde(default)]
    pub jumbo: JumboMode,

    /// Template ids admitted past the filter. Heartbeats (template 0) are
    /// always dropped regardless of this table.
    #[serde(default = "defaults::admitted_templates")]
    pub admitted_templates: Vec<u16>,

    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            interface: None,
            recv_buffer_bytes: defaults::recv_buffer_bytes(),
            mode: IngestMode::default(),
            shm_name: defaults::shm_name(),
            slot_size: defaults::slot_size(),
            slot_count: defaults::slot_count(),
            jumbo: JumboMode::default(),
            admitted_templates: defaults::admitted_templates(),
            log_level: defaults::log_level(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {key}")]
    Env { key: &'static str, value: String },
}

mod defaults {
    pub fn bind() -> String {
        "239.195.1.1:15000".into()
    }

    pub fn recv_buffer_bytes() -> usize {
        4 * 1024 * 1024
    }

    pub fn shm_name() -> String {
        "shijim_market_data_l2".into()
    }

    pub fn slot_size() -> usize {
        256
    }

    pub fn slot_count() -> usize {
        1024
    }

    pub fn admitted_templates() -> Vec<u16> {
        vec![1, 2, 3]
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl GatewayConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: GatewayConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Applies the recognized environment variables on top of this config.
    /// CLI flags are applied after this, so the layering is
    /// defaults < file < environment < CLI.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = std::env::var("SHM_NAME") {
            self.shm_name = v;
        }
        if let Ok(v) = std::env::var("SHM_SLOT_SIZE") {
            self.slot_size = v
                .parse()
                .map_err(|_| ConfigError::Env {
                    key: "SHM_SLOT_SIZE",
                    value: v,
                })?;
        }
        if let Ok(v) = std::env::var("SHM_SLOT_COUNT") {
            self.slot_count = v
                .parse()
                .map_err(|_| ConfigError::Env {
                    key: "SHM_SLOT_COUNT",
                    value: v,
                })?;
        }
        if let Ok(v) = std::env::var("INGEST_BIND") {
            self.bind = v;
        }
        if let Ok(v) = std::env::var("INGEST_MODE") {
            self.mode = IngestMode::parse(&v).ok_or(ConfigError::Env {
                key: "INGEST_MODE",
                value: v,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let cfg: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.slot_size, 256);
        assert_eq!(cfg.slot_count, 1024);
        assert_eq!(cfg.shm_name, "shijim_market_data_l2");
        assert_eq!(cfg.mode, IngestMode::Normal);
        assert_eq!(cfg.jumbo, JumboMode::Truncate);
        assert_eq!(cfg.admitted_templates, vec![1, 2, 3]);
    }

    #[test]
    fn file_values_override_defaults() {
        let cfg: GatewayConfig = toml::from_str(
            r#"
            bind = "127.0.0.1:5000"
            mode = "TESTING"
            jumbo = "drop"
            slot_count = 4096
            admitted_templates = [2]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:5000");
        assert_eq!(cfg.mode, IngestMode::Testing);
        assert_eq!(cfg.jumbo, JumboMode::Drop);
        assert_eq!(cfg.slot_count, 4096);
        assert_eq!(cfg.admitted_templates, vec![2]);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(IngestMode::parse("testing"), Some(IngestMode::Testing));
        assert_eq!(IngestMode::parse("NORMAL"), Some(IngestMode::Normal));
        assert_eq!(IngestMode::parse("sideways"), None);
    }
}
