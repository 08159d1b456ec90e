//! Node configuration loading
//!
//! `node.toml` is compiled into the image and parsed once at boot. The
//! build script already rejects a bad file, so the fallback only guards
//! against the two validators drifting apart.

use defmt::*;
use telenode_core::config::{parse_config, NodeConfig};

/// Embedded configuration (compiled into firmware)
/// Edit node.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../node.toml");

/// Parse the embedded configuration, falling back to defaults
pub fn load() -> NodeConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config: debounce {}ms, interval {}ms, retry {}ms, port {}",
                config.timing.debounce_ms,
                config.timing.update_interval_ms,
                config.timing.link_retry_ms,
                config.server.port
            );
            config
        }
        Err(err) => {
            error!("node.toml rejected ({}), using defaults", err);
            NodeConfig::default()
        }
    }
}
