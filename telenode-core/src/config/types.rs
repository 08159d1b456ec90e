//! Configuration type definitions

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::graph::{PlotWindow, DEFAULT_PLOT_HEIGHT, DEFAULT_PLOT_TOP};

/// Panel width in pixels
pub const DISPLAY_WIDTH: u32 = 128;

/// Panel height in pixels
pub const DISPLAY_HEIGHT: u32 = 64;

/// Rows above the plot reserved for the status line and readout
pub const STATUS_AREA_HEIGHT: u32 = 16;

/// Default loop period in milliseconds
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 50;

/// Default delay between WiFi join attempts
pub const DEFAULT_LINK_RETRY_MS: u32 = 500;

/// Default SSD1306 I2C address
pub const DEFAULT_DISPLAY_ADDRESS: u8 = 0x3C;

/// Default WebSocket listener port
pub const DEFAULT_SERVER_PORT: u16 = 81;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Loop period of zero
    ZeroInterval,
    /// Plot band overlaps the status area or runs off the panel
    PlotOutOfBounds,
    /// Address outside the 7-bit I2C range
    InvalidAddress,
    /// Listener port of zero
    InvalidPort,
}

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopConfig {
    /// Button settle time
    pub debounce_ms: u32,
    /// Pause between ticks
    pub update_interval_ms: u32,
    /// Pause between WiFi join attempts
    pub link_retry_ms: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            link_retry_ms: DEFAULT_LINK_RETRY_MS,
        }
    }
}

/// Plot band placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GraphConfig {
    pub top: u8,
    pub height: u8,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            top: DEFAULT_PLOT_TOP as u8,
            height: DEFAULT_PLOT_HEIGHT as u8,
        }
    }
}

impl GraphConfig {
    /// Full-width plot window for this placement
    pub fn window(&self) -> PlotWindow {
        PlotWindow {
            top: i32::from(self.top),
            height: i32::from(self.height),
            width: DISPLAY_WIDTH as i32,
        }
    }
}

/// Display hardware settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayHwConfig {
    /// 7-bit I2C address
    pub i2c_address: u8,
}

impl Default for DisplayHwConfig {
    fn default() -> Self {
        Self {
            i2c_address: DEFAULT_DISPLAY_ADDRESS,
        }
    }
}

/// Broadcast listener settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
        }
    }
}

/// Complete node configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    pub timing: LoopConfig,
    pub graph: GraphConfig,
    pub display: DisplayHwConfig,
    pub server: ServerConfig,
}

impl NodeConfig {
    /// Check values the parser cannot catch on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let top = u32::from(self.graph.top);
        let bottom = top + u32::from(self.graph.height);
        if self.graph.height == 0 || top < STATUS_AREA_HEIGHT || bottom >= DISPLAY_HEIGHT {
            return Err(ConfigError::PlotOutOfBounds);
        }

        if self.display.i2c_address > 0x7F {
            return Err(ConfigError::InvalidAddress);
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.graph.window(), PlotWindow::default());
        assert_eq!(config.server.port, 81);
        assert_eq!(config.display.i2c_address, 0x3C);
    }

    #[test]
    fn test_plot_must_fit_panel() {
        let mut config = NodeConfig::default();
        config.graph.height = 44;
        assert_eq!(config.validate(), Err(ConfigError::PlotOutOfBounds));

        config.graph = GraphConfig { top: 8, height: 20 };
        assert_eq!(config.validate(), Err(ConfigError::PlotOutOfBounds));

        config.graph = GraphConfig { top: 16, height: 47 };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = NodeConfig::default();
        config.timing.update_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
    }
}
