// src/config.rs
//! Configuration management with file-based storage

use crate::error::{GpsError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsConfig {
    /// Serial device the receiver is attached to.
    pub device: Option<String>,
    /// Receive pin identifier on the serial adapter; negative means
    /// misconfigured and the driver will refuse to start.
    pub rx_pin: i16,
    /// Transmit pin identifier; negative disables the transmit path.
    pub tx_pin: i16,
    /// Oldest fix still accepted by position queries, in milliseconds.
    pub max_fix_age_ms: u64,
    /// Polling cadence of the monitor task, in milliseconds.
    pub poll_interval_ms: u64,
    /// Power mode applied at startup ("max-performance", "power-save", "eco").
    pub power_mode: Option<String>,
    /// Dynamic platform model code applied at startup.
    pub dynamic_model: Option<u8>,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            device: None,
            rx_pin: 0,
            tx_pin: 0,
            max_fix_age_ms: 2000,
            poll_interval_ms: 50,
            power_mode: None,
            dynamic_model: None,
        }
    }
}

impl GpsConfig {
    /// Load configuration from storage
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| GpsError::Other(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| GpsError::Other(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to storage
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GpsError::Other(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| GpsError::Other(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)
            .map_err(|e| GpsError::Other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_config_path() -> Result<std::path::PathBuf> {
        use std::path::PathBuf;

        let home = std::env::var("HOME")
            .map_err(|_| GpsError::Other("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("ublox-gps")
            .join("config.json"))
    }

    /// Update serial device settings
    pub fn update_serial(&mut self, device: String, rx_pin: i16, tx_pin: i16) {
        self.device = Some(device);
        self.rx_pin = rx_pin;
        self.tx_pin = tx_pin;
    }

    /// Update startup command settings
    pub fn update_startup_commands(&mut self, power_mode: Option<String>, dynamic_model: Option<u8>) {
        self.power_mode = power_mode;
        self.dynamic_model = dynamic_model;
    }
}
