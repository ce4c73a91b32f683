// src/monitor.rs
//! Main GPS monitor coordination
//!
//! Owns the driver and plays the role of the periodic scheduler: a tokio
//! task drains the receiver, accumulates odometry and refreshes a shared
//! snapshot that displays and JSON output read from.

use crate::{
    config::GpsConfig,
    error::{GpsError, Result},
    gps::{data::GpsSnapshot, driver::GpsDriver, pps::PpsSignal, ubx::{DynamicModel, PowerMode}},
};
use chrono::Utc;
use log::{error, info};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, RwLock,
    },
    time::Duration,
};

/// Coordinates the GPS driver, its polling task and snapshot sharing.
pub struct GpsMonitor {
    driver: Arc<Mutex<GpsDriver>>,
    snapshot: Arc<RwLock<GpsSnapshot>>,
    running: Arc<AtomicBool>,
    pps: PpsSignal,
}

impl GpsMonitor {
    /// Create a new GPS monitor
    pub fn new() -> Self {
        let pps = PpsSignal::new();
        Self {
            driver: Arc::new(Mutex::new(GpsDriver::new(pps.clone()))),
            snapshot: Arc::new(RwLock::new(GpsSnapshot::new())),
            running: Arc::new(AtomicBool::new(true)),
            pps,
        }
    }

    /// Producer handle for pulse-per-second edges. Whatever watches the
    /// pulse line (a GPIO interrupt bridge, a DCD watcher) marks edges here
    /// and the driver's time query picks them up.
    pub fn pps(&self) -> PpsSignal {
        self.pps.clone()
    }

    /// Bring up the driver from config and start the polling task.
    pub async fn start(&self, config: &GpsConfig) -> Result<()> {
        let device = config
            .device
            .clone()
            .ok_or_else(|| GpsError::Other("no serial device configured".to_string()))?;

        {
            let mut driver = self.driver.lock().unwrap();
            if !driver.initialize(&device, config.rx_pin, config.tx_pin) {
                return Err(GpsError::Connection(format!(
                    "failed to bring up GPS receiver on {}",
                    device
                )));
            }
            info!("GPS receiver up on {}", device);
            self.apply_startup_commands(&mut driver, config);
        }

        let driver = Arc::clone(&self.driver);
        let snapshot = Arc::clone(&self.snapshot);
        let running = Arc::clone(&self.running);
        let max_fix_age_ms = config.max_fix_age_ms;
        let poll_interval = Duration::from_millis(config.poll_interval_ms.max(1));

        tokio::spawn(async move {
            while running.load(Ordering::Relaxed) {
                {
                    let mut drv = driver.lock().unwrap();
                    drv.poll();
                    drv.store_current_position(max_fix_age_ms);

                    let mut snap = drv.snapshot(max_fix_age_ms);
                    if let Some(sample) = drv.date_time() {
                        snap.time_utc = Some(sample.utc);
                        snap.time_age_ms = Some(sample.age_ms);
                        snap.pps_synced = sample.pps_synced;
                    }
                    snap.captured_at = Some(Utc::now());
                    snap.device = Some(device.clone());
                    *snapshot.write().unwrap() = snap;
                }
                tokio::time::sleep(poll_interval).await;
            }
        });

        Ok(())
    }

    fn apply_startup_commands(&self, driver: &mut GpsDriver, config: &GpsConfig) {
        if let Some(name) = config.power_mode.as_deref() {
            match PowerMode::from_name(name) {
                Some(mode) => {
                    if !driver.set_power_mode(mode) {
                        error!("failed to apply power mode {}", mode.name());
                    }
                }
                None => error!("unknown power mode {:?} in config", name),
            }
        }
        if let Some(code) = config.dynamic_model {
            match DynamicModel::from_code(code) {
                Some(model) => {
                    if !driver.set_dynamic_model(model) {
                        error!("failed to apply dynamic model {:?}", model);
                    }
                }
                None => error!("dynamic model code {} is reserved or out of range", code),
            }
        }
    }

    /// Stop the monitor
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Check if the monitor is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Get a clone of the current snapshot
    pub fn get_snapshot(&self) -> GpsSnapshot {
        self.snapshot.read().unwrap().clone()
    }

    /// Shared snapshot handle for display loops.
    pub fn snapshot_handle(&self) -> Arc<RwLock<GpsSnapshot>> {
        Arc::clone(&self.snapshot)
    }

    /// Shared running flag for display loops.
    pub fn running_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

impl Clone for GpsMonitor {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            snapshot: Arc::clone(&self.snapshot),
            running: Arc::clone(&self.running),
            pps: self.pps.clone(),
        }
    }
}

impl Default for GpsMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// List available serial ports
pub async fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| GpsError::Other(format!("Failed to list serial ports: {}", e)))?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}
