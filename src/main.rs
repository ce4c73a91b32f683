// src/main.rs
//! u-blox GPS monitor - serial GPS receiver driver with terminal display

use clap::{Parser, Subcommand};
use std::time::Duration;
use ublox_gps::{
    config::GpsConfig, display::terminal::TerminalDisplay, error::Result, monitor, GpsMonitor,
};

#[derive(Parser)]
#[command(name = "ublox-gps", version, about = "u-blox GPS receiver monitor")]
struct Cli {
    /// Serial device of the receiver (e.g. /dev/ttyUSB0)
    #[arg(short, long)]
    device: Option<String>,

    /// RX pin identifier on the serial adapter
    #[arg(long)]
    rx_pin: Option<i16>,

    /// TX pin identifier; negative disables the transmit path
    #[arg(long)]
    tx_pin: Option<i16>,

    /// Power mode to apply at startup (max-performance, power-save, eco)
    #[arg(long)]
    power_mode: Option<String>,

    /// Dynamic platform model code to apply at startup (0, 2-10)
    #[arg(long)]
    dynamic_model: Option<u8>,

    /// Emit one JSON snapshot per second instead of the terminal display
    #[arg(long)]
    json: bool,

    /// Persist the effective configuration for later runs
    #[arg(long)]
    save_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List available serial ports
    ListPorts,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(Command::ListPorts) = cli.command {
        return monitor::list_serial_ports().await;
    }

    let mut config = GpsConfig::load().unwrap_or_default();
    if let Some(device) = cli.device {
        config.device = Some(device);
    }
    if let Some(rx_pin) = cli.rx_pin {
        config.rx_pin = rx_pin;
    }
    if let Some(tx_pin) = cli.tx_pin {
        config.tx_pin = tx_pin;
    }
    if cli.power_mode.is_some() {
        config.power_mode = cli.power_mode;
    }
    if cli.dynamic_model.is_some() {
        config.dynamic_model = cli.dynamic_model;
    }
    if cli.save_config {
        config.save()?;
    }

    let gps_monitor = GpsMonitor::new();
    gps_monitor.start(&config).await?;

    if cli.json {
        run_json_output(&gps_monitor).await
    } else {
        let display = TerminalDisplay::new();
        display
            .run(gps_monitor.snapshot_handle(), gps_monitor.running_handle())
            .await
    }
}

/// Print one snapshot per second as a JSON line until interrupted.
async fn run_json_output(gps_monitor: &GpsMonitor) -> Result<()> {
    let stopper = gps_monitor.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        stopper.stop();
    });

    while gps_monitor.is_running() {
        let snap = gps_monitor.get_snapshot();
        println!("{}", serde_json::to_string(&snap)?);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Ok(())
}
