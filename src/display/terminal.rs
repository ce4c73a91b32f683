// src/display/terminal.rs
//! Terminal-based display implementation

use crate::{
    error::{GpsError, Result},
    gps::GpsSnapshot,
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tokio::time::sleep;

pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Start the terminal display loop
    pub async fn run(
        &self,
        snapshot: Arc<RwLock<GpsSnapshot>>,
        running: Arc<AtomicBool>,
    ) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Hide, DisableLineWrap).map_err(GpsError::Io)?;

        // Set up Ctrl+C handler
        let running_clone = Arc::clone(&running);
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            running_clone.store(false, Ordering::Relaxed);
        });

        while running.load(Ordering::Relaxed) {
            execute!(stdout, Clear(ClearType::All), MoveTo(0, 0)).map_err(GpsError::Io)?;

            let snap = snapshot.read().unwrap().clone();
            self.render_display(&mut stdout, &snap)?;

            stdout.flush().map_err(GpsError::Io)?;
            sleep(Duration::from_secs(1)).await;
        }

        execute!(stdout, Show, EnableLineWrap).map_err(GpsError::Io)?;
        println!("\nShutting down...");
        Ok(())
    }

    /// Render the snapshot to the terminal
    fn render_display(&self, stdout: &mut impl Write, snap: &GpsSnapshot) -> Result<()> {
        // Header
        execute!(
            stdout,
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\n"),
            Print("u-blox GPS Receiver Monitor"),
            Print("\n"),
            Print("=".repeat(60)),
            Print("\n"),
            ResetColor
        )
        .map_err(GpsError::Io)?;

        // Timestamp and device
        let captured_str = match snap.captured_at {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => "No data received".to_string(),
        };
        let device_str = snap.device.as_deref().unwrap_or("Unknown");
        execute!(
            stdout,
            Print(format!("Last Update: {} ({})\n\n", captured_str, device_str))
        )
        .map_err(GpsError::Io)?;

        self.render_position_section(stdout, snap)?;
        self.render_time_section(stdout, snap)?;
        self.render_stream_section(stdout, snap)?;

        // Footer
        execute!(
            stdout,
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\n"),
            Print("Press Ctrl+C to exit"),
            Print("\n"),
            ResetColor
        )
        .map_err(GpsError::Io)?;

        Ok(())
    }

    fn render_position_section(&self, stdout: &mut impl Write, snap: &GpsSnapshot) -> Result<()> {
        execute!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print("POSITION:\n"),
            ResetColor
        )
        .map_err(GpsError::Io)?;

        let fix_str = if snap.has_fix {
            "Current".to_string()
        } else {
            match snap.fix_age_ms {
                Some(age) => format!("Stale ({} ms old)", age),
                None => "None".to_string(),
            }
        };

        execute!(
            stdout,
            Print(format!(
                "  Latitude:  {}\n",
                GpsSnapshot::format_coordinate(snap.latitude)
            )),
            Print(format!(
                "  Longitude: {}\n",
                GpsSnapshot::format_coordinate(snap.longitude)
            )),
            Print(format!(
                "  Altitude:  {}\n",
                GpsSnapshot::format_value(snap.altitude, "m")
            )),
            Print(format!("  Fix:       {:>12}\n", fix_str)),
            Print(format!(
                "  Satellites:{}\n",
                GpsSnapshot::format_value(snap.satellites, "")
            )),
            Print(format!(
                "  Odometer:  {:>12.3} km\n\n",
                snap.odometer_km()
            ))
        )
        .map_err(GpsError::Io)?;

        Ok(())
    }

    fn render_time_section(&self, stdout: &mut impl Write, snap: &GpsSnapshot) -> Result<()> {
        execute!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print("TIME:\n"),
            ResetColor
        )
        .map_err(GpsError::Io)?;

        let time_str = match snap.time_utc {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => "Not trustworthy".to_string(),
        };
        let sync_str = if snap.pps_synced { "PPS pulse" } else { "NMEA sentence" };

        execute!(
            stdout,
            Print(format!("  Receiver:  {:>23}\n", time_str)),
            Print(format!(
                "  Age:       {}\n",
                GpsSnapshot::format_value(snap.time_age_ms, "ms")
            )),
            Print(format!("  Anchor:    {:>12}\n\n", sync_str))
        )
        .map_err(GpsError::Io)?;

        Ok(())
    }

    fn render_stream_section(&self, stdout: &mut impl Write, snap: &GpsSnapshot) -> Result<()> {
        execute!(
            stdout,
            SetForegroundColor(Color::Blue),
            Print("STREAM:\n"),
            ResetColor
        )
        .map_err(GpsError::Io)?;

        let raw_display = if snap.last_sentence.is_empty() {
            "No data"
        } else {
            &snap.last_sentence
        };

        execute!(
            stdout,
            Print(format!("  Health:    {:>12}\n", snap.stream_health())),
            Print(format!(
                "  Sentences: {:>12} ({} failed)\n",
                snap.sentences_decoded, snap.failed_sentences
            )),
            Print(format!("  {}\n\n", raw_display))
        )
        .map_err(GpsError::Io)?;

        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}
