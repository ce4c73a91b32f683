// src/gps/transport.rs
//! Byte-stream transport abstraction over the GPS serial link

use crate::error::{GpsError, Result};
use log::warn;
use std::io::{Read, Write};
use std::time::Duration;

const READ_TIMEOUT_MS: u64 = 50;

/// Minimal byte-stream contract the driver needs from its serial link.
///
/// The driver never assumes more than this: how many bytes are ready, one
/// byte at a time in, a buffer out, and whether the transmit wire is hooked
/// up at all.
pub trait Transport: Send {
    /// Number of bytes ready to read without blocking.
    fn available(&mut self) -> usize;

    /// Read a single byte, `None` if nothing could be read.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write a buffer, returning how many bytes were accepted.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Whether the transmit path is wired up.
    fn tx_enabled(&self) -> bool;

    /// Reconfigure the line speed.
    fn configure(&mut self, baud_rate: u32) -> Result<()>;
}

/// Production transport over a blocking serial port handle.
pub struct SerialTransport {
    port: Box<dyn tokio_serial::SerialPort>,
    tx_enabled: bool,
}

impl SerialTransport {
    /// Open `device` at the given baud rate. `tx_enabled` reflects whether
    /// the transmit wire is physically connected; with it false, all command
    /// writes are refused up front rather than sent into the void.
    pub fn open(device: &str, baud_rate: u32, tx_enabled: bool) -> Result<Self> {
        let port = tokio_serial::new(device, baud_rate)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()
            .map_err(GpsError::Serial)?;
        Ok(Self { port, tx_enabled })
    }
}

impl Transport for SerialTransport {
    fn available(&mut self) -> usize {
        self.port.bytes_to_read().map(|n| n as usize).unwrap_or(0)
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }

    fn write(&mut self, data: &[u8]) -> usize {
        match self.port.write(data) {
            Ok(written) => {
                let _ = self.port.flush();
                written
            }
            Err(e) => {
                warn!("serial write failed: {}", e);
                0
            }
        }
    }

    fn tx_enabled(&self) -> bool {
        self.tx_enabled
    }

    fn configure(&mut self, baud_rate: u32) -> Result<()> {
        self.port.set_baud_rate(baud_rate).map_err(GpsError::Serial)
    }
}
