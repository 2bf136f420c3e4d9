// src/parser/devices.rs

//! Parser for `adb devices -l` output
//!
//! Example input:
//!
//! ```text
//! * daemon not running; starting now at tcp:5037
//! List of devices attached
//! emulator-5554   device product:sdk_gphone_x86 model:Android_SDK device:generic_x86 transport_id:1
//! 0123456789ABCDEF unauthorized usb:1-1 transport_id:2
//! ```
//!
//! Lines that do not look like a device entry are skipped. adb does not
//! version this format, so nothing here is an error.

use std::fmt;
use tracing::debug;

const EMULATOR_SERIAL_PREFIX: &str = "emulator-";

/// Connection state of an attached device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Ready,
    Unauthorized,
    Offline,
    Unknown,
}

impl DeviceStatus {
    /// Map an adb state token to a status
    pub fn from_token(token: &str) -> Self {
        match token {
            "device" => DeviceStatus::Ready,
            "unauthorized" => DeviceStatus::Unauthorized,
            "offline" => DeviceStatus::Offline,
            _ => DeviceStatus::Unknown,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Ready => write!(f, "Ready"),
            DeviceStatus::Unauthorized => write!(f, "Unauthorized"),
            DeviceStatus::Offline => write!(f, "Offline"),
            DeviceStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One attached device from a single enumeration snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub serial: String,
    pub model: Option<String>,
    pub product: Option<String>,
    pub status: DeviceStatus,
    pub is_emulator: bool,
}

impl DeviceRecord {
    /// Name used in per-device header lines
    pub fn display_name(&self) -> &str {
        self.model.as_deref().unwrap_or("Device")
    }

    pub fn is_ready(&self) -> bool {
        self.status == DeviceStatus::Ready
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.serial, self.status)
    }
}

/// Parse `adb devices -l` output into records, preserving input order
pub fn parse_devices(output: &str) -> Vec<DeviceRecord> {
    let devices: Vec<DeviceRecord> = output.lines().filter_map(parse_device_line).collect();
    debug!("Parsed {} device(s) from adb output", devices.len());
    devices
}

fn parse_device_line(line: &str) -> Option<DeviceRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('*') || line.starts_with("List of devices") {
        return None;
    }

    let mut tokens = line.split_whitespace();
    let serial = tokens.next()?;
    // A device entry always carries a state after the serial
    let state = tokens.next()?;
    if state.contains(':') {
        return None;
    }

    let mut status = DeviceStatus::from_token(state);
    let mut model = None;
    let mut product = None;
    let mut emulator_hint = false;

    for token in tokens {
        match token.split_once(':') {
            Some(("model", value)) if !value.is_empty() => model = Some(value.to_string()),
            Some(("product", value)) if !value.is_empty() => {
                if value.starts_with("sdk_") {
                    emulator_hint = true;
                }
                product = Some(value.to_string());
            }
            Some(("device", value)) => {
                if value.starts_with("generic") || value.starts_with("emu") {
                    emulator_hint = true;
                }
            }
            Some(_) => {}
            None => {
                if status == DeviceStatus::Unknown {
                    status = DeviceStatus::from_token(token);
                }
            }
        }
    }

    let is_emulator = serial.starts_with(EMULATOR_SERIAL_PREFIX) || emulator_hint;

    Some(DeviceRecord {
        serial: serial.to_string(),
        model,
        product,
        status,
        is_emulator,
    })
}
