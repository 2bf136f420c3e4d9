// src/parser/mod.rs
//! Parsers for adb text output

mod devices;
mod packages;

pub use devices::{DeviceRecord, DeviceStatus, parse_devices};
pub use packages::{
    PackageRef, parse_packages, shortened_install_status, was_successful,
    was_successfully_installed, was_successfully_uninstalled,
};
