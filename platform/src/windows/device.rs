use crate::{DevicePathEnumerator, MAX_DEVICES};
use std::path::PathBuf;

/// Physical drives `\\.\PhysicalDrive1` through `\\.\PhysicalDrive16`.
/// `PhysicalDrive0` is skipped, it is almost always the system disk.
pub struct WindowsDevicePaths;

impl DevicePathEnumerator for WindowsDevicePaths {
    fn candidates(&self) -> Vec<PathBuf> {
        (1..=MAX_DEVICES)
            .map(|index| PathBuf::from(format!(r"\\.\PhysicalDrive{}", index)))
            .collect()
    }
}
