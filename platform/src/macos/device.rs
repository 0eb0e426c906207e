use crate::{DevicePathEnumerator, MAX_DEVICES};
use std::path::PathBuf;

/// Whole disks `/dev/disk1` through `/dev/disk16`; `disk0` is the boot disk.
pub struct MacOSDevicePaths;

impl DevicePathEnumerator for MacOSDevicePaths {
    fn candidates(&self) -> Vec<PathBuf> {
        (1..=MAX_DEVICES)
            .map(|index| PathBuf::from(format!("/dev/disk{}", index)))
            .collect()
    }
}
