use crate::{DevicePathEnumerator, MAX_DEVICES};
use std::path::PathBuf;

/// SCSI/USB disks: `/dev/sda` through `/dev/sdp`.
pub struct LinuxDevicePaths;

impl DevicePathEnumerator for LinuxDevicePaths {
    fn candidates(&self) -> Vec<PathBuf> {
        (b'a'..)
            .take(MAX_DEVICES)
            .map(|letter| PathBuf::from(format!("/dev/sd{}", letter as char)))
            .collect()
    }
}
