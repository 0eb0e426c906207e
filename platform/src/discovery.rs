//! Sequential probing of candidate device paths.
//!
//! At most one candidate is open at any time: every rejected handle is dropped
//! before the next path is opened.

use crate::DevicePathEnumerator;
use nofs_core::{DeviceOptions, NofsDevice, NofsError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Opens the first candidate that carries a NoFS signature.
pub fn find_nofs_device<E: DevicePathEnumerator + ?Sized>(
    enumerator: &E,
    options: &DeviceOptions,
) -> Result<NofsDevice, NofsError> {
    for path in enumerator.candidates() {
        match NofsDevice::open_with(&path, options) {
            Ok(device) if device.valid_format() => {
                info!("Found NoFS device at {}", path.display());
                return Ok(device);
            }
            Ok(device) => {
                debug!("{} has no NoFS signature", path.display());
                drop(device);
            }
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }

    Err(NofsError::DeviceNotFound(
        "No NoFS device could be found".to_string(),
    ))
}

/// Whether `path` can be opened and read right now.
pub fn is_readable(path: &Path) -> bool {
    let mut byte = [0u8; 1];
    File::open(path)
        .and_then(|mut file| file.read(&mut byte))
        .is_ok()
}

/// Candidates that are readable at the time of the call.
pub fn available_devices<E: DevicePathEnumerator + ?Sized>(enumerator: &E) -> Vec<PathBuf> {
    enumerator
        .candidates()
        .into_iter()
        .filter(|path| is_readable(path))
        .collect()
}

/// Candidates that became readable since the `before` snapshot was taken.
///
/// Taking one snapshot with the medium ejected and calling this after it is
/// inserted narrows the candidates down to that medium.
pub fn newly_available<E: DevicePathEnumerator + ?Sized>(
    before: &[PathBuf],
    enumerator: &E,
) -> Vec<PathBuf> {
    enumerator
        .candidates()
        .into_iter()
        .filter(|path| !before.contains(path))
        .filter(|path| is_readable(path))
        .collect()
}
