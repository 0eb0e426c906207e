use std::path::PathBuf;

pub mod discovery;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub use linux::LinuxDevicePaths as PlatformDevicePaths;

#[cfg(target_os = "windows")]
pub use windows::WindowsDevicePaths as PlatformDevicePaths;

#[cfg(target_os = "macos")]
pub use macos::MacOSDevicePaths as PlatformDevicePaths;

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
pub use crate::NoDevicePaths as PlatformDevicePaths;

pub use discovery::{available_devices, find_nofs_device, is_readable, newly_available};

/// Number of candidates generated per platform, counting from the first
/// device name.
pub const MAX_DEVICES: usize = 16;

/// Source of candidate device paths, in probing order.
pub trait DevicePathEnumerator {
    fn candidates(&self) -> Vec<PathBuf>;
}

/// No known raw device naming; only explicit paths can be used.
#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
pub struct NoDevicePaths;

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
impl DevicePathEnumerator for NoDevicePaths {
    fn candidates(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// A fixed list of candidates, e.g. a single user-supplied path.
#[derive(Debug, Clone, Default)]
pub struct FixedPaths(pub Vec<PathBuf>);

impl DevicePathEnumerator for FixedPaths {
    fn candidates(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}
