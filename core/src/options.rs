use crate::layout::{FILL, LEGACY_FILL};
use crate::NofsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Open mode requested for a device.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionLevel {
    #[default]
    ReadOnly,
    FullAccess,
}

impl PermissionLevel {
    pub fn allows_writes(&self) -> bool {
        matches!(self, PermissionLevel::FullAccess)
    }
}

/// Which fill byte ends the scan of a device that carries no signature.
///
/// The terminal byte is payload there. A forced erase leaves the device
/// unformatted, so with `Erased` every rewritten sector reads back as a single
/// 0x03 byte until `initialize_nofs` formats it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FillConvention {
    /// 0xFF, as written by the current erase pattern.
    #[default]
    Erased,
    /// 0x00, as written by early tool versions.
    Zeroed,
}

impl FillConvention {
    pub fn byte(&self) -> u8 {
        match self {
            FillConvention::Erased => FILL,
            FillConvention::Zeroed => LEGACY_FILL,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceOptions {
    pub permissions: PermissionLevel,
    /// Permits destructive operations on a device without a valid signature.
    /// Callers obtain user confirmation before setting this.
    pub force: bool,
    pub fill: FillConvention,
}

impl DeviceOptions {
    pub fn new(permissions: PermissionLevel, force: bool) -> Self {
        Self {
            permissions,
            force,
            ..Default::default()
        }
    }
}

/// Snapshot of a device's observed state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceReport {
    pub path: Option<PathBuf>,
    pub valid_format: bool,
    pub force: bool,
    pub sectors_read: Option<usize>,
    pub payload_len: Option<u64>,
}

impl DeviceReport {
    pub fn to_json_pretty(&self) -> Result<String, NofsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
