pub mod device;
pub mod error;
pub mod layout;
pub mod options;
pub mod sector;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use device::NofsDevice;
pub use error::NofsError;
pub use layout::{SectorPattern, HEADER_LEN, SECTOR_SIZE, SIGNATURE, TERMINAL};
pub use options::{DeviceOptions, DeviceReport, FillConvention, PermissionLevel};
