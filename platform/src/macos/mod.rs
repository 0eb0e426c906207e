pub mod device;

pub use device::MacOSDevicePaths;
