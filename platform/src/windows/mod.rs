pub mod device;

pub use device::WindowsDevicePaths;
