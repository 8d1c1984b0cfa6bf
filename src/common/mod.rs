pub mod config;
pub mod device;
pub mod error;
pub mod resources;

pub use config::Config;
pub use device::{DeviceKind, DevicePreference, Precision};
