#![no_std]

#[macro_use]
mod macros;

#[cfg(feature = "simple-network")]
mod adapter;
pub mod error;
pub mod register;
mod spi_device;

pub use error::DriverError;
pub use spi_device::Enc28j60;
