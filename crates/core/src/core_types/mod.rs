//! Core types and utilities

pub mod parcel;
pub mod sounding;
pub mod units;

pub use parcel::ParcelState;
pub use sounding::{Level, Sounding, SoundingError, SoundingView};
pub use units::*;
