//! Air parcel state lifted by the CAPE evaluator

use super::sounding::Sounding;
use super::units::{Hectopascals, Kelvin};
use serde::{Deserialize, Serialize};

/// Starting state of a lifted air parcel.
///
/// Parcels are short-lived: the MPI solver builds three of them per outer
/// iteration and each is consumed by a single CAPE evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParcelState {
    /// Starting pressure (hPa)
    pub pressure: Hectopascals,
    /// Starting temperature (K)
    pub temperature: Kelvin,
    /// Water vapour mixing ratio (kg/kg)
    pub mixing_ratio: f64,
}

impl ParcelState {
    /// Create a parcel from its starting pressure, temperature and mixing ratio.
    #[must_use]
    pub fn new(pressure: Hectopascals, temperature: Kelvin, mixing_ratio: f64) -> Self {
        Self {
            pressure,
            temperature,
            mixing_ratio,
        }
    }

    /// Parcel with the environmental properties of sounding level `index`.
    pub fn from_level(sounding: &Sounding, index: usize) -> Option<Self> {
        let level = sounding.level(index)?;
        Some(Self::new(level.pressure, level.temperature, level.mixing_ratio))
    }
}
