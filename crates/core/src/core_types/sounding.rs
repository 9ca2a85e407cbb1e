//! Environmental soundings
//!
//! A sounding is the vertical profile of pressure, temperature and water
//! vapour mixing ratio that a lifted parcel is compared against. Levels are
//! ordered from the surface upward, so pressure strictly decreases with the
//! level index.
//!
//! Soundings are validated once at construction and never mutated. The CAPE
//! evaluator ignores everything at or above its pressure floor by borrowing a
//! shorter [`SoundingView`] rather than copying or trimming the profile.

use super::units::{grams_per_kilogram_to_kg_per_kg, Celsius, Hectopascals, Kelvin};
use crate::atmosphere::virtual_temperature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single sounding level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    /// Pressure (hPa)
    pub pressure: Hectopascals,
    /// Temperature (K)
    pub temperature: Kelvin,
    /// Water vapour mixing ratio (kg/kg)
    pub mixing_ratio: f64,
}

/// Validated environmental sounding (pressure hPa, temperature K, mixing ratio kg/kg).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sounding {
    pressure: Vec<f64>,
    temperature: Vec<f64>,
    mixing_ratio: Vec<f64>,
}

impl Sounding {
    /// Minimum number of levels needed to integrate anything.
    pub const MIN_LEVELS: usize = 2;

    /// Create a sounding from solver-unit columns.
    ///
    /// # Arguments
    ///
    /// * `pressure_hpa` - Level pressures (hPa), strictly decreasing
    /// * `temperature_k` - Level temperatures (K)
    /// * `mixing_ratio` - Level water vapour mixing ratios (kg/kg)
    ///
    /// # Errors
    ///
    /// Returns [`SoundingError`] if the columns differ in length, hold fewer
    /// than [`Sounding::MIN_LEVELS`] levels, contain non-finite values or
    /// non-positive pressures, or if pressure does not strictly decrease.
    pub fn new(
        pressure_hpa: Vec<f64>,
        temperature_k: Vec<f64>,
        mixing_ratio: Vec<f64>,
    ) -> Result<Self, SoundingError> {
        if pressure_hpa.len() != temperature_k.len() || pressure_hpa.len() != mixing_ratio.len()
        {
            return Err(SoundingError::LengthMismatch {
                pressure: pressure_hpa.len(),
                temperature: temperature_k.len(),
                mixing_ratio: mixing_ratio.len(),
            });
        }
        if pressure_hpa.len() < Self::MIN_LEVELS {
            return Err(SoundingError::TooFewLevels(pressure_hpa.len()));
        }

        for level in 0..pressure_hpa.len() {
            let (p, t, r) = (pressure_hpa[level], temperature_k[level], mixing_ratio[level]);
            if !(p.is_finite() && t.is_finite() && r.is_finite()) {
                return Err(SoundingError::NonFinite { level });
            }
            if p <= 0.0 {
                return Err(SoundingError::NonPositivePressure { level, pressure: p });
            }
            if level > 0 && p >= pressure_hpa[level - 1] {
                return Err(SoundingError::PressureNotDecreasing { level });
            }
        }

        Ok(Self {
            pressure: pressure_hpa,
            temperature: temperature_k,
            mixing_ratio,
        })
    }

    /// Create a sounding from columns already known to be valid, such as
    /// compiled-in reference profiles.
    pub(crate) fn from_validated(
        pressure_hpa: Vec<f64>,
        temperature_k: Vec<f64>,
        mixing_ratio: Vec<f64>,
    ) -> Self {
        debug_assert!(
            Self::new(pressure_hpa.clone(), temperature_k.clone(), mixing_ratio.clone()).is_ok()
        );
        Self {
            pressure: pressure_hpa,
            temperature: temperature_k,
            mixing_ratio,
        }
    }

    /// Create a sounding from driver-unit columns: temperature in °C and
    /// mixing ratio in g/kg, as reanalysis drivers hand them over.
    ///
    /// # Errors
    ///
    /// Same as [`Sounding::new`].
    pub fn from_observed(
        pressure_hpa: &[f64],
        temperature_c: &[f64],
        mixing_ratio_g_per_kg: &[f64],
    ) -> Result<Self, SoundingError> {
        let temperature = temperature_c
            .iter()
            .map(|&t| *Celsius::from(t).to_kelvin())
            .collect();
        let mixing_ratio = mixing_ratio_g_per_kg
            .iter()
            .map(|&r| grams_per_kilogram_to_kg_per_kg(r))
            .collect();
        Self::new(pressure_hpa.to_vec(), temperature, mixing_ratio)
    }

    /// Number of levels
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Always false for a validated sounding; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Level pressures (hPa)
    #[inline]
    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    /// Level temperatures (K)
    #[inline]
    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    /// Level mixing ratios (kg/kg)
    #[inline]
    pub fn mixing_ratio(&self) -> &[f64] {
        &self.mixing_ratio
    }

    /// Level at `index`, if present.
    pub fn level(&self, index: usize) -> Option<Level> {
        Some(Level {
            pressure: Hectopascals::from(*self.pressure.get(index)?),
            temperature: Kelvin::from(self.temperature[index]),
            mixing_ratio: self.mixing_ratio[index],
        })
    }

    /// Lowest (surface) level
    pub fn surface(&self) -> Level {
        Level {
            pressure: Hectopascals::from(self.pressure[0]),
            temperature: Kelvin::from(self.temperature[0]),
            mixing_ratio: self.mixing_ratio[0],
        }
    }

    /// Coldest temperature anywhere in the profile
    pub fn min_temperature(&self) -> Kelvin {
        Kelvin::from(self.temperature.iter().copied().fold(f64::INFINITY, f64::min))
    }

    /// Borrow the levels strictly below the pressure floor `ptop`.
    ///
    /// The view keeps every level up to and including the highest one whose
    /// pressure exceeds `ptop`. If no level does, the surface level alone is
    /// kept so that the view is never empty.
    pub fn below(&self, ptop: Hectopascals) -> SoundingView<'_> {
        let top = self
            .pressure
            .iter()
            .rposition(|&p| p > *ptop)
            .unwrap_or(0);
        let len = top + 1;
        SoundingView {
            pressure: &self.pressure[..len],
            temperature: &self.temperature[..len],
            mixing_ratio: &self.mixing_ratio[..len],
        }
    }
}

/// Borrowed, possibly truncated, view of a [`Sounding`].
#[derive(Debug, Clone, Copy)]
pub struct SoundingView<'a> {
    pressure: &'a [f64],
    temperature: &'a [f64],
    mixing_ratio: &'a [f64],
}

impl<'a> SoundingView<'a> {
    /// Number of levels in the view
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// True if the view has no levels (never the case for views from [`Sounding::below`])
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Index of the highest level in the view
    #[inline]
    pub fn top_index(&self) -> usize {
        self.pressure.len().saturating_sub(1)
    }

    /// Level pressures (hPa)
    #[inline]
    pub fn pressure(&self) -> &'a [f64] {
        self.pressure
    }

    /// Level temperatures (K)
    #[inline]
    pub fn temperature(&self) -> &'a [f64] {
        self.temperature
    }

    /// Level mixing ratios (kg/kg)
    #[inline]
    pub fn mixing_ratio(&self) -> &'a [f64] {
        self.mixing_ratio
    }

    /// Lowest level whose pressure is at or below `pressure`, i.e. the first
    /// level at or above a parcel starting at `pressure`.
    pub fn first_level_at_or_above(&self, pressure: f64) -> Option<usize> {
        self.pressure.iter().position(|&p| p <= pressure)
    }

    /// Environmental virtual temperature at `index` (K)
    #[inline]
    pub fn virtual_temperature(&self, index: usize) -> f64 {
        virtual_temperature(self.temperature[index], self.mixing_ratio[index])
    }
}

/// Errors raised while validating a sounding.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundingError {
    /// Fewer levels than [`Sounding::MIN_LEVELS`]
    TooFewLevels(usize),
    /// Columns have different lengths
    LengthMismatch {
        /// Pressure column length
        pressure: usize,
        /// Temperature column length
        temperature: usize,
        /// Mixing ratio column length
        mixing_ratio: usize,
    },
    /// A value at `level` is NaN or infinite
    NonFinite {
        /// Offending level index
        level: usize,
    },
    /// Pressure at `level` is zero or negative
    NonPositivePressure {
        /// Offending level index
        level: usize,
        /// Offending pressure (hPa)
        pressure: f64,
    },
    /// Pressure at `level` is not lower than the level beneath it
    PressureNotDecreasing {
        /// Offending level index
        level: usize,
    },
}

impl fmt::Display for SoundingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundingError::TooFewLevels(n) => write!(
                f,
                "Sounding needs at least {} levels, got {n}",
                Sounding::MIN_LEVELS
            ),
            SoundingError::LengthMismatch {
                pressure,
                temperature,
                mixing_ratio,
            } => write!(
                f,
                "Sounding columns differ in length: pressure {pressure}, temperature {temperature}, mixing ratio {mixing_ratio}"
            ),
            SoundingError::NonFinite { level } => {
                write!(f, "Sounding level {level} contains a non-finite value")
            }
            SoundingError::NonPositivePressure { level, pressure } => {
                write!(f, "Sounding level {level} has non-positive pressure {pressure} hPa")
            }
            SoundingError::PressureNotDecreasing { level } => write!(
                f,
                "Sounding pressure must strictly decrease with height (level {level})"
            ),
        }
    }
}

impl std::error::Error for SoundingError {}
