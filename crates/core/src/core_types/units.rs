//! Semantic unit types for type-safe physical quantity handling
//!
//! This module provides newtype wrappers for the quantities that cross the
//! solver boundary, so that a sea-surface temperature in Celsius cannot be
//! handed to a routine expecting an outflow temperature in Kelvin, and a
//! sea-level pressure in Pascals cannot slip in where hectopascals are meant.
//!
//! # Design Philosophy
//! - All types wrap `f64`: the CAPE integration differences nearly equal
//!   virtual temperatures and needs full double precision
//! - Validated constructors (`new`) assert physical bounds; `From<f64>` is
//!   unchecked and used for values computed inside the solver
//! - Total ordering via `Ord` (NaN handled as greater than all values)
//! - Serde support for serialization
//!
//! # Usage
//! ```
//! use mpi_core::core_types::units::{Celsius, Hectopascals, Kelvin};
//!
//! let sst = Celsius::new(28.0);
//! let kelvin: Kelvin = sst.into();
//! assert!((*kelvin - 301.15).abs() < 1e-9);
//!
//! let slp = Hectopascals::from_pascals(101_300.0);
//! assert_eq!(slp, Hectopascals::new(1013.0));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Implements the shared ordering/deref/conversion boilerplate for an f64 newtype.
macro_rules! f64_quantity {
    ($name:ident) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f64_total_cmp(self.0, other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl PartialEq<f64> for $name {
            fn eq(&self, other: &f64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<f64> for $name {
            fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
                self.0.partial_cmp(other)
            }
        }
    };
}

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Celsius to Kelvin conversion offset (0°C = 273.15 K)
pub const CELSIUS_KELVIN_OFFSET: f64 = 273.15;

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

f64_quantity!(Celsius);

impl Celsius {
    /// Absolute zero in Celsius
    pub const ABSOLUTE_ZERO: Celsius = Celsius(-CELSIUS_KELVIN_OFFSET);

    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -CELSIUS_KELVIN_OFFSET,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Convert to Kelvin
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(self.0 + CELSIUS_KELVIN_OFFSET)
    }
}

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Kelvin {
        c.to_kelvin()
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

/// Temperature in Kelvin (absolute scale)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kelvin(f64);

f64_quantity!(Kelvin);

impl Kelvin {
    /// Absolute zero
    pub const ABSOLUTE_ZERO: Kelvin = Kelvin(0.0);

    /// Create a new Kelvin temperature. Asserts value >= absolute zero (0 K).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Kelvin::new: value is below absolute zero (0 K)");
        Kelvin(value)
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius(self.0 - CELSIUS_KELVIN_OFFSET)
    }
}

impl From<Kelvin> for Celsius {
    fn from(k: Kelvin) -> Celsius {
        k.to_celsius()
    }
}

// Kelvin - Kelvin = temperature difference in K
impl Sub for Kelvin {
    type Output = f64;
    fn sub(self, rhs: Kelvin) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Kelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} K", self.0)
    }
}

// ============================================================================
// PRESSURE
// ============================================================================

/// Pressure in hectopascals (numerically equal to millibars)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hectopascals(f64);

f64_quantity!(Hectopascals);

impl Hectopascals {
    /// Pascals per hectopascal
    const PASCALS_PER_HECTOPASCAL: f64 = 100.0;

    /// Create a new pressure. Asserts value is non-negative.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Hectopascals::new: pressure must be non-negative");
        Hectopascals(value)
    }

    /// Convert from Pascals (reanalysis sea-level pressure is stored in Pa)
    #[inline]
    #[must_use]
    pub fn from_pascals(pascals: f64) -> Self {
        Hectopascals(pascals / Self::PASCALS_PER_HECTOPASCAL)
    }

    /// Convert to Pascals
    #[inline]
    #[must_use]
    pub fn to_pascals(self) -> f64 {
        self.0 * Self::PASCALS_PER_HECTOPASCAL
    }
}

// Hectopascals - Hectopascals = pressure drop in hPa
impl Sub for Hectopascals {
    type Output = f64;
    fn sub(self, rhs: Hectopascals) -> f64 {
        self.0 - rhs.0
    }
}

impl Add<f64> for Hectopascals {
    type Output = Hectopascals;
    fn add(self, rhs: f64) -> Hectopascals {
        Hectopascals(self.0 + rhs)
    }
}

impl fmt::Display for Hectopascals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} hPa", self.0)
    }
}

// ============================================================================
// SPEED
// ============================================================================

/// Wind speed in meters per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

f64_quantity!(MetersPerSecond);

impl MetersPerSecond {
    /// m/s to km/h
    const KMH_PER_MS: f64 = 3.6;

    /// Meters per second to knots
    const KNOTS_PER_MS: f64 = 1.943_844_5;

    /// Create a new speed. Asserts value is non-negative.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "MetersPerSecond::new: speed must be non-negative");
        MetersPerSecond(value)
    }

    /// Convert to km/h
    #[inline]
    #[must_use]
    pub fn to_kmh(self) -> f64 {
        self.0 * Self::KMH_PER_MS
    }

    /// Convert to knots (the unit of operational cyclone advisories)
    #[inline]
    #[must_use]
    pub fn to_knots(self) -> f64 {
        self.0 * Self::KNOTS_PER_MS
    }
}

impl fmt::Display for MetersPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} m/s", self.0)
    }
}

// ============================================================================
// MOISTURE
// ============================================================================

/// Grams per kilogram in one kg/kg
const GRAMS_PER_KILOGRAM: f64 = 1000.0;

/// Convert a mixing ratio from g/kg (driver convention) to kg/kg (solver convention)
#[inline]
#[must_use]
pub fn grams_per_kilogram_to_kg_per_kg(grams_per_kg: f64) -> f64 {
    grams_per_kg / GRAMS_PER_KILOGRAM
}

/// Convert a mixing ratio from kg/kg to g/kg
#[inline]
#[must_use]
pub fn kg_per_kg_to_grams_per_kilogram(kg_per_kg: f64) -> f64 {
    kg_per_kg * GRAMS_PER_KILOGRAM
}

/// Convert specific humidity q (kg/kg) to mixing ratio r = q / (1 - q) (kg/kg)
#[inline]
#[must_use]
pub fn specific_humidity_to_mixing_ratio(specific_humidity: f64) -> f64 {
    specific_humidity / (1.0 - specific_humidity)
}
