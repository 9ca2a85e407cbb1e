//! Solver configuration
//!
//! Physical tunables and iteration thresholds for the CAPE evaluator and the
//! minimum-pressure solver. Everything the two routines treat as a constant
//! of the model lives here, so a solve is a pure function of its inputs and
//! one immutable configuration value.

use crate::core_types::{Celsius, Hectopascals, Kelvin};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fate of condensate in a lifted parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AscentMode {
    /// All condensate is carried with the parcel and weighs on its buoyancy
    #[default]
    Reversible,
    /// Condensate falls out immediately
    PseudoAdiabatic,
}

impl AscentMode {
    /// Fraction of condensate removed from the parcel (0 reversible, 1 pseudo-adiabatic)
    #[must_use]
    pub const fn fallout_fraction(self) -> f64 {
        match self {
            Self::Reversible => 0.0,
            Self::PseudoAdiabatic => 1.0,
        }
    }
}

/// Thresholds of the CAPE evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapeConfig {
    /// Condensate treatment during ascent
    pub ascent: AscentMode,
    /// Levels at or above this pressure are ignored (hPa)
    pub pressure_floor: Hectopascals,
    /// Convergence threshold of the moist-adiabat temperature iteration (K)
    pub temperature_tolerance: f64,
    /// Iteration cap of the moist-adiabat temperature iteration
    pub max_iterations: u32,
    /// Number of leading iterations that use `damping`
    pub damped_iterations: u32,
    /// Under-relaxation factor for the damped iterations
    pub damping: f64,
    /// Parcels drier than this (kg/kg) are not lifted
    pub min_mixing_ratio: f64,
    /// Parcels colder than this are not lifted
    pub min_parcel_temperature: Kelvin,
}

impl Default for CapeConfig {
    fn default() -> Self {
        Self {
            ascent: AscentMode::Reversible,
            pressure_floor: Hectopascals::new(59.0),
            temperature_tolerance: 0.001,
            max_iterations: 500,
            damped_iterations: 2,
            damping: 0.3,
            min_mixing_ratio: 1e-6,
            min_parcel_temperature: Kelvin::new(200.0),
        }
    }
}

/// Configuration of the maximum potential intensity solver.
///
/// # Example
///
/// ```
/// use mpi_core::solver::{AscentMode, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_ck_cd(1.2)
///     .with_ascent(AscentMode::PseudoAdiabatic);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.cape.ascent.fallout_fraction(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Ratio of surface enthalpy to momentum exchange coefficients, `C_k / C_D`
    pub ck_cd: f64,
    /// Include dissipative heating (scales the wind by `SST / T_out`)
    pub dissipative_heating: bool,
    /// Exponent `b` of the eye wind profile `V = V_m (r / r_m)^b`
    pub eye_profile_exponent: f64,
    /// Sounding level from which near-surface parcels are lifted
    pub parcel_level: usize,
    /// Reduction from gradient wind to 10 m wind
    pub wind_reduction: f64,
    /// First guess of the minimum central pressure
    pub initial_pressure: Hectopascals,
    /// Convergence threshold on successive trial pressures (hPa)
    pub pressure_tolerance: f64,
    /// Outer iteration cap; exceeding it means no stable minimum exists
    pub max_iterations: u32,
    /// Trial pressures below this are treated as runaway (hypercane)
    pub min_trial_pressure: Hectopascals,
    /// Parcel pressure at the radius of maximum wind never exceeds this
    pub max_parcel_pressure: Hectopascals,
    /// Sea-surface temperatures at or below this cannot support a cyclone
    pub min_sea_surface_temperature: Celsius,
    /// Soundings with any level at or below this are rejected
    pub min_sounding_temperature: Kelvin,
    /// CAPE evaluator thresholds
    pub cape: CapeConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            ck_cd: 0.9,
            dissipative_heating: true,
            eye_profile_exponent: 2.0,
            parcel_level: 0,
            wind_reduction: 0.8,
            initial_pressure: Hectopascals::new(970.0),
            pressure_tolerance: 0.2,
            max_iterations: 200,
            min_trial_pressure: Hectopascals::new(400.0),
            max_parcel_pressure: Hectopascals::new(1000.0),
            min_sea_surface_temperature: Celsius::new(5.0),
            min_sounding_temperature: Kelvin::new(100.0),
            cape: CapeConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Standard configuration: reversible ascent, dissipative heating,
    /// `C_k / C_D = 0.9`, parcels from the lowest level.
    #[must_use]
    pub fn emanuel_default() -> Self {
        Self::default()
    }

    /// Standard configuration without dissipative heating.
    #[must_use]
    pub fn no_dissipative_heating() -> Self {
        Self::default().with_dissipative_heating(false)
    }

    /// Standard configuration with pseudo-adiabatic ascent.
    #[must_use]
    pub fn pseudo_adiabatic() -> Self {
        Self::default().with_ascent(AscentMode::PseudoAdiabatic)
    }

    /// Set `C_k / C_D`
    pub fn with_ck_cd(mut self, ck_cd: f64) -> Self {
        self.ck_cd = ck_cd;
        self
    }

    /// Enable or disable dissipative heating
    pub fn with_dissipative_heating(mut self, enabled: bool) -> Self {
        self.dissipative_heating = enabled;
        self
    }

    /// Set the eye wind-profile exponent `b`
    pub fn with_eye_profile_exponent(mut self, b: f64) -> Self {
        self.eye_profile_exponent = b;
        self
    }

    /// Set the sounding level parcels are lifted from
    pub fn with_parcel_level(mut self, level: usize) -> Self {
        self.parcel_level = level;
        self
    }

    /// Set the gradient-to-surface wind reduction factor
    pub fn with_wind_reduction(mut self, factor: f64) -> Self {
        self.wind_reduction = factor;
        self
    }

    /// Set the condensate treatment of the CAPE evaluator
    pub fn with_ascent(mut self, ascent: AscentMode) -> Self {
        self.cape.ascent = ascent;
        self
    }

    /// Check that every tunable is finite and in its physical range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first parameter out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ck_cd", self.ck_cd)?;
        positive("eye_profile_exponent", self.eye_profile_exponent)?;
        positive("pressure_tolerance", self.pressure_tolerance)?;
        positive("initial_pressure", *self.initial_pressure)?;
        positive("max_parcel_pressure", *self.max_parcel_pressure)?;
        positive("cape.pressure_floor", *self.cape.pressure_floor)?;
        positive("cape.temperature_tolerance", self.cape.temperature_tolerance)?;
        unit_interval("wind_reduction", self.wind_reduction)?;
        unit_interval("cape.damping", self.cape.damping)?;
        finite("min_trial_pressure", *self.min_trial_pressure)?;
        finite("min_sea_surface_temperature", *self.min_sea_surface_temperature)?;
        finite("min_sounding_temperature", *self.min_sounding_temperature)?;
        finite("cape.min_mixing_ratio", self.cape.min_mixing_ratio)?;
        finite("cape.min_parcel_temperature", *self.cape.min_parcel_temperature)?;
        if self.max_iterations == 0 {
            return Err(ConfigError::new("max_iterations", 0.0, "must be at least 1"));
        }
        if self.cape.max_iterations == 0 {
            return Err(ConfigError::new("cape.max_iterations", 0.0, "must be at least 1"));
        }
        if self.min_trial_pressure >= self.initial_pressure {
            return Err(ConfigError::new(
                "min_trial_pressure",
                *self.min_trial_pressure,
                "must be below initial_pressure",
            ));
        }
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::new(name, value, "must be finite"))
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::new(name, value, "must be finite and positive"))
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::new(name, value, "must be in (0, 1]"))
    }
}

/// A configuration parameter outside its valid range.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Parameter name
    pub parameter: &'static str,
    /// Rejected value
    pub value: f64,
    /// Violated constraint
    pub constraint: &'static str,
}

impl ConfigError {
    fn new(parameter: &'static str, value: f64, constraint: &'static str) -> Self {
        Self {
            parameter,
            value,
            constraint,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solver parameter {} {}, got {}",
            self.parameter, self.constraint, self.value
        )
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_formulation() {
        let config = SolverConfig::default();
        assert_eq!(config.ck_cd, 0.9);
        assert!(config.dissipative_heating);
        assert_eq!(config.eye_profile_exponent, 2.0);
        assert_eq!(config.parcel_level, 0);
        assert_eq!(config.wind_reduction, 0.8);
        assert_eq!(config.initial_pressure, Hectopascals::new(970.0));
        assert_eq!(config.max_iterations, 200);
        assert_eq!(config.cape.ascent, AscentMode::Reversible);
        assert_eq!(config.cape.pressure_floor, Hectopascals::new(59.0));
        assert_eq!(config.cape.max_iterations, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert!(!SolverConfig::no_dissipative_heating().dissipative_heating);
        assert_eq!(
            SolverConfig::pseudo_adiabatic().cape.ascent,
            AscentMode::PseudoAdiabatic
        );
        assert_eq!(SolverConfig::emanuel_default(), SolverConfig::default());
    }

    #[test]
    fn test_fallout_fraction() {
        assert_eq!(AscentMode::Reversible.fallout_fraction(), 0.0);
        assert_eq!(AscentMode::PseudoAdiabatic.fallout_fraction(), 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = SolverConfig::default().with_ck_cd(-1.0).validate().unwrap_err();
        assert_eq!(err.parameter, "ck_cd");

        let err = SolverConfig::default()
            .with_wind_reduction(1.5)
            .validate()
            .unwrap_err();
        assert_eq!(err.parameter, "wind_reduction");
        assert!(err.to_string().contains("(0, 1]"));

        let err = SolverConfig::default()
            .with_eye_profile_exponent(f64::NAN)
            .validate()
            .unwrap_err();
        assert_eq!(err.parameter, "eye_profile_exponent");

        let config = SolverConfig {
            min_trial_pressure: Hectopascals::new(980.0),
            ..SolverConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().parameter,
            "min_trial_pressure"
        );
    }
}
