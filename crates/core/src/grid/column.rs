//! Per-cell inputs of the grid driver.

use crate::core_types::{
    kg_per_kg_to_grams_per_kilogram, specific_humidity_to_mixing_ratio, Celsius, Hectopascals,
    Kelvin, Sounding, SoundingError,
};
use crate::solver::{solve_pcmin, MpiRecord, PcminOutcome, SolverConfig};
use serde::{Deserialize, Serialize};

/// Environmental inputs of one grid cell in driver units.
///
/// A NaN sea-surface temperature marks land or missing data; such cells are
/// masked and never handed to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInput {
    /// Sea-surface temperature (°C), NaN over land
    pub sst: f64,
    /// Sea-level pressure (hPa)
    pub slp: f64,
    /// Temperature at each field level (°C)
    pub temperature: Vec<f64>,
    /// Water vapour mixing ratio at each field level (g/kg)
    pub mixing_ratio: Vec<f64>,
}

/// How reanalysis specific humidity becomes the solver's mixing ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HumidityConversion {
    /// `r = q / (1 - q)`
    #[default]
    Exact,
    /// `r = q`, as older MPI maps were produced; about 2% dry in the tropics
    Legacy,
}

impl HumidityConversion {
    /// Mixing ratio (kg/kg) for specific humidity `q` (kg/kg)
    pub fn mixing_ratio(self, q: f64) -> f64 {
        match self {
            HumidityConversion::Exact => specific_humidity_to_mixing_ratio(q),
            HumidityConversion::Legacy => q,
        }
    }
}

impl ColumnInput {
    /// Build a column from reanalysis units: SST and temperatures in K,
    /// sea-level pressure in Pa and specific humidity in kg/kg.
    pub fn from_reanalysis(
        sst_k: f64,
        slp_pa: f64,
        temperature_k: &[f64],
        specific_humidity: &[f64],
    ) -> Self {
        Self::from_reanalysis_with(
            sst_k,
            slp_pa,
            temperature_k,
            specific_humidity,
            HumidityConversion::Exact,
        )
    }

    /// Same as [`ColumnInput::from_reanalysis`] with an explicit humidity
    /// conversion. [`HumidityConversion::Legacy`] reproduces maps made by
    /// drivers that fed specific humidity straight in as mixing ratio.
    pub fn from_reanalysis_with(
        sst_k: f64,
        slp_pa: f64,
        temperature_k: &[f64],
        specific_humidity: &[f64],
        conversion: HumidityConversion,
    ) -> Self {
        Self {
            sst: *Kelvin::from(sst_k).to_celsius(),
            slp: *Hectopascals::from_pascals(slp_pa),
            temperature: temperature_k
                .iter()
                .map(|&t| *Kelvin::from(t).to_celsius())
                .collect(),
            mixing_ratio: specific_humidity
                .iter()
                .map(|&q| kg_per_kg_to_grams_per_kilogram(conversion.mixing_ratio(q)))
                .collect(),
        }
    }

    /// True for land or missing-data cells
    pub fn is_masked(&self) -> bool {
        self.sst.is_nan()
    }

    /// Validated sounding of this column on `levels` (hPa).
    ///
    /// # Errors
    ///
    /// Returns [`SoundingError`] if the profile is malformed or holds missing values.
    pub fn sounding(&self, levels: &[f64]) -> Result<Sounding, SoundingError> {
        Sounding::from_observed(levels, &self.temperature, &self.mixing_ratio)
    }

    /// Evaluate this column on `levels`.
    pub fn estimate(&self, levels: &[f64], config: &SolverConfig) -> CellEstimate {
        if self.is_masked() {
            return CellEstimate::Masked;
        }
        match self.sounding(levels) {
            Ok(sounding) => CellEstimate::Evaluated(solve_pcmin(
                Celsius::from(self.sst),
                Hectopascals::from(self.slp),
                &sounding,
                config,
            )),
            Err(err) => CellEstimate::Invalid(err),
        }
    }
}

/// Result for one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellEstimate {
    /// Land or missing sea-surface temperature
    Masked,
    /// Ocean cell whose profile could not form a sounding
    Invalid(SoundingError),
    /// Ocean cell handed to the solver
    Evaluated(PcminOutcome),
}

impl CellEstimate {
    /// Flat record with NaN sentinels for every undefined quantity
    pub fn to_record(&self) -> MpiRecord {
        match self {
            CellEstimate::Evaluated(outcome) => outcome.to_record(),
            CellEstimate::Masked | CellEstimate::Invalid(_) => MpiRecord::undefined(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{tropical_sounding, TROPICAL_PRESSURE};
    use approx::assert_relative_eq;

    fn tropical_column(sst: f64) -> ColumnInput {
        let sounding = tropical_sounding();
        ColumnInput {
            sst,
            slp: 1013.0,
            temperature: sounding
                .temperature()
                .iter()
                .map(|&t| *Kelvin::from(t).to_celsius())
                .collect(),
            mixing_ratio: sounding
                .mixing_ratio()
                .iter()
                .map(|&r| kg_per_kg_to_grams_per_kilogram(r))
                .collect(),
        }
    }

    #[test]
    fn test_from_reanalysis_converts_units() {
        let column = ColumnInput::from_reanalysis(301.15, 101_300.0, &[299.15, 273.15], &[0.02, 0.0]);
        assert_relative_eq!(column.sst, 28.0, epsilon = 1e-9);
        assert_relative_eq!(column.slp, 1013.0, epsilon = 1e-9);
        assert_relative_eq!(column.temperature[0], 26.0, epsilon = 1e-9);
        assert_relative_eq!(column.temperature[1], 0.0, epsilon = 1e-9);
        // r = q / (1 - q)
        assert_relative_eq!(column.mixing_ratio[0], 20.0 / 0.98, epsilon = 1e-9);
        assert_eq!(column.mixing_ratio[1], 0.0);
    }

    #[test]
    fn test_legacy_humidity_conversion_passes_q_through() {
        let q = [0.0173, 0.0, 0.002];
        let t = [299.15, 273.15, 250.0];
        let exact = ColumnInput::from_reanalysis(301.15, 101_300.0, &t, &q);
        let legacy = ColumnInput::from_reanalysis_with(
            301.15,
            101_300.0,
            &t,
            &q,
            HumidityConversion::Legacy,
        );
        assert_relative_eq!(legacy.mixing_ratio[0], 17.3, epsilon = 1e-9);
        assert_relative_eq!(legacy.mixing_ratio[2], 2.0, epsilon = 1e-9);
        assert_eq!(legacy.mixing_ratio[1], 0.0);
        assert!(legacy.mixing_ratio[0] < exact.mixing_ratio[0]);
        assert_eq!(legacy.temperature, exact.temperature);
        assert_eq!(HumidityConversion::default(), HumidityConversion::Exact);
    }

    #[test]
    fn test_legacy_column_solves_with_drier_boundary_layer() {
        let sounding = tropical_sounding();
        let t_k = sounding.temperature().to_vec();
        let q: Vec<f64> = sounding
            .mixing_ratio()
            .iter()
            .map(|&r| r / (1.0 + r))
            .collect();
        let solve = |conversion| {
            let column =
                ColumnInput::from_reanalysis_with(301.15, 101_300.0, &t_k, &q, conversion);
            match column.estimate(&TROPICAL_PRESSURE, &SolverConfig::default()) {
                CellEstimate::Evaluated(outcome) => *outcome.min_pressure().unwrap(),
                other => panic!("expected an evaluated cell, got {other:?}"),
            }
        };
        let exact = solve(HumidityConversion::Exact);
        let legacy = solve(HumidityConversion::Legacy);
        assert!(exact < 1013.0 && legacy < 1013.0);
        assert!((exact - legacy).abs() > 1e-6);
    }

    #[test]
    fn test_nan_sst_is_masked() {
        let column = tropical_column(f64::NAN);
        assert!(column.is_masked());
        assert_eq!(
            column.estimate(&TROPICAL_PRESSURE, &SolverConfig::default()),
            CellEstimate::Masked
        );
        assert!(CellEstimate::Masked.to_record().min_pressure.is_nan());
    }

    #[test]
    fn test_missing_profile_value_is_invalid() {
        let mut column = tropical_column(28.0);
        column.temperature[5] = f64::NAN;
        let estimate = column.estimate(&TROPICAL_PRESSURE, &SolverConfig::default());
        assert_eq!(
            estimate,
            CellEstimate::Invalid(SoundingError::NonFinite { level: 5 })
        );
    }

    #[test]
    fn test_ocean_cell_matches_direct_solve() {
        let column = tropical_column(28.0);
        let estimate = column.estimate(&TROPICAL_PRESSURE, &SolverConfig::default());
        let direct = solve_pcmin(
            Celsius::new(28.0),
            Hectopascals::new(1013.0),
            &tropical_sounding(),
            &SolverConfig::default(),
        );
        let CellEstimate::Evaluated(outcome) = estimate else {
            panic!("ocean cell should be evaluated");
        };
        assert_relative_eq!(
            *outcome.min_pressure().unwrap(),
            *direct.min_pressure().unwrap(),
            epsilon = 1e-6
        );
    }
}
