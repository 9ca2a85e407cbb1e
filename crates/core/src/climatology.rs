//! Multi-year potential intensity climatology.
//!
//! Collapses one minimum-pressure map per year into per-cell mean and
//! standard deviation maps, and draws synthetic years from them by sampling
//! each cell independently from a normal distribution. Synthetic years feed
//! stochastic cyclone track models that need an intensity ceiling per cell.
//!
//! Cells undefined in any year (land, unsupportive or runaway columns) stay
//! undefined in the climatology and in every synthetic year.

use crate::grid::MpiField;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Per-cell mean and standard deviation of yearly maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimatologyMap {
    nlat: usize,
    nlon: usize,
    years: usize,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl ClimatologyMap {
    /// Build the climatology of row-major `nlat × nlon` maps, one per year.
    ///
    /// The standard deviation is the population value (divisor `n`). A NaN
    /// in any year makes that cell's mean and deviation NaN.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError`] if no years are given or a map has the
    /// wrong number of cells.
    pub fn from_years(
        years: &[Vec<f64>],
        nlat: usize,
        nlon: usize,
    ) -> Result<Self, ClimatologyError> {
        if years.is_empty() {
            return Err(ClimatologyError::NoYears);
        }
        let cells = nlat * nlon;
        for (year, map) in years.iter().enumerate() {
            if map.len() != cells {
                return Err(ClimatologyError::ShapeMismatch {
                    year,
                    expected: cells,
                    actual: map.len(),
                });
            }
        }

        let n = years.len() as f64;
        let mut mean = vec![0.0; cells];
        let mut std = vec![0.0; cells];
        for cell in 0..cells {
            let m = years.iter().map(|map| map[cell]).sum::<f64>() / n;
            let variance = years.iter().map(|map| (map[cell] - m).powi(2)).sum::<f64>() / n;
            mean[cell] = m;
            std[cell] = variance.sqrt();
        }

        let map = Self {
            nlat,
            nlon,
            years: years.len(),
            mean,
            std,
        };
        info!(
            years = map.years,
            grid_mean = map.grid_mean(),
            grid_mean_std = map.grid_mean_std(),
            "Climatology built"
        );
        Ok(map)
    }

    /// Climatology of the minimum-pressure maps of solved fields.
    ///
    /// # Errors
    ///
    /// Same as [`ClimatologyMap::from_years`]; every field must share the
    /// first field's grid.
    pub fn from_fields(fields: &[MpiField]) -> Result<Self, ClimatologyError> {
        let Some(first) = fields.first() else {
            return Err(ClimatologyError::NoYears);
        };
        let maps: Vec<Vec<f64>> = fields.iter().map(MpiField::min_pressure_map).collect();
        Self::from_years(&maps, first.nlat(), first.nlon())
    }

    /// Number of latitude rows
    pub fn nlat(&self) -> usize {
        self.nlat
    }

    /// Number of longitude columns
    pub fn nlon(&self) -> usize {
        self.nlon
    }

    /// Number of years averaged
    pub fn years(&self) -> usize {
        self.years
    }

    /// Per-cell mean, row-major
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-cell population standard deviation, row-major
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Mean of the mean map over defined cells (NaN if none are defined)
    pub fn grid_mean(&self) -> f64 {
        finite_mean(&self.mean)
    }

    /// Mean of the standard deviation map over defined cells
    pub fn grid_mean_std(&self) -> f64 {
        finite_mean(&self.std)
    }

    /// Draw one synthetic year. Undefined cells stay NaN.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.mean
            .iter()
            .zip(&self.std)
            .map(|(&mean, &std)| {
                if mean.is_finite() && std.is_finite() {
                    Normal::new(mean, std).map_or(f64::NAN, |normal| normal.sample(&mut *rng))
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    /// Draw `count` synthetic years from a generator seeded with `seed`.
    pub fn generate_years(&self, count: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count).map(|_| self.generate(&mut rng)).collect()
    }
}

fn finite_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Errors raised while building a climatology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClimatologyError {
    /// No yearly maps were given
    NoYears,
    /// A yearly map has the wrong number of cells
    ShapeMismatch {
        /// Index of the offending year
        year: usize,
        /// `nlat × nlon`
        expected: usize,
        /// Cells found
        actual: usize,
    },
}

impl fmt::Display for ClimatologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClimatologyError::NoYears => write!(f, "Climatology needs at least one year"),
            ClimatologyError::ShapeMismatch {
                year,
                expected,
                actual,
            } => write!(f, "Year {year} map has {actual} cells, expected {expected}"),
        }
    }
}

impl std::error::Error for ClimatologyError {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_years() -> Vec<Vec<f64>> {
        vec![
            vec![950.0, 960.0, f64::NAN, 1000.0],
            vec![940.0, 960.0, 980.0, 1000.0],
            vec![960.0, 960.0, 990.0, 1000.0],
        ]
    }

    #[test]
    fn test_mean_and_population_std() {
        let clim = ClimatologyMap::from_years(&sample_years(), 2, 2).unwrap();
        assert_eq!(clim.years(), 3);
        assert_relative_eq!(clim.mean()[0], 950.0, epsilon = 1e-9);
        // Population deviation of (950, 940, 960)
        assert_relative_eq!(clim.std()[0], (200.0_f64 / 3.0).sqrt(), epsilon = 1e-9);
        assert_eq!(clim.std()[1], 0.0);
        assert!(clim.mean()[2].is_nan());
        assert!(clim.std()[2].is_nan());
    }

    #[test]
    fn test_grid_means_skip_undefined_cells() {
        let clim = ClimatologyMap::from_years(&sample_years(), 2, 2).unwrap();
        assert_relative_eq!(clim.grid_mean(), (950.0 + 960.0 + 1000.0) / 3.0, epsilon = 1e-9);
        assert_relative_eq!(
            clim.grid_mean_std(),
            (200.0_f64 / 3.0).sqrt() / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            ClimatologyMap::from_years(&[], 2, 2).unwrap_err(),
            ClimatologyError::NoYears
        );
        let err = ClimatologyMap::from_years(&[vec![1.0; 4], vec![1.0; 3]], 2, 2).unwrap_err();
        assert_eq!(
            err,
            ClimatologyError::ShapeMismatch {
                year: 1,
                expected: 4,
                actual: 3
            }
        );
        assert!(ClimatologyMap::from_fields(&[]).is_err());
    }

    #[test]
    fn test_generate_keeps_mask_and_constant_cells() {
        let clim = ClimatologyMap::from_years(&sample_years(), 2, 2).unwrap();
        let year = clim.generate(&mut StdRng::seed_from_u64(7));
        assert_eq!(year.len(), 4);
        assert!(year[0].is_finite());
        // Zero deviation reproduces the mean exactly
        assert_eq!(year[1], 960.0);
        assert!(year[2].is_nan());
        assert_eq!(year[3], 1000.0);
    }

    #[test]
    fn test_generate_years_is_deterministic() {
        let clim = ClimatologyMap::from_years(&sample_years(), 2, 2).unwrap();
        let a = clim.generate_years(5, 42);
        let b = clim.generate_years(5, 42);
        assert_eq!(a.len(), 5);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x[0], y[0]);
            assert_eq!(x[3], y[3]);
        }
        assert_ne!(a[0][0], a[1][0]);
    }

    #[test]
    fn test_generated_cells_follow_climatology() {
        let years = vec![vec![900.0], vec![920.0], vec![940.0]];
        let clim = ClimatologyMap::from_years(&years, 1, 1).unwrap();
        let draws: Vec<f64> = clim.generate_years(4000, 1).into_iter().map(|y| y[0]).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let std = (draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / draws.len() as f64).sqrt();
        assert_relative_eq!(mean, 920.0, epsilon = 1.0);
        assert_relative_eq!(std, clim.std()[0], epsilon = 1.0);
    }
}
