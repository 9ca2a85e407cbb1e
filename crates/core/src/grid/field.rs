//! Gridded potential intensity over a basin.
//!
//! An [`EnvironmentalField`] holds one [`ColumnInput`] per cell of a
//! latitude-longitude grid (row-major, latitude first) on a shared set of
//! pressure levels. Solving evaluates every ocean cell independently and in
//! parallel; the resulting [`MpiField`] keeps each cell's full outcome and
//! can be flattened into NaN-filled maps.

use super::column::{CellEstimate, ColumnInput};
use crate::solver::{PcminFailure, PcminOutcome, SolutionStatus, SolverConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Environmental inputs of a whole grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalField {
    nlat: usize,
    nlon: usize,
    levels: Vec<f64>,
    cells: Vec<ColumnInput>,
}

impl EnvironmentalField {
    /// Create a field of `nlat × nlon` cells on `levels` (hPa).
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] if the level set is empty, the cell count does
    /// not match the grid, or a cell's profile length differs from the
    /// level count.
    pub fn new(
        nlat: usize,
        nlon: usize,
        levels: Vec<f64>,
        cells: Vec<ColumnInput>,
    ) -> Result<Self, FieldError> {
        if levels.is_empty() {
            return Err(FieldError::NoLevels);
        }
        if cells.len() != nlat * nlon {
            return Err(FieldError::CellCountMismatch {
                expected: nlat * nlon,
                actual: cells.len(),
            });
        }
        for (cell, column) in cells.iter().enumerate() {
            for actual in [column.temperature.len(), column.mixing_ratio.len()] {
                if actual != levels.len() {
                    return Err(FieldError::ProfileLengthMismatch {
                        cell,
                        expected: levels.len(),
                        actual,
                    });
                }
            }
        }

        Ok(Self {
            nlat,
            nlon,
            levels,
            cells,
        })
    }

    /// Number of latitude rows
    pub fn nlat(&self) -> usize {
        self.nlat
    }

    /// Number of longitude columns
    pub fn nlon(&self) -> usize {
        self.nlon
    }

    /// Pressure levels shared by every column (hPa)
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Column at (`lat`, `lon`), if inside the grid
    pub fn column(&self, lat: usize, lon: usize) -> Option<&ColumnInput> {
        if lat < self.nlat && lon < self.nlon {
            self.cells.get(lat * self.nlon + lon)
        } else {
            None
        }
    }

    /// Evaluate every cell in parallel.
    pub fn solve(&self, config: &SolverConfig) -> MpiField {
        debug!(
            nlat = self.nlat,
            nlon = self.nlon,
            levels = self.levels.len(),
            "Solving potential intensity field"
        );

        let cells: Vec<CellEstimate> = self
            .cells
            .par_iter()
            .map(|column| column.estimate(&self.levels, config))
            .collect();

        let field = MpiField {
            nlat: self.nlat,
            nlon: self.nlon,
            cells,
        };
        let summary = field.summary();
        info!(
            "Potential intensity field {}x{} solved: {}",
            self.nlat, self.nlon, summary
        );
        field
    }
}

/// Errors raised while assembling an [`EnvironmentalField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No pressure levels were given
    NoLevels,
    /// Number of cells differs from `nlat × nlon`
    CellCountMismatch {
        /// `nlat × nlon`
        expected: usize,
        /// Cells supplied
        actual: usize,
    },
    /// A cell's profile does not have one value per level
    ProfileLengthMismatch {
        /// Row-major cell index
        cell: usize,
        /// Number of levels
        expected: usize,
        /// Profile length found
        actual: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::NoLevels => write!(f, "Field has no pressure levels"),
            FieldError::CellCountMismatch { expected, actual } => {
                write!(f, "Field expects {expected} cells, got {actual}")
            }
            FieldError::ProfileLengthMismatch {
                cell,
                expected,
                actual,
            } => write!(
                f,
                "Cell {cell} profile has {actual} values for {expected} levels"
            ),
        }
    }
}

impl std::error::Error for FieldError {}

/// Solved potential intensity field.
#[derive(Debug, Clone, PartialEq)]
pub struct MpiField {
    nlat: usize,
    nlon: usize,
    cells: Vec<CellEstimate>,
}

impl MpiField {
    /// Number of latitude rows
    pub fn nlat(&self) -> usize {
        self.nlat
    }

    /// Number of longitude columns
    pub fn nlon(&self) -> usize {
        self.nlon
    }

    /// All cell estimates, row-major
    pub fn cells(&self) -> &[CellEstimate] {
        &self.cells
    }

    /// Estimate at (`lat`, `lon`), if inside the grid
    pub fn get(&self, lat: usize, lon: usize) -> Option<&CellEstimate> {
        if lat < self.nlat && lon < self.nlon {
            self.cells.get(lat * self.nlon + lon)
        } else {
            None
        }
    }

    /// Minimum central pressure per cell (hPa), NaN where undefined
    pub fn min_pressure_map(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|cell| cell.to_record().min_pressure)
            .collect()
    }

    /// Maximum surface wind per cell (m/s), NaN where undefined
    pub fn max_wind_map(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|cell| cell.to_record().max_wind)
            .collect()
    }

    /// Count cells by outcome
    pub fn summary(&self) -> FieldSummary {
        let mut summary = FieldSummary::default();
        for cell in &self.cells {
            match cell {
                CellEstimate::Masked => summary.masked += 1,
                CellEstimate::Invalid(_) => summary.invalid += 1,
                CellEstimate::Evaluated(PcminOutcome::Solved(solution)) => {
                    summary.solved += 1;
                    if solution.status == SolutionStatus::CapeFailure {
                        summary.low_confidence += 1;
                    }
                }
                CellEstimate::Evaluated(PcminOutcome::Failed(failure)) => match failure {
                    PcminFailure::EnvironmentUnsupportive => summary.unsupportive += 1,
                    PcminFailure::NonConvergent { .. } => summary.non_convergent += 1,
                    PcminFailure::CapeUndefined { .. }
                    | PcminFailure::InvalidParcelLevel { .. } => summary.cape_undefined += 1,
                },
            }
        }
        summary
    }
}

/// Cell counts of a solved field by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    /// Land or missing-SST cells
    pub masked: usize,
    /// Ocean cells with malformed profiles
    pub invalid: usize,
    /// Cells with an MPI estimate
    pub solved: usize,
    /// Solved cells flagged with a CAPE convergence failure
    pub low_confidence: usize,
    /// Cells too cold to support a cyclone
    pub unsupportive: usize,
    /// Cells where the pressure iteration ran away
    pub non_convergent: usize,
    /// Cells where a parcel could not be lifted
    pub cape_undefined: usize,
}

impl FieldSummary {
    /// Total number of cells
    pub fn total(&self) -> usize {
        self.masked
            + self.invalid
            + self.solved
            + self.unsupportive
            + self.non_convergent
            + self.cape_undefined
    }
}

impl fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} solved ({} low confidence), {} masked, {} invalid, {} unsupportive, {} non-convergent, {} CAPE undefined",
            self.solved,
            self.low_confidence,
            self.masked,
            self.invalid,
            self.unsupportive,
            self.non_convergent,
            self.cape_undefined
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{TROPICAL_MIXING_RATIO, TROPICAL_PRESSURE, TROPICAL_TEMPERATURE};

    fn column(sst: f64) -> ColumnInput {
        ColumnInput {
            sst,
            slp: 1013.0,
            temperature: TROPICAL_TEMPERATURE.to_vec(),
            mixing_ratio: TROPICAL_MIXING_RATIO.to_vec(),
        }
    }

    fn field(ssts: &[f64], nlat: usize, nlon: usize) -> EnvironmentalField {
        EnvironmentalField::new(
            nlat,
            nlon,
            TROPICAL_PRESSURE.to_vec(),
            ssts.iter().map(|&sst| column(sst)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_wrong_cell_count() {
        let err = EnvironmentalField::new(2, 2, TROPICAL_PRESSURE.to_vec(), vec![column(28.0)])
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::CellCountMismatch {
                expected: 4,
                actual: 1
            }
        );
    }

    #[test]
    fn test_rejects_short_profile() {
        let mut short = column(28.0);
        short.mixing_ratio.pop();
        let err =
            EnvironmentalField::new(1, 2, TROPICAL_PRESSURE.to_vec(), vec![column(28.0), short])
                .unwrap_err();
        assert_eq!(
            err,
            FieldError::ProfileLengthMismatch {
                cell: 1,
                expected: 19,
                actual: 18
            }
        );
        assert!(err.to_string().contains("Cell 1"));
    }

    #[test]
    fn test_rejects_empty_levels() {
        assert_eq!(
            EnvironmentalField::new(0, 0, Vec::new(), Vec::new()).unwrap_err(),
            FieldError::NoLevels
        );
    }

    #[test]
    fn test_solve_maps_every_outcome() {
        let field = field(&[28.0, f64::NAN, 3.0, 36.0, 30.0, 26.0], 2, 3);
        let solved = field.solve(&SolverConfig::default());

        let summary = solved.summary();
        assert_eq!(summary.solved, 3);
        assert_eq!(summary.masked, 1);
        assert_eq!(summary.unsupportive, 1);
        assert_eq!(summary.non_convergent, 1);
        assert_eq!(summary.total(), 6);

        let pmin = solved.min_pressure_map();
        assert_eq!(pmin.len(), 6);
        assert!((pmin[0] - 951.41).abs() < 0.1);
        assert!(pmin[1].is_nan());
        assert!(pmin[2].is_nan());
        assert!(pmin[3].is_nan());
        assert!(pmin[4] < pmin[0] && pmin[0] < pmin[5]);

        let vmax = solved.max_wind_map();
        assert!(vmax[4] > vmax[0] && vmax[0] > vmax[5]);

        assert_eq!(solved.get(1, 1), solved.cells().get(4));
        assert!(solved.get(2, 0).is_none());
    }

    #[test]
    fn test_parallel_solve_matches_cellwise_estimate() {
        let field = field(&[27.0, 28.5, 29.5, 30.5], 2, 2);
        let config = SolverConfig::default();
        let solved = field.solve(&config);
        for lat in 0..2 {
            for lon in 0..2 {
                let expected = field
                    .column(lat, lon)
                    .unwrap()
                    .estimate(field.levels(), &config);
                assert_eq!(solved.get(lat, lon), Some(&expected));
            }
        }
    }
}
