//! Tropical Cyclone Potential Intensity Core Library
//!
//! Computes the maximum potential intensity (MPI) of tropical cyclones from
//! sea-surface temperature, sea-level pressure and an environmental sounding,
//! following the Emanuel (1995) and Bister & Emanuel (2002) formulation.
//!
//! ## Components
//!
//! - Moist thermodynamics of lifted parcels (`atmosphere`)
//! - CAPE evaluator and minimum-pressure solver (`solver`)
//! - Parallel evaluation over reanalysis grids (`grid`)
//! - Multi-year climatologies and synthetic fields (`climatology`)

// Core types and utilities
pub mod atmosphere;
pub mod core_types;

// Solver and drivers
pub mod climatology;
pub mod grid;
pub mod reference;
pub mod solver;

// Re-export core types
pub use core_types::{Celsius, Hectopascals, Kelvin, MetersPerSecond};
pub use core_types::{ParcelState, Sounding, SoundingError};

// Re-export solver types
pub use solver::{evaluate_cape, solve_pcmin, CapeOutcome, PcminOutcome, SolverConfig};

// Re-export driver types
pub use climatology::{ClimatologyError, ClimatologyMap};
pub use grid::{
    CellEstimate, ColumnInput, EnvironmentalField, FieldError, HumidityConversion, MpiField,
};
