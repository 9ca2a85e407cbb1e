//! Potential intensity solver module
//!
//! Two routines make up the solver:
//!
//! - [`evaluate_cape`] lifts a single parcel through a sounding and
//!   integrates its convective available potential energy
//! - [`solve_pcmin`] iterates three CAPE evaluations to the minimum central
//!   pressure and maximum wind a tropical cyclone can reach
//!
//! Both are pure functions of their inputs and an immutable configuration,
//! so callers may evaluate many columns concurrently.
//!
//! # Example
//!
//! ```
//! use mpi_core::core_types::{Celsius, Hectopascals};
//! use mpi_core::reference::tropical_sounding;
//! use mpi_core::solver::{solve_pcmin, PcminOutcome, SolverConfig};
//!
//! let config = SolverConfig::emanuel_default();
//! let outcome = solve_pcmin(
//!     Celsius::new(30.0),
//!     Hectopascals::new(1010.0),
//!     &tropical_sounding(),
//!     &config,
//! );
//! assert!(matches!(outcome, PcminOutcome::Solved(_)));
//! ```

mod cape;
pub mod config;
pub mod outcome;
mod pcmin;

// Re-exports
pub use cape::evaluate_cape;
pub use config::{AscentMode, CapeConfig, ConfigError, SolverConfig};
pub use outcome::{
    CapeOutcome, CapeParcel, CapeResult, CapeStatus, MpiDiagnostics, MpiRecord, MpiSolution,
    PcminFailure, PcminOutcome, SolutionStatus, UnsuitableReason, LEGACY_FLAG_CAPE_FAILURE,
    LEGACY_FLAG_NO_SOLUTION, LEGACY_FLAG_OK,
};
pub use pcmin::solve_pcmin;
