//! C ABI for the potential intensity solver.
//!
//! Every entry point returns an [`MpiErrorCode`]; on failure the message is
//! available from `mpi_get_last_error()` on the same thread. Results are
//! written through caller-provided out-pointers, and the header `MpiFFI.h`
//! is generated at build time.

// ============================================================================
// ERROR HANDLING
// ============================================================================

mod error;
mod helpers;

pub use error::{mpi_get_last_error, mpi_get_last_error_code, MpiErrorCode};

// ============================================================================
// CONFIGURATION AND SOLVER
// ============================================================================

mod config;
mod solver;

pub use config::{mpi_config_default, MpiConfigC};
pub use solver::{
    mpi_evaluate_cape, mpi_solve_pcmin, CapeRecordC, MpiRecordC, ParcelC, SoundingC,
    MPI_CAPE_NOT_CONVERGED, MPI_CAPE_OK, MPI_CAPE_UNSUITABLE,
};
