//! Tagged results of the CAPE evaluator and the MPI solver.
//!
//! Failures are values, never panics. Inside the crate every undefined
//! quantity is represented by a variant rather than a NaN; NaN sentinels
//! only appear when an outcome is flattened into an [`MpiRecord`] for grid
//! drivers and the C ABI.

use crate::core_types::{Hectopascals, Kelvin, MetersPerSecond};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// CAPE
// ═══════════════════════════════════════════════════════════════════════

/// Status flag of a CAPE evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapeStatus {
    /// Evaluation succeeded
    Ok,
    /// Parcel could not be lifted; CAPE undefined
    Unsuitable,
    /// At least one level's moist-adiabat iteration did not converge;
    /// CAPE computed from the last estimates
    NotConverged,
}

/// Why a parcel could not be lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnsuitableReason {
    /// Mixing ratio below the evaluator's minimum
    TooDry,
    /// Temperature below the evaluator's minimum
    TooCold,
    /// Parcel starts above every level of the sounding
    AboveSounding,
}

impl fmt::Display for UnsuitableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsuitableReason::TooDry => write!(f, "parcel carries essentially no water vapour"),
            UnsuitableReason::TooCold => write!(f, "parcel is colder than any physical sounding"),
            UnsuitableReason::AboveSounding => write!(f, "parcel starts above the sounding top"),
        }
    }
}

/// CAPE of a parcel that could be lifted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapeResult {
    /// Convective available potential energy (J/kg), never negative
    pub cape: f64,
    /// Temperature at the level of neutral buoyancy (K)
    pub outflow_temperature: Kelvin,
    /// False if any moist-adiabat iteration hit its cap or an unphysical
    /// saturation pressure
    pub converged: bool,
    /// Largest number of moist-adiabat iterations spent on one level
    pub max_inner_iterations: u32,
}

/// Result of one CAPE evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CapeOutcome {
    /// CAPE was integrated (possibly with unconverged levels)
    Computed(CapeResult),
    /// The parcel could not be lifted
    Unsuitable {
        /// Reason the parcel was rejected
        reason: UnsuitableReason,
        /// Surface temperature of the sounding (K), reported as outflow temperature
        surface_temperature: Kelvin,
    },
}

impl CapeOutcome {
    /// Status flag
    pub fn status(&self) -> CapeStatus {
        match self {
            CapeOutcome::Computed(result) if result.converged => CapeStatus::Ok,
            CapeOutcome::Computed(_) => CapeStatus::NotConverged,
            CapeOutcome::Unsuitable { .. } => CapeStatus::Unsuitable,
        }
    }

    /// True only for a fully converged evaluation
    pub fn is_ok(&self) -> bool {
        self.status() == CapeStatus::Ok
    }

    /// CAPE (J/kg), undefined for unsuitable parcels
    pub fn cape(&self) -> Option<f64> {
        match self {
            CapeOutcome::Computed(result) => Some(result.cape),
            CapeOutcome::Unsuitable { .. } => None,
        }
    }

    /// Outflow temperature (K); the sounding's surface temperature for unsuitable parcels
    pub fn outflow_temperature(&self) -> Kelvin {
        match self {
            CapeOutcome::Computed(result) => result.outflow_temperature,
            CapeOutcome::Unsuitable {
                surface_temperature,
                ..
            } => *surface_temperature,
        }
    }

    /// The computed result, if any
    pub fn result(&self) -> Option<&CapeResult> {
        match self {
            CapeOutcome::Computed(result) => Some(result),
            CapeOutcome::Unsuitable { .. } => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MAXIMUM POTENTIAL INTENSITY
// ═══════════════════════════════════════════════════════════════════════

/// Quality flag of a solved MPI estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolutionStatus {
    /// Every CAPE evaluation converged
    Ok,
    /// At least one CAPE evaluation did not converge; the estimate is low confidence
    CapeFailure,
}

/// Diagnostics of the final outer iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MpiDiagnostics {
    /// Thermodynamic efficiency ratio `SST / T_out` (1 without dissipative heating)
    pub temperature_ratio: f64,
    /// CAPE of the saturated parcel at SST and the radius of maximum wind (J/kg)
    pub cape_saturated: f64,
    /// CAPE of the boundary-layer parcel at the radius of maximum wind (J/kg)
    pub cape_near_surface: f64,
    /// Energy available to the wind, `max(0, CAPE_sat − CAPE_ns)` (J/kg)
    pub energy_availability: f64,
    /// CAPE of the boundary-layer parcel in the ambient environment (J/kg)
    pub cape_ambient: f64,
}

/// A converged maximum potential intensity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MpiSolution {
    /// Minimum central pressure
    pub min_pressure: Hectopascals,
    /// Maximum 10 m wind speed
    pub max_wind: MetersPerSecond,
    /// Outflow temperature of the saturated parcel
    pub outflow_temperature: Kelvin,
    /// Quality flag
    pub status: SolutionStatus,
    /// Number of outer iterations performed
    pub iterations: u32,
    /// Intermediate quantities
    pub diagnostics: MpiDiagnostics,
}

/// The three parcels lifted by the MPI solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapeParcel {
    /// Boundary-layer parcel in the undisturbed environment
    Ambient,
    /// Boundary-layer parcel at the radius of maximum wind
    NearSurface,
    /// Parcel saturated at SST at the radius of maximum wind
    Saturated,
}

/// Why no MPI estimate exists for a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PcminFailure {
    /// SST or sounding too cold to support convection
    EnvironmentUnsupportive,
    /// Trial pressure never stabilized or ran away (hypercane)
    NonConvergent {
        /// Outer iterations performed before giving up
        iterations: u32,
        /// Last trial pressure
        last_pressure: Hectopascals,
    },
    /// One of the parcels could not be lifted, so CAPE is undefined
    CapeUndefined {
        /// Which parcel failed
        parcel: CapeParcel,
        /// Why it failed
        reason: UnsuitableReason,
    },
    /// Configured parcel level does not exist in the sounding
    InvalidParcelLevel {
        /// Configured level
        level: usize,
        /// Levels available
        levels: usize,
    },
}

impl fmt::Display for PcminFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcminFailure::EnvironmentUnsupportive => {
                write!(f, "environment too cold to support convection")
            }
            PcminFailure::NonConvergent {
                iterations,
                last_pressure,
            } => write!(
                f,
                "minimum pressure did not converge after {iterations} iterations (last {last_pressure})"
            ),
            PcminFailure::CapeUndefined { parcel, reason } => {
                write!(f, "CAPE undefined for {parcel:?} parcel: {reason}")
            }
            PcminFailure::InvalidParcelLevel { level, levels } => write!(
                f,
                "parcel level {level} outside sounding with {levels} levels"
            ),
        }
    }
}

/// Result of one MPI solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PcminOutcome {
    /// The iteration converged
    Solved(MpiSolution),
    /// No estimate exists
    Failed(PcminFailure),
}

/// Legacy integer flag: no estimate (cold environment or hypercane)
pub const LEGACY_FLAG_NO_SOLUTION: i32 = 0;
/// Legacy integer flag: success
pub const LEGACY_FLAG_OK: i32 = 1;
/// Legacy integer flag: a CAPE evaluation failed
pub const LEGACY_FLAG_CAPE_FAILURE: i32 = 2;

impl PcminOutcome {
    /// The solution, if the solve succeeded
    pub fn solution(&self) -> Option<&MpiSolution> {
        match self {
            PcminOutcome::Solved(solution) => Some(solution),
            PcminOutcome::Failed(_) => None,
        }
    }

    /// The failure, if the solve failed
    pub fn failure(&self) -> Option<&PcminFailure> {
        match self {
            PcminOutcome::Solved(_) => None,
            PcminOutcome::Failed(failure) => Some(failure),
        }
    }

    /// Minimum central pressure, if defined
    pub fn min_pressure(&self) -> Option<Hectopascals> {
        self.solution().map(|s| s.min_pressure)
    }

    /// Maximum wind, if defined
    pub fn max_wind(&self) -> Option<MetersPerSecond> {
        self.solution().map(|s| s.max_wind)
    }

    /// Legacy integer flag (see the `LEGACY_FLAG_*` constants)
    pub fn legacy_flag(&self) -> i32 {
        match self {
            PcminOutcome::Solved(MpiSolution {
                status: SolutionStatus::Ok,
                ..
            }) => LEGACY_FLAG_OK,
            PcminOutcome::Solved(_) | PcminOutcome::Failed(PcminFailure::CapeUndefined { .. }) => {
                LEGACY_FLAG_CAPE_FAILURE
            }
            PcminOutcome::Failed(_) => LEGACY_FLAG_NO_SOLUTION,
        }
    }

    /// Flatten into a record with NaN for every undefined quantity.
    pub fn to_record(&self) -> MpiRecord {
        let flag = self.legacy_flag();
        match self {
            PcminOutcome::Solved(s) => MpiRecord {
                min_pressure: *s.min_pressure,
                max_wind: *s.max_wind,
                outflow_temperature: *s.outflow_temperature,
                flag,
                temperature_ratio: s.diagnostics.temperature_ratio,
                cape_saturated: s.diagnostics.cape_saturated,
                cape_near_surface: s.diagnostics.cape_near_surface,
                energy_availability: s.diagnostics.energy_availability,
                cape_ambient: s.diagnostics.cape_ambient,
            },
            PcminOutcome::Failed(_) => MpiRecord {
                flag,
                ..MpiRecord::undefined()
            },
        }
    }
}

/// Flat MPI record with NaN sentinels, for grid maps and foreign callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MpiRecord {
    /// Minimum central pressure (hPa) or NaN
    pub min_pressure: f64,
    /// Maximum 10 m wind (m/s) or NaN
    pub max_wind: f64,
    /// Outflow temperature (K) or NaN
    pub outflow_temperature: f64,
    /// Legacy integer flag
    pub flag: i32,
    /// `SST / T_out` or NaN
    pub temperature_ratio: f64,
    /// Saturated CAPE (J/kg) or NaN
    pub cape_saturated: f64,
    /// Near-surface CAPE (J/kg) or NaN
    pub cape_near_surface: f64,
    /// Energy availability (J/kg) or NaN
    pub energy_availability: f64,
    /// Ambient CAPE (J/kg) or NaN
    pub cape_ambient: f64,
}

impl MpiRecord {
    /// A record with every quantity undefined (masked cell)
    pub fn undefined() -> Self {
        Self {
            min_pressure: f64::NAN,
            max_wind: f64::NAN,
            outflow_temperature: f64::NAN,
            flag: LEGACY_FLAG_NO_SOLUTION,
            temperature_ratio: f64::NAN,
            cape_saturated: f64::NAN,
            cape_near_surface: f64::NAN,
            energy_availability: f64::NAN,
            cape_ambient: f64::NAN,
        }
    }
}
