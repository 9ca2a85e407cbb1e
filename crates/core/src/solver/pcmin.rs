//! Maximum potential intensity of a tropical cyclone.
//!
//! # Scientific Background
//!
//! The minimum central pressure follows from the energy a boundary-layer
//! parcel can draw from the ocean between the undisturbed environment and
//! the radius of maximum wind. Three parcels are lifted through the same
//! sounding:
//!
//! - **ambient**: the boundary-layer air of the environment
//! - **near-surface**: the same air brought isothermally to the trial
//!   central pressure, conserving its vapour pressure fraction
//! - **saturated**: air saturated at the sea-surface temperature at the
//!   trial central pressure
//!
//! The pressure drop is the exponential of the CAPE difference between them,
//! divided by `Rd · Tv_av`. Because the near-surface and saturated CAPEs
//! depend on the trial pressure, the estimate is iterated to a fixed point.
//! A trial pressure that keeps falling (or never settles) signals a
//! hypercane regime in which no steady-state storm exists.
//!
//! With dissipative heating the available energy is scaled by the Carnot
//! ratio `SST / T_out`, where `T_out` is the outflow temperature of the
//! saturated parcel.
//!
//! # References
//!
//! - Emanuel, K.A. (1995). "Sensitivity of tropical cyclones to surface
//!   exchange coefficients and a revised steady-state model incorporating
//!   eye dynamics." J. Atmos. Sci., 52, 3969-3976.
//! - Bister, M. & Emanuel, K.A. (1998). "Dissipative heating and hurricane
//!   intensity." Meteorol. Atmos. Phys., 65, 233-240.
//! - Bister, M. & Emanuel, K.A. (2002). "Low frequency variability of tropical
//!   cyclone potential intensity." JGR, 107(D24), 4801.

use super::cape::evaluate_cape;
use super::config::SolverConfig;
use super::outcome::{
    CapeOutcome, CapeParcel, MpiDiagnostics, MpiSolution, PcminFailure, PcminOutcome,
    SolutionStatus,
};
use crate::atmosphere::{saturation_vapor_pressure, EPS_APPROX, RD};
use crate::core_types::{Celsius, Hectopascals, Kelvin, MetersPerSecond, ParcelState, Sounding};
use tracing::{debug, trace};

/// Running record of CAPE evaluation quality across one solve.
struct CapeLedger {
    all_converged: bool,
}

impl CapeLedger {
    /// CAPE and outflow temperature, or the failure naming `parcel`.
    fn record(
        &mut self,
        parcel: CapeParcel,
        outcome: CapeOutcome,
    ) -> Result<(f64, Kelvin), PcminFailure> {
        match outcome {
            CapeOutcome::Computed(result) => {
                if !result.converged {
                    debug!(?parcel, "CAPE evaluation did not converge");
                    self.all_converged = false;
                }
                Ok((result.cape, result.outflow_temperature))
            }
            CapeOutcome::Unsuitable { reason, .. } => {
                debug!(?parcel, %reason, "CAPE undefined");
                Err(PcminFailure::CapeUndefined { parcel, reason })
            }
        }
    }
}

/// Quantities of one outer iteration at trial pressure `pm`.
struct Trial {
    cape_near_surface: f64,
    cape_saturated: f64,
    outflow_temperature: Kelvin,
    temperature_ratio: f64,
    mean_virtual_temperature: f64,
}

/// Solve for the minimum central pressure and maximum surface wind that the
/// ocean and `sounding` can sustain.
///
/// # Arguments
///
/// * `sst` - Sea-surface temperature
/// * `slp` - Ambient sea-level pressure
/// * `sounding` - Environmental sounding, surface first
/// * `config` - Physical tunables and iteration thresholds
///
/// # Example
///
/// ```
/// use mpi_core::core_types::{Celsius, Hectopascals};
/// use mpi_core::reference::tropical_sounding;
/// use mpi_core::solver::{solve_pcmin, SolverConfig};
///
/// let outcome = solve_pcmin(
///     Celsius::new(28.0),
///     Hectopascals::new(1013.0),
///     &tropical_sounding(),
///     &SolverConfig::default(),
/// );
/// let solution = outcome.solution().unwrap();
/// assert!(*solution.min_pressure < 1013.0);
/// assert!(*solution.max_wind > 0.0);
/// ```
pub fn solve_pcmin(
    sst: Celsius,
    slp: Hectopascals,
    sounding: &Sounding,
    config: &SolverConfig,
) -> PcminOutcome {
    match solve(sst, slp, sounding, config) {
        Ok(solution) => PcminOutcome::Solved(solution),
        Err(failure) => {
            debug!(%failure, "No potential intensity estimate");
            PcminOutcome::Failed(failure)
        }
    }
}

fn solve(
    sst: Celsius,
    slp: Hectopascals,
    sounding: &Sounding,
    config: &SolverConfig,
) -> Result<MpiSolution, PcminFailure> {
    if sst <= config.min_sea_surface_temperature
        || sounding.min_temperature() <= config.min_sounding_temperature
    {
        return Err(PcminFailure::EnvironmentUnsupportive);
    }

    let nk = config.parcel_level;
    let boundary_layer = sounding
        .level(nk)
        .ok_or(PcminFailure::InvalidParcelLevel {
            level: nk,
            levels: sounding.len(),
        })?;

    let mut ledger = CapeLedger {
        all_converged: true,
    };
    let ambient = ParcelState::new(
        boundary_layer.pressure,
        boundary_layer.temperature,
        boundary_layer.mixing_ratio,
    );
    let (cape_ambient, _) = ledger.record(
        CapeParcel::Ambient,
        evaluate_cape(&ambient, sounding, &config.cape),
    )?;

    let sst_k = *sst.to_kelvin();
    let es0 = saturation_vapor_pressure(*sst);
    let surface = sounding.surface();
    let surface_tv = *surface.temperature * (1.0 + surface.mixing_ratio / EPS_APPROX)
        / (1.0 + surface.mixing_ratio);

    let trial_at = |pm: f64, ledger: &mut CapeLedger| -> Result<Trial, PcminFailure> {
        let pp = pm.min(*config.max_parcel_pressure);
        let rbl = boundary_layer.mixing_ratio;

        // Boundary-layer air brought to the trial pressure at constant relative humidity
        let rp = EPS_APPROX * rbl * *slp / (pp * (EPS_APPROX + rbl) - rbl * *slp);
        let near_surface =
            ParcelState::new(Hectopascals::from(pp), boundary_layer.temperature, rp);
        let (cape_near_surface, _) = ledger.record(
            CapeParcel::NearSurface,
            evaluate_cape(&near_surface, sounding, &config.cape),
        )?;

        let rs0 = EPS_APPROX * es0 / (pp - es0);
        let saturated = ParcelState::new(Hectopascals::from(pp), sst.to_kelvin(), rs0);
        let (cape_saturated, outflow_temperature) = ledger.record(
            CapeParcel::Saturated,
            evaluate_cape(&saturated, sounding, &config.cape),
        )?;

        let temperature_ratio = if config.dissipative_heating {
            sst_k / *outflow_temperature
        } else {
            1.0
        };
        let mean_virtual_temperature =
            0.5 * (surface_tv + sst_k * (1.0 + rs0 / EPS_APPROX) / (1.0 + rs0));

        Ok(Trial {
            cape_near_surface,
            cape_saturated,
            outflow_temperature,
            temperature_ratio,
            mean_virtual_temperature,
        })
    };

    let pressure_for = |trial: &Trial, energy_factor: f64| -> f64 {
        let cat = (trial.cape_near_surface - cape_ambient
            + config.ck_cd
                * trial.temperature_ratio
                * energy_factor
                * (trial.cape_saturated - trial.cape_near_surface))
            .max(0.0);
        *slp * (-cat / (RD * trial.mean_virtual_temperature)).exp()
    };

    let mut pm = *config.initial_pressure;
    let mut iterations = 0;
    let trial = loop {
        let trial = trial_at(pm, &mut ledger)?;
        let previous = pm;
        pm = pressure_for(&trial, 0.5);
        iterations += 1;
        trace!(iteration = iterations, pressure = pm, "Trial central pressure");

        if iterations > config.max_iterations || pm < *config.min_trial_pressure {
            return Err(PcminFailure::NonConvergent {
                iterations,
                last_pressure: Hectopascals::from(pm),
            });
        }
        if (pm - previous).abs() <= config.pressure_tolerance {
            break trial;
        }
    };

    // Eye dynamics raise the effective energy by (1 + 1/b) / 2
    let eye_factor = 0.5 * (1.0 + 1.0 / config.eye_profile_exponent);
    let min_pressure = pressure_for(&trial, eye_factor);
    let energy_availability = (trial.cape_saturated - trial.cape_near_surface).max(0.0);
    let max_wind = config.wind_reduction
        * (config.ck_cd * trial.temperature_ratio * energy_availability).sqrt();

    let status = if ledger.all_converged {
        SolutionStatus::Ok
    } else {
        SolutionStatus::CapeFailure
    };
    debug!(
        iterations,
        min_pressure,
        max_wind,
        ?status,
        "Potential intensity converged"
    );

    Ok(MpiSolution {
        min_pressure: Hectopascals::from(min_pressure),
        max_wind: MetersPerSecond::from(max_wind),
        outflow_temperature: trial.outflow_temperature,
        status,
        iterations,
        diagnostics: MpiDiagnostics {
            temperature_ratio: trial.temperature_ratio,
            cape_saturated: trial.cape_saturated,
            cape_near_surface: trial.cape_near_surface,
            energy_availability,
            cape_ambient,
        },
    })
}
