//! Convective available potential energy of a lifted parcel.
//!
//! # Scientific Background
//!
//! The parcel is lifted from its starting pressure through every sounding
//! level above it. Below the lifted condensation pressure it cools along a
//! dry adiabat. Above it, its temperature is found level by level by holding
//! the reversible entropy fixed and solving `S_sat(T, p) = S` with a damped
//! Newton iteration. Buoyancy at each level is the difference between the
//! parcel's density temperature and the environment's virtual temperature.
//!
//! CAPE is the pressure-weighted integral of buoyancy between the parcel's
//! starting level and its level of neutral buoyancy (LNB), found as the
//! highest level with positive buoyancy. Positive and negative areas are
//! accumulated separately and the residual area above the LNB is added by
//! linear interpolation of buoyancy to zero. The temperature at the
//! interpolated crossing is the outflow temperature.
//!
//! # References
//!
//! - Emanuel, K.A. (1994). "Atmospheric Convection." Oxford University Press.
//! - Bister, M. & Emanuel, K.A. (2002). "Low frequency variability of tropical
//!   cyclone potential intensity." JGR, 107(D24), 4801.

use super::config::CapeConfig;
use super::outcome::{CapeOutcome, CapeResult, UnsuitableReason};
use crate::atmosphere::{
    density_temperature, saturated_entropy, virtual_temperature, ParcelThermo, CPD, RD,
};
use crate::core_types::{Kelvin, ParcelState, Sounding, SoundingView};
use tracing::{debug, trace};

/// Lift `parcel` through `sounding` and integrate its CAPE.
///
/// Levels at or above `config.pressure_floor` are ignored. The evaluation
/// never fails: parcels that cannot be lifted yield
/// [`CapeOutcome::Unsuitable`] and unconverged moist-adiabat iterations are
/// reported through [`CapeResult::converged`].
///
/// # Example
///
/// ```
/// use mpi_core::core_types::{Hectopascals, Kelvin, ParcelState};
/// use mpi_core::reference::tropical_sounding;
/// use mpi_core::solver::{evaluate_cape, CapeConfig};
///
/// let sounding = tropical_sounding();
/// let parcel = ParcelState::new(Hectopascals::new(1000.0), Kelvin::new(299.15), 0.0176);
/// let outcome = evaluate_cape(&parcel, &sounding, &CapeConfig::default());
/// assert!(outcome.is_ok());
/// assert!(outcome.cape().unwrap() > 0.0);
/// ```
pub fn evaluate_cape(parcel: &ParcelState, sounding: &Sounding, config: &CapeConfig) -> CapeOutcome {
    let surface_temperature = sounding.surface().temperature;
    let unsuitable = |reason| CapeOutcome::Unsuitable {
        reason,
        surface_temperature,
    };

    let tp = *parcel.temperature;
    let rp = parcel.mixing_ratio;
    let pp = *parcel.pressure;

    if rp < config.min_mixing_ratio {
        return unsuitable(UnsuitableReason::TooDry);
    }
    if tp < *config.min_parcel_temperature {
        return unsuitable(UnsuitableReason::TooCold);
    }

    let view = sounding.below(config.pressure_floor);
    let Some(jmin) = view.first_level_at_or_above(pp) else {
        return unsuitable(UnsuitableReason::AboveSounding);
    };

    let thermo = ParcelThermo::new(pp, tp, rp);
    let sig = config.ascent.fallout_fraction();
    let profile = buoyancy_profile(&view, jmin, parcel, &thermo, sig, config);

    trace!(
        lcl_pressure = thermo.lcl_pressure,
        first_level = jmin,
        top_level = view.top_index(),
        "Lifted parcel"
    );
    if !profile.converged {
        debug!(
            max_inner_iterations = profile.max_inner_iterations,
            "Moist adiabat iteration did not converge on every level"
        );
    }

    let (cape, outflow_temperature) = integrate(&view, jmin, pp, &profile.buoyancy);

    CapeOutcome::Computed(CapeResult {
        cape,
        outflow_temperature: Kelvin::from(outflow_temperature),
        converged: profile.converged,
        max_inner_iterations: profile.max_inner_iterations,
    })
}

/// Buoyancy of the lifted parcel at every level of the view.
struct BuoyancyProfile {
    /// Density-temperature excess (K); zero below the parcel's first level
    buoyancy: Vec<f64>,
    converged: bool,
    max_inner_iterations: u32,
}

fn buoyancy_profile(
    view: &SoundingView<'_>,
    jmin: usize,
    parcel: &ParcelState,
    thermo: &ParcelThermo,
    sig: f64,
    config: &CapeConfig,
) -> BuoyancyProfile {
    let (p, t, r) = (view.pressure(), view.temperature(), view.mixing_ratio());
    let tp = *parcel.temperature;
    let rp = parcel.mixing_ratio;
    let pp = *parcel.pressure;

    let mut buoyancy = vec![0.0; view.len()];
    let mut converged = true;
    let mut max_inner_iterations = 0;

    for j in jmin..view.len() {
        let parcel_density_temperature = if p[j] >= thermo.lcl_pressure {
            // Dry adiabat, no condensate
            let tg = tp * (p[j] / pp).powf(RD / CPD);
            virtual_temperature(tg, rp)
        } else {
            let state = moist_adiabat(thermo.entropy, p[j], t[j], rp, config);
            converged &= state.converged;
            max_inner_iterations = max_inner_iterations.max(state.iterations);
            let r_mean = sig * state.mixing_ratio + (1.0 - sig) * rp;
            density_temperature(state.temperature, state.mixing_ratio, r_mean)
        };
        buoyancy[j] = parcel_density_temperature - virtual_temperature(t[j], r[j]);
    }

    BuoyancyProfile {
        buoyancy,
        converged,
        max_inner_iterations,
    }
}

/// Saturated parcel state at one level above the condensation level.
struct MoistState {
    temperature: f64,
    mixing_ratio: f64,
    iterations: u32,
    converged: bool,
}

/// Solve `S_sat(T, p) = entropy` for `T`, starting from the environmental
/// temperature at the level.
fn moist_adiabat(
    entropy: f64,
    pressure: f64,
    environment_temperature: f64,
    total_water: f64,
    config: &CapeConfig,
) -> MoistState {
    let mut tg_new = environment_temperature;
    let mut tg = 0.0;
    let mut rg = 0.0;
    let mut iterations = 0;
    let mut converged = true;

    while (tg_new - tg).abs() > config.temperature_tolerance {
        tg = tg_new;
        let (sg, slope, rs, es) = saturated_entropy(tg, pressure, total_water);
        rg = rs;
        iterations += 1;

        let relaxation = if iterations <= config.damped_iterations {
            config.damping
        } else {
            1.0
        };
        tg_new = tg + relaxation * (entropy - sg) / slope;

        // Vapour pressure within 1 hPa of the total pressure is unphysical
        if es > pressure - 1.0 {
            converged = false;
        }
        if iterations > config.max_iterations {
            converged = false;
            break;
        }
    }

    MoistState {
        temperature: tg,
        mixing_ratio: rg,
        iterations,
        converged,
    }
}

/// Integrate positive and negative areas up to the level of neutral
/// buoyancy. Returns `(cape, outflow_temperature)`.
fn integrate(view: &SoundingView<'_>, jmin: usize, pp: f64, tv: &[f64]) -> (f64, f64) {
    let (p, t) = (view.pressure(), view.temperature());
    let n = view.top_index();
    let surface_temperature = t[0];

    // Highest positively buoyant level, never below level 1
    let inb = (jmin..=n)
        .rev()
        .find(|&j| tv[j] > 0.0)
        .map_or(1, |j| j.max(1));

    if inb == jmin || inb <= 1 {
        return (0.0, surface_temperature);
    }

    let mut positive = 0.0;
    let mut negative = 0.0;
    for j in (jmin + 1)..=inb {
        let pfac = RD * (tv[j] + tv[j - 1]) * (p[j - 1] - p[j]) / (p[j] + p[j - 1]);
        positive += pfac.max(0.0);
        negative -= pfac.min(0.0);
    }

    // Partial layer between the parcel and the first level above it
    let pfac = RD * (pp - p[jmin]) / (pp + p[jmin]);
    positive += pfac * tv[jmin].max(0.0);
    negative -= pfac * tv[jmin].min(0.0);

    // Residual area above the LNB, buoyancy interpolated linearly to zero
    let mut residual = 0.0;
    let mut outflow_temperature = t[inb];
    if inb < n {
        let pinb = (p[inb + 1] * tv[inb] - p[inb] * tv[inb + 1]) / (tv[inb] - tv[inb + 1]);
        residual = RD * tv[inb] * (p[inb] - pinb) / (p[inb] + pinb);
        outflow_temperature = (t[inb] * (pinb - p[inb + 1]) + t[inb + 1] * (p[inb] - pinb))
            / (p[inb] - p[inb + 1]);
    }

    ((positive + residual - negative).max(0.0), outflow_temperature)
}
