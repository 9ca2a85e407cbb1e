//! Validation of the potential intensity solver against the reference
//! tropical sounding.
//!
//! # Behaviour Validated
//!
//! - **Reversible CAPE**: 828 J/kg for the surface parcel, outflow near 217 K
//! - **Pseudo-adiabatic CAPE**: larger than reversible, outflow colder
//! - **MPI at 28 °C / 1013 hPa**: about 951 hPa and 60 m/s in four iterations
//! - **Monotonic response**: warmer oceans give deeper storms and faster winds
//! - **Hypercane regime**: very warm oceans never settle and report no estimate
//! - **Robustness**: every outcome is a value; nothing panics or returns NaN
//!
//! Run tests with: cargo test --test `reference_sounding_validation`

use approx::assert_relative_eq;
use ctor::ctor;
use mpi_core::core_types::{Celsius, Hectopascals, Kelvin, ParcelState, Sounding};
use mpi_core::reference::tropical_sounding;
use mpi_core::solver::{
    evaluate_cape, solve_pcmin, AscentMode, CapeConfig, CapeStatus, PcminFailure, PcminOutcome,
    SolutionStatus, SolverConfig,
};
use tracing_subscriber::EnvFilter;

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn solve(sst: f64, slp: f64, config: &SolverConfig) -> PcminOutcome {
    solve_pcmin(
        Celsius::new(sst),
        Hectopascals::new(slp),
        &tropical_sounding(),
        config,
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_surface_parcel_cape() {
    let sounding = tropical_sounding();
    let parcel = ParcelState::from_level(&sounding, 0).unwrap();

    let reversible = evaluate_cape(&parcel, &sounding, &CapeConfig::default());
    assert_eq!(reversible.status(), CapeStatus::Ok);
    assert_relative_eq!(reversible.cape().unwrap(), 828.234, epsilon = 1.0);
    assert_relative_eq!(*reversible.outflow_temperature(), 217.163, epsilon = 0.5);

    let config = CapeConfig {
        ascent: AscentMode::PseudoAdiabatic,
        ..CapeConfig::default()
    };
    let pseudo = evaluate_cape(&parcel, &sounding, &config);
    assert_relative_eq!(pseudo.cape().unwrap(), 2197.017, epsilon = 2.0);
    assert!(pseudo.outflow_temperature() < reversible.outflow_temperature());
}

#[test]
fn test_cape_is_never_negative() {
    let sounding = tropical_sounding();
    for t in [270.0, 280.0, 290.0, 300.0, 305.0] {
        for r in [1e-3, 5e-3, 1e-2, 2e-2] {
            let parcel = ParcelState::new(Hectopascals::new(1000.0), Kelvin::new(t), r);
            let outcome = evaluate_cape(&parcel, &sounding, &CapeConfig::default());
            let cape = outcome.cape().expect("suitable parcel");
            assert!(cape >= 0.0 && cape.is_finite(), "T={t} r={r} CAPE={cape}");
        }
    }
}

#[test]
fn test_levels_above_pressure_floor_do_not_matter() {
    let base = tropical_sounding();
    let mut p = base.pressure().to_vec();
    let mut t = base.temperature().to_vec();
    let mut r = base.mixing_ratio().to_vec();
    p.extend([50.0, 30.0, 20.0]);
    t.extend([195.0, 205.0, 215.0]);
    r.extend([0.0, 0.0, 0.0]);
    let extended = Sounding::new(p, t, r).unwrap();

    let config = SolverConfig::default();
    let a = solve_pcmin(Celsius::new(28.0), Hectopascals::new(1013.0), &base, &config);
    let b = solve_pcmin(
        Celsius::new(28.0),
        Hectopascals::new(1013.0),
        &extended,
        &config,
    );
    assert_eq!(a, b);
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAXIMUM POTENTIAL INTENSITY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reference_mpi() {
    let outcome = solve(28.0, 1013.0, &SolverConfig::default());
    let solution = outcome.solution().unwrap();
    assert_eq!(solution.status, SolutionStatus::Ok);
    assert_eq!(solution.iterations, 4);
    assert_relative_eq!(*solution.min_pressure, 951.413, epsilon = 0.1);
    assert_relative_eq!(*solution.max_wind, 60.390, epsilon = 0.1);
    assert_relative_eq!(*solution.outflow_temperature, 209.141, epsilon = 0.5);

    let record = outcome.to_record();
    assert_eq!(record.flag, 1);
    assert_relative_eq!(record.min_pressure, *solution.min_pressure);
}

#[test]
fn test_warmer_ocean_gives_stronger_storm() {
    let config = SolverConfig::default();
    let mut previous: Option<(f64, f64)> = None;
    for sst in [26.0, 27.0, 28.0, 29.0, 30.0] {
        let outcome = solve(sst, 1013.0, &config);
        let solution = outcome.solution().unwrap();
        let (pmin, vmax) = (*solution.min_pressure, *solution.max_wind);
        assert!(pmin < 1013.0);
        if let Some((p0, v0)) = previous {
            assert!(pmin < p0, "SST {sst}: {pmin} !< {p0}");
            assert!(vmax > v0, "SST {sst}: {vmax} !> {v0}");
        }
        previous = Some((pmin, vmax));
    }
}

#[test]
fn test_dissipative_heating_strengthens_storm() {
    let with = solve(28.0, 1013.0, &SolverConfig::default());
    let without = solve(28.0, 1013.0, &SolverConfig::no_dissipative_heating());
    assert!(with.min_pressure().unwrap() < without.min_pressure().unwrap());
    assert!(with.max_wind().unwrap() > without.max_wind().unwrap());
}

#[test]
fn test_hypercane_regime_has_no_estimate() {
    let outcome = solve(36.0, 1013.0, &SolverConfig::default());
    assert!(matches!(
        outcome,
        PcminOutcome::Failed(PcminFailure::NonConvergent {
            iterations: 201,
            ..
        })
    ));
    let record = outcome.to_record();
    assert_eq!(record.flag, 0);
    assert!(record.min_pressure.is_nan() && record.max_wind.is_nan());
}

#[test]
fn test_cold_ocean_has_no_estimate() {
    let outcome = solve(4.0, 1013.0, &SolverConfig::default());
    assert_eq!(
        outcome,
        PcminOutcome::Failed(PcminFailure::EnvironmentUnsupportive)
    );
}

fn record_bits(outcome: &PcminOutcome) -> ([u64; 8], i32) {
    let r = outcome.to_record();
    (
        [
            r.min_pressure.to_bits(),
            r.max_wind.to_bits(),
            r.outflow_temperature.to_bits(),
            r.temperature_ratio.to_bits(),
            r.cape_saturated.to_bits(),
            r.cape_near_surface.to_bits(),
            r.energy_availability.to_bits(),
            r.cape_ambient.to_bits(),
        ],
        r.flag,
    )
}

#[test]
fn test_repeated_solves_are_bit_identical() {
    let config = SolverConfig::default();

    let first = solve(28.0, 1013.0, &config);
    let second = solve(28.0, 1013.0, &config);
    assert!(matches!(first, PcminOutcome::Solved(_)));
    assert_eq!(record_bits(&first), record_bits(&second));
    assert_eq!(
        first.solution().unwrap().iterations,
        second.solution().unwrap().iterations
    );

    let first = solve(36.0, 1013.0, &config);
    let second = solve(36.0, 1013.0, &config);
    assert_eq!(record_bits(&first), record_bits(&second));
    match (first, second) {
        (
            PcminOutcome::Failed(PcminFailure::NonConvergent {
                iterations: i1,
                last_pressure: p1,
            }),
            PcminOutcome::Failed(PcminFailure::NonConvergent {
                iterations: i2,
                last_pressure: p2,
            }),
        ) => {
            assert_eq!(i1, i2);
            assert_eq!(p1.to_bits(), p2.to_bits());
        }
        other => panic!("expected two non-convergent outcomes, got {other:?}"),
    }
}

#[test]
fn test_solver_never_reports_nan_inside_solutions() {
    let config = SolverConfig::default();
    for sst in [6.0, 10.0, 15.0, 20.0, 25.0, 31.0, 33.0] {
        for slp in [1000.0, 1010.0, 1020.0] {
            if let PcminOutcome::Solved(solution) = solve(sst, slp, &config) {
                assert!(solution.min_pressure.is_finite());
                assert!(solution.max_wind.is_finite());
                assert!(*solution.min_pressure <= slp);
            }
        }
    }
}
