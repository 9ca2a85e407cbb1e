//! Grid driver tests: reanalysis-unit columns on the 37 standard pressure
//! levels, parallel field evaluation and multi-year climatology.
//!
//! Run tests with: cargo test --test `grid_driver`

use mpi_core::climatology::ClimatologyMap;
use mpi_core::core_types::{Celsius, Hectopascals, CELSIUS_KELVIN_OFFSET};
use mpi_core::grid::{
    CellEstimate, ColumnInput, EnvironmentalField, MpiField, STANDARD_PRESSURE_LEVELS,
};
use mpi_core::reference::{TROPICAL_MIXING_RATIO, TROPICAL_PRESSURE, TROPICAL_TEMPERATURE};
use mpi_core::solver::{solve_pcmin, PcminOutcome, SolverConfig};

/// Linear interpolation of the reference profile onto `p` (hPa); constant
/// warming above 100 hPa stands in for the stratosphere.
fn reference_profile_at(p: f64) -> (f64, f64) {
    if p < 100.0 {
        return (TROPICAL_TEMPERATURE[18] + 0.15 * (100.0 - p), 0.0);
    }
    let upper = TROPICAL_PRESSURE
        .iter()
        .position(|&level| level <= p)
        .unwrap_or(TROPICAL_PRESSURE.len() - 1);
    if upper == 0 || TROPICAL_PRESSURE[upper] == p {
        return (TROPICAL_TEMPERATURE[upper], TROPICAL_MIXING_RATIO[upper]);
    }
    let lower = upper - 1;
    let w = (TROPICAL_PRESSURE[lower] - p) / (TROPICAL_PRESSURE[lower] - TROPICAL_PRESSURE[upper]);
    (
        TROPICAL_TEMPERATURE[lower] + w * (TROPICAL_TEMPERATURE[upper] - TROPICAL_TEMPERATURE[lower]),
        TROPICAL_MIXING_RATIO[lower]
            + w * (TROPICAL_MIXING_RATIO[upper] - TROPICAL_MIXING_RATIO[lower]),
    )
}

/// One reanalysis cell: SST in K, SLP in Pa, T in K, specific humidity in kg/kg.
fn reanalysis_column(sst_c: f64) -> ColumnInput {
    let (t_k, q): (Vec<f64>, Vec<f64>) = STANDARD_PRESSURE_LEVELS
        .iter()
        .map(|&p| {
            let (t_c, r_g_per_kg) = reference_profile_at(p);
            let r = r_g_per_kg / 1000.0;
            (t_c + CELSIUS_KELVIN_OFFSET, r / (1.0 + r))
        })
        .unzip();
    ColumnInput::from_reanalysis(sst_c + CELSIUS_KELVIN_OFFSET, 101_300.0, &t_k, &q)
}

fn basin(ssts: &[f64], nlat: usize, nlon: usize) -> EnvironmentalField {
    EnvironmentalField::new(
        nlat,
        nlon,
        STANDARD_PRESSURE_LEVELS.to_vec(),
        ssts.iter().map(|&sst| reanalysis_column(sst)).collect(),
    )
    .unwrap()
}

#[test]
fn test_reanalysis_column_round_trips_units() {
    let column = reanalysis_column(28.0);
    assert!((column.sst - 28.0).abs() < 1e-9);
    assert!((column.slp - 1013.0).abs() < 1e-9);
    assert!((column.temperature[0] - 26.0).abs() < 1e-9);
    assert!((column.mixing_ratio[0] - 17.6).abs() < 1e-9);
    assert_eq!(column.temperature.len(), 37);
}

#[test]
fn test_standard_levels_column_solves_like_its_sounding() {
    let column = reanalysis_column(28.0);
    let sounding = column.sounding(&STANDARD_PRESSURE_LEVELS).unwrap();
    let config = SolverConfig::default();

    let direct = solve_pcmin(
        Celsius::new(28.0),
        Hectopascals::new(1013.0),
        &sounding,
        &config,
    );
    let solution = direct.solution().expect("tropical column solves");
    assert!(*solution.min_pressure > 900.0 && *solution.min_pressure < 1000.0);
    assert!(*solution.max_wind > 30.0 && *solution.max_wind < 90.0);

    match column.estimate(&STANDARD_PRESSURE_LEVELS, &config) {
        CellEstimate::Evaluated(outcome) => {
            let pmin = *outcome.min_pressure().unwrap();
            assert!((pmin - *solution.min_pressure).abs() < 1e-6);
        }
        other => panic!("expected an evaluated cell, got {other:?}"),
    }
}

#[test]
fn test_basin_field_with_land_and_missing_data() {
    let ssts = [f64::NAN, 26.0, 28.0, 30.0, 3.0, 28.0];
    let mut columns: Vec<ColumnInput> = ssts.iter().map(|&sst| reanalysis_column(sst)).collect();
    // Missing upper-air value over ocean
    columns[5].temperature[20] = f64::NAN;
    let field =
        EnvironmentalField::new(2, 3, STANDARD_PRESSURE_LEVELS.to_vec(), columns).unwrap();
    let solved = field.solve(&SolverConfig::default());

    let summary = solved.summary();
    assert_eq!(summary.masked, 1);
    assert_eq!(summary.solved, 3);
    assert_eq!(summary.unsupportive, 1);
    assert_eq!(summary.invalid, 1);
    assert_eq!(summary.total(), ssts.len());

    let pmin = solved.min_pressure_map();
    assert!(pmin[0].is_nan());
    assert!(pmin[1] > pmin[2] && pmin[2] > pmin[3]);
    assert!(pmin[4].is_nan() && pmin[5].is_nan());

    assert!(matches!(solved.get(1, 2), Some(CellEstimate::Invalid(_))));
    assert!(matches!(
        solved.get(1, 1),
        Some(CellEstimate::Evaluated(PcminOutcome::Failed(_)))
    ));
}

#[test]
fn test_climatology_of_yearly_fields() {
    let config = SolverConfig::default();
    let years: Vec<MpiField> = [27.0, 28.0, 29.0]
        .iter()
        .map(|&base| basin(&[f64::NAN, base, base + 0.5, base + 1.0], 2, 2).solve(&config))
        .collect();

    let clim = ClimatologyMap::from_fields(&years).unwrap();
    assert_eq!(clim.years(), 3);
    assert!(clim.mean()[0].is_nan());
    for cell in 1..4 {
        assert!(clim.mean()[cell] < 1013.0);
        assert!(clim.std()[cell] > 0.0);
    }
    assert!(clim.grid_mean().is_finite());

    let synthetic = clim.generate_years(10, 2024);
    assert_eq!(synthetic.len(), 10);
    for year in &synthetic {
        assert!(year[0].is_nan());
        assert!(year[1..].iter().all(|p| p.is_finite()));
    }
    let again = clim.generate_years(10, 2024);
    for (a, b) in synthetic.iter().zip(&again) {
        assert_eq!(a[1..], b[1..]);
    }
}
