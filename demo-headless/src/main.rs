use clap::Parser;
use mpi_core::core_types::{Celsius, Hectopascals, ParcelState, CELSIUS_KELVIN_OFFSET};
use mpi_core::reference::tropical_sounding;
use mpi_core::solver::{
    evaluate_cape, solve_pcmin, AscentMode, PcminOutcome, SolutionStatus, SolverConfig,
};
use mpi_core::Sounding;
use tracing_subscriber::EnvFilter;

/// Tropical cyclone potential intensity demo on the reference tropical sounding
#[derive(Parser, Debug)]
#[command(name = "mpi-demo")]
#[command(about = "Maximum potential intensity of a tropical cyclone", long_about = None)]
struct Args {
    /// Sea-surface temperature in °C
    #[arg(short, long, default_value_t = 28.0)]
    sst: f64,

    /// Sea-level pressure in hPa
    #[arg(short = 'p', long, default_value_t = 1013.0)]
    slp: f64,

    /// Ratio of enthalpy to momentum exchange coefficients
    #[arg(long, default_value_t = 0.9)]
    ck_cd: f64,

    /// Exclude dissipative heating
    #[arg(long)]
    no_dissipation: bool,

    /// Lift parcels pseudo-adiabatically instead of reversibly
    #[arg(long)]
    pseudo_adiabatic: bool,

    /// Sounding level near-surface parcels are lifted from
    #[arg(long, default_value_t = 0)]
    parcel_level: usize,

    /// Print a table over a range of sea-surface temperatures
    #[arg(long)]
    sweep: bool,

    /// Log solver iterations (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "mpi_core=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(msg) = validate_surface(args.sst, args.slp) {
        eprintln!("Invalid surface conditions: {msg}");
        std::process::exit(2);
    }

    let ascent = if args.pseudo_adiabatic {
        AscentMode::PseudoAdiabatic
    } else {
        AscentMode::Reversible
    };
    let config = SolverConfig::default()
        .with_ck_cd(args.ck_cd)
        .with_dissipative_heating(!args.no_dissipation)
        .with_parcel_level(args.parcel_level)
        .with_ascent(ascent);
    if let Err(err) = config.validate() {
        eprintln!("Invalid configuration: {err}");
        std::process::exit(2);
    }

    let sounding = tropical_sounding();

    println!("=== Potential Intensity Demo ===\n");
    println!(
        "Sounding: reference tropical profile, {} levels ({:.0} to {:.0} hPa)",
        sounding.len(),
        sounding.pressure()[0],
        sounding.pressure()[sounding.len() - 1]
    );
    println!(
        "Config: Ck/Cd = {:.2}, dissipative heating {}, {:?} ascent, parcel level {}\n",
        config.ck_cd,
        if config.dissipative_heating { "on" } else { "off" },
        config.cape.ascent,
        config.parcel_level
    );

    if args.sweep {
        run_sweep(&sounding, args.slp, &config);
    } else {
        report_cape(&sounding, &config);
        report_mpi(&sounding, args.sst, args.slp, &config);
    }
}

/// Range checks for values that go through the asserting unit constructors.
fn validate_surface(sst: f64, slp: f64) -> Result<(), String> {
    if !(sst.is_finite() && sst >= -CELSIUS_KELVIN_OFFSET) {
        return Err(format!("--sst must be finite and at least -273.15 °C, got {sst}"));
    }
    if !(slp.is_finite() && slp > 0.0) {
        return Err(format!("--slp must be finite and positive, got {slp}"));
    }
    Ok(())
}

fn report_cape(sounding: &Sounding, config: &SolverConfig) {
    let Some(parcel) = ParcelState::from_level(sounding, config.parcel_level) else {
        println!("Parcel level {} is outside the sounding\n", config.parcel_level);
        return;
    };
    let outcome = evaluate_cape(&parcel, sounding, &config.cape);
    println!("Environmental CAPE (parcel at {}):", parcel.pressure);
    match outcome.cape() {
        Some(cape) => println!(
            "  CAPE: {:.1} J/kg, outflow temperature: {}, status: {:?}\n",
            cape,
            outcome.outflow_temperature(),
            outcome.status()
        ),
        None => println!("  Parcel cannot be lifted ({:?})\n", outcome.status()),
    }
}

fn report_mpi(sounding: &Sounding, sst: f64, slp: f64, config: &SolverConfig) {
    let outcome = solve_pcmin(Celsius::new(sst), Hectopascals::new(slp), sounding, config);
    println!("Maximum potential intensity (SST {sst:.1}°C, SLP {slp:.1} hPa):");
    match &outcome {
        PcminOutcome::Solved(solution) => {
            println!("  Minimum central pressure: {}", solution.min_pressure);
            println!(
                "  Maximum surface wind: {} ({:.0} km/h, {:.0} kt)",
                solution.max_wind,
                solution.max_wind.to_kmh(),
                solution.max_wind.to_knots()
            );
            println!("  Outflow temperature: {}", solution.outflow_temperature);
            println!("  Iterations: {}", solution.iterations);
            let d = &solution.diagnostics;
            println!("  SST / T_out: {:.3}", d.temperature_ratio);
            println!(
                "  CAPE ambient / near-surface / saturated: {:.1} / {:.1} / {:.1} J/kg",
                d.cape_ambient, d.cape_near_surface, d.cape_saturated
            );
            if solution.status == SolutionStatus::CapeFailure {
                println!("  WARNING: a CAPE evaluation did not converge; treat with caution");
            }
        }
        PcminOutcome::Failed(failure) => println!("  No estimate: {failure}"),
    }
    println!("  Legacy flag: {}", outcome.legacy_flag());
}

fn run_sweep(sounding: &Sounding, slp: f64, config: &SolverConfig) {
    println!("SST(°C) | Pmin(hPa) | Vmax(m/s) | Tout(K) | Iter | Flag");
    println!("--------|-----------|-----------|---------|------|-----");
    for step in 0..=28 {
        let sst = 20.0 + 0.5 * f64::from(step);
        let outcome = solve_pcmin(Celsius::new(sst), Hectopascals::new(slp), sounding, config);
        let record = outcome.to_record();
        let iterations = outcome
            .solution()
            .map_or_else(|| "-".to_string(), |s| s.iterations.to_string());
        println!(
            "{:7.1} | {:9.1} | {:9.1} | {:7.1} | {:>4} | {:4}",
            sst,
            record.min_pressure,
            record.max_wind,
            record.outflow_temperature,
            iterations,
            record.flag
        );
    }
}
