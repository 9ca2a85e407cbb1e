use mpi_core::solver::AscentMode;
use mpi_core::SolverConfig;

/// C view of the solver configuration.
///
/// Only the physical tunables are exposed; iteration thresholds keep their
/// library defaults. Start from `mpi_config_default()` and change fields.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MpiConfigC {
    /// Ratio of surface exchange coefficients `C_k / C_D` (default 0.9).
    pub ck_cd: f64,

    /// Include dissipative heating (default true).
    pub dissipative_heating: bool,

    /// Exponent of the eye wind profile (default 2.0).
    pub eye_profile_exponent: f64,

    /// Sounding level near-surface parcels are lifted from (default 0).
    pub parcel_level: usize,

    /// Gradient-to-10 m wind reduction factor (default 0.8).
    pub wind_reduction: f64,

    /// Pseudo-adiabatic ascent instead of reversible (default false).
    pub pseudo_adiabatic: bool,
}

impl From<&SolverConfig> for MpiConfigC {
    fn from(config: &SolverConfig) -> Self {
        Self {
            ck_cd: config.ck_cd,
            dissipative_heating: config.dissipative_heating,
            eye_profile_exponent: config.eye_profile_exponent,
            parcel_level: config.parcel_level,
            wind_reduction: config.wind_reduction,
            pseudo_adiabatic: config.cape.ascent == AscentMode::PseudoAdiabatic,
        }
    }
}

impl From<MpiConfigC> for SolverConfig {
    fn from(config: MpiConfigC) -> Self {
        let ascent = if config.pseudo_adiabatic {
            AscentMode::PseudoAdiabatic
        } else {
            AscentMode::Reversible
        };
        SolverConfig::default()
            .with_ck_cd(config.ck_cd)
            .with_dissipative_heating(config.dissipative_heating)
            .with_eye_profile_exponent(config.eye_profile_exponent)
            .with_parcel_level(config.parcel_level)
            .with_wind_reduction(config.wind_reduction)
            .with_ascent(ascent)
    }
}

/// Default solver configuration: reversible ascent, dissipative heating,
/// `C_k / C_D = 0.9`, parcels from the lowest level.
#[no_mangle]
pub extern "C" fn mpi_config_default() -> MpiConfigC {
    MpiConfigC::from(&SolverConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_to_library_default() {
        let config = SolverConfig::from(mpi_config_default());
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn test_fields_reach_solver_config() {
        let c = MpiConfigC {
            ck_cd: 1.2,
            dissipative_heating: false,
            parcel_level: 2,
            pseudo_adiabatic: true,
            ..mpi_config_default()
        };
        let config = SolverConfig::from(c);
        assert_eq!(config.ck_cd, 1.2);
        assert!(!config.dissipative_heating);
        assert_eq!(config.parcel_level, 2);
        assert_eq!(config.cape.ascent, AscentMode::PseudoAdiabatic);
        assert_eq!(config.max_iterations, SolverConfig::default().max_iterations);
    }
}
