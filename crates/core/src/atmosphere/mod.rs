//! Atmospheric thermodynamics for tropical cyclone potential intensity.
//!
//! This module holds the moist-thermodynamic relations used to lift parcels
//! through an environmental sounding:
//! - Saturation vapour pressure (Bolton 1980)
//! - Mixing ratio / vapour pressure conversions
//! - Virtual and density temperature for buoyancy
//! - Reversible entropy and lifted condensation pressure
//!
//! # References
//!
//! - Emanuel, K.A. (1994). "Atmospheric Convection." Oxford University Press.
//! - Bolton, D. (1980). "The computation of equivalent potential temperature."

mod thermodynamics;

pub use thermodynamics::{
    density_temperature, latent_heat_vaporization, saturated_entropy, saturation_mixing_ratio,
    saturation_vapor_pressure, vapor_pressure, virtual_temperature, ParcelThermo, ALV0, CL, CPD,
    CPV, CPVMCL, EPS, EPS_APPROX, RD, RV,
};
