//! Moist thermodynamics of lifted parcels.
//!
//! Closed-form relations shared by the CAPE evaluator and the MPI solver:
//! saturation vapour pressure, mixing ratio conversions, virtual and density
//! temperature, reversible parcel entropy and the lifted condensation
//! pressure.
//!
//! # Scientific Background
//!
//! A parcel lifted from the boundary layer cools dry-adiabatically until it
//! saturates at the lifted condensation level. Above it, condensation
//! releases latent heat and the parcel follows a moist adiabat, found here
//! by holding its entropy fixed. Buoyancy is measured by comparing the
//! parcel's density temperature (virtual temperature including the weight of
//! any condensate it carries) with the environment's virtual temperature.
//!
//! # References
//!
//! - Bolton, D. (1980). "The computation of equivalent potential temperature."
//!   Monthly Weather Review, 108, 1046-1053.
//! - Emanuel, K.A. (1994). "Atmospheric Convection." Oxford University Press.
//! - Bister, M. & Emanuel, K.A. (2002). "Low frequency variability of tropical
//!   cyclone potential intensity." JGR, 107(D24), 4801.

/// Specific heat of dry air at constant pressure (J/(kg·K))
pub const CPD: f64 = 1005.7;

/// Specific heat of water vapour at constant pressure (J/(kg·K))
pub const CPV: f64 = 1870.0;

/// Heat capacity of condensed water (J/(kg·K)).
///
/// 2500 is the effective value of the reference MPI formulation; published
/// MPI climatologies are computed with it.
pub const CL: f64 = 2500.0;

/// `CPV - CL`, temperature dependence of the latent heat (J/(kg·K))
pub const CPVMCL: f64 = CPV - CL;

/// Gas constant of water vapour (J/(kg·K))
pub const RV: f64 = 461.5;

/// Gas constant of dry air (J/(kg·K))
pub const RD: f64 = 287.04;

/// Ratio of gas constants `RD / RV`
pub const EPS: f64 = RD / RV;

/// Rounded `EPS` used by the surface mixing-ratio relations of the MPI solver
pub const EPS_APPROX: f64 = 0.622;

/// Latent heat of vaporization at 0°C (J/kg)
pub const ALV0: f64 = 2.501e6;

/// Bolton (1980) saturation vapour pressure coefficients
const BOLTON_E0: f64 = 6.112; // hPa
const BOLTON_A: f64 = 17.67;
const BOLTON_B: f64 = 243.5; // °C

/// Saturation vapour pressure over liquid water (hPa) at `temp_c` (°C).
///
/// ```text
/// es = 6.112 · exp(17.67 · T / (243.5 + T))
/// ```
#[inline]
#[must_use]
pub fn saturation_vapor_pressure(temp_c: f64) -> f64 {
    BOLTON_E0 * (BOLTON_A * temp_c / (BOLTON_B + temp_c)).exp()
}

/// Partial pressure of water vapour (hPa) for mixing ratio `r` at pressure `p` (hPa).
#[inline]
#[must_use]
pub fn vapor_pressure(r: f64, p: f64) -> f64 {
    r * p / (EPS + r)
}

/// Mixing ratio (kg/kg) of air holding vapour pressure `e` at total pressure `p`.
#[inline]
#[must_use]
pub fn saturation_mixing_ratio(e: f64, p: f64) -> f64 {
    EPS * e / (p - e)
}

/// Latent heat of vaporization (J/kg) at `temp_c` (°C).
#[inline]
#[must_use]
pub fn latent_heat_vaporization(temp_c: f64) -> f64 {
    ALV0 + CPVMCL * temp_c
}

/// Virtual temperature (K) of air at `temp_k` with vapour mixing ratio `r`.
#[inline]
#[must_use]
pub fn virtual_temperature(temp_k: f64, r: f64) -> f64 {
    density_temperature(temp_k, r, r)
}

/// Density temperature (K): virtual temperature of air carrying vapour
/// `r_vapor` and total water `r_total` (vapour plus condensate).
#[inline]
#[must_use]
pub fn density_temperature(temp_k: f64, r_vapor: f64, r_total: f64) -> f64 {
    temp_k * (1.0 + r_vapor / EPS) / (1.0 + r_total)
}

/// Initial thermodynamic state of a parcel before lifting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParcelThermo {
    /// Relative humidity, clamped to at most 1
    pub relative_humidity: f64,
    /// Reversible entropy (J/(kg·K)), conserved during ascent
    pub entropy: f64,
    /// Lifted condensation pressure (hPa)
    pub lcl_pressure: f64,
}

impl ParcelThermo {
    /// Entropy, relative humidity and condensation pressure of a parcel at
    /// `pressure` (hPa), `temp_k` (K) carrying mixing ratio `r` (kg/kg).
    ///
    /// ```text
    /// S    = (Cpd + r·Cl)·ln T − Rd·ln(p − e) + Lv·r/T − r·Rv·ln RH
    /// PLCL = p · RH^χ,   χ = T / (1669 − 122·RH − T)
    /// ```
    #[must_use]
    pub fn new(pressure: f64, temp_k: f64, r: f64) -> Self {
        let temp_c = temp_k - crate::core_types::CELSIUS_KELVIN_OFFSET;
        let es = saturation_vapor_pressure(temp_c);
        let e = vapor_pressure(r, pressure);
        let relative_humidity = (e / es).min(1.0);
        let alv = latent_heat_vaporization(temp_c);
        let entropy = (CPD + r * CL) * temp_k.ln() - RD * (pressure - e).ln() + alv * r / temp_k
            - r * RV * relative_humidity.ln();

        let chi = temp_k / (1669.0 - 122.0 * relative_humidity - temp_k);
        let lcl_pressure = pressure * relative_humidity.powf(chi);

        Self {
            relative_humidity,
            entropy,
            lcl_pressure,
        }
    }
}

/// Saturated entropy of a parcel at `temp_k` and `pressure` with total water
/// `r_total`, and its derivative with respect to temperature at constant
/// pressure. Returns `(entropy, d_entropy_dt, saturation_mixing_ratio,
/// saturation_vapor_pressure)`.
#[inline]
#[must_use]
pub fn saturated_entropy(temp_k: f64, pressure: f64, r_total: f64) -> (f64, f64, f64, f64) {
    let temp_c = temp_k - crate::core_types::CELSIUS_KELVIN_OFFSET;
    let es = saturation_vapor_pressure(temp_c);
    let rs = saturation_mixing_ratio(es, pressure);
    let alv = latent_heat_vaporization(temp_c);
    let heat_capacity = CPD + r_total * CL;

    let slope = (heat_capacity + alv * alv * rs / (RV * temp_k * temp_k)) / temp_k;
    let em = vapor_pressure(rs, pressure);
    let entropy = heat_capacity * temp_k.ln() - RD * (pressure - em).ln() + alv * rs / temp_k;

    (entropy, slope, rs, es)
}
