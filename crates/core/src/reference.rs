//! Reference environments for validation and demos.
//!
//! The tropical sounding is the standard test column of the MPI algorithm:
//! a moist, conditionally unstable West Pacific profile from 1000 to 100 hPa.
//! With the default configuration its surface parcel has a reversible CAPE
//! of about 828 J/kg and a 28 °C ocean under 1013 hPa supports a minimum
//! central pressure near 951 hPa.

use crate::core_types::{grams_per_kilogram_to_kg_per_kg, Sounding, CELSIUS_KELVIN_OFFSET};

/// Pressure levels of the reference sounding (hPa)
pub const TROPICAL_PRESSURE: [f64; 19] = [
    1000.0, 950.0, 900.0, 850.0, 800.0, 750.0, 700.0, 650.0, 600.0, 550.0, 500.0, 450.0, 400.0,
    350.0, 300.0, 250.0, 200.0, 150.0, 100.0,
];

/// Temperatures of the reference sounding (°C)
pub const TROPICAL_TEMPERATURE: [f64; 19] = [
    26.0, 23.0, 19.8, 17.3, 14.6, 11.8, 8.6, 5.1, 1.4, -2.5, -6.9, -11.9, -17.7, -24.8, -33.2,
    -43.3, -55.2, -61.5, -67.6,
];

/// Mixing ratios of the reference sounding (g/kg)
pub const TROPICAL_MIXING_RATIO: [f64; 19] = [
    17.6, 15.3, 13.0, 11.0, 8.4, 7.1, 5.8, 4.6, 3.6, 3.2, 2.1, 1.4, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0,
];

/// The reference tropical sounding in solver units.
pub fn tropical_sounding() -> Sounding {
    Sounding::from_validated(
        TROPICAL_PRESSURE.to_vec(),
        TROPICAL_TEMPERATURE
            .iter()
            .map(|t| t + CELSIUS_KELVIN_OFFSET)
            .collect(),
        TROPICAL_MIXING_RATIO
            .iter()
            .map(|&r| grams_per_kilogram_to_kg_per_kg(r))
            .collect(),
    )
}
