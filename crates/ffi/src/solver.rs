use mpi_core::core_types::{Celsius, Hectopascals, Kelvin, CELSIUS_KELVIN_OFFSET};
use mpi_core::solver::{CapeStatus, MpiRecord};
use mpi_core::{evaluate_cape, solve_pcmin, CapeOutcome, ParcelState, Sounding};

use crate::config::MpiConfigC;
use crate::error::{DefaultMpiError, MpiErrorCode};
use crate::helpers::{
    at_least, column_from_raw, config_from_ptr, finite, positive, track_error, track_result,
};

/// CAPE status flag: parcel could not be lifted.
pub const MPI_CAPE_UNSUITABLE: i32 = 0;
/// CAPE status flag: converged.
pub const MPI_CAPE_OK: i32 = 1;
/// CAPE status flag: moist-adiabat iteration hit its cap at some level.
pub const MPI_CAPE_NOT_CONVERGED: i32 = 2;

#[repr(C)]
/// Borrowed sounding columns, ordered from the surface upward.
#[derive(Debug, Clone, Copy)]
pub struct SoundingC {
    /// Level pressures (hPa), strictly decreasing.
    pub pressure: *const f64,

    /// Level temperatures; unit depends on the function.
    pub temperature: *const f64,

    /// Level water vapour mixing ratios; unit depends on the function.
    pub mixing_ratio: *const f64,

    /// Number of levels in each column.
    pub len: usize,
}

impl SoundingC {
    /// Borrow the three columns.
    ///
    /// # Safety
    /// Each pointer must be null or point to `len` readable `f64` values.
    unsafe fn columns<'a>(&self) -> Result<[&'a [f64]; 3], DefaultMpiError> {
        Ok(unsafe {
            [
                column_from_raw(self.pressure, self.len, "pressure")?,
                column_from_raw(self.temperature, self.len, "temperature")?,
                column_from_raw(self.mixing_ratio, self.len, "mixing_ratio")?,
            ]
        })
    }
}

#[repr(C)]
/// A parcel about to be lifted: pressure (hPa), temperature (K), mixing ratio (kg/kg).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParcelC {
    /// Pressure (hPa).
    pub pressure: f64,

    /// Temperature (K).
    pub temperature: f64,

    /// Water vapour mixing ratio (kg/kg).
    pub mixing_ratio: f64,
}

#[repr(C)]
/// Result of `mpi_evaluate_cape`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapeRecordC {
    /// Convective available potential energy (J/kg), NaN for unsuitable parcels.
    pub cape: f64,

    /// Outflow temperature (K); the sounding's surface temperature for unsuitable parcels.
    pub outflow_temperature: f64,

    /// One of `MPI_CAPE_OK`, `MPI_CAPE_UNSUITABLE`, `MPI_CAPE_NOT_CONVERGED`.
    pub flag: i32,
}

impl From<&CapeOutcome> for CapeRecordC {
    fn from(outcome: &CapeOutcome) -> Self {
        let flag = match outcome.status() {
            CapeStatus::Ok => MPI_CAPE_OK,
            CapeStatus::Unsuitable => MPI_CAPE_UNSUITABLE,
            CapeStatus::NotConverged => MPI_CAPE_NOT_CONVERGED,
        };
        Self {
            cape: outcome.cape().unwrap_or(f64::NAN),
            outflow_temperature: *outcome.outflow_temperature(),
            flag,
        }
    }
}

#[repr(C)]
/// Result of `mpi_solve_pcmin`. Undefined quantities are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MpiRecordC {
    /// Minimum central pressure (hPa).
    pub min_pressure: f64,

    /// Maximum 10 m wind speed (m/s).
    pub max_wind: f64,

    /// Outflow temperature (K).
    pub outflow_temperature: f64,

    /// 1 solved, 0 no estimate (cold ocean or hypercane), 2 a CAPE evaluation failed.
    pub flag: i32,

    /// Ratio of sea-surface to outflow temperature.
    pub temperature_ratio: f64,

    /// CAPE of the parcel saturated at SST at the radius of maximum wind (J/kg).
    pub cape_saturated: f64,

    /// CAPE of the boundary-layer parcel at the radius of maximum wind (J/kg).
    pub cape_near_surface: f64,

    /// Energy available to the storm (J/kg).
    pub energy_availability: f64,

    /// CAPE of the ambient boundary-layer parcel (J/kg).
    pub cape_ambient: f64,
}

impl From<MpiRecord> for MpiRecordC {
    fn from(record: MpiRecord) -> Self {
        Self {
            min_pressure: record.min_pressure,
            max_wind: record.max_wind,
            outflow_temperature: record.outflow_temperature,
            flag: record.flag,
            temperature_ratio: record.temperature_ratio,
            cape_saturated: record.cape_saturated,
            cape_near_surface: record.cape_near_surface,
            energy_availability: record.energy_availability,
            cape_ambient: record.cape_ambient,
        }
    }
}

/// Compute the CAPE of a parcel lifted through a sounding.
///
/// Units: pressure hPa, temperature K, mixing ratio kg/kg, for both the
/// parcel and the sounding columns. Sounding pressure must strictly decrease.
/// Only `config.pseudo_adiabatic` affects the result.
///
/// Returns
/// - `MpiErrorCode::Ok`: `out_record` holds the result; check its `flag`
/// - `MpiErrorCode::NullPointer`: a column pointer or `out_record` is null
/// - `MpiErrorCode::InvalidSounding`: the columns fail validation
/// - `MpiErrorCode::InvalidConfig`: `config` is out of range
/// - `MpiErrorCode::InvalidParameter`: a parcel value is not finite, or its
///   pressure or temperature is not positive
///
/// # Safety
///
/// - The `sounding` column pointers must each point to `sounding.len`
///   readable `f64` values.
/// - `config` must be null (library defaults) or point to a valid `MpiConfigC`.
/// - `out_record` must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn mpi_evaluate_cape(
    parcel: ParcelC,
    sounding: SoundingC,
    config: *const MpiConfigC,
    out_record: *mut CapeRecordC,
) -> MpiErrorCode {
    if out_record.is_null() {
        return track_error(&DefaultMpiError::null_pointer("out_record"));
    }

    match track_result(unsafe { cape_record(parcel, &sounding, config) }) {
        Ok(record) => {
            unsafe {
                *out_record = record;
            }
            MpiErrorCode::Ok
        }
        Err(code) => code,
    }
}

unsafe fn cape_record(
    parcel: ParcelC,
    sounding: &SoundingC,
    config: *const MpiConfigC,
) -> Result<CapeRecordC, DefaultMpiError> {
    let parcel = ParcelState::new(
        Hectopascals::new(positive("parcel.pressure", parcel.pressure)?),
        Kelvin::new(positive("parcel.temperature", parcel.temperature)?),
        finite("parcel.mixing_ratio", parcel.mixing_ratio)?,
    );
    let [p, t, r] = unsafe { sounding.columns() }?;
    let sounding = Sounding::new(p.to_vec(), t.to_vec(), r.to_vec())?;
    let config = unsafe { config_from_ptr(config) }?;
    Ok(CapeRecordC::from(&evaluate_cape(
        &parcel,
        &sounding,
        &config.cape,
    )))
}

/// Compute the maximum potential intensity of a tropical cyclone.
///
/// Units follow reanalysis drivers: SST °C, SLP hPa, sounding pressure hPa,
/// temperature °C, mixing ratio g/kg. Sounding pressure must strictly decrease.
///
/// A column that cannot support a storm is not an error: the call returns
/// `Ok` with NaN in every undefined field and `flag` set to 0 or 2.
///
/// Returns
/// - `MpiErrorCode::Ok`: `out_record` holds the result
/// - `MpiErrorCode::NullPointer`: a column pointer or `out_record` is null
/// - `MpiErrorCode::InvalidSounding`: the columns fail validation
/// - `MpiErrorCode::InvalidConfig`: `config` is out of range
/// - `MpiErrorCode::InvalidParameter`: `sst` is not finite or below absolute
///   zero, or `slp` is not finite and positive
///
/// # Safety
///
/// - The `sounding` column pointers must each point to `sounding.len`
///   readable `f64` values.
/// - `config` must be null (library defaults) or point to a valid `MpiConfigC`.
/// - `out_record` must be a valid, non-null pointer to writable memory.
///
/// Example (C)
/// ```c
/// MpiConfigC config = mpi_config_default();
/// config.ck_cd = 1.0;
/// SoundingC sounding = { p, t, r, 19 };
/// MpiRecordC record;
/// if (mpi_solve_pcmin(28.0, 1013.0, sounding, &config, &record) == Ok
///     && record.flag == 1) {
///     printf("%.1f hPa, %.1f m/s\n", record.min_pressure, record.max_wind);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn mpi_solve_pcmin(
    sst: f64,
    slp: f64,
    sounding: SoundingC,
    config: *const MpiConfigC,
    out_record: *mut MpiRecordC,
) -> MpiErrorCode {
    if out_record.is_null() {
        return track_error(&DefaultMpiError::null_pointer("out_record"));
    }

    match track_result(unsafe { pcmin_record(sst, slp, &sounding, config) }) {
        Ok(record) => {
            unsafe {
                *out_record = record;
            }
            MpiErrorCode::Ok
        }
        Err(code) => code,
    }
}

unsafe fn pcmin_record(
    sst: f64,
    slp: f64,
    sounding: &SoundingC,
    config: *const MpiConfigC,
) -> Result<MpiRecordC, DefaultMpiError> {
    let sst = Celsius::new(at_least("sst", sst, -CELSIUS_KELVIN_OFFSET)?);
    let slp = Hectopascals::new(positive("slp", slp)?);
    let [p, t, r] = unsafe { sounding.columns() }?;
    let sounding = Sounding::from_observed(p, t, r)?;
    let config = unsafe { config_from_ptr(config) }?;
    Ok(MpiRecordC::from(
        solve_pcmin(sst, slp, &sounding, &config).to_record(),
    ))
}
