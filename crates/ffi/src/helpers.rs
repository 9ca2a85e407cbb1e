use crate::config::MpiConfigC;
use crate::error::{with_last_error_mut, DefaultMpiError, MpiError, MpiErrorCode};
use mpi_core::SolverConfig;
use std::ffi::CString;
use std::slice;
use tracing::debug;

/// Set the thread-local error message and code.
/// Accepts any type implementing `MpiError` trait.
pub(crate) fn set_last_error(error: &impl MpiError) {
    debug!(code = ?error.code(), message = error.msg(), "FFI call failed");
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl MpiError) -> MpiErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, or clear the last error on success.
pub(crate) fn track_result<T>(result: Result<T, DefaultMpiError>) -> Result<T, MpiErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = MpiErrorCode::Ok;
    });
}

/// Borrow a caller-owned `f64` column.
///
/// # Safety
/// `ptr` must be null or point to `len` readable, initialized `f64` values
/// that stay alive and unmodified for the returned lifetime.
pub(crate) unsafe fn column_from_raw<'a>(
    ptr: *const f64,
    len: usize,
    param_name: &str,
) -> Result<&'a [f64], DefaultMpiError> {
    if ptr.is_null() {
        return Err(DefaultMpiError::null_pointer(param_name));
    }
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Read an optional configuration; null selects the defaults.
///
/// # Safety
/// `config` must be null or point to a valid `MpiConfigC`.
pub(crate) unsafe fn config_from_ptr(
    config: *const MpiConfigC,
) -> Result<SolverConfig, DefaultMpiError> {
    let config = if config.is_null() {
        SolverConfig::default()
    } else {
        SolverConfig::from(unsafe { *config })
    };
    config.validate()?;
    Ok(config)
}

/// Reject NaN and infinite scalar arguments.
pub(crate) fn finite(param_name: &str, value: f64) -> Result<f64, DefaultMpiError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DefaultMpiError::invalid_parameter(param_name, value, "must be finite"))
    }
}

/// Accept only finite values strictly above zero (pressures, absolute temperatures).
pub(crate) fn positive(param_name: &str, value: f64) -> Result<f64, DefaultMpiError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DefaultMpiError::invalid_parameter(
            param_name,
            value,
            "must be finite and positive",
        ))
    }
}

/// Accept only finite values at or above `min`.
pub(crate) fn at_least(
    param_name: &str,
    value: f64,
    min: f64,
) -> Result<f64, DefaultMpiError> {
    if value.is_finite() && value >= min {
        Ok(value)
    } else {
        Err(DefaultMpiError::invalid_parameter(
            param_name,
            value,
            &format!("must be finite and at least {min}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_checks() {
        assert_eq!(finite("x", -5.0), Ok(-5.0));
        assert!(finite("x", f64::NAN).is_err());

        assert_eq!(positive("p", 1013.0), Ok(1013.0));
        assert!(positive("p", 0.0).is_err());
        assert!(positive("p", -1013.0).is_err());
        assert!(positive("p", f64::INFINITY).is_err());

        assert_eq!(at_least("sst", -273.15, -273.15), Ok(-273.15));
        let err = at_least("sst", -300.0, -273.15).unwrap_err();
        assert_eq!(err.code(), MpiErrorCode::InvalidParameter);
        assert_eq!(
            err.msg(),
            "Parameter 'sst' must be finite and at least -273.15, got -300"
        );
    }
}
