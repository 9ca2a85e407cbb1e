use mpi_core::solver::ConfigError;
use mpi_core::SoundingError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// Every failure crossing the C boundary carries a code for control flow and
/// a message for diagnostics.
///
/// # Example
/// ```rust,ignore
/// let err = DefaultMpiError::null_pointer("out_record");
/// assert_eq!(err.code(), MpiErrorCode::NullPointer);
/// assert_eq!(err.msg(), "Parameter 'out_record' cannot be null");
/// ```
pub(crate) trait MpiError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> MpiErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `MpiError` for the failures the C API reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultMpiError {
    code: MpiErrorCode,
    msg: String,
}

impl DefaultMpiError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"pressure"`, `"out_record"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: MpiErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for a sounding rejected by validation.
    pub fn invalid_sounding(error: &SoundingError) -> Self {
        Self {
            code: MpiErrorCode::InvalidSounding,
            msg: error.to_string(),
        }
    }

    /// Create error for a solver configuration outside its valid range.
    pub fn invalid_config(error: &ConfigError) -> Self {
        Self {
            code: MpiErrorCode::InvalidConfig,
            msg: error.to_string(),
        }
    }

    /// Create error for an invalid scalar argument.
    ///
    /// # Arguments
    /// * `param_name` - The name of the invalid parameter (e.g., `"sst"`)
    /// * `value` - The invalid value
    /// * `constraint` - Description of the constraint (e.g., `"must be finite and positive"`)
    pub fn invalid_parameter(param_name: &str, value: f64, constraint: &str) -> Self {
        Self {
            code: MpiErrorCode::InvalidParameter,
            msg: format!("Parameter '{param_name}' {constraint}, got {value}"),
        }
    }
}

impl MpiError for DefaultMpiError {
    fn code(&self) -> MpiErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<SoundingError> for DefaultMpiError {
    fn from(error: SoundingError) -> Self {
        Self::invalid_sounding(&error)
    }
}

impl From<ConfigError> for DefaultMpiError {
    fn from(error: ConfigError) -> Self {
        Self::invalid_config(&error)
    }
}

/// FFI error codes returned by potential intensity functions.
/// Follows standard C convention: 0 = success, non-zero = error.
///
/// Numerical outcomes (unsuitable parcels, hypercanes, cold oceans) are not
/// errors; they are reported through the status fields of the output record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpiErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Sounding columns are inconsistent, non-finite or not ordered by decreasing pressure.
    InvalidSounding = 2,

    /// Solver configuration parameter out of range.
    InvalidConfig = 3,

    /// Scalar argument is NaN, infinite or outside its physical range.
    InvalidParameter = 4,
}

impl From<DefaultMpiError> for MpiErrorCode {
    fn from(error: DefaultMpiError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, MpiErrorCode)> = const { RefCell::new((None, MpiErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, MpiErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, MpiErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded or no call has been made.
///
/// # Thread Safety
/// Error state is stored per-thread, so each thread sees only its own failures.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// MpiRecordC record;
/// MpiErrorCode err = mpi_solve_pcmin(28.0, 1013.0, sounding, NULL, &record);
/// if (err != Ok) {
///     const char* error = mpi_get_last_error();
///     if (error) {
///         fprintf(stderr, "PCMIN failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn mpi_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `MpiErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn mpi_get_last_error_code() -> MpiErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
