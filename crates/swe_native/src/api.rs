//! Typed table of the native entry points.

use std::os::raw::{c_char, c_double, c_int};

use libloading::Library;

use crate::error::LoadError;

/// Size of every native string buffer (`AS_MAXCH`).
pub(crate) const AS_MAXCH: usize = 256;

/// Native failure return code.
pub(crate) const ERR: c_int = -1;

/// JPL file the native library opens when none was selected.
pub(crate) const DEFAULT_JPL_FILE: &str = "de431.eph";

pub(crate) type ErrBuf = [c_char; AS_MAXCH];

pub(crate) const fn err_buf() -> ErrBuf {
    [0; AS_MAXCH]
}

type CalcFn = unsafe extern "C" fn(c_double, c_int, c_int, *mut c_double, *mut c_char) -> c_int;
type AyanamsaExFn = unsafe extern "C" fn(c_double, c_int, *mut c_double, *mut c_char) -> c_int;
pub(crate) type ToUtcFn = unsafe extern "C" fn(
    c_double,
    c_int,
    *mut c_int,
    *mut c_int,
    *mut c_int,
    *mut c_int,
    *mut c_int,
    *mut c_double,
);
type HousesFn =
    unsafe extern "C" fn(c_double, c_double, c_double, c_int, *mut c_double, *mut c_double) -> c_int;
pub(crate) type LocalTimeFn = unsafe extern "C" fn(c_double, c_double, *mut c_double, *mut c_char) -> c_int;

macro_rules! native_api {
    ($($field:ident: $ty:ty = $symbol:literal;)*) => {
        /// Function pointers resolved from a loaded library.
        ///
        /// The pointers are valid only while the [`Library`] they were
        /// resolved from stays loaded.
        pub(crate) struct Api {
            $(pub(crate) $field: $ty,)*
        }

        impl Api {
            /// Resolve every entry point from `lib`.
            ///
            /// # Safety
            ///
            /// `lib` must export these symbols with the declared C
            /// signatures, and must outlive the returned table.
            pub(crate) unsafe fn load(lib: &Library) -> Result<Self, LoadError> {
                Ok(Self {
                    // SAFETY: forwarded from the caller's contract.
                    $($field: unsafe { resolve::<$ty>(lib, $symbol)? },)*
                })
            }
        }
    };
}

native_api! {
    version: unsafe extern "C" fn(*mut c_char) -> *mut c_char = "swe_version";
    set_ephe_path: unsafe extern "C" fn(*const c_char) = "swe_set_ephe_path";
    close: unsafe extern "C" fn() = "swe_close";
    set_jpl_file: unsafe extern "C" fn(*const c_char) = "swe_set_jpl_file";
    set_topo: unsafe extern "C" fn(c_double, c_double, c_double) = "swe_set_topo";
    set_sid_mode: unsafe extern "C" fn(c_int, c_double, c_double) = "swe_set_sid_mode";
    calc: CalcFn = "swe_calc";
    calc_ut: CalcFn = "swe_calc_ut";
    get_planet_name: unsafe extern "C" fn(c_int, *mut c_char) -> *mut c_char = "swe_get_planet_name";
    get_ayanamsa: unsafe extern "C" fn(c_double) -> c_double = "swe_get_ayanamsa";
    get_ayanamsa_ut: unsafe extern "C" fn(c_double) -> c_double = "swe_get_ayanamsa_ut";
    get_ayanamsa_ex: AyanamsaExFn = "swe_get_ayanamsa_ex";
    get_ayanamsa_ex_ut: AyanamsaExFn = "swe_get_ayanamsa_ex_ut";
    get_ayanamsa_name: unsafe extern "C" fn(c_int) -> *const c_char = "swe_get_ayanamsa_name";
    julday: unsafe extern "C" fn(c_int, c_int, c_int, c_double, c_int) -> c_double = "swe_julday";
    revjul: unsafe extern "C" fn(c_double, c_int, *mut c_int, *mut c_int, *mut c_int, *mut c_double) = "swe_revjul";
    utc_to_jd: unsafe extern "C" fn(
        c_int, c_int, c_int, c_int, c_int, c_double, c_int, *mut c_double, *mut c_char,
    ) -> c_int = "swe_utc_to_jd";
    jdet_to_utc: ToUtcFn = "swe_jdet_to_utc";
    jdut1_to_utc: ToUtcFn = "swe_jdut1_to_utc";
    houses: HousesFn = "swe_houses";
    houses_ex: unsafe extern "C" fn(
        c_double, c_int, c_double, c_double, c_int, *mut c_double, *mut c_double,
    ) -> c_int = "swe_houses_ex";
    houses_armc: HousesFn = "swe_houses_armc";
    house_pos: unsafe extern "C" fn(
        c_double, c_double, c_double, c_int, *mut c_double, *mut c_char,
    ) -> c_double = "swe_house_pos";
    house_name: unsafe extern "C" fn(c_int) -> *const c_char = "swe_house_name";
    deltat: unsafe extern "C" fn(c_double) -> c_double = "swe_deltat";
    deltat_ex: unsafe extern "C" fn(c_double, c_int, *mut c_char) -> c_double = "swe_deltat_ex";
    time_equ: unsafe extern "C" fn(c_double, *mut c_double, *mut c_char) -> c_int = "swe_time_equ";
    lmt_to_lat: LocalTimeFn = "swe_lmt_to_lat";
    lat_to_lmt: LocalTimeFn = "swe_lat_to_lmt";
    sidtime0: unsafe extern "C" fn(c_double, c_double, c_double) -> c_double = "swe_sidtime0";
    sidtime: unsafe extern "C" fn(c_double) -> c_double = "swe_sidtime";
}

/// # Safety
///
/// `T` must be the function pointer type of the exported `symbol`.
unsafe fn resolve<T: Copy>(lib: &Library, symbol: &'static str) -> Result<T, LoadError> {
    // SAFETY: the caller guarantees `T` matches the symbol's signature.
    let sym = unsafe { lib.get::<T>(symbol.as_bytes()) }
        .map_err(|source| LoadError::Symbol { symbol, source })?;
    log::trace!("resolved {symbol}");
    Ok(*sym)
}
