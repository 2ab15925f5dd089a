//! Load errors and translation of native status into the contract taxonomy.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};

use swe_contract::{EphemerisError, ErrorKind};
use thiserror::Error;

use crate::api::ERR;
use crate::config::ConfigError;

/// Failure to obtain a usable native library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load native library {}: {source}", path.display())]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("native library does not export {symbol}: {source}")]
    Symbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}

/// Decode a NUL-terminated native buffer, replacing invalid UTF-8.
pub(crate) fn c_buf_to_string(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Decode a native string pointer; NULL yields an empty string.
///
/// # Safety
///
/// A non-null `ptr` must point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub(crate) unsafe fn c_ptr_to_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}

/// Paths the native library can accept: UTF-8 without interior NUL.
pub(crate) fn path_to_cstring(path: &Path) -> Option<CString> {
    path.to_str().and_then(|s| CString::new(s).ok())
}

/// Message left in a native error buffer, if any.
fn native_message(serr: &[c_char]) -> Option<String> {
    let msg = c_buf_to_string(serr);
    let msg = msg.trim();
    (!msg.is_empty()).then(|| msg.to_string())
}

/// Map a native return code and error buffer into a contract result.
///
/// `ERR` becomes an error of `kind`; a message accompanying a successful
/// call is a native warning and only logged.
pub(crate) fn check_status(
    op: &'static str,
    ret: c_int,
    serr: &[c_char],
    kind: ErrorKind,
) -> Result<(), EphemerisError> {
    let msg = native_message(serr);
    if ret == ERR {
        return Err(EphemerisError::new(
            kind,
            msg.unwrap_or_else(|| format!("{op} failed")),
        ));
    }
    if let Some(warning) = msg {
        log::warn!("{op}: {warning}");
    }
    Ok(())
}

/// Map a native error buffer into a contract result for calls that signal
/// failure only through the buffer.
pub(crate) fn check_message(serr: &[c_char], kind: ErrorKind) -> Result<(), EphemerisError> {
    match native_message(serr) {
        Some(msg) => Err(EphemerisError::new(kind, msg)),
        None => Ok(()),
    }
}

/// Map a native house position into a contract result.
///
/// Positions start at 1.0; the native library returns 0.0 when the point
/// has no position in the system (e.g. circumpolar). Any message alongside
/// a valid position is a caveat and only logged.
pub(crate) fn check_house_position(pos: f64, serr: &[c_char]) -> Result<f64, EphemerisError> {
    let msg = native_message(serr);
    if pos.is_nan() || pos < 1.0 {
        return Err(EphemerisError::UndefinedGeometry(
            msg.unwrap_or_else(|| "house position undefined".to_string()),
        ));
    }
    if let Some(warning) = msg {
        log::warn!("house_pos: {warning}");
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::err_buf;

    fn buf_with(text: &str) -> [c_char; 256] {
        let mut buf = err_buf();
        for (slot, byte) in buf.iter_mut().zip(text.bytes()) {
            *slot = byte as c_char;
        }
        buf
    }

    #[test]
    fn decodes_until_nul() {
        let mut buf = buf_with("Moshier eph");
        buf[7] = 0;
        assert_eq!(c_buf_to_string(&buf), "Moshier");
    }

    #[test]
    fn decodes_unterminated_buffer() {
        let buf = [b'a' as c_char; 4];
        assert_eq!(c_buf_to_string(&buf), "aaaa");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let buf = [0xffu8 as c_char, b'x' as c_char, 0];
        assert_eq!(c_buf_to_string(&buf), "\u{fffd}x");
    }

    #[test]
    fn null_pointer_is_empty() {
        // SAFETY: null is handled before dereferencing.
        assert_eq!(unsafe { c_ptr_to_string(std::ptr::null()) }, "");
    }

    #[test]
    fn pointer_decoding() {
        let s = CString::new("Placidus").unwrap();
        // SAFETY: `s` is NUL-terminated and outlives the call.
        assert_eq!(unsafe { c_ptr_to_string(s.as_ptr()) }, "Placidus");
    }

    #[test]
    fn path_with_nul_is_rejected() {
        assert!(path_to_cstring(Path::new("/usr/share/ephe")).is_some());
        assert!(path_to_cstring(Path::new("bad\0path")).is_none());
    }

    #[test]
    fn err_status_maps_to_kind_with_message() {
        let serr = buf_with("jd 1e9 outside ephemeris range");
        let err = check_status("calc", ERR, &serr, ErrorKind::NativeLibrary).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeLibrary);
        assert_eq!(err.message(), "jd 1e9 outside ephemeris range");
    }

    #[test]
    fn err_status_without_message_names_operation() {
        let err =
            check_status("time_equ", ERR, &err_buf(), ErrorKind::Unresolvable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unresolvable);
        assert_eq!(err.message(), "time_equ failed");
    }

    #[test]
    fn warning_on_success_is_not_an_error() {
        let serr = buf_with("SwissEph file not found, using Moshier");
        assert!(check_status("calc", 4, &serr, ErrorKind::NativeLibrary).is_ok());
    }

    #[test]
    fn message_only_failures() {
        assert!(check_message(&err_buf(), ErrorKind::UndefinedGeometry).is_ok());
        let err =
            check_message(&buf_with("within polar circle"), ErrorKind::UndefinedGeometry)
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedGeometry);
    }

    #[test]
    fn house_position_caveat_is_not_an_error() {
        let serr = buf_with("swe_house_pos(): using simplified algorithm for system L");
        assert_eq!(check_house_position(7.25, &serr).unwrap(), 7.25);
        assert_eq!(check_house_position(1.0, &err_buf()).unwrap(), 1.0);
    }

    #[test]
    fn zero_house_position_is_undefined_geometry() {
        let serr = buf_with("no Koch house position, because planet is circumpolar.");
        let err = check_house_position(0.0, &serr).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedGeometry);
        assert!(err.message().contains("circumpolar"));

        let err = check_house_position(f64::NAN, &err_buf()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedGeometry);
    }
}
