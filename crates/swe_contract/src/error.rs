//! Error taxonomy shared by every provider implementation.

use thiserror::Error;

/// Closed set of failure kinds a provider may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Unresolvable,
    UndefinedGeometry,
    NativeLibrary,
}

/// Errors returned by fallible [`crate::EphemerisProvider`] operations.
///
/// Native error codes never appear here; bindings translate them into one
/// of these kinds and keep the native message as context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EphemerisError {
    /// Malformed calendar date or inconsistent flag/sub-structure combination.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// ΔT, ayanamsa or a time equation cannot be computed for the request.
    #[error("unresolvable: {0}")]
    Unresolvable(String),
    /// House position is undefined for the requested system and location.
    #[error("undefined house geometry: {0}")]
    UndefinedGeometry(String),
    /// Opaque failure reported by the wrapped library (e.g. missing file).
    #[error("native library error: {0}")]
    NativeLibrary(String),
}

impl EphemerisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Unresolvable(_) => ErrorKind::Unresolvable,
            Self::UndefinedGeometry(_) => ErrorKind::UndefinedGeometry,
            Self::NativeLibrary(_) => ErrorKind::NativeLibrary,
        }
    }

    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::InvalidInput => Self::InvalidInput(message),
            ErrorKind::Unresolvable => Self::Unresolvable(message),
            ErrorKind::UndefinedGeometry => Self::UndefinedGeometry(message),
            ErrorKind::NativeLibrary => Self::NativeLibrary(message),
        }
    }

    /// The message carried by the error, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(m)
            | Self::Unresolvable(m)
            | Self::UndefinedGeometry(m)
            | Self::NativeLibrary(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_matches_kind() {
        for kind in [
            ErrorKind::InvalidInput,
            ErrorKind::Unresolvable,
            ErrorKind::UndefinedGeometry,
            ErrorKind::NativeLibrary,
        ] {
            let err = EphemerisError::new(kind, "boom");
            assert_eq!(err.kind(), kind);
            assert_eq!(err.message(), "boom");
        }
    }

    #[test]
    fn display_has_kind_prefix() {
        let err = EphemerisError::UndefinedGeometry("circumpolar body".into());
        assert_eq!(err.to_string(), "undefined house geometry: circumpolar body");
    }
}
