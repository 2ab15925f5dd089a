//! Calculation flags with their per-call sub-structures.
//!
//! The native library configures topocentric location, sidereal mode and
//! the JPL file through separate global setters. These types carry that
//! configuration alongside the flag bits so each request is self-contained.

use crate::error::EphemerisError;
use crate::sidereal::{SidMode, SiderealSystem};

/// Use a JPL ephemeris file.
pub const FLG_JPLEPH: i32 = 1;
/// Use the Swiss Ephemeris files.
pub const FLG_SWIEPH: i32 = 2;
/// Use the built-in Moshier ephemeris.
pub const FLG_MOSEPH: i32 = 4;
/// Heliocentric position.
pub const FLG_HELCTR: i32 = 8;
/// True/geometric position.
pub const FLG_TRUEPOS: i32 = 16;
/// No precession, J2000 equinox.
pub const FLG_J2000: i32 = 32;
/// No nutation, mean equinox of date.
pub const FLG_NONUT: i32 = 64;
/// Speed from three positions.
pub const FLG_SPEED3: i32 = 128;
/// High-precision speed.
pub const FLG_SPEED: i32 = 256;
/// No gravitational deflection.
pub const FLG_NOGDEFL: i32 = 512;
/// No annual aberration.
pub const FLG_NOABERR: i32 = 1024;
/// Astrometric position.
pub const FLG_ASTROMETRIC: i32 = FLG_NOABERR | FLG_NOGDEFL;
/// Equatorial coordinates instead of ecliptic.
pub const FLG_EQUATORIAL: i32 = 2048;
/// Cartesian coordinates instead of polar.
pub const FLG_XYZ: i32 = 4096;
/// Radians instead of degrees.
pub const FLG_RADIANS: i32 = 8192;
/// Barycentric position.
pub const FLG_BARYCTR: i32 = 16384;
/// Topocentric position; requires a [`TopoLoc`].
pub const FLG_TOPOCTR: i32 = 32768;
/// Sidereal position; requires a [`SidMode`].
pub const FLG_SIDEREAL: i32 = 65536;
/// ICRS reference frame.
pub const FLG_ICRS: i32 = 131072;
/// Reproduce JPL Horizons to 1 mas.
pub const FLG_JPLHOR: i32 = 262144;
/// Approximate JPL Horizons to 1 mas.
pub const FLG_JPLHOR_APPROX: i32 = 524288;
/// Center of body instead of barycenter of its system.
pub const FLG_CENTER_BODY: i32 = 1048576;

/// Mask of the three ephemeris source bits.
pub const EPHEMERIS_MASK: i32 = FLG_JPLEPH | FLG_SWIEPH | FLG_MOSEPH;

/// Geographic observer location, degrees and metres above sea level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TopoLoc {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl TopoLoc {
    pub const fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !self.lat.is_finite() || !self.lon.is_finite() || !self.alt.is_finite() {
            return Err("topocentric location must be finite");
        }
        if self.lat.abs() > 90.0 {
            return Err("topocentric latitude must be within [-90, 90]");
        }
        if self.lon.abs() > 180.0 {
            return Err("topocentric longitude must be within [-180, 180]");
        }
        Ok(())
    }
}

/// Flags argument of `Calc`/`CalcUT`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalcFlags {
    pub flags: i32,
    /// Meaningful only with [`FLG_TOPOCTR`].
    pub topo_loc: Option<TopoLoc>,
    /// Meaningful only with [`FLG_SIDEREAL`].
    pub sid_mode: Option<SidMode>,
    /// JPL file name, meaningful only with [`FLG_JPLEPH`].
    pub jpl_file: Option<String>,
}

impl CalcFlags {
    pub const fn new(flags: i32) -> Self {
        Self {
            flags,
            topo_loc: None,
            sid_mode: None,
            jpl_file: None,
        }
    }

    /// Attach a topocentric location and set [`FLG_TOPOCTR`].
    pub fn with_topo(mut self, topo: TopoLoc) -> Self {
        self.flags |= FLG_TOPOCTR;
        self.topo_loc = Some(topo);
        self
    }

    /// Attach a sidereal mode and set [`FLG_SIDEREAL`].
    pub fn with_sid_mode(mut self, sid_mode: SidMode) -> Self {
        self.flags |= FLG_SIDEREAL;
        self.sid_mode = Some(sid_mode);
        self
    }

    /// Select a JPL file, set [`FLG_JPLEPH`] and clear the other sources.
    pub fn with_jpl_file(mut self, name: impl Into<String>) -> Self {
        self.flags = (self.flags & !EPHEMERIS_MASK) | FLG_JPLEPH;
        self.jpl_file = Some(name.into());
        self
    }

    pub const fn is_set(&self, bit: i32) -> bool {
        self.flags & bit == bit
    }

    /// Topocentric location, if it takes effect.
    pub fn topo(&self) -> Option<&TopoLoc> {
        self.topo_loc.as_ref().filter(|_| self.is_set(FLG_TOPOCTR))
    }

    /// Sidereal mode, if it takes effect.
    pub fn sidereal(&self) -> Option<&SidMode> {
        self.sid_mode.as_ref().filter(|_| self.is_set(FLG_SIDEREAL))
    }

    /// JPL file name, if it takes effect.
    pub fn jpl(&self) -> Option<&str> {
        self.jpl_file.as_deref().filter(|_| self.is_set(FLG_JPLEPH))
    }

    /// Check that flag bits and sub-structures agree.
    pub fn validate(&self) -> Result<(), EphemerisError> {
        if self.is_set(FLG_TOPOCTR) {
            let topo = self.topo_loc.as_ref().ok_or_else(|| {
                EphemerisError::InvalidInput("topocentric flag set without a location".into())
            })?;
            topo.validate()
                .map_err(|msg| EphemerisError::InvalidInput(msg.into()))?;
            if self.flags & (FLG_HELCTR | FLG_BARYCTR) != 0 {
                return Err(EphemerisError::InvalidInput(
                    "topocentric flag cannot be combined with helio- or barycentric".into(),
                ));
            }
        }
        if self.is_set(FLG_SIDEREAL) {
            let sid_mode = self.sid_mode.as_ref().ok_or_else(|| {
                EphemerisError::InvalidInput("sidereal flag set without a sidereal mode".into())
            })?;
            sid_mode
                .validate()
                .map_err(|msg| EphemerisError::InvalidInput(msg.into()))?;
        }
        if let Some(name) = self.jpl() {
            if name.is_empty() || name.contains('\0') {
                return Err(EphemerisError::InvalidInput(
                    "JPL file name must be non-empty and free of NUL".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Flags argument of `GetAyanamsaEx`/`GetAyanamsaExUT`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AyanamsaFlags {
    pub flags: i32,
    pub sid_mode: SidMode,
}

impl AyanamsaFlags {
    pub const fn new(flags: i32, sid_mode: SidMode) -> Self {
        Self { flags, sid_mode }
    }

    pub fn validate(&self) -> Result<(), EphemerisError> {
        self.sid_mode
            .validate()
            .map_err(|msg| EphemerisError::InvalidInput(msg.into()))
    }
}

/// Flags argument of `HousesEx`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HouseFlags {
    pub flags: i32,
    /// Applied only with [`FLG_SIDEREAL`].
    pub sid_mode: SidMode,
}

impl HouseFlags {
    pub const fn new(flags: i32) -> Self {
        Self {
            flags,
            sid_mode: SidMode::new(SiderealSystem::FaganBradley),
        }
    }

    /// Sidereal houses in the given mode.
    pub const fn sidereal(flags: i32, sid_mode: SidMode) -> Self {
        Self {
            flags: flags | FLG_SIDEREAL,
            sid_mode,
        }
    }

    /// Sidereal mode, if it takes effect.
    pub fn effective_sid_mode(&self) -> Option<&SidMode> {
        (self.flags & FLG_SIDEREAL != 0).then_some(&self.sid_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn greenwich() -> TopoLoc {
        TopoLoc::new(51.4769, -0.0005, 46.0)
    }

    #[test]
    fn builders_set_bits() {
        let fl = CalcFlags::new(FLG_SWIEPH | FLG_SPEED)
            .with_topo(greenwich())
            .with_sid_mode(SidMode::new(SiderealSystem::Lahiri));
        assert!(fl.is_set(FLG_TOPOCTR));
        assert!(fl.is_set(FLG_SIDEREAL));
        assert!(fl.is_set(FLG_SPEED));
        assert!(fl.validate().is_ok());
    }

    #[test]
    fn jpl_file_replaces_ephemeris_source() {
        let fl = CalcFlags::new(FLG_SWIEPH | FLG_SPEED).with_jpl_file("de441.eph");
        assert_eq!(fl.flags & EPHEMERIS_MASK, FLG_JPLEPH);
        assert_eq!(fl.jpl(), Some("de441.eph"));
    }

    #[test]
    fn unset_bits_hide_sub_structures() {
        let fl = CalcFlags {
            flags: FLG_SWIEPH,
            topo_loc: Some(greenwich()),
            sid_mode: Some(SidMode::new(SiderealSystem::Raman)),
            jpl_file: Some("de441.eph".into()),
        };
        assert!(fl.topo().is_none());
        assert!(fl.sidereal().is_none());
        assert!(fl.jpl().is_none());
        assert!(fl.validate().is_ok());
    }

    #[test]
    fn topo_bit_without_location_rejected() {
        let err = CalcFlags::new(FLG_TOPOCTR).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn sidereal_bit_without_mode_rejected() {
        let err = CalcFlags::new(FLG_SIDEREAL).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn topo_with_heliocentric_rejected() {
        let fl = CalcFlags::new(FLG_HELCTR).with_topo(greenwich());
        assert!(fl.validate().is_err());
    }

    #[test]
    fn out_of_range_location_rejected() {
        let fl = CalcFlags::new(0).with_topo(TopoLoc::new(91.0, 0.0, 0.0));
        assert!(fl.validate().is_err());
        let fl = CalcFlags::new(0).with_topo(TopoLoc::new(0.0, f64::INFINITY, 0.0));
        assert!(fl.validate().is_err());
    }

    #[test]
    fn jpl_bit_without_file_is_valid() {
        assert!(CalcFlags::new(FLG_JPLEPH).validate().is_ok());
    }

    #[test]
    fn jpl_file_with_nul_rejected() {
        let fl = CalcFlags::new(0).with_jpl_file("de\0441");
        assert!(fl.validate().is_err());
    }

    #[test]
    fn house_flags_sidereal_only_with_bit() {
        let tropical = HouseFlags::new(0);
        assert!(tropical.effective_sid_mode().is_none());
        let sidereal = HouseFlags::sidereal(0, SidMode::new(SiderealSystem::Lahiri));
        assert_eq!(
            sidereal.effective_sid_mode().map(|m| m.mode),
            Some(SiderealSystem::Lahiri.code())
        );
    }

    #[test]
    fn ayanamsa_flags_validate_reference() {
        let fl = AyanamsaFlags::new(FLG_SWIEPH, SidMode::user(f64::NAN, 0.0));
        assert!(fl.validate().is_err());
    }
}
