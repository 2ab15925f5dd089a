//! The provider contract.

use std::path::Path;

use crate::calendar::{CalendarDate, CalendarType, JulianDayPair, UtcDateTime};
use crate::error::EphemerisError;
use crate::flags::{AyanamsaFlags, CalcFlags, HouseFlags};
use crate::house::{HouseCusps, HouseSystem};
use crate::position::Position;

/// Operations a binding to the native ephemeris library must support.
///
/// Every computational method is a function of its explicit arguments
/// only: sidereal mode, topocentric location and JPL file travel with the
/// flags of each call instead of living in global state. Implementations
/// that wrap a library with process-global state synchronize internally,
/// which is why every method takes `&self`.
///
/// Methods returning a plain value mirror native calls without a failure
/// mode and never fabricate errors.
pub trait EphemerisProvider {
    /// Version string of the native library.
    fn version(&self) -> String;

    /// Directory the native library searches for ephemeris files.
    fn set_path(&self, ephe_path: &Path);

    /// Release native resources (open files, caches).
    fn close(&self);

    /// Position (and speed with `FLG_SPEED`) of `body` at Julian Date `et`
    /// in Ephemeris Time.
    fn calc(&self, et: f64, body: i32, flags: &CalcFlags) -> Result<Position, EphemerisError>;

    /// As [`calc`](Self::calc) at Julian Date `ut` in Universal Time; ΔT is
    /// applied by the provider.
    fn calc_ut(&self, ut: f64, body: i32, flags: &CalcFlags) -> Result<Position, EphemerisError>;

    /// Name of `body`; unknown ids yield a library-defined placeholder.
    fn planet_name(&self, body: i32) -> String;

    /// Ayanamsa at `et` in the default sidereal mode.
    fn get_ayanamsa(&self, et: f64) -> f64;

    /// Ayanamsa at `ut` in the default sidereal mode.
    fn get_ayanamsa_ut(&self, ut: f64) -> f64;

    /// Ayanamsa at `et` using the ΔT consistent with the ephemeris in
    /// `flags.flags`.
    fn get_ayanamsa_ex(&self, et: f64, flags: &AyanamsaFlags) -> Result<f64, EphemerisError>;

    /// Ayanamsa at `ut` using the ΔT consistent with the ephemeris in
    /// `flags.flags`.
    fn get_ayanamsa_ex_ut(&self, ut: f64, flags: &AyanamsaFlags) -> Result<f64, EphemerisError>;

    /// Name of the sidereal mode `sid_mode`.
    fn get_ayanamsa_name(&self, sid_mode: i32) -> String;

    /// Julian Date of a calendar date with decimal `hour`.
    fn jul_day(&self, year: i32, month: i32, day: i32, hour: f64, cal: CalendarType) -> f64;

    /// Calendar date of Julian Date `jd`.
    fn rev_jul(&self, jd: f64, cal: CalendarType) -> CalendarDate;

    /// ET and UT Julian Dates of a UTC date, honouring leap seconds.
    fn utc_to_jd(
        &self,
        year: i32,
        month: i32,
        day: i32,
        hour: f64,
        cal: CalendarType,
    ) -> Result<JulianDayPair, EphemerisError>;

    /// UTC date of Julian Date `et` in Ephemeris Time.
    fn jd_et_to_utc(&self, et: f64, cal: CalendarType) -> UtcDateTime;

    /// UTC date of Julian Date `ut1` in UT1.
    fn jd_ut1_to_utc(&self, ut1: f64, cal: CalendarType) -> UtcDateTime;

    fn houses(&self, ut: f64, geolat: f64, geolon: f64, hsys: HouseSystem) -> HouseCusps;

    fn houses_ex(
        &self,
        ut: f64,
        flags: &HouseFlags,
        geolat: f64,
        geolon: f64,
        hsys: HouseSystem,
    ) -> HouseCusps;

    fn houses_armc(&self, armc: f64, geolat: f64, eps: f64, hsys: HouseSystem) -> HouseCusps;

    /// House position (1.0..13.0, or 1.0..37.0 for Gauquelin) of the
    /// ecliptic point `xpin = [lon, lat]`.
    fn house_pos(
        &self,
        armc: f64,
        geolat: f64,
        eps: f64,
        hsys: HouseSystem,
        xpin: [f64; 2],
    ) -> Result<f64, EphemerisError>;

    fn house_name(&self, hsys: HouseSystem) -> String;

    /// ΔT in days at Julian Date `jd`.
    fn delta_t(&self, jd: f64) -> f64;

    /// ΔT in days consistent with the ephemeris selected in `flags`.
    fn delta_t_ex(&self, jd: f64, flags: i32) -> Result<f64, EphemerisError>;

    /// Equation of time in days at `jd`.
    fn time_equ(&self, jd: f64) -> Result<f64, EphemerisError>;

    /// Local apparent time of local mean time `jd_lmt` at `geolon`.
    fn lmt_to_lat(&self, jd_lmt: f64, geolon: f64) -> Result<f64, EphemerisError>;

    /// Local mean time of local apparent time `jd_lat` at `geolon`.
    fn lat_to_lmt(&self, jd_lat: f64, geolon: f64) -> Result<f64, EphemerisError>;

    /// Sidereal time in hours from explicit obliquity and nutation.
    fn sid_time0(&self, ut: f64, eps: f64, nut: f64) -> f64;

    /// Sidereal time in hours at `ut`.
    fn sid_time(&self, ut: f64) -> f64;
}
