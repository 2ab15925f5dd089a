//! Runtime-loaded binding of the Swiss Ephemeris C library.
//!
//! [`SwissEph`] resolves the library's entry points with `libloading` and
//! implements [`EphemerisProvider`]. The per-call state carried by the
//! flag types (sidereal mode, topocentric location, JPL file) is applied to
//! the native globals under one process-wide lock right before each call,
//! so results never depend on what an earlier call configured.

mod api;
pub mod config;
pub mod error;
mod state;

use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::MutexGuard;
use std::sync::atomic::{AtomicU64, Ordering};

use libloading::Library;
use swe_contract::flags::FLG_JPLEPH;
use swe_contract::house::{ASCMC_LEN, MAX_CUSPS};
use swe_contract::{
    AyanamsaFlags, CalcFlags, CalendarDate, CalendarType, EphemerisError, EphemerisProvider,
    ErrorKind, HouseCusps, HouseFlags, HouseSystem, JulianDayPair, Position, SidMode,
    UtcDateTime, split_hour,
};

use crate::api::{AS_MAXCH, Api, DEFAULT_JPL_FILE, ERR, LocalTimeFn, ToUtcFn, err_buf};
use crate::error::{
    c_buf_to_string, c_ptr_to_string, check_house_position, check_message, check_status,
    path_to_cstring,
};
use crate::state::NativeState;

pub use crate::config::{ConfigError, NativeConfig, default_library_name};
pub use crate::error::LoadError;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// A loaded Swiss Ephemeris library.
///
/// Handles are cheap to share by reference; all methods take `&self` and
/// serialize on the process-wide native lock.
pub struct SwissEph {
    api: Api,
    handle: u64,
    library_path: PathBuf,
    // Keeps the resolved function pointers valid.
    _lib: Library,
}

impl std::fmt::Debug for SwissEph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwissEph")
            .field("handle", &self.handle)
            .field("library_path", &self.library_path)
            .finish_non_exhaustive()
    }
}

impl SwissEph {
    /// Load the library named by `config` and apply its ephemeris path.
    pub fn open(config: &NativeConfig) -> Result<Self, LoadError> {
        config.validate()?;
        let path = &config.library_path;
        log::debug!("loading Swiss Ephemeris from {}", path.display());

        // SAFETY: loading runs the library's initialisers; the Swiss
        // Ephemeris only initialises its own globals.
        let lib = unsafe { Library::new(path) }.map_err(|source| LoadError::Library {
            path: path.clone(),
            source,
        })?;
        // SAFETY: `Api` mirrors the prototypes of swephexp.h and the table
        // is stored next to `lib`, which outlives every call through it.
        let api = unsafe { Api::load(&lib) }?;

        let eph = Self {
            api,
            handle: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
            library_path: path.clone(),
            _lib: lib,
        };
        if let Some(ephe_path) = &config.ephe_path {
            eph.set_path(ephe_path);
        }
        log::debug!("loaded Swiss Ephemeris {}", eph.version());
        Ok(eph)
    }

    /// Load using the platform default overridden by the environment.
    pub fn from_env() -> Result<Self, LoadError> {
        Self::open(&NativeConfig::from_env())
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    fn lock(&self) -> MutexGuard<'static, NativeState> {
        state::lock(self.handle)
    }

    fn apply_sid_mode(&self, state: &mut NativeState, mode: &SidMode) {
        if state.replace_sid_mode(mode) {
            log::trace!("swe_set_sid_mode({}, {}, {})", mode.mode, mode.t0, mode.ayan_t0);
            // SAFETY: plain value arguments.
            unsafe { (self.api.set_sid_mode)(mode.mode, mode.t0, mode.ayan_t0) };
        }
    }

    fn apply_calc_state(&self, state: &mut NativeState, flags: &CalcFlags) {
        if let Some(mode) = flags.sidereal() {
            self.apply_sid_mode(state, mode);
        }
        if let Some(topo) = flags.topo() {
            if state.replace_topo(topo) {
                log::trace!("swe_set_topo({}, {}, {})", topo.lon, topo.lat, topo.alt);
                // SAFETY: plain value arguments; the native order is lon, lat, alt.
                unsafe { (self.api.set_topo)(topo.lon, topo.lat, topo.alt) };
            }
        }
        if flags.is_set(FLG_JPLEPH) {
            let name = flags.jpl().unwrap_or(DEFAULT_JPL_FILE);
            match path_to_cstring(Path::new(name)) {
                Some(c_name) if state.replace_jpl_file(name) => {
                    log::trace!("swe_set_jpl_file({name})");
                    // SAFETY: `c_name` is NUL-terminated and outlives the call;
                    // the native side copies it.
                    unsafe { (self.api.set_jpl_file)(c_name.as_ptr()) };
                }
                Some(_) => {}
                None => log::warn!("ignoring JPL file name {name:?}"),
            }
        }
    }

    fn houses_result(
        op: &'static str,
        ret: c_int,
        hsys: HouseSystem,
        cusps: &[f64; MAX_CUSPS + 1],
        ascmc: [f64; ASCMC_LEN],
    ) -> HouseCusps {
        if ret == ERR {
            if hsys.polar_fallback() {
                log::debug!("{op}: house system {hsys} undefined here, Porphyry substituted");
            } else {
                log::warn!("{op}: native error for house system {hsys}, cusps may be unset");
            }
        }
        HouseCusps {
            cusps: cusps[1..=hsys.cusp_count()].to_vec(),
            ascmc,
        }
    }

    fn to_utc(
        &self,
        convert: ToUtcFn,
        jd: f64,
        cal: CalendarType,
    ) -> UtcDateTime {
        let (mut year, mut month, mut day): (c_int, c_int, c_int) = (0, 0, 0);
        let (mut hour, mut minute): (c_int, c_int) = (0, 0);
        let mut second: f64 = 0.0;
        let _guard = self.lock();
        // SAFETY: every out-pointer refers to a live local.
        unsafe {
            convert(
                jd,
                cal.code(),
                &mut year,
                &mut month,
                &mut day,
                &mut hour,
                &mut minute,
                &mut second,
            )
        };
        UtcDateTime::new(year, month, day, hour, minute, second)
    }

    fn local_time(
        &self,
        op: &'static str,
        convert: LocalTimeFn,
        jd: f64,
        geolon: f64,
    ) -> Result<f64, EphemerisError> {
        let mut out: f64 = 0.0;
        let mut serr = err_buf();
        let ret = {
            let _guard = self.lock();
            // SAFETY: `out` is a live local and `serr` holds AS_MAXCH bytes.
            unsafe { convert(jd, geolon, &mut out, serr.as_mut_ptr()) }
        };
        check_status(op, ret, &serr, ErrorKind::Unresolvable)?;
        Ok(out)
    }
}

impl EphemerisProvider for SwissEph {
    fn version(&self) -> String {
        let mut buf: [c_char; AS_MAXCH] = err_buf();
        let _guard = self.lock();
        // SAFETY: `buf` holds AS_MAXCH bytes as the native call requires.
        unsafe { (self.api.version)(buf.as_mut_ptr()) };
        c_buf_to_string(&buf)
    }

    fn set_path(&self, ephe_path: &Path) {
        let Some(c_path) = path_to_cstring(ephe_path) else {
            log::warn!(
                "ignoring ephemeris path {}: not UTF-8 or contains NUL",
                ephe_path.display()
            );
            return;
        };
        let mut state = self.lock();
        // SAFETY: `c_path` is NUL-terminated and outlives the call; the
        // native side copies it.
        unsafe { (self.api.set_ephe_path)(c_path.as_ptr()) };
        state.invalidate();
        log::debug!("ephemeris path set to {}", ephe_path.display());
    }

    fn close(&self) {
        let mut state = self.lock();
        // SAFETY: no arguments; the native library re-initialises lazily.
        unsafe { (self.api.close)() };
        state.invalidate();
    }

    fn calc(&self, et: f64, body: i32, flags: &CalcFlags) -> Result<Position, EphemerisError> {
        flags.validate()?;
        let mut xx = [0.0; 6];
        let mut serr = err_buf();
        let ret = {
            let mut state = self.lock();
            self.apply_calc_state(&mut state, flags);
            // SAFETY: `xx` holds 6 doubles and `serr` AS_MAXCH bytes.
            unsafe { (self.api.calc)(et, body, flags.flags, xx.as_mut_ptr(), serr.as_mut_ptr()) }
        };
        check_status("calc", ret, &serr, ErrorKind::NativeLibrary)?;
        Ok(Position::new(xx, ret))
    }

    fn calc_ut(&self, ut: f64, body: i32, flags: &CalcFlags) -> Result<Position, EphemerisError> {
        flags.validate()?;
        let mut xx = [0.0; 6];
        let mut serr = err_buf();
        let ret = {
            let mut state = self.lock();
            self.apply_calc_state(&mut state, flags);
            // SAFETY: `xx` holds 6 doubles and `serr` AS_MAXCH bytes.
            unsafe {
                (self.api.calc_ut)(ut, body, flags.flags, xx.as_mut_ptr(), serr.as_mut_ptr())
            }
        };
        check_status("calc_ut", ret, &serr, ErrorKind::NativeLibrary)?;
        Ok(Position::new(xx, ret))
    }

    fn planet_name(&self, body: i32) -> String {
        let mut buf = err_buf();
        let _guard = self.lock();
        // SAFETY: `buf` holds AS_MAXCH bytes as the native call requires.
        unsafe { (self.api.get_planet_name)(body, buf.as_mut_ptr()) };
        c_buf_to_string(&buf)
    }

    fn get_ayanamsa(&self, et: f64) -> f64 {
        let mut state = self.lock();
        self.apply_sid_mode(&mut state, &SidMode::default());
        // SAFETY: plain value argument.
        unsafe { (self.api.get_ayanamsa)(et) }
    }

    fn get_ayanamsa_ut(&self, ut: f64) -> f64 {
        let mut state = self.lock();
        self.apply_sid_mode(&mut state, &SidMode::default());
        // SAFETY: plain value argument.
        unsafe { (self.api.get_ayanamsa_ut)(ut) }
    }

    fn get_ayanamsa_ex(&self, et: f64, flags: &AyanamsaFlags) -> Result<f64, EphemerisError> {
        flags.validate()?;
        let mut daya: f64 = 0.0;
        let mut serr = err_buf();
        let ret = {
            let mut state = self.lock();
            self.apply_sid_mode(&mut state, &flags.sid_mode);
            // SAFETY: `daya` is a live local and `serr` holds AS_MAXCH bytes.
            unsafe { (self.api.get_ayanamsa_ex)(et, flags.flags, &mut daya, serr.as_mut_ptr()) }
        };
        check_status("get_ayanamsa_ex", ret, &serr, ErrorKind::Unresolvable)?;
        Ok(daya)
    }

    fn get_ayanamsa_ex_ut(&self, ut: f64, flags: &AyanamsaFlags) -> Result<f64, EphemerisError> {
        flags.validate()?;
        let mut daya: f64 = 0.0;
        let mut serr = err_buf();
        let ret = {
            let mut state = self.lock();
            self.apply_sid_mode(&mut state, &flags.sid_mode);
            // SAFETY: `daya` is a live local and `serr` holds AS_MAXCH bytes.
            unsafe {
                (self.api.get_ayanamsa_ex_ut)(ut, flags.flags, &mut daya, serr.as_mut_ptr())
            }
        };
        check_status("get_ayanamsa_ex_ut", ret, &serr, ErrorKind::Unresolvable)?;
        Ok(daya)
    }

    fn get_ayanamsa_name(&self, sid_mode: i32) -> String {
        let _guard = self.lock();
        // SAFETY: the native call returns NULL or a pointer into a static table.
        unsafe { c_ptr_to_string((self.api.get_ayanamsa_name)(sid_mode)) }
    }

    fn jul_day(&self, year: i32, month: i32, day: i32, hour: f64, cal: CalendarType) -> f64 {
        let _guard = self.lock();
        // SAFETY: plain value arguments.
        unsafe { (self.api.julday)(year, month, day, hour, cal.code()) }
    }

    fn rev_jul(&self, jd: f64, cal: CalendarType) -> CalendarDate {
        let (mut year, mut month, mut day): (c_int, c_int, c_int) = (0, 0, 0);
        let mut hour: f64 = 0.0;
        let _guard = self.lock();
        // SAFETY: every out-pointer refers to a live local.
        unsafe {
            (self.api.revjul)(jd, cal.code(), &mut year, &mut month, &mut day, &mut hour)
        };
        CalendarDate::new(year, month, day, hour)
    }

    fn utc_to_jd(
        &self,
        year: i32,
        month: i32,
        day: i32,
        hour: f64,
        cal: CalendarType,
    ) -> Result<JulianDayPair, EphemerisError> {
        if !hour.is_finite() {
            return Err(EphemerisError::InvalidInput(format!(
                "hour must be finite, got {hour}"
            )));
        }
        let (h, m, s) = split_hour(hour);
        let mut dret = [0.0; 2];
        let mut serr = err_buf();
        let ret = {
            let _guard = self.lock();
            // SAFETY: `dret` holds 2 doubles and `serr` AS_MAXCH bytes.
            unsafe {
                (self.api.utc_to_jd)(
                    year,
                    month,
                    day,
                    h,
                    m,
                    s,
                    cal.code(),
                    dret.as_mut_ptr(),
                    serr.as_mut_ptr(),
                )
            }
        };
        check_status("utc_to_jd", ret, &serr, ErrorKind::InvalidInput)?;
        Ok(JulianDayPair {
            et: dret[0],
            ut: dret[1],
        })
    }

    fn jd_et_to_utc(&self, et: f64, cal: CalendarType) -> UtcDateTime {
        self.to_utc(self.api.jdet_to_utc, et, cal)
    }

    fn jd_ut1_to_utc(&self, ut1: f64, cal: CalendarType) -> UtcDateTime {
        self.to_utc(self.api.jdut1_to_utc, ut1, cal)
    }

    fn houses(&self, ut: f64, geolat: f64, geolon: f64, hsys: HouseSystem) -> HouseCusps {
        let mut cusps = [0.0; MAX_CUSPS + 1];
        let mut ascmc = [0.0; ASCMC_LEN];
        let ret = {
            let _guard = self.lock();
            // SAFETY: `cusps` holds 37 doubles (enough for Gauquelin) and
            // `ascmc` the 10 the native call writes.
            unsafe {
                (self.api.houses)(
                    ut,
                    geolat,
                    geolon,
                    c_int::from(hsys.code()),
                    cusps.as_mut_ptr(),
                    ascmc.as_mut_ptr(),
                )
            }
        };
        Self::houses_result("houses", ret, hsys, &cusps, ascmc)
    }

    fn houses_ex(
        &self,
        ut: f64,
        flags: &HouseFlags,
        geolat: f64,
        geolon: f64,
        hsys: HouseSystem,
    ) -> HouseCusps {
        let mut cusps = [0.0; MAX_CUSPS + 1];
        let mut ascmc = [0.0; ASCMC_LEN];
        let ret = {
            let mut state = self.lock();
            if let Some(mode) = flags.effective_sid_mode() {
                self.apply_sid_mode(&mut state, mode);
            }
            // SAFETY: `cusps` holds 37 doubles and `ascmc` 10.
            unsafe {
                (self.api.houses_ex)(
                    ut,
                    flags.flags,
                    geolat,
                    geolon,
                    c_int::from(hsys.code()),
                    cusps.as_mut_ptr(),
                    ascmc.as_mut_ptr(),
                )
            }
        };
        Self::houses_result("houses_ex", ret, hsys, &cusps, ascmc)
    }

    fn houses_armc(&self, armc: f64, geolat: f64, eps: f64, hsys: HouseSystem) -> HouseCusps {
        let mut cusps = [0.0; MAX_CUSPS + 1];
        let mut ascmc = [0.0; ASCMC_LEN];
        let ret = {
            let _guard = self.lock();
            // SAFETY: `cusps` holds 37 doubles and `ascmc` 10.
            unsafe {
                (self.api.houses_armc)(
                    armc,
                    geolat,
                    eps,
                    c_int::from(hsys.code()),
                    cusps.as_mut_ptr(),
                    ascmc.as_mut_ptr(),
                )
            }
        };
        Self::houses_result("houses_armc", ret, hsys, &cusps, ascmc)
    }

    fn house_pos(
        &self,
        armc: f64,
        geolat: f64,
        eps: f64,
        hsys: HouseSystem,
        xpin: [f64; 2],
    ) -> Result<f64, EphemerisError> {
        // Native signature takes a full coordinate vector.
        let mut xp = [xpin[0], xpin[1], 0.0, 0.0, 0.0, 0.0];
        let mut serr = err_buf();
        let pos = {
            let _guard = self.lock();
            // SAFETY: `xp` holds 6 doubles and `serr` AS_MAXCH bytes.
            unsafe {
                (self.api.house_pos)(
                    armc,
                    geolat,
                    eps,
                    c_int::from(hsys.code()),
                    xp.as_mut_ptr(),
                    serr.as_mut_ptr(),
                )
            }
        };
        check_house_position(pos, &serr)
    }

    fn house_name(&self, hsys: HouseSystem) -> String {
        let _guard = self.lock();
        // SAFETY: the native call returns NULL or a pointer to a static string.
        unsafe { c_ptr_to_string((self.api.house_name)(c_int::from(hsys.code()))) }
    }

    fn delta_t(&self, jd: f64) -> f64 {
        let _guard = self.lock();
        // SAFETY: plain value argument.
        unsafe { (self.api.deltat)(jd) }
    }

    fn delta_t_ex(&self, jd: f64, flags: i32) -> Result<f64, EphemerisError> {
        let mut serr = err_buf();
        let dt = {
            let _guard = self.lock();
            // SAFETY: `serr` holds AS_MAXCH bytes.
            unsafe { (self.api.deltat_ex)(jd, flags, serr.as_mut_ptr()) }
        };
        check_message(&serr, ErrorKind::InvalidInput)?;
        Ok(dt)
    }

    fn time_equ(&self, jd: f64) -> Result<f64, EphemerisError> {
        let mut te: f64 = 0.0;
        let mut serr = err_buf();
        let ret = {
            let _guard = self.lock();
            // SAFETY: `te` is a live local and `serr` holds AS_MAXCH bytes.
            unsafe { (self.api.time_equ)(jd, &mut te, serr.as_mut_ptr()) }
        };
        check_status("time_equ", ret, &serr, ErrorKind::Unresolvable)?;
        Ok(te)
    }

    fn lmt_to_lat(&self, jd_lmt: f64, geolon: f64) -> Result<f64, EphemerisError> {
        self.local_time("lmt_to_lat", self.api.lmt_to_lat, jd_lmt, geolon)
    }

    fn lat_to_lmt(&self, jd_lat: f64, geolon: f64) -> Result<f64, EphemerisError> {
        self.local_time("lat_to_lmt", self.api.lat_to_lmt, jd_lat, geolon)
    }

    fn sid_time0(&self, ut: f64, eps: f64, nut: f64) -> f64 {
        let _guard = self.lock();
        // SAFETY: plain value arguments.
        unsafe { (self.api.sidtime0)(ut, eps, nut) }
    }

    fn sid_time(&self, ut: f64) -> f64 {
        let _guard = self.lock();
        // SAFETY: plain value argument.
        unsafe { (self.api.sidtime)(ut) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_invalid_config_before_loading() {
        let err = SwissEph::open(&NativeConfig::new("")).unwrap_err();
        assert!(matches!(err, LoadError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn open_reports_missing_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_library_name());
        let err = SwissEph::open(&NativeConfig::new(&path)).unwrap_err();
        match err {
            LoadError::Library { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn houses_result_trims_to_cusp_count() {
        let mut cusps = [0.0; MAX_CUSPS + 1];
        for (i, c) in cusps.iter_mut().enumerate() {
            *c = i as f64;
        }
        let twelve =
            SwissEph::houses_result("houses", 0, HouseSystem::Placidus, &cusps, [0.0; ASCMC_LEN]);
        assert_eq!(twelve.cusps.len(), 12);
        assert_eq!(twelve.cusp(1), Some(1.0));
        assert_eq!(twelve.cusp(12), Some(12.0));

        let sectors =
            SwissEph::houses_result("houses", ERR, HouseSystem::Gauquelin, &cusps, [0.0; ASCMC_LEN]);
        assert_eq!(sectors.cusps.len(), 36);
        assert_eq!(sectors.cusp(36), Some(36.0));
    }

    #[test]
    fn houses_error_outside_polar_systems_still_returns_cusps() {
        let cusps = [15.0; MAX_CUSPS + 1];
        let houses =
            SwissEph::houses_result("houses_armc", ERR, HouseSystem::Equal, &cusps, [0.0; ASCMC_LEN]);
        assert_eq!(houses.cusps, vec![15.0; 12]);
    }
}
