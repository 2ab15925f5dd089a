//! Conformance checks any [`EphemerisProvider`] must pass.
//!
//! Each check exercises a relation between contract operations (inverse
//! pairs, ET/UT agreement, equivalent house calls, flag hygiene) and
//! reports the first violated comparison. [`run_all`] evaluates every check
//! at a fixed set of reference inputs that need no ephemeris files (the
//! built-in Moshier ephemeris is selected for position checks).

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::body::{Body, ECL_NUT};
use crate::calendar::{CalendarType, J2000_JD, UtcDateTime};
use crate::error::EphemerisError;
use crate::flags::{
    CalcFlags, EPHEMERIS_MASK, FLG_MOSEPH, FLG_SIDEREAL, FLG_SPEED, FLG_TOPOCTR, FLG_XYZ,
    HouseFlags, TopoLoc,
};
use crate::house::{HouseCusps, HouseSystem, angular_distance_deg};
use crate::provider::EphemerisProvider;
use crate::sidereal::{SidMode, SiderealSystem};

/// Tolerance of the Julian Date round trip, in days (~1 ms).
pub const JULDAY_TOL_DAYS: f64 = 1e-8;
/// Tolerance of the UTC round trips, in seconds.
pub const UTC_TOL_SECONDS: f64 = 1e-3;
/// Tolerance of the local mean/apparent time round trip, in days.
pub const LOCAL_TIME_TOL_DAYS: f64 = 1e-6;
/// Tolerance of position and house comparisons, in degrees.
pub const ANGLE_TOL_DEG: f64 = 1e-6;

/// A violated conformance property.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{property}: {detail}")]
pub struct ConformanceFailure {
    pub property: &'static str,
    pub detail: String,
}

impl ConformanceFailure {
    fn new(property: &'static str, detail: impl Into<String>) -> Self {
        Self {
            property,
            detail: detail.into(),
        }
    }

    fn from_error(property: &'static str, err: EphemerisError) -> Self {
        Self::new(property, format!("operation failed: {err}"))
    }
}

/// `JulDay(2000, 1, 1, 12.0, Gregorian)` is exactly the J2000.0 epoch.
pub fn j2000_epoch<P>(provider: &P) -> Result<(), ConformanceFailure>
where
    P: EphemerisProvider + ?Sized,
{
    let jd = provider.jul_day(2000, 1, 1, 12.0, CalendarType::Gregorian);
    if jd != J2000_JD {
        return Err(ConformanceFailure::new(
            "j2000_epoch",
            format!("expected {J2000_JD}, got {jd}"),
        ));
    }
    Ok(())
}

/// `JulDay(RevJul(jd))` reproduces `jd`.
pub fn julday_round_trip<P>(
    provider: &P,
    jd: f64,
    cal: CalendarType,
    tol_days: f64,
) -> Result<(), ConformanceFailure>
where
    P: EphemerisProvider + ?Sized,
{
    let date = provider.rev_jul(jd, cal);
    let back = provider.jul_day(date.year, date.month, date.day, date.hour, cal);
    let err = (back - jd).abs();
    if !(err <= tol_days) {
        return Err(ConformanceFailure::new(
            "julday_round_trip",
            format!("{cal:?} jd {jd} -> {date:?} -> {back} (error {err:.3e} d)"),
        ));
    }
    Ok(())
}

/// `UTCToJD` followed by `JdETToUTC` (on ET) and `JdUT1ToUTC` (on UT)
/// reproduces the UTC instant.
pub fn utc_round_trip<P>(
    provider: &P,
    utc: &UtcDateTime,
    cal: CalendarType,
    tol_seconds: f64,
) -> Result<(), ConformanceFailure>
where
    P: EphemerisProvider + ?Sized,
{
    const PROPERTY: &str = "utc_round_trip";

    let pair = provider
        .utc_to_jd(utc.year, utc.month, utc.day, utc.decimal_hour(), cal)
        .map_err(|e| ConformanceFailure::from_error(PROPERTY, e))?;

    let reference = provider.jul_day(utc.year, utc.month, utc.day, utc.decimal_hour(), cal);
    for (label, back) in [
        ("ET", provider.jd_et_to_utc(pair.et, cal)),
        ("UT1", provider.jd_ut1_to_utc(pair.ut, cal)),
    ] {
        let jd = provider.jul_day(back.year, back.month, back.day, back.decimal_hour(), cal);
        let err_s = (jd - reference).abs() * 86_400.0;
        if !(err_s <= tol_seconds) {
            return Err(ConformanceFailure::new(
                PROPERTY,
                format!("{utc} via {label} came back as {back} (error {err_s:.3e} s)"),
            ));
        }
    }
    Ok(())
}

/// `LATToLMT(LMTToLAT(jd))` reproduces `jd` at a fixed longitude.
pub fn local_time_round_trip<P>(
    provider: &P,
    jd_lmt: f64,
    geolon: f64,
    tol_days: f64,
) -> Result<(), ConformanceFailure>
where
    P: EphemerisProvider + ?Sized,
{
    const PROPERTY: &str = "local_time_round_trip";

    let jd_lat = provider
        .lmt_to_lat(jd_lmt, geolon)
        .map_err(|e| ConformanceFailure::from_error(PROPERTY, e))?;
    let back = provider
        .lat_to_lmt(jd_lat, geolon)
        .map_err(|e| ConformanceFailure::from_error(PROPERTY, e))?;
    let err = (back - jd_lmt).abs();
    if !(err <= tol_days) {
        return Err(ConformanceFailure::new(
            PROPERTY,
            format!("lon {geolon}: {jd_lmt} -> {jd_lat} -> {back} (error {err:.3e} d)"),
        ));
    }
    Ok(())
}

/// `Calc(ut + ΔT)` and `CalcUT(ut)` give the same position.
pub fn calc_matches_calc_ut<P>(
    provider: &P,
    ut: f64,
    body: i32,
    flags: &CalcFlags,
    tol: f64,
) -> Result<(), ConformanceFailure>
where
    P: EphemerisProvider + ?Sized,
{
    const PROPERTY: &str = "calc_matches_calc_ut";

    let delta_t = provider
        .delta_t_ex(ut, flags.flags & EPHEMERIS_MASK)
        .unwrap_or_else(|_| provider.delta_t(ut));
    let from_et = provider
        .calc(ut + delta_t, body, flags)
        .map_err(|e| ConformanceFailure::from_error(PROPERTY, e))?;
    let from_ut = provider
        .calc_ut(ut, body, flags)
        .map_err(|e| ConformanceFailure::from_error(PROPERTY, e))?;

    for i in 0..3 {
        let diff = if i == 0 && !flags.is_set(FLG_XYZ) {
            angular_distance_deg(from_et.xx[i], from_ut.xx[i])
        } else {
            (from_et.xx[i] - from_ut.xx[i]).abs()
        };
        if !(diff <= tol) {
            return Err(ConformanceFailure::new(
                PROPERTY,
                format!(
                    "body {body} at ut {ut}: component {i} differs by {diff:.3e} ({} vs {})",
                    from_et.xx[i], from_ut.xx[i]
                ),
            ));
        }
    }
    Ok(())
}

/// `Houses`, `HousesEx` without sidereal bit and `HousesArmc` (with the
/// ARMC and true obliquity of the same instant) agree.
pub fn house_variants_agree<P>(
    provider: &P,
    ut: f64,
    geolat: f64,
    geolon: f64,
    hsys: HouseSystem,
    tol_deg: f64,
) -> Result<(), ConformanceFailure>
where
    P: EphemerisProvider + ?Sized,
{
    const PROPERTY: &str = "house_variants_agree";

    let direct = provider.houses(ut, geolat, geolon, hsys);
    let extended = provider.houses_ex(ut, &HouseFlags::new(0), geolat, geolon, hsys);
    compare_houses(PROPERTY, "houses_ex", &direct, &extended, tol_deg)?;

    let et = ut + provider.delta_t(ut);
    let nutation = provider
        .calc(et, ECL_NUT, &CalcFlags::new(0))
        .map_err(|e| ConformanceFailure::from_error(PROPERTY, e))?;
    let true_obliquity = nutation.xx[0];
    let from_armc = provider.houses_armc(direct.armc(), geolat, true_obliquity, hsys);
    compare_houses(PROPERTY, "houses_armc", &direct, &from_armc, tol_deg)
}

fn compare_houses(
    property: &'static str,
    label: &str,
    expected: &HouseCusps,
    actual: &HouseCusps,
    tol_deg: f64,
) -> Result<(), ConformanceFailure> {
    if expected.cusps.len() != actual.cusps.len() {
        return Err(ConformanceFailure::new(
            property,
            format!(
                "{label}: {} cusps instead of {}",
                actual.cusps.len(),
                expected.cusps.len()
            ),
        ));
    }
    let cusps = expected.cusps.iter().zip(&actual.cusps);
    let angles = expected.ascmc[..2].iter().zip(&actual.ascmc[..2]);
    for (idx, (a, b)) in cusps.chain(angles).enumerate() {
        let diff = angular_distance_deg(*a, *b);
        if !(diff <= tol_deg) {
            return Err(ConformanceFailure::new(
                property,
                format!("{label}: value {idx} differs by {diff:.3e} deg ({a} vs {b})"),
            ));
        }
    }
    Ok(())
}

/// Populated topocentric/sidereal sub-structures with their bits unset
/// behave exactly as if they were omitted.
pub fn flag_hygiene<P>(
    provider: &P,
    et: f64,
    body: i32,
    base_flags: i32,
) -> Result<(), ConformanceFailure>
where
    P: EphemerisProvider + ?Sized,
{
    const PROPERTY: &str = "flag_hygiene";

    let bits = base_flags & !(FLG_TOPOCTR | FLG_SIDEREAL);
    let clean = CalcFlags::new(bits);
    let polluted = CalcFlags {
        flags: bits,
        topo_loc: Some(TopoLoc::new(47.37, 8.54, 408.0)),
        sid_mode: Some(SidMode::new(SiderealSystem::Lahiri)),
        jpl_file: None,
    };

    let a = provider.calc(et, body, &clean);
    let b = provider.calc(et, body, &polluted);
    match (a, b) {
        (Ok(a), Ok(b)) if a.xx == b.xx => {}
        (Ok(a), Ok(b)) => {
            return Err(ConformanceFailure::new(
                PROPERTY,
                format!("calc differs: {:?} vs {:?}", a.xx, b.xx),
            ));
        }
        (Err(a), Err(b)) if a.kind() == b.kind() => {}
        (a, b) => {
            return Err(ConformanceFailure::new(
                PROPERTY,
                format!("calc outcome differs: {a:?} vs {b:?}"),
            ));
        }
    }

    let tropical = HouseFlags::new(0);
    let stray_mode = HouseFlags {
        flags: 0,
        sid_mode: SidMode::new(SiderealSystem::Lahiri),
    };
    let a = provider.houses_ex(et, &tropical, 47.37, 8.54, HouseSystem::Placidus);
    let b = provider.houses_ex(et, &stray_mode, 47.37, 8.54, HouseSystem::Placidus);
    if a != b {
        return Err(ConformanceFailure::new(
            PROPERTY,
            "houses_ex differs when an inactive sidereal mode is supplied",
        ));
    }
    Ok(())
}

/// Named outcome of one conformance check.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub name: String,
    pub result: Result<(), ConformanceFailure>,
}

/// Outcomes of [`run_all`], in execution order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConformanceReport {
    pub outcomes: Vec<Outcome>,
}

impl ConformanceReport {
    fn record(&mut self, name: impl Into<String>, result: Result<(), ConformanceFailure>) {
        self.outcomes.push(Outcome {
            name: name.into(),
            result,
        });
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConformanceFailure> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }
}

impl Display for ConformanceReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(()) => writeln!(f, "ok    {}", outcome.name)?,
                Err(e) => writeln!(f, "FAIL  {} ({})", outcome.name, e.detail)?,
            }
        }
        let failed = self.failures().count();
        write!(
            f,
            "{} checks, {} passed, {} failed",
            self.outcomes.len(),
            self.outcomes.len() - failed,
            failed
        )
    }
}

/// Reference Julian Dates: J2000, the Gregorian reform, 2023, year 1.
const REFERENCE_JDS: [f64; 4] = [J2000_JD, 2_299_160.5, 2_460_000.25, 1_721_425.5];

/// Evaluate every check at the reference inputs.
pub fn run_all<P>(provider: &P) -> ConformanceReport
where
    P: EphemerisProvider + ?Sized,
{
    let mut report = ConformanceReport::default();
    let ut = 2_460_390.0;
    let moshier = CalcFlags::new(FLG_MOSEPH | FLG_SPEED);

    report.record("j2000_epoch", j2000_epoch(provider));

    for cal in [CalendarType::Gregorian, CalendarType::Julian] {
        for jd in REFERENCE_JDS {
            report.record(
                format!("julday_round_trip({cal:?}, {jd})"),
                julday_round_trip(provider, jd, cal, JULDAY_TOL_DAYS),
            );
        }
    }

    for utc in [
        UtcDateTime::new(2024, 3, 20, 12, 0, 0.0),
        UtcDateTime::new(1985, 7, 1, 6, 30, 15.5),
        UtcDateTime::new(2016, 12, 31, 23, 0, 0.0),
    ] {
        report.record(
            format!("utc_round_trip({utc})"),
            utc_round_trip(provider, &utc, CalendarType::Gregorian, UTC_TOL_SECONDS),
        );
    }

    for geolon in [13.4, -74.0] {
        report.record(
            format!("local_time_round_trip(lon {geolon})"),
            local_time_round_trip(provider, ut, geolon, LOCAL_TIME_TOL_DAYS),
        );
    }

    for body in [Body::Sun, Body::Moon, Body::Mars] {
        report.record(
            format!("calc_matches_calc_ut({body:?})"),
            calc_matches_calc_ut(provider, ut, body.code(), &moshier, ANGLE_TOL_DEG),
        );
    }

    for (hsys, geolat, geolon) in [
        (HouseSystem::Placidus, 52.52, 13.40),
        (HouseSystem::Koch, 40.71, -74.01),
        (HouseSystem::Equal, -33.92, 18.42),
        (HouseSystem::WholeSign, 28.61, 77.21),
    ] {
        report.record(
            format!("house_variants_agree({hsys}, {geolat}, {geolon})"),
            house_variants_agree(provider, ut, geolat, geolon, hsys, ANGLE_TOL_DEG),
        );
    }

    report.record(
        "flag_hygiene(Moon)",
        flag_hygiene(provider, ut, Body::Moon.code(), moshier.flags),
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_failures() {
        let mut report = ConformanceReport::default();
        report.record("a", Ok(()));
        report.record("b", Err(ConformanceFailure::new("b", "broken")));
        assert!(!report.passed());
        assert_eq!(report.failures().count(), 1);
        let text = report.to_string();
        assert!(text.contains("ok    a"));
        assert!(text.contains("FAIL  b (broken)"));
        assert!(text.ends_with("2 checks, 1 passed, 1 failed"));
    }

    #[test]
    fn empty_report_passes() {
        assert!(ConformanceReport::default().passed());
    }

    #[test]
    fn failure_display() {
        let f = ConformanceFailure::new("j2000_epoch", "expected 2451545, got 0");
        assert_eq!(f.to_string(), "j2000_epoch: expected 2451545, got 0");
    }
}
