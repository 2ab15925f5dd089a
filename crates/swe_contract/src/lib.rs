//! Stateless contract for a Swiss Ephemeris binding.
//!
//! This crate provides:
//! - The [`EphemerisProvider`] trait covering lifecycle, positions,
//!   ayanamsa, calendar, UTC, houses and time/sidereal-time operations
//! - Typed flags that carry topocentric location, sidereal mode and JPL
//!   file per call instead of through global setters
//! - The [`EphemerisError`] taxonomy every implementation maps into
//! - Provider-independent [`conformance`] checks

pub mod body;
pub mod calendar;
pub mod conformance;
pub mod error;
pub mod flags;
pub mod house;
pub mod position;
pub mod provider;
pub mod sidereal;

pub use body::{AST_OFFSET, Body, ECL_NUT, asteroid};
pub use calendar::{
    CalendarDate, CalendarType, J2000_JD, JulianDayPair, UtcDateTime, split_hour,
};
pub use conformance::{ConformanceFailure, ConformanceReport, run_all};
pub use error::{EphemerisError, ErrorKind};
pub use flags::{AyanamsaFlags, CalcFlags, HouseFlags, TopoLoc};
pub use house::{HouseCusps, HouseSystem, angular_distance_deg};
pub use position::Position;
pub use provider::EphemerisProvider;
pub use sidereal::{SidMode, SiderealSystem};
