//! House systems and house computation results.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::EphemerisError;

/// Number of slots in the native ascendant/angle vector.
pub const ASCMC_LEN: usize = 10;

/// Largest cusp count of any system (Gauquelin sectors).
pub const MAX_CUSPS: usize = 36;

/// House division methods of the native library, keyed by their letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HouseSystem {
    /// Equal houses from the Ascendant.
    Equal,
    Alcabitius,
    Campanus,
    /// Equal houses from the MC.
    EqualMc,
    Carter,
    /// 36 Gauquelin sectors.
    Gauquelin,
    /// Horizon/azimuth.
    Horizon,
    /// Sunshine houses, Treindl's solution.
    Sunshine,
    /// Sunshine houses, Makransky's solution (native `i`).
    SunshineMakransky,
    SavardA,
    Koch,
    PullenSinusoidalDelta,
    Morinus,
    /// Equal houses with house 1 at 0° Aries.
    EqualAries,
    Porphyry,
    Placidus,
    PullenSinusoidalRatio,
    Regiomontanus,
    Sripati,
    /// Polich/Page.
    Topocentric,
    KrusinskiPisaGoelzer,
    Vehlow,
    WholeSign,
    /// Axial rotation / meridian houses.
    AxialRotation,
    /// Astronomical Polar Cusps.
    Apc,
}

const ALL_HOUSE_SYSTEMS: [HouseSystem; 25] = [
    HouseSystem::Equal,
    HouseSystem::Alcabitius,
    HouseSystem::Campanus,
    HouseSystem::EqualMc,
    HouseSystem::Carter,
    HouseSystem::Gauquelin,
    HouseSystem::Horizon,
    HouseSystem::Sunshine,
    HouseSystem::SunshineMakransky,
    HouseSystem::SavardA,
    HouseSystem::Koch,
    HouseSystem::PullenSinusoidalDelta,
    HouseSystem::Morinus,
    HouseSystem::EqualAries,
    HouseSystem::Porphyry,
    HouseSystem::Placidus,
    HouseSystem::PullenSinusoidalRatio,
    HouseSystem::Regiomontanus,
    HouseSystem::Sripati,
    HouseSystem::Topocentric,
    HouseSystem::KrusinskiPisaGoelzer,
    HouseSystem::Vehlow,
    HouseSystem::WholeSign,
    HouseSystem::AxialRotation,
    HouseSystem::Apc,
];

impl HouseSystem {
    pub const fn all() -> &'static [HouseSystem] {
        &ALL_HOUSE_SYSTEMS
    }

    /// Native house system letter.
    pub const fn code(self) -> u8 {
        match self {
            Self::Equal => b'A',
            Self::Alcabitius => b'B',
            Self::Campanus => b'C',
            Self::EqualMc => b'D',
            Self::Carter => b'F',
            Self::Gauquelin => b'G',
            Self::Horizon => b'H',
            Self::Sunshine => b'I',
            Self::SunshineMakransky => b'i',
            Self::SavardA => b'J',
            Self::Koch => b'K',
            Self::PullenSinusoidalDelta => b'L',
            Self::Morinus => b'M',
            Self::EqualAries => b'N',
            Self::Porphyry => b'O',
            Self::Placidus => b'P',
            Self::PullenSinusoidalRatio => b'Q',
            Self::Regiomontanus => b'R',
            Self::Sripati => b'S',
            Self::Topocentric => b'T',
            Self::KrusinskiPisaGoelzer => b'U',
            Self::Vehlow => b'V',
            Self::WholeSign => b'W',
            Self::AxialRotation => b'X',
            Self::Apc => b'Y',
        }
    }

    /// Convert a native letter into a system. `E` is an alias of `A`;
    /// letters are case-insensitive except the distinct `i`.
    pub const fn from_code(code: u8) -> Option<Self> {
        if code == b'i' {
            return Some(Self::SunshineMakransky);
        }
        let system = match code.to_ascii_uppercase() {
            b'A' | b'E' => Self::Equal,
            b'B' => Self::Alcabitius,
            b'C' => Self::Campanus,
            b'D' => Self::EqualMc,
            b'F' => Self::Carter,
            b'G' => Self::Gauquelin,
            b'H' => Self::Horizon,
            b'I' => Self::Sunshine,
            b'J' => Self::SavardA,
            b'K' => Self::Koch,
            b'L' => Self::PullenSinusoidalDelta,
            b'M' => Self::Morinus,
            b'N' => Self::EqualAries,
            b'O' => Self::Porphyry,
            b'P' => Self::Placidus,
            b'Q' => Self::PullenSinusoidalRatio,
            b'R' => Self::Regiomontanus,
            b'S' => Self::Sripati,
            b'T' => Self::Topocentric,
            b'U' => Self::KrusinskiPisaGoelzer,
            b'V' => Self::Vehlow,
            b'W' => Self::WholeSign,
            b'X' => Self::AxialRotation,
            b'Y' => Self::Apc,
            _ => return None,
        };
        Some(system)
    }

    /// Number of cusps the system produces.
    pub const fn cusp_count(self) -> usize {
        match self {
            Self::Gauquelin => MAX_CUSPS,
            _ => 12,
        }
    }

    /// Whether the cusps depend on the observer latitude.
    ///
    /// Quadrant systems based on semi-arcs break down inside the polar
    /// circles; the native library then substitutes Porphyry.
    pub const fn polar_fallback(self) -> bool {
        matches!(
            self,
            Self::Placidus | Self::Koch | Self::Gauquelin | Self::Topocentric
        )
    }
}

impl Display for HouseSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code() as char)
    }
}

impl FromStr for HouseSystem {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EphemerisError::InvalidInput(format!("unknown house system: {s}"));
        match s.as_bytes() {
            [code] => Self::from_code(*code).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

/// Cusps and angles returned by the house operations.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseCusps {
    /// Cusp longitudes; `cusps[0]` is house 1.
    pub cusps: Vec<f64>,
    /// Ascendant, MC, ARMC, Vertex, equatorial ascendant, co-ascendant
    /// (Koch), co-ascendant (Munkasey), polar ascendant, two unused slots.
    pub ascmc: [f64; ASCMC_LEN],
}

impl HouseCusps {
    /// Cusp of house `number` (1-based).
    pub fn cusp(&self, number: usize) -> Option<f64> {
        number.checked_sub(1).and_then(|i| self.cusps.get(i)).copied()
    }

    pub fn ascendant(&self) -> f64 {
        self.ascmc[0]
    }

    pub fn mc(&self) -> f64 {
        self.ascmc[1]
    }

    pub fn armc(&self) -> f64 {
        self.ascmc[2]
    }

    pub fn vertex(&self) -> f64 {
        self.ascmc[3]
    }

    pub fn equatorial_ascendant(&self) -> f64 {
        self.ascmc[4]
    }

    pub fn co_ascendant_koch(&self) -> f64 {
        self.ascmc[5]
    }

    pub fn co_ascendant_munkasey(&self) -> f64 {
        self.ascmc[6]
    }

    pub fn polar_ascendant(&self) -> f64 {
        self.ascmc[7]
    }
}

/// Smallest absolute difference between two longitudes in degrees.
pub fn angular_distance_deg(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip() {
        for &system in HouseSystem::all() {
            assert_eq!(HouseSystem::from_code(system.code()), Some(system));
        }
    }

    #[test]
    fn lowercase_and_alias() {
        assert_eq!(HouseSystem::from_code(b'p'), Some(HouseSystem::Placidus));
        assert_eq!(HouseSystem::from_code(b'E'), Some(HouseSystem::Equal));
        assert_eq!(HouseSystem::from_code(b'Z'), None);
    }

    #[test]
    fn sunshine_variants_are_distinct() {
        assert_eq!(HouseSystem::from_code(b'I'), Some(HouseSystem::Sunshine));
        assert_eq!(HouseSystem::from_code(b'i'), Some(HouseSystem::SunshineMakransky));
        assert_eq!(HouseSystem::from_code(b'j'), Some(HouseSystem::SavardA));
        assert_eq!("i".parse::<HouseSystem>().unwrap().code(), b'i');
        assert_eq!(HouseSystem::all().len(), 25);
    }

    #[test]
    fn parse_single_letter() {
        assert_eq!("K".parse::<HouseSystem>().unwrap(), HouseSystem::Koch);
        assert!("KP".parse::<HouseSystem>().is_err());
        assert!("".parse::<HouseSystem>().is_err());
    }

    #[test]
    fn display_is_letter() {
        assert_eq!(HouseSystem::WholeSign.to_string(), "W");
    }

    #[test]
    fn gauquelin_has_36_sectors() {
        assert_eq!(HouseSystem::Gauquelin.cusp_count(), 36);
        assert_eq!(HouseSystem::Placidus.cusp_count(), 12);
    }

    #[test]
    fn cusp_lookup_is_one_based() {
        let houses = HouseCusps {
            cusps: (0..12).map(|i| i as f64 * 30.0).collect(),
            ascmc: [0.0; ASCMC_LEN],
        };
        assert_eq!(houses.cusp(1), Some(0.0));
        assert_eq!(houses.cusp(12), Some(330.0));
        assert_eq!(houses.cusp(0), None);
        assert_eq!(houses.cusp(13), None);
    }

    #[test]
    fn ascmc_accessors() {
        let mut ascmc = [0.0; ASCMC_LEN];
        for (i, slot) in ascmc.iter_mut().enumerate() {
            *slot = i as f64;
        }
        let houses = HouseCusps {
            cusps: Vec::new(),
            ascmc,
        };
        assert_eq!(houses.ascendant(), 0.0);
        assert_eq!(houses.mc(), 1.0);
        assert_eq!(houses.armc(), 2.0);
        assert_eq!(houses.vertex(), 3.0);
        assert_eq!(houses.polar_ascendant(), 7.0);
    }

    #[test]
    fn angular_distance_wraps() {
        assert!((angular_distance_deg(359.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((angular_distance_deg(10.0, 190.0) - 180.0).abs() < 1e-12);
        assert!(angular_distance_deg(42.0, 42.0).abs() < 1e-12);
    }
}
