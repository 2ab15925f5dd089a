//! Output of the position calculations.

/// Six-component result of `Calc`/`CalcUT`.
///
/// With default flags the components are ecliptic longitude, latitude and
/// distance followed by their daily speeds. `FLG_EQUATORIAL` turns them
/// into right ascension/declination, `FLG_XYZ` into Cartesian x/y/z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub xx: [f64; 6],
    /// Flags actually used by the provider; may differ from the request
    /// (e.g. a fallback to another ephemeris source).
    pub flags: i32,
}

impl Position {
    pub const fn new(xx: [f64; 6], flags: i32) -> Self {
        Self { xx, flags }
    }

    pub fn longitude(&self) -> f64 {
        self.xx[0]
    }

    pub fn latitude(&self) -> f64 {
        self.xx[1]
    }

    pub fn distance(&self) -> f64 {
        self.xx[2]
    }

    pub fn speed_longitude(&self) -> f64 {
        self.xx[3]
    }

    pub fn speed_latitude(&self) -> f64 {
        self.xx[4]
    }

    pub fn speed_distance(&self) -> f64 {
        self.xx[5]
    }

    /// Apparent backward motion in longitude.
    pub fn is_retrograde(&self) -> bool {
        self.speed_longitude() < 0.0
    }
}
