//! Native body ids.
//!
//! Operations take raw `i32` ids so that every id the native library
//! understands (numbered asteroids, fictitious bodies) stays expressible.
//! [`Body`] names the common ones.

/// Pseudo-body returning obliquity and nutation instead of a position.
pub const ECL_NUT: i32 = -1;

/// Offset added to a Minor Planet Center number to form a body id.
pub const AST_OFFSET: i32 = 10_000;

/// Body id of the numbered minor planet `number`.
pub const fn asteroid(number: i32) -> i32 {
    AST_OFFSET + number
}

/// Bodies and computed points with a fixed native id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    MeanNode,
    TrueNode,
    MeanApogee,
    OsculatingApogee,
    Earth,
    Chiron,
    Pholus,
    Ceres,
    Pallas,
    Juno,
    Vesta,
    InterpolatedApogee,
    InterpolatedPerigee,
}

const ALL_BODIES: [Body; 23] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
    Body::MeanNode,
    Body::TrueNode,
    Body::MeanApogee,
    Body::OsculatingApogee,
    Body::Earth,
    Body::Chiron,
    Body::Pholus,
    Body::Ceres,
    Body::Pallas,
    Body::Juno,
    Body::Vesta,
    Body::InterpolatedApogee,
    Body::InterpolatedPerigee,
];

impl Body {
    pub const fn all() -> &'static [Body] {
        &ALL_BODIES
    }

    /// Native body id.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Convert a native body id into a [`Body`].
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| ALL_BODIES.get(idx).copied())
    }

    /// Case-insensitive lookup by English name (`"sun"`, `"true-node"`).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let body = match normalized.as_str() {
            "sun" => Self::Sun,
            "moon" => Self::Moon,
            "mercury" => Self::Mercury,
            "venus" => Self::Venus,
            "mars" => Self::Mars,
            "jupiter" => Self::Jupiter,
            "saturn" => Self::Saturn,
            "uranus" => Self::Uranus,
            "neptune" => Self::Neptune,
            "pluto" => Self::Pluto,
            "meannode" => Self::MeanNode,
            "truenode" => Self::TrueNode,
            "meanapogee" | "lilith" => Self::MeanApogee,
            "osculatingapogee" => Self::OsculatingApogee,
            "earth" => Self::Earth,
            "chiron" => Self::Chiron,
            "pholus" => Self::Pholus,
            "ceres" => Self::Ceres,
            "pallas" => Self::Pallas,
            "juno" => Self::Juno,
            "vesta" => Self::Vesta,
            "interpolatedapogee" => Self::InterpolatedApogee,
            "interpolatedperigee" => Self::InterpolatedPerigee,
            _ => return None,
        };
        Some(body)
    }
}

impl From<Body> for i32 {
    fn from(body: Body) -> Self {
        body.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_ids() {
        assert_eq!(Body::Sun.code(), 0);
        assert_eq!(Body::Moon.code(), 1);
        assert_eq!(Body::Pluto.code(), 9);
        assert_eq!(Body::TrueNode.code(), 11);
        assert_eq!(Body::Earth.code(), 14);
        assert_eq!(Body::Chiron.code(), 15);
        assert_eq!(Body::InterpolatedPerigee.code(), 22);
    }

    #[test]
    fn code_roundtrip() {
        for &body in Body::all() {
            assert_eq!(Body::from_code(body.code()), Some(body));
        }
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(Body::from_code(ECL_NUT), None);
        assert_eq!(Body::from_code(23), None);
        assert_eq!(Body::from_code(asteroid(433)), None);
    }

    #[test]
    fn asteroid_offset() {
        assert_eq!(asteroid(433), 10_433);
    }

    #[test]
    fn names() {
        assert_eq!(Body::from_name("Sun"), Some(Body::Sun));
        assert_eq!(Body::from_name("true-node"), Some(Body::TrueNode));
        assert_eq!(Body::from_name("TRUE_NODE"), Some(Body::TrueNode));
        assert_eq!(Body::from_name("lilith"), Some(Body::MeanApogee));
        assert_eq!(Body::from_name("vulcan"), None);
    }
}
