//! # Planetary Sequence
//!
//! The seven classical planets in the order horas cycle through them. Each
//! weekday seeds a different starting point; from there every hora advances one
//! step through [`PLANETARY_SEQUENCE`], wrapping after Mars back to the Sun.

use serde::{Deserialize, Serialize};

/// Number of entries in the rotation.
pub const SEQUENCE_LEN: usize = 7;

/// A ruling planet of a hora.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Sun,
    Venus,
    Mercury,
    Moon,
    Saturn,
    Jupiter,
    Mars,
}

/// The fixed cyclic rotation. Order never changes.
pub const PLANETARY_SEQUENCE: [Planet; SEQUENCE_LEN] = [
    Planet::Sun,
    Planet::Venus,
    Planet::Mercury,
    Planet::Moon,
    Planet::Saturn,
    Planet::Jupiter,
    Planet::Mars,
];

impl Planet {
    /// Astronomical glyph.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Sun => "☉",
            Self::Venus => "♀",
            Self::Mercury => "☿",
            Self::Moon => "☾",
            Self::Saturn => "♄",
            Self::Jupiter => "♃",
            Self::Mars => "♂",
        }
    }

    pub const fn english_name(self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Venus => "Venus",
            Self::Mercury => "Mercury",
            Self::Moon => "Moon",
            Self::Saturn => "Saturn",
            Self::Jupiter => "Jupiter",
            Self::Mars => "Mars",
        }
    }

    /// Sanskrit (graha) name.
    pub const fn sanskrit_name(self) -> &'static str {
        match self {
            Self::Sun => "Surya",
            Self::Venus => "Shukra",
            Self::Mercury => "Budha",
            Self::Moon => "Chandra",
            Self::Saturn => "Shani",
            Self::Jupiter => "Guru",
            Self::Mars => "Mangal",
        }
    }

    /// Display label, e.g. `☉ Sun (Surya)`.
    pub fn label(self) -> String {
        format!(
            "{} {} ({})",
            self.symbol(),
            self.english_name(),
            self.sanskrit_name()
        )
    }

    /// Semantic indicator of the hora this planet rules.
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Sun => "Leadership",
            Self::Venus => "Financing",
            Self::Mercury => "Intellect",
            Self::Moon => "Emotional Balance",
            Self::Saturn => "Patience",
            Self::Jupiter => "Optimism",
            Self::Mars => "Initiations",
        }
    }

    /// 0-based position in [`PLANETARY_SEQUENCE`].
    pub const fn index(self) -> usize {
        match self {
            Self::Sun => 0,
            Self::Venus => 1,
            Self::Mercury => 2,
            Self::Moon => 3,
            Self::Saturn => 4,
            Self::Jupiter => 5,
            Self::Mars => 6,
        }
    }
}

/// Planet ruling hora `position` (1-based) of a period whose rotation starts at
/// `seed`.
///
/// `(seed + position - 1) mod 7`, indexed into [`PLANETARY_SEQUENCE`].
pub fn planet_for(seed: usize, position: usize) -> Planet {
    PLANETARY_SEQUENCE[(seed + position + SEQUENCE_LEN - 1) % SEQUENCE_LEN]
}

/// Rotation seed of the night period: the day seed advanced by the twelve day
/// horas.
pub fn night_seed(day_seed: usize) -> usize {
    (day_seed + 12) % SEQUENCE_LEN
}
