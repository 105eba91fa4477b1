//! # Hora Clock Core Library
//!
//! This library computes the traditional planetary hours (horas) for a location:
//! daylight and nighttime are each divided into twelve equal segments, and every
//! segment is ruled by one entry of a fixed seven-planet rotation seeded by the
//! day of the week.
//!
//! ## Design Philosophy
//!
//! ### Pure Computation
//! - **Value objects only**: every [`HoraResult`] is built fresh per call and
//!   never mutated afterwards
//! - **No hidden state**: the only process-wide data is the constant
//!   [`planets::PLANETARY_SEQUENCE`]
//! - **Injected sun**: sunrise and sunset come from a
//!   [`solar::SolarTimesProvider`], so the engine can be driven by the bundled
//!   NOAA calculator or by fixed times in tests
//!
//! ### Time Model
//! All instants are `DateTime<FixedOffset>`. The offset of the reference
//! instant defines the local calendar: which date's sunrise is used, which
//! weekday seeds the rotation and which hour is displayed.
//!
//! ### Data Flow
//! 1. **Locate**: the caller acquires a [`GeoCoordinate`] ([`location`])
//! 2. **Sun**: the provider yields [`SolarTimes`] for the local date
//! 3. **Split**: [`hora::compute_horas`] builds 12 day and 12 night segments
//! 4. **Show**: [`renderer`] turns the [`HoraResult`] into terminal tables
//!
//! ## Core Types
//! - [`GeoCoordinate`]: latitude/longitude input
//! - [`SolarTimes`]: sunrise/sunset pair for one local date
//! - [`HoraSegment`]: one planetary hour
//! - [`HoraResult`]: the complete day and night tables

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::planets::Planet;

// Module declarations
pub mod config;
pub mod hora;
pub mod location;
pub mod planets;
pub mod renderer;
pub mod solar;

/// Geographic position of the observer in decimal degrees.
///
/// North latitudes and east longitudes are positive.
///
/// # Example
/// ```
/// use hora_clock_lib::GeoCoordinate;
///
/// let london = GeoCoordinate::new(51.5074, -0.1278);
/// assert!(london.is_valid());
///
/// let bogus = GeoCoordinate::new(95.0, 0.0);
/// assert!(!bogus.is_valid());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Sunrise and sunset for one local calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTimes {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

/// Half of the hora day a segment belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Sunrise to sunset
    Day,
    /// Sunset to the following sunrise
    Night,
}

/// One planetary hour.
///
/// Segments of the same period are contiguous: the `end` of segment `i` is the
/// `start` of segment `i + 1`. The range is half-open, `[start, end)`.
///
/// Serialized segments also carry the planet's display label and indicator,
/// so JSON consumers do not need their own planet table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "SegmentRecord", from = "SegmentRecord")]
pub struct HoraSegment {
    /// Position within its period, 1 to 12
    pub index: u8,
    /// Ruling planet of this hora
    pub planet: Planet,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// True if the reference instant lies inside `[start, end)`
    pub is_active: bool,
}

/// Wire form of a [`HoraSegment`].
///
/// `label` and `indicator` are derived from `planet` and ignored on input.
#[derive(Serialize, Deserialize)]
struct SegmentRecord {
    index: u8,
    planet: Planet,
    #[serde(default)]
    label: String,
    #[serde(default)]
    indicator: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    is_active: bool,
}

impl From<HoraSegment> for SegmentRecord {
    fn from(segment: HoraSegment) -> Self {
        SegmentRecord {
            index: segment.index,
            planet: segment.planet,
            label: segment.planet.label(),
            indicator: segment.planet.indicator().to_string(),
            start: segment.start,
            end: segment.end,
            is_active: segment.is_active,
        }
    }
}

impl From<SegmentRecord> for HoraSegment {
    fn from(record: SegmentRecord) -> Self {
        HoraSegment {
            index: record.index,
            planet: record.planet,
            start: record.start,
            end: record.end,
            is_active: record.is_active,
        }
    }
}

impl HoraSegment {
    /// Indicator meaning of the ruling planet.
    pub fn indicator(&self) -> &'static str {
        self.planet.indicator()
    }

    /// Half-open containment check used for the active flag.
    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// Complete hora table for one reference instant.
///
/// Created fresh by [`hora::compute_horas`]; there is no identity shared
/// between two results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoraResult {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    /// Exactly 12 segments from sunrise to sunset
    pub day_segments: Vec<HoraSegment>,
    /// Exactly 12 segments from sunset to the next sunrise
    pub night_segments: Vec<HoraSegment>,
}

impl HoraResult {
    /// The segment flagged active, if the reference instant fell inside one.
    ///
    /// # Example
    /// ```
    /// use chrono::DateTime;
    /// use hora_clock_lib::{hora::compute_horas, GeoCoordinate, Period, SolarTimes};
    ///
    /// // A fixed `SolarTimes` acts as its own provider.
    /// let sun = SolarTimes {
    ///     sunrise: DateTime::parse_from_rfc3339("2024-06-16T06:00:00+00:00").unwrap(),
    ///     sunset: DateTime::parse_from_rfc3339("2024-06-16T18:00:00+00:00").unwrap(),
    /// };
    /// let now = DateTime::parse_from_rfc3339("2024-06-16T09:30:00+00:00").unwrap();
    /// let result = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(now), &sun).unwrap();
    ///
    /// let (period, segment) = result.active_segment().unwrap();
    /// assert_eq!(period, Period::Day);
    /// assert_eq!(segment.index, 4);
    /// ```
    pub fn active_segment(&self) -> Option<(Period, &HoraSegment)> {
        self.day_segments
            .iter()
            .find(|s| s.is_active)
            .map(|s| (Period::Day, s))
            .or_else(|| {
                self.night_segments
                    .iter()
                    .find(|s| s.is_active)
                    .map(|s| (Period::Night, s))
            })
    }

    /// All 24 segments in chronological order, tagged with their period.
    pub fn segments(&self) -> impl Iterator<Item = (Period, &HoraSegment)> {
        self.day_segments
            .iter()
            .map(|s| (Period::Day, s))
            .chain(self.night_segments.iter().map(|s| (Period::Night, s)))
    }
}
