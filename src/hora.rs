//! # Hora Computation Engine
//!
//! Turns a coordinate and a reference instant into the day's planetary hours.
//!
//! ## Algorithm
//! 1. **Sun**: ask the [`SolarTimesProvider`] for sunrise and sunset on the
//!    reference instant's local date
//! 2. **Lengths**: one day hora is `(sunset - sunrise) / 12`, one night hora is
//!    `(sunrise + 24h - sunset) / 12`; both must be positive
//! 3. **Seed**: the weekday of the reference instant (Sunday = 0) picks the
//!    planet of the first day hora; the night rotation starts at `seed + 12`
//! 4. **Segments**: hora `i` of a period spans
//!    `[boundary + (i-1)·length, boundary + i·length)`
//! 5. **Active**: the segment whose half-open range holds the reference instant
//!
//! The engine is pure: it samples the clock at most once (when no instant is
//! given), performs no I/O and keeps no state between calls.
//!
//! ## Display
//! [`format_time`] rounds to the nearest minute (30 s and up rounds up) and
//! renders `H:MM`. Rounding is for display only; the boundaries themselves
//! stay exact.

use chrono::{DateTime, Datelike, FixedOffset, Local, TimeDelta, Timelike};
use thiserror::Error;

use crate::planets::{night_seed, planet_for};
use crate::solar::{SolarError, SolarTimesProvider};
use crate::{GeoCoordinate, HoraResult, HoraSegment, Period, SolarTimes};

/// Horas in each of the day and night periods.
pub const HORAS_PER_PERIOD: i32 = 12;

/// Errors reported by [`compute_horas`]. None of them yields a partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoraError {
    /// Latitude/longitude not finite or out of range
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// The provider could not compute sunrise/sunset (e.g. polar day or night)
    #[error("sunrise/sunset unavailable: {0}")]
    SolarTimesUnavailable(#[from] SolarError),

    /// A computed hora length was zero or negative
    #[error("degenerate {period:?} interval: sunrise {sunrise}, sunset {sunset}")]
    DegenerateInterval {
        period: Period,
        sunrise: DateTime<FixedOffset>,
        sunset: DateTime<FixedOffset>,
    },
}

/// Compute the full hora table for `coordinate` at `now`.
///
/// `now` defaults to the current local time. Its UTC offset selects the local
/// calendar date handed to `provider` and the weekday that seeds the planetary
/// rotation.
///
/// # Errors
/// - [`HoraError::InvalidCoordinate`] for non-finite or out-of-range input
/// - [`HoraError::SolarTimesUnavailable`] when the provider fails, or a hora
///   boundary falls past the last representable instant
/// - [`HoraError::DegenerateInterval`] when sunset is not after sunrise, or
///   the night would be empty
pub fn compute_horas<P>(
    coordinate: GeoCoordinate,
    now: Option<DateTime<FixedOffset>>,
    provider: &P,
) -> Result<HoraResult, HoraError>
where
    P: SolarTimesProvider + ?Sized,
{
    if !coordinate.is_valid() {
        return Err(HoraError::InvalidCoordinate {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        });
    }

    // Sampled once; every boundary and the active flag use this instant
    let now = now.unwrap_or_else(|| Local::now().fixed_offset());

    let SolarTimes { sunrise, sunset } =
        provider.solar_times(now.date_naive(), *now.offset(), coordinate)?;

    let degenerate = |period| HoraError::DegenerateInterval {
        period,
        sunrise,
        sunset,
    };

    let day_length = (sunset - sunrise) / HORAS_PER_PERIOD;
    if day_length <= TimeDelta::zero() {
        return Err(degenerate(Period::Day));
    }
    let next_sunrise = shift(sunrise, TimeDelta::days(1))?;
    let night_length = (next_sunrise - sunset) / HORAS_PER_PERIOD;
    if night_length <= TimeDelta::zero() {
        return Err(degenerate(Period::Night));
    }

    let seed = weekday_index(&now);

    Ok(HoraResult {
        sunrise,
        sunset,
        day_segments: build_segments(sunrise, day_length, seed, &now)?,
        night_segments: build_segments(sunset, night_length, night_seed(seed), &now)?,
    })
}

/// `instant + delta`, or `OutOfRange` past the edge of representable time.
fn shift(
    instant: DateTime<FixedOffset>,
    delta: TimeDelta,
) -> Result<DateTime<FixedOffset>, HoraError> {
    instant
        .checked_add_signed(delta)
        .ok_or(HoraError::SolarTimesUnavailable(SolarError::OutOfRange))
}

/// Day of week of `instant` in its own offset, Sunday = 0 … Saturday = 6.
pub fn weekday_index(instant: &DateTime<FixedOffset>) -> usize {
    instant.weekday().num_days_from_sunday() as usize
}

fn build_segments(
    boundary: DateTime<FixedOffset>,
    length: TimeDelta,
    seed: usize,
    now: &DateTime<FixedOffset>,
) -> Result<Vec<HoraSegment>, HoraError> {
    (1..=HORAS_PER_PERIOD)
        .map(|i| {
            let start = shift(boundary, length * (i - 1))?;
            let end = shift(boundary, length * i)?;
            Ok(HoraSegment {
                index: i as u8,
                planet: planet_for(seed, i as usize),
                start,
                end,
                is_active: start <= *now && *now < end,
            })
        })
        .collect()
}

/// Hour and minute of `instant` rounded to the nearest minute.
///
/// Seconds 0–29 keep the minute, 30–59 add one; a minute of 60 carries into
/// the hour, and hour 24 wraps to 0.
pub fn round_to_minute(instant: &DateTime<FixedOffset>) -> (u32, u32) {
    let mut hour = instant.hour();
    let mut minute = instant.minute();
    if instant.second() >= 30 {
        minute += 1;
    }
    if minute >= 60 {
        minute -= 60;
        hour = (hour + 1) % 24;
    }
    (hour, minute)
}

/// Render `instant` as `H:MM` (24-hour clock, unpadded hour).
///
/// ```
/// use chrono::DateTime;
/// use hora_clock_lib::hora::format_time;
///
/// let t = DateTime::parse_from_rfc3339("2024-06-16T06:59:30+02:00").unwrap();
/// assert_eq!(format_time(&t), "7:00");
/// ```
pub fn format_time(instant: &DateTime<FixedOffset>) -> String {
    let (hour, minute) = round_to_minute(instant);
    format!("{}:{:02}", hour, minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::planets::Planet;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    /// Sunday 2024-06-16, sun up 06:00 to 18:00 UTC.
    fn six_to_six() -> SolarTimes {
        SolarTimes {
            sunrise: at("2024-06-16T06:00:00+00:00"),
            sunset: at("2024-06-16T18:00:00+00:00"),
        }
    }

    #[test]
    fn test_even_day_gives_one_hour_horas() {
        let now = at("2024-06-16T12:00:00+00:00");
        let result = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(now), &six_to_six()).unwrap();

        assert_eq!(result.day_segments.len(), 12);
        assert_eq!(result.night_segments.len(), 12);

        let first = &result.day_segments[0];
        assert_eq!(first.start, at("2024-06-16T06:00:00+00:00"));
        assert_eq!(first.end, at("2024-06-16T07:00:00+00:00"));

        let last = &result.day_segments[11];
        assert_eq!(last.start, at("2024-06-16T17:00:00+00:00"));
        assert_eq!(last.end, at("2024-06-16T18:00:00+00:00"));

        let night = &result.night_segments[0];
        assert_eq!(night.start, at("2024-06-16T18:00:00+00:00"));
        assert_eq!(night.end, at("2024-06-16T19:00:00+00:00"));
        assert_eq!(
            result.night_segments[11].end,
            at("2024-06-17T06:00:00+00:00")
        );
    }

    #[test]
    fn test_sunday_planets() {
        let now = at("2024-06-16T12:00:00+00:00");
        assert_eq!(weekday_index(&now), 0);

        let result = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(now), &six_to_six()).unwrap();
        assert_eq!(result.day_segments[0].planet, Planet::Sun);
        assert_eq!(result.day_segments[0].indicator(), "Leadership");
        assert_eq!(result.day_segments[7].planet, Planet::Sun);
        // (0 + 12) mod 7 = 5
        assert_eq!(result.night_segments[0].planet, Planet::Jupiter);
    }

    #[test]
    fn test_active_segment_is_end_exclusive() {
        let boundary = at("2024-06-16T07:00:00+00:00");
        let result =
            compute_horas(GeoCoordinate::new(0.0, 0.0), Some(boundary), &six_to_six()).unwrap();

        assert!(!result.day_segments[0].is_active);
        assert!(result.day_segments[1].is_active);
        let (period, segment) = result.active_segment().unwrap();
        assert_eq!(period, Period::Day);
        assert_eq!(segment.index, 2);
    }

    #[test]
    fn test_night_segment_active_after_sunset() {
        let now = at("2024-06-16T20:15:00+00:00");
        let result = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(now), &six_to_six()).unwrap();
        let (period, segment) = result.active_segment().unwrap();
        assert_eq!(period, Period::Night);
        assert_eq!(segment.index, 3);
    }

    #[test]
    fn test_before_sunrise_nothing_active() {
        let now = at("2024-06-16T03:00:00+00:00");
        let result = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(now), &six_to_six()).unwrap();
        assert!(result.active_segment().is_none());
        assert_eq!(result.segments().filter(|(_, s)| s.is_active).count(), 0);
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let now = at("2024-06-16T12:00:00+00:00");
        for coordinate in [
            GeoCoordinate::new(90.5, 0.0),
            GeoCoordinate::new(0.0, -180.1),
            GeoCoordinate::new(f64::NAN, 0.0),
            GeoCoordinate::new(0.0, f64::INFINITY),
        ] {
            let err = compute_horas(coordinate, Some(now), &six_to_six()).unwrap_err();
            assert!(matches!(err, HoraError::InvalidCoordinate { .. }));
        }
    }

    #[test]
    fn test_sunrise_equal_sunset_is_degenerate() {
        let now = at("2024-06-16T12:00:00+00:00");
        let flat = SolarTimes {
            sunrise: at("2024-06-16T12:00:00+00:00"),
            sunset: at("2024-06-16T12:00:00+00:00"),
        };
        let err = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(now), &flat).unwrap_err();
        assert!(matches!(
            err,
            HoraError::DegenerateInterval {
                period: Period::Day,
                ..
            }
        ));
    }

    #[test]
    fn test_day_longer_than_24h_is_degenerate_night() {
        let now = at("2024-06-16T12:00:00+00:00");
        let long = SolarTimes {
            sunrise: at("2024-06-16T00:00:00+00:00"),
            sunset: at("2024-06-17T01:00:00+00:00"),
        };
        let err = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(now), &long).unwrap_err();
        assert!(matches!(
            err,
            HoraError::DegenerateInterval {
                period: Period::Night,
                ..
            }
        ));
    }

    #[test]
    fn test_boundaries_past_max_date_are_out_of_range() {
        let last_day = NaiveDate::MAX;
        let on = |h| {
            last_day
                .and_hms_opt(h, 0, 0)
                .unwrap()
                .and_local_timezone(FixedOffset::east_opt(0).unwrap())
                .unwrap()
        };
        let sun = SolarTimes {
            sunrise: on(6),
            sunset: on(18),
        };
        let err = compute_horas(GeoCoordinate::new(0.0, 0.0), Some(on(12)), &sun).unwrap_err();
        assert_eq!(err, HoraError::SolarTimesUnavailable(SolarError::OutOfRange));
    }

    #[test]
    fn test_round_to_minute() {
        assert_eq!(round_to_minute(&at("2024-06-16T06:14:29+00:00")), (6, 14));
        assert_eq!(round_to_minute(&at("2024-06-16T06:14:30+00:00")), (6, 15));
        assert_eq!(round_to_minute(&at("2024-06-16T06:59:30+00:00")), (7, 0));
        assert_eq!(round_to_minute(&at("2024-06-16T23:59:45+00:00")), (0, 0));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(&at("2024-06-16T06:05:00+00:00")), "6:05");
        assert_eq!(format_time(&at("2024-06-16T18:00:59+00:00")), "18:01");
        assert_eq!(format_time(&at("2024-06-16T00:00:10+00:00")), "0:00");
    }
}
