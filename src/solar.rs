//! Sunrise & sunset from the low-precision NOAA solar equations.
//!
//! The algorithm is the widely used "sunrise equation" popularised by the NOAA
//! solar calculator and SunCalc: mean anomaly → equation of center → ecliptic
//! longitude → declination → hour angle of the horizon crossing.
//! Accuracy: about one minute between the polar circles.
//! References: Meeus, *Astronomical Algorithms* ch. 15 & 25;
//! NOAA ESRL solar calculation details.

use core::f64::consts::PI;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use thiserror::Error;

use crate::{GeoCoordinate, SolarTimes};

/// Why a provider could not produce a sunrise/sunset pair.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarError {
    /// Polar night: the Sun stays below the horizon all day
    #[error("the sun does not rise on this date at this location")]
    NeverRises,

    /// Midnight sun: the Sun stays above the horizon all day
    #[error("the sun does not set on this date at this location")]
    NeverSets,

    /// The date or a computed instant is outside the representable range
    #[error("date out of range for solar calculation")]
    OutOfRange,
}

/// Source of sunrise and sunset instants for a local calendar date.
///
/// `offset` is the UTC offset of the caller's local calendar; returned instants
/// carry that offset.
pub trait SolarTimesProvider {
    fn solar_times(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
        coordinate: GeoCoordinate,
    ) -> Result<SolarTimes, SolarError>;
}

/// A fixed pair is a provider that ignores its inputs.
impl SolarTimesProvider for SolarTimes {
    fn solar_times(
        &self,
        _date: NaiveDate,
        _offset: FixedOffset,
        _coordinate: GeoCoordinate,
    ) -> Result<SolarTimes, SolarError> {
        Ok(*self)
    }
}

/// Standard apparent altitude of the upper limb at rise/set:
/// 34' refraction + 16' semidiameter.
pub const SUNRISE_SUNSET_ALTITUDE_DEG: f64 = -0.833;

const RAD: f64 = PI / 180.0;
const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
/// Transit correction in days (Meeus).
const J0: f64 = 0.0009;
/// Obliquity of the ecliptic at J2000.
const OBLIQUITY_DEG: f64 = 23.4397;

/// NOAA-style calculator; the default horizon is [`SUNRISE_SUNSET_ALTITUDE_DEG`].
#[derive(Debug, Clone, Copy)]
pub struct NoaaSolarCalculator {
    /// Solar altitude in degrees that counts as rise/set
    pub horizon_deg: f64,
}

impl Default for NoaaSolarCalculator {
    fn default() -> Self {
        Self {
            horizon_deg: SUNRISE_SUNSET_ALTITUDE_DEG,
        }
    }
}

impl SolarTimesProvider for NoaaSolarCalculator {
    fn solar_times(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
        coordinate: GeoCoordinate,
    ) -> Result<SolarTimes, SolarError> {
        // Anchor the Julian cycle on local noon so both events fall on `date`.
        let noon = date
            .and_hms_opt(12, 0, 0)
            .and_then(|naive| offset.from_local_datetime(&naive).single())
            .ok_or(SolarError::OutOfRange)?
            .with_timezone(&Utc);

        let (rise_jd, set_jd) = rise_set_julian(
            noon.timestamp_millis(),
            coordinate.latitude,
            coordinate.longitude,
            self.horizon_deg,
        )?;

        Ok(SolarTimes {
            sunrise: from_julian(rise_jd)?.with_timezone(&offset),
            sunset: from_julian(set_jd)?.with_timezone(&offset),
        })
    }
}

/// Julian dates of sunrise and sunset for the solar day nearest `instant_ms`.
fn rise_set_julian(
    instant_ms: i64,
    lat_deg: f64,
    lon_deg: f64,
    horizon_deg: f64,
) -> Result<(f64, f64), SolarError> {
    // ---------- 1. Days since J2000 and the nearest Julian cycle -------------
    let lw = -lon_deg * RAD; // west longitude, radians
    let phi = lat_deg * RAD;
    let d = instant_ms as f64 / DAY_MS - 0.5 + J1970 - J2000;
    let n = (d - J0 - lw / (2.0 * PI)).round();

    // ---------- 2. Approximate transit and the Sun's position there ----------
    let ds = J0 + lw / (2.0 * PI) + n;
    let m = RAD * (357.5291 + 0.985_600_28 * ds); // mean anomaly
    let c = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    let l = m + c + RAD * 102.9372 + PI; // ecliptic longitude, perihelion 102.9372°
    let dec = ((OBLIQUITY_DEG * RAD).sin() * l.sin()).asin();
    let transit = |approx: f64| J2000 + approx + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin();
    let j_noon = transit(ds);

    // ---------- 3. Hour angle at which the Sun crosses the horizon -----------
    let cos_h = ((horizon_deg * RAD).sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos());
    if cos_h > 1.0 {
        return Err(SolarError::NeverRises);
    }
    if cos_h < -1.0 {
        return Err(SolarError::NeverSets);
    }
    if cos_h.is_nan() {
        return Err(SolarError::OutOfRange);
    }
    let w = cos_h.acos();

    // Rise mirrors set about transit
    let j_set = transit(J0 + (w + lw) / (2.0 * PI) + n);
    let j_rise = j_noon - (j_set - j_noon);

    Ok((j_rise, j_set))
}

fn from_julian(jd: f64) -> Result<DateTime<Utc>, SolarError> {
    let ms = ((jd + 0.5 - J1970) * DAY_MS).round();
    if !ms.is_finite() {
        return Err(SolarError::OutOfRange);
    }
    DateTime::from_timestamp_millis(ms as i64).ok_or(SolarError::OutOfRange)
}
