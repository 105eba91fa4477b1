//! # Hora Table Rendering
//!
//! This module turns a [`HoraResult`] into the terminal tables shown to the user and
//! provides the user-facing wording for failures. The engine itself never produces
//! display text; everything a person reads is built here.

use std::fmt::Write as _;

use crate::config::DisplayConfig;
use crate::hora::{format_time, HoraError};
use crate::location::LocationError;
use crate::{GeoCoordinate, HoraResult, HoraSegment, Period};

const PLANET_WIDTH: usize = 20;
const INDICATOR_WIDTH: usize = 19;

/// Location line, coordinates to two decimals.
pub fn format_location(coordinate: GeoCoordinate) -> String {
    format!(
        "📍 Latitude: {:.2}, Longitude: {:.2}",
        coordinate.latitude, coordinate.longitude
    )
}

/// Title line of a period's table, with its boundary time.
fn period_title(period: Period, result: &HoraResult) -> String {
    match period {
        Period::Day => format!("Day Horas (Sunrise: {})", format_time(&result.sunrise)),
        Period::Night => format!("Night Horas (Sunset: {})", format_time(&result.sunset)),
    }
}

fn header(config: &DisplayConfig, gutter: usize) -> String {
    let mut line = format!("{}{:>2}  {:<PLANET_WIDTH$}", " ".repeat(gutter), "#", "Hora Planet");
    if config.show_indicators {
        let _ = write!(line, "{:<INDICATOR_WIDTH$}", "Indicators");
    }
    line.push_str("Time");
    line
}

fn row(segment: &HoraSegment, config: &DisplayConfig, gutter: usize) -> String {
    let marker = if segment.is_active {
        format!("{:<gutter$}", config.active_marker)
    } else {
        " ".repeat(gutter)
    };
    let mut line = format!(
        "{}{:>2}  {:<PLANET_WIDTH$}",
        marker,
        segment.index,
        segment.planet.label()
    );
    if config.show_indicators {
        let _ = write!(line, "{:<INDICATOR_WIDTH$}", segment.indicator());
    }
    let _ = write!(
        line,
        "{} - {}",
        format_time(&segment.start),
        format_time(&segment.end)
    );
    line
}

/// Render one period's table: title, header and twelve rows.
pub fn render_period(result: &HoraResult, period: Period, config: &DisplayConfig) -> String {
    let segments = match period {
        Period::Day => &result.day_segments,
        Period::Night => &result.night_segments,
    };
    // Marker plus one space of separation
    let gutter = config.active_marker.chars().count() + 1;

    let mut out = String::new();
    let _ = writeln!(out, "{}", period_title(period, result));
    let _ = writeln!(out, "{}", header(config, gutter));
    for segment in segments {
        let _ = writeln!(out, "{}", row(segment, config, gutter));
    }
    out
}

/// Render the full report: optional location line, day table, night table.
pub fn render_report(
    result: &HoraResult,
    coordinate: GeoCoordinate,
    config: &DisplayConfig,
) -> String {
    let mut out = String::new();
    if config.show_location {
        let _ = writeln!(out, "{}\n", format_location(coordinate));
    }
    out.push_str(&render_period(result, Period::Day, config));
    out.push('\n');
    out.push_str(&render_period(result, Period::Night, config));
    out
}

/// Render hora tables to the terminal.
pub fn draw_ascii(result: &HoraResult, coordinate: GeoCoordinate, config: &DisplayConfig) {
    print!("{}", render_report(result, coordinate, config));
}

/// User-facing text for a failed location request.
pub fn location_error_message(error: &LocationError) -> &'static str {
    match error {
        LocationError::PermissionDenied => {
            "Location permission denied. Please allow access and try again."
        }
        LocationError::Unavailable => "Location information is unavailable.",
        LocationError::Timeout(_) => "Location request timed out. Please try again.",
        LocationError::Parse(_) => "An unknown error occurred.",
    }
}

/// User-facing text for a failed hora computation.
pub fn hora_error_message(error: &HoraError) -> &'static str {
    match error {
        HoraError::InvalidCoordinate { .. } => {
            "The location coordinates are invalid. Please check latitude and longitude."
        }
        HoraError::SolarTimesUnavailable(_) => {
            "Sunrise and sunset cannot be computed for this date and location. Try a different location."
        }
        HoraError::DegenerateInterval { .. } => {
            "Hora computation failed: the day or night length is not positive."
        }
    }
}
