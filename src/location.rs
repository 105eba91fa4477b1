//! # Location Acquisition and Caching
//!
//! The hora engine only needs a coordinate; this module is the caller-side plumbing
//! that finds one. It mirrors the permission / unavailable / timeout outcomes of a
//! platform geolocation request and keeps the last fix in a small JSON cache.
//!
//! ## Resolution Order
//! 1. **Permission**: `allow = false` fails immediately with `PermissionDenied`
//! 2. **Explicit**: a coordinate given on the command line always wins
//! 3. **Cache**: a cached fix younger than the TTL is reused
//! 4. **Sources**: `HORA_LOCATION` environment variable, then the configured
//!    coordinate, then the configured location file, all under a timeout
//!
//! ## Caching Strategy
//! - **Location**: `hora_location.json` in the system temp directory
//! - **Format**: JSON `{coordinate, saved_at}`
//! - **TTL**: 30 minutes by default; an old fix may no longer describe where
//!   the user is
//! - **Failures**: cache read and write errors are logged and ignored

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LocationConfig;
use crate::GeoCoordinate;

/// Environment variable holding "lat,lon"
pub const LOCATION_ENV: &str = "HORA_LOCATION";

/// Cache file name inside the system temp directory
const CACHE_FILE: &str = "hora_location.json";

/// Errors that can occur while acquiring a location.
#[derive(Error, Debug)]
pub enum LocationError {
    /// Location access is disabled
    #[error("location permission denied")]
    PermissionDenied,

    /// No configured source produced a coordinate
    #[error("location unavailable")]
    Unavailable,

    /// The sources did not answer in time
    #[error("location request timed out after {0:?}")]
    Timeout(Duration),

    /// A source produced text that is not a valid "lat,lon" pair
    #[error("invalid location {0:?}")]
    Parse(String),
}

/// Everything [`acquire`] needs to find a coordinate.
#[derive(Debug, Clone)]
pub struct LocationRequest {
    /// Coordinate supplied directly by the user
    pub explicit: Option<GeoCoordinate>,
    pub allow: bool,
    /// Read the cache before asking sources (writes happen regardless)
    pub use_cache: bool,
    pub cache_path: PathBuf,
    pub cache_ttl: TimeDelta,
    pub timeout: Duration,
    /// Raw value of [`LOCATION_ENV`], captured when the request is built
    pub env_location: Option<String>,
    pub configured: Option<GeoCoordinate>,
    pub file: Option<PathBuf>,
}

impl LocationRequest {
    /// Build a request from configuration and the process environment.
    pub fn from_config(config: &LocationConfig) -> Self {
        LocationRequest {
            explicit: None,
            allow: config.allow,
            use_cache: true,
            cache_path: default_cache_path(),
            cache_ttl: TimeDelta::minutes(config.cache_ttl_minutes as i64),
            timeout: Duration::from_secs(config.timeout_secs),
            env_location: std::env::var(LOCATION_ENV).ok(),
            configured: config
                .latitude
                .zip(config.longitude)
                .map(|(lat, lon)| GeoCoordinate::new(lat, lon)),
            file: config.file.clone(),
        }
    }
}

/// Default cache location in the system temp directory.
pub fn default_cache_path() -> PathBuf {
    std::env::temp_dir().join(CACHE_FILE)
}

/// Acquire the observer's coordinate.
///
/// Explicit coordinates are returned unvalidated so the engine can report
/// them as invalid; only valid coordinates are cached.
pub async fn acquire(request: &LocationRequest) -> Result<GeoCoordinate, LocationError> {
    acquire_from(request, resolve(request)).await
}

/// [`acquire`] with the source lookup supplied by the caller.
pub async fn acquire_from<F>(
    request: &LocationRequest,
    source: F,
) -> Result<GeoCoordinate, LocationError>
where
    F: Future<Output = Result<GeoCoordinate, LocationError>>,
{
    if !request.allow {
        return Err(LocationError::PermissionDenied);
    }

    if let Some(coordinate) = request.explicit {
        remember(request, coordinate);
        return Ok(coordinate);
    }

    if request.use_cache {
        match load_cache(&request.cache_path, request.cache_ttl, Utc::now()) {
            Ok(coordinate) => {
                debug!(?coordinate, "using cached location");
                return Ok(coordinate);
            }
            Err(e) => debug!("location cache miss: {}", e),
        }
    }

    let coordinate = tokio::time::timeout(request.timeout, source)
        .await
        .map_err(|_| LocationError::Timeout(request.timeout))??;

    remember(request, coordinate);
    Ok(coordinate)
}

/// Ask the configured sources in order.
async fn resolve(request: &LocationRequest) -> Result<GeoCoordinate, LocationError> {
    if let Some(raw) = &request.env_location {
        debug!("location from {}", LOCATION_ENV);
        return parse_coordinate(raw);
    }

    if let Some(coordinate) = request.configured {
        debug!("location from configuration");
        return if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(LocationError::Parse(format!(
                "{},{}",
                coordinate.latitude, coordinate.longitude
            )))
        };
    }

    if let Some(path) = &request.file {
        debug!(path = %path.display(), "location from file");
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            warn!(path = %path.display(), "cannot read location file: {}", e);
            LocationError::Unavailable
        })?;
        return parse_coordinate(&raw);
    }

    Err(LocationError::Unavailable)
}

/// Parse `"lat,lon"` in decimal degrees, surrounding whitespace allowed.
pub fn parse_coordinate(raw: &str) -> Result<GeoCoordinate, LocationError> {
    let parse_err = || LocationError::Parse(raw.trim().to_string());

    let (lat, lon) = raw.trim().split_once(',').ok_or_else(parse_err)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| parse_err())?;
    let longitude: f64 = lon.trim().parse().map_err(|_| parse_err())?;

    let coordinate = GeoCoordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        return Err(parse_err());
    }
    Ok(coordinate)
}

/// Write a valid coordinate to the cache; failures are only logged.
fn remember(request: &LocationRequest, coordinate: GeoCoordinate) {
    if !coordinate.is_valid() {
        return;
    }
    if let Err(e) = save_cache(&request.cache_path, coordinate, Utc::now()) {
        warn!(path = %request.cache_path.display(), "could not write location cache: {}", e);
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedLocation {
    coordinate: GeoCoordinate,
    saved_at: DateTime<Utc>,
}

/// Load a cached coordinate if it is younger than `ttl` at `now`.
///
/// Returns an error for stale, missing, future-dated or corrupted entries.
pub fn load_cache(
    path: &Path,
    ttl: TimeDelta,
    now: DateTime<Utc>,
) -> Result<GeoCoordinate, io::Error> {
    let data = std::fs::read(path)?;
    let cached: CachedLocation = serde_json::from_slice(&data)?;

    let age = now - cached.saved_at;
    if age < TimeDelta::zero() || age > ttl {
        return Err(io::Error::other("stale"));
    }
    if !cached.coordinate.is_valid() {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid coordinate"));
    }

    Ok(cached.coordinate)
}

/// Save a coordinate stamped with `now`.
pub fn save_cache(
    path: &Path,
    coordinate: GeoCoordinate,
    now: DateTime<Utc>,
) -> Result<(), io::Error> {
    let data = serde_json::to_vec(&CachedLocation {
        coordinate,
        saved_at: now,
    })?;
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn request_with_cache(path: &Path) -> LocationRequest {
        let mut request = LocationRequest::from_config(&LocationConfig::default());
        request.cache_path = path.to_path_buf();
        request.env_location = None;
        request
    }

    #[test]
    fn test_parse_coordinate() {
        let c = parse_coordinate(" 12.97, 77.59\n").unwrap();
        assert_eq!(c, GeoCoordinate::new(12.97, 77.59));

        assert!(matches!(parse_coordinate("12.97"), Err(LocationError::Parse(_))));
        assert!(matches!(parse_coordinate("abc,1"), Err(LocationError::Parse(_))));
        assert!(matches!(parse_coordinate("91,0"), Err(LocationError::Parse(_))));
    }

    #[test]
    fn test_cache_roundtrip_and_staleness() {
        let file = NamedTempFile::new().unwrap();
        let saved_at = Utc::now();
        let coordinate = GeoCoordinate::new(-33.87, 151.21);
        save_cache(file.path(), coordinate, saved_at).unwrap();

        let ttl = TimeDelta::minutes(30);
        let fresh = load_cache(file.path(), ttl, saved_at + TimeDelta::minutes(10)).unwrap();
        assert_eq!(fresh, coordinate);

        assert!(load_cache(file.path(), ttl, saved_at + TimeDelta::minutes(31)).is_err());
        assert!(load_cache(file.path(), ttl, saved_at - TimeDelta::minutes(1)).is_err());
    }

    #[test]
    fn test_corrupted_cache_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not json").unwrap();
        assert!(load_cache(file.path(), TimeDelta::minutes(30), Utc::now()).is_err());
    }

    #[tokio::test]
    async fn test_permission_denied_wins() {
        let file = NamedTempFile::new().unwrap();
        let mut request = request_with_cache(file.path());
        request.allow = false;
        request.explicit = Some(GeoCoordinate::new(1.0, 2.0));

        let err = acquire(&request).await.unwrap_err();
        assert!(matches!(err, LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_no_source_is_unavailable() {
        let file = NamedTempFile::new().unwrap();
        let mut request = request_with_cache(file.path());
        request.use_cache = false;

        let err = acquire(&request).await.unwrap_err();
        assert!(matches!(err, LocationError::Unavailable));
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let file = NamedTempFile::new().unwrap();
        let mut request = request_with_cache(file.path());
        request.use_cache = false;
        request.timeout = Duration::from_millis(20);

        let err = acquire_from(&request, std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_env_location_is_cached_then_reused() {
        let file = NamedTempFile::new().unwrap();
        let mut request = request_with_cache(file.path());
        request.env_location = Some("48.86,2.35".to_string());

        let first = acquire(&request).await.unwrap();
        assert_eq!(first, GeoCoordinate::new(48.86, 2.35));

        // Source removed: the fresh cache entry still answers
        request.env_location = None;
        let second = acquire(&request).await.unwrap();
        assert_eq!(second, first);

        // Bypassing the cache goes back to the (now empty) sources
        request.use_cache = false;
        assert!(matches!(
            acquire(&request).await,
            Err(LocationError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_location_file_source() {
        let cache = NamedTempFile::new().unwrap();
        let fix = NamedTempFile::new().unwrap();
        std::fs::write(fix.path(), "40.71,-74.01\n").unwrap();

        let mut request = request_with_cache(cache.path());
        request.use_cache = false;
        request.file = Some(fix.path().to_path_buf());

        let coordinate = acquire(&request).await.unwrap();
        assert_eq!(coordinate, GeoCoordinate::new(40.71, -74.01));
    }

    #[tokio::test]
    async fn test_configured_coordinate_source() {
        let cache = NamedTempFile::new().unwrap();
        let mut request = request_with_cache(cache.path());
        request.use_cache = false;
        request.configured = Some(GeoCoordinate::new(12.97, 77.59));

        let coordinate = acquire(&request).await.unwrap();
        assert_eq!(coordinate, GeoCoordinate::new(12.97, 77.59));

        request.configured = Some(GeoCoordinate::new(95.0, 0.0));
        assert!(matches!(acquire(&request).await, Err(LocationError::Parse(_))));
    }

    #[tokio::test]
    async fn test_source_precedence_env_then_config_then_file() {
        let cache = NamedTempFile::new().unwrap();
        let fix = NamedTempFile::new().unwrap();
        std::fs::write(fix.path(), "40.71,-74.01\n").unwrap();

        let mut request = request_with_cache(cache.path());
        request.use_cache = false;
        request.env_location = Some("-33.87,151.21".to_string());
        request.configured = Some(GeoCoordinate::new(12.97, 77.59));
        request.file = Some(fix.path().to_path_buf());

        let coordinate = acquire(&request).await.unwrap();
        assert_eq!(coordinate, GeoCoordinate::new(-33.87, 151.21));

        request.env_location = None;
        let coordinate = acquire(&request).await.unwrap();
        assert_eq!(coordinate, GeoCoordinate::new(12.97, 77.59));

        request.configured = None;
        let coordinate = acquire(&request).await.unwrap();
        assert_eq!(coordinate, GeoCoordinate::new(40.71, -74.01));
    }

    #[tokio::test]
    async fn test_invalid_explicit_coordinate_is_not_cached() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"").unwrap();
        let mut request = request_with_cache(file.path());
        request.explicit = Some(GeoCoordinate::new(123.0, 0.0));

        let coordinate = acquire(&request).await.unwrap();
        assert_eq!(coordinate.latitude, 123.0);
        assert!(std::fs::read(file.path()).unwrap().is_empty());
    }
}
