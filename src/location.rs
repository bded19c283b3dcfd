/// User geolocation
///
/// The Nearby and Faraway tabs need the user's position. It is requested at
/// most once per session through a [`LocationProvider`]; the answer arrives
/// asynchronously and the feed simply keeps collection order until then.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::state::config::GeolocationConfig;
use crate::state::data::Coordinates;

/// Why a location request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
}

impl LocationError {
    /// Message shown in the status bar
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Location permission was denied, so photos cannot be sorted by distance."
            }
            LocationError::Unavailable => "Your location is unavailable right now.",
            LocationError::Timeout => "Timed out while getting your location.",
        }
    }
}

/// A resolved position and when it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coordinates: Coordinates,
    pub fixed_at: DateTime<Utc>,
}

impl LocationFix {
    pub fn now(coordinates: Coordinates) -> Self {
        Self { coordinates, fixed_at: Utc::now() }
    }

    /// Whether this fix is still within `max_age`
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => now.signed_duration_since(self.fixed_at) <= max_age,
            Err(_) => true,
        }
    }
}

pub type LocationFuture = Pin<Box<dyn Future<Output = Result<LocationFix, LocationError>> + Send>>;

/// Source of the user's position
pub trait LocationProvider: Send + Sync {
    fn request_location(&self) -> LocationFuture;
}

/// Ask `provider` for a fix, giving up after `timeout`
pub async fn request_with_timeout(
    provider: Arc<dyn LocationProvider>,
    timeout: Duration,
) -> Result<LocationFix, LocationError> {
    match tokio::time::timeout(timeout, provider.request_location()).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}

/// Reports the home position from the settings file.
///
/// A desktop session has no browser geolocation; the user states where
/// they are instead. Refusing permission in the settings behaves exactly
/// like a denied platform prompt.
#[derive(Debug)]
pub struct ConfiguredLocationProvider {
    permission_granted: bool,
    home: Option<Coordinates>,
    max_age: Duration,
    last_fix: Mutex<Option<LocationFix>>,
}

impl ConfiguredLocationProvider {
    pub fn new(config: &GeolocationConfig) -> Self {
        Self {
            permission_granted: config.permission_granted,
            home: config.home(),
            max_age: config.max_age(),
            last_fix: Mutex::new(None),
        }
    }

    fn resolve(&self) -> Result<LocationFix, LocationError> {
        if !self.permission_granted {
            return Err(LocationError::PermissionDenied);
        }

        let mut last_fix = self.last_fix.lock().map_err(|_| LocationError::Unavailable)?;
        if let Some(fix) = *last_fix {
            if fix.is_fresh(self.max_age, Utc::now()) {
                debug!("Reusing location fix from {}", fix.fixed_at);
                return Ok(fix);
            }
        }

        let coordinates = self.home.ok_or(LocationError::Unavailable)?;
        let fix = LocationFix::now(coordinates);
        *last_fix = Some(fix);
        Ok(fix)
    }
}

impl LocationProvider for ConfiguredLocationProvider {
    fn request_location(&self) -> LocationFuture {
        let result = self.resolve();
        Box::pin(async move { result })
    }
}

/// Session-wide location state
///
/// Once a position is known it is never requested again. Only one request
/// is in flight at a time.
#[derive(Debug, Clone, Default)]
pub struct SessionLocation {
    location: Option<Coordinates>,
    in_flight: bool,
}

impl SessionLocation {
    pub fn get(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight
    }

    /// Returns true when the caller should start a request now
    pub fn begin_request(&mut self) -> bool {
        if self.location.is_some() || self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Record the outcome of a request started with [`begin_request`].
    /// A failure leaves the location unknown.
    ///
    /// [`begin_request`]: SessionLocation::begin_request
    pub fn complete(&mut self, result: Result<LocationFix, LocationError>) -> Result<Coordinates, LocationError> {
        self.in_flight = false;
        match result {
            Ok(fix) => {
                info!(
                    "📍 Location resolved: {:.4}, {:.4}",
                    fix.coordinates.latitude, fix.coordinates.longitude
                );
                self.location = Some(fix.coordinates);
                Ok(fix.coordinates)
            }
            Err(err) => {
                warn!("Geolocation error: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(permission_granted: bool, home: Option<(f64, f64)>) -> GeolocationConfig {
        GeolocationConfig {
            permission_granted,
            latitude: home.map(|h| h.0),
            longitude: home.map(|h| h.1),
            ..GeolocationConfig::default()
        }
    }

    struct NeverResolves;

    impl LocationProvider for NeverResolves {
        fn request_location(&self) -> LocationFuture {
            Box::pin(std::future::pending::<Result<LocationFix, LocationError>>())
        }
    }

    #[tokio::test]
    async fn test_configured_home() {
        let provider: Arc<dyn LocationProvider> =
            Arc::new(ConfiguredLocationProvider::new(&config(true, Some((48.85, 2.35)))));

        let fix = request_with_timeout(provider, Duration::from_secs(5)).await.unwrap();
        assert_eq!(fix.coordinates, Coordinates::new(48.85, 2.35));
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let provider: Arc<dyn LocationProvider> =
            Arc::new(ConfiguredLocationProvider::new(&config(false, Some((48.85, 2.35)))));

        let result = request_with_timeout(provider, Duration::from_secs(5)).await;
        assert_eq!(result, Err(LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_unavailable_without_home() {
        let provider: Arc<dyn LocationProvider> = Arc::new(ConfiguredLocationProvider::new(&config(true, None)));

        let result = request_with_timeout(provider, Duration::from_secs(5)).await;
        assert_eq!(result, Err(LocationError::Unavailable));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let provider: Arc<dyn LocationProvider> = Arc::new(NeverResolves);

        let result = request_with_timeout(provider, Duration::from_secs(5)).await;
        assert_eq!(result, Err(LocationError::Timeout));
    }

    #[test]
    fn test_fix_reused_within_max_age() {
        let provider = ConfiguredLocationProvider::new(&config(true, Some((1.0, 2.0))));
        let first = provider.resolve().unwrap();
        let second = provider.resolve().unwrap();
        assert_eq!(first.fixed_at, second.fixed_at);
    }

    #[test]
    fn test_fix_freshness() {
        let fix = LocationFix::now(Coordinates::new(0.0, 0.0));
        let later = fix.fixed_at + chrono::Duration::seconds(61);
        assert!(fix.is_fresh(Duration::from_secs(60), fix.fixed_at));
        assert!(!fix.is_fresh(Duration::from_secs(60), later));
    }

    #[test]
    fn test_messages_are_distinct() {
        let messages = [
            LocationError::PermissionDenied.user_message(),
            LocationError::Unavailable.user_message(),
            LocationError::Timeout.user_message(),
        ];
        assert!(messages[0].contains("permission"));
        assert!(messages[1].contains("unavailable"));
        assert!(messages[2].contains("Timed out"));
    }

    #[test]
    fn test_session_requests_once() {
        let mut session = SessionLocation::default();
        assert!(session.begin_request());
        assert!(!session.begin_request(), "request already in flight");

        let location = session.complete(Ok(LocationFix::now(Coordinates::new(1.0, 1.0))));
        assert!(location.is_ok());
        assert!(!session.begin_request(), "location already known");
        assert_eq!(session.get(), Some(Coordinates::new(1.0, 1.0)));
    }

    #[test]
    fn test_session_failure_allows_retry() {
        let mut session = SessionLocation::default();
        assert!(session.begin_request());
        assert_eq!(session.complete(Err(LocationError::PermissionDenied)), Err(LocationError::PermissionDenied));

        assert!(session.get().is_none());
        assert!(!session.is_pending());
        assert!(session.begin_request());
    }
}
