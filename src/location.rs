use crate::config::LocationConfig;

/// A captured geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Errors that can occur while resolving the current location.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationError {
    /// Access to location data was denied
    Denied,
    /// Access to location data is restricted by policy
    Restricted,
    /// The provider failed for an unspecified reason
    Unknown,
    /// The provider did not produce a fix in time
    Timeout,
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationError::Denied => write!(f, "Location access denied"),
            LocationError::Restricted => write!(f, "Location access denied"),
            LocationError::Unknown => write!(f, "Error getting location"),
            LocationError::Timeout => write!(f, "Location request timed out. Please try again."),
        }
    }
}

impl std::error::Error for LocationError {}

/// Source of the current coordinates.
///
/// Device positioning is an external collaborator; anything that can
/// produce a coordinate (or fail with a [`LocationError`]) fits behind
/// this trait.
pub trait LocationProvider {
    fn current_location(&self) -> Result<GeoPoint, LocationError>;
}

/// Provider backed by the optional `location` section of the config file.
///
/// Reports [`LocationError::Denied`] when no coordinate is configured.
pub struct ConfiguredLocation {
    point: Option<GeoPoint>,
}

impl ConfiguredLocation {
    pub fn new(point: Option<GeoPoint>) -> Self {
        Self { point }
    }

    pub fn from_config(location: Option<&LocationConfig>) -> Self {
        Self::new(location.map(|l| GeoPoint::new(l.lat, l.lng)))
    }
}

impl LocationProvider for ConfiguredLocation {
    fn current_location(&self) -> Result<GeoPoint, LocationError> {
        self.point.ok_or(LocationError::Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_location_returns_point() {
        let provider = ConfiguredLocation::new(Some(GeoPoint::new(19.4326, -99.1332)));
        let point = provider.current_location().unwrap();
        assert_eq!(point.lat, 19.4326);
        assert_eq!(point.lng, -99.1332);
    }

    #[test]
    fn test_unconfigured_location_is_denied() {
        let provider = ConfiguredLocation::new(None);
        assert_eq!(provider.current_location(), Err(LocationError::Denied));
    }

    #[test]
    fn test_from_config() {
        let config = LocationConfig {
            lat: 40.4168,
            lng: -3.7038,
        };
        let provider = ConfiguredLocation::from_config(Some(&config));
        let point = provider.current_location().unwrap();
        assert_eq!(point.lat, 40.4168);

        let provider = ConfiguredLocation::from_config(None);
        assert!(provider.current_location().is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LocationError::Denied.to_string(), "Location access denied");
        assert_eq!(
            LocationError::Timeout.to_string(),
            "Location request timed out. Please try again."
        );
    }
}
