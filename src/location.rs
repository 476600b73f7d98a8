use log::{info, warn};

use crate::error::LocateError;
use crate::geo::Coordinate;

/// Used whenever no position can be obtained (Visakhapatnam)
pub const FALLBACK_LOCATION: Coordinate = Coordinate::new(17.6868, 83.2185);

/// One-shot position lookup
pub trait LocationProvider {
    fn current_position(&self) -> Result<Coordinate, LocateError>;
}

/// A position known up front, e.g. from `--here`
pub struct FixedLocation(pub Coordinate);

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> Result<Coordinate, LocateError> {
        Ok(self.0)
    }
}

/// No positioning available on this device
pub struct Unavailable;

impl LocationProvider for Unavailable {
    fn current_position(&self) -> Result<Coordinate, LocateError> {
        Err(LocateError::Unsupported)
    }
}

/// Resolve the user's position, falling back silently on any failure
pub fn detect_user_location(provider: &dyn LocationProvider) -> Coordinate {
    match provider.current_position() {
        Ok(c) => {
            info!("User location {:.4},{:.4}", c.lat, c.lng);
            c
        }
        Err(e) => {
            warn!("{e}, using fallback location");
            FALLBACK_LOCATION
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Denied;

    impl LocationProvider for Denied {
        fn current_position(&self) -> Result<Coordinate, LocateError> {
            Err(LocateError::Denied)
        }
    }

    #[test]
    fn test_fixed_location_used() {
        let here = Coordinate::new(12.97, 77.59);
        assert_eq!(detect_user_location(&FixedLocation(here)), here);
    }

    #[test]
    fn test_failures_fall_back() {
        assert_eq!(detect_user_location(&Unavailable), FALLBACK_LOCATION);
        assert_eq!(detect_user_location(&Denied), FALLBACK_LOCATION);
    }
}
