//! Locator - Best-Effort Device Positioning Port
//!
//! ## Responsibilities
//!
//! - Abstract the platform positioning capability
//! - Apply a bounded timeout to position queries
//! - Collapse "capability absent", "permission denied", and "timed out"
//!   into a single "no location" outcome
//!
//! Location is never fatal: a capture proceeds without coordinates when
//! positioning fails in any way.

use crate::error::{Error, Result};
use crate::models::Location;
use async_trait::async_trait;
use std::time::Duration;

/// Platform positioning capability
#[async_trait]
pub trait Locator: Send + Sync {
    /// Report the current device position with a high-accuracy hint.
    /// An error means the capability is absent, denied, or failed.
    async fn current_location(&self) -> Result<Location>;
}

/// Resolve a location without ever failing the caller
///
/// Errors and timeouts degrade uniformly to `None`; the distinction is
/// kept only in the logs.
pub async fn resolve_best_effort(locator: &dyn Locator, timeout: Duration) -> Option<Location> {
    match tokio::time::timeout(timeout, locator.current_location()).await {
        Ok(Ok(location)) => Some(location),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Location unavailable");
            None
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Location request timed out"
            );
            None
        }
    }
}

/// Locator for devices without a positioning capability
pub struct NullLocator;

#[async_trait]
impl Locator for NullLocator {
    async fn current_location(&self) -> Result<Location> {
        Err(Error::Internal(
            "no positioning capability on this device".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLocator(Location);

    #[async_trait]
    impl Locator for FixedLocator {
        async fn current_location(&self) -> Result<Location> {
            Ok(self.0)
        }
    }

    struct SlowLocator(Location);

    #[async_trait]
    impl Locator for SlowLocator {
        async fn current_location(&self) -> Result<Location> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_fixed_locator_resolves() {
        let locator = FixedLocator(Location {
            latitude: 13.7563,
            longitude: 100.5018,
        });
        let resolved = resolve_best_effort(&locator, Duration::from_secs(5)).await;
        assert_eq!(resolved.map(|l| l.latitude), Some(13.7563));
    }

    #[tokio::test]
    async fn test_null_locator_degrades_to_none() {
        let resolved = resolve_best_effort(&NullLocator, Duration::from_secs(5)).await;
        assert_eq!(resolved, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_none() {
        let locator = SlowLocator(Location {
            latitude: 0.0,
            longitude: 0.0,
        });
        let resolved = resolve_best_effort(&locator, Duration::from_secs(5)).await;
        assert_eq!(resolved, None);
    }
}
