//! Tunables for the check-in flow.

use std::time::Duration;

use crate::geolocation::GeolocationOptions;
use crate::share::error::{invalid_settings, ScanShareResult};

/// Interval between issued-token listings while waiting for a new token.
pub const DEFAULT_POLL_INTERVAL_MILLIS: u64 = 2_000;
pub const DEFAULT_GEOLOCATION_TIMEOUT_MILLIS: u64 = 8_000;
pub const DEFAULT_COUNTDOWN_TICK_MILLIS: u64 = 1_000;
pub const DEFAULT_RECENT_TOKEN_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanShareSettings {
    poll_interval_millis: u64,
    geolocation_timeout_millis: u64,
    high_accuracy: bool,
    countdown_tick_millis: u64,
    recent_token_limit: usize,
}

impl ScanShareSettings {
    pub fn new(
        poll_interval_millis: u64,
        geolocation_timeout_millis: u64,
        high_accuracy: bool,
        countdown_tick_millis: u64,
        recent_token_limit: usize,
    ) -> ScanShareResult<Self> {
        validate_positive("poll_interval_millis", poll_interval_millis)?;
        validate_positive("geolocation_timeout_millis", geolocation_timeout_millis)?;
        validate_positive("countdown_tick_millis", countdown_tick_millis)?;
        validate_positive("recent_token_limit", recent_token_limit as u64)?;
        Ok(Self {
            poll_interval_millis,
            geolocation_timeout_millis,
            high_accuracy,
            countdown_tick_millis,
            recent_token_limit,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_millis)
    }

    pub fn high_accuracy(&self) -> bool {
        self.high_accuracy
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_millis)
    }

    pub fn recent_token_limit(&self) -> usize {
        self.recent_token_limit
    }

    pub fn geolocation_options(&self) -> GeolocationOptions {
        GeolocationOptions {
            high_accuracy: self.high_accuracy,
            timeout: self.geolocation_timeout(),
        }
    }

    /// Applies every field present in `update`, leaving `self` untouched on error.
    pub fn apply(&mut self, update: &ScanShareSettingsUpdate) -> ScanShareResult<()> {
        let next = Self::new(
            update.poll_interval_millis.unwrap_or(self.poll_interval_millis),
            update
                .geolocation_timeout_millis
                .unwrap_or(self.geolocation_timeout_millis),
            update.high_accuracy.unwrap_or(self.high_accuracy),
            update.countdown_tick_millis.unwrap_or(self.countdown_tick_millis),
            update.recent_token_limit.unwrap_or(self.recent_token_limit),
        )?;
        *self = next;
        Ok(())
    }
}

impl Default for ScanShareSettings {
    fn default() -> Self {
        Self {
            poll_interval_millis: DEFAULT_POLL_INTERVAL_MILLIS,
            geolocation_timeout_millis: DEFAULT_GEOLOCATION_TIMEOUT_MILLIS,
            high_accuracy: true,
            countdown_tick_millis: DEFAULT_COUNTDOWN_TICK_MILLIS,
            recent_token_limit: DEFAULT_RECENT_TOKEN_LIMIT,
        }
    }
}

/// Partial update to apply on top of existing settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanShareSettingsUpdate {
    pub poll_interval_millis: Option<u64>,
    pub geolocation_timeout_millis: Option<u64>,
    pub high_accuracy: Option<bool>,
    pub countdown_tick_millis: Option<u64>,
    pub recent_token_limit: Option<usize>,
}

impl ScanShareSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn validate_positive(name: &str, value: u64) -> ScanShareResult<()> {
    if value == 0 {
        return Err(invalid_settings(format!("{name} must be greater than zero")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_portal_behaviour() {
        let settings = ScanShareSettings::default();
        assert_eq!(settings.poll_interval(), Duration::from_secs(2));
        assert_eq!(settings.geolocation_timeout(), Duration::from_secs(8));
        assert!(settings.high_accuracy());
        assert_eq!(settings.countdown_tick(), Duration::from_secs(1));
        assert_eq!(settings.recent_token_limit(), 10);
    }

    #[test]
    fn rejects_zero_intervals() {
        let err = ScanShareSettings::new(0, 8_000, true, 1_000, 10).unwrap_err();
        assert_eq!(err.code_str(), "scan-share/invalid-settings");
        assert!(ScanShareSettings::new(2_000, 8_000, false, 1_000, 0).is_err());
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut settings = ScanShareSettings::default();
        let bad = ScanShareSettingsUpdate {
            poll_interval_millis: Some(500),
            countdown_tick_millis: Some(0),
            ..Default::default()
        };
        assert!(settings.apply(&bad).is_err());
        assert_eq!(settings, ScanShareSettings::default());

        let good = ScanShareSettingsUpdate {
            poll_interval_millis: Some(500),
            ..Default::default()
        };
        assert!(!good.is_empty());
        settings.apply(&good).unwrap();
        assert_eq!(settings.poll_interval(), Duration::from_millis(500));
        assert!(ScanShareSettingsUpdate::default().is_empty());
    }
}
