//! Debounced auto-save scheduling.
//!
//! A save becomes due once the session has been quiet for the debounce delay
//! and the minimum interval since the previous save has passed. The manager
//! only decides *when*; the board controller performs the write.

use std::time::Duration;

use web_time::Instant;

use crate::config::UserPreferences;

#[derive(Debug)]
pub struct AutoSaveManager {
    interval: Duration,
    debounce: Duration,
    enabled: bool,
    /// Set while there are edits not yet written.
    pending_since: Option<Instant>,
    last_save: Option<Instant>,
}

impl AutoSaveManager {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

    pub fn new() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            debounce: Self::DEFAULT_DEBOUNCE,
            enabled: true,
            pending_since: None,
            last_save: None,
        }
    }

    /// Build a manager from the user's auto-save preferences.
    pub fn from_preferences(prefs: &UserPreferences) -> Self {
        Self {
            interval: prefs.auto_save_interval(),
            debounce: prefs.auto_save_debounce(),
            enabled: prefs.auto_save,
            pending_since: None,
            last_save: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Record an edit. Restarts the debounce window.
    pub fn record_change(&mut self) {
        self.pending_since = Some(Instant::now());
        log::trace!("Auto-save: change recorded");
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a save should happen now.
    pub fn is_due(&self) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(changed) = self.pending_since else {
            return false;
        };
        if changed.elapsed() < self.debounce {
            return false;
        }
        self.last_save
            .is_none_or(|saved| saved.elapsed() >= self.interval)
    }

    /// Record the outcome of a save attempt.
    ///
    /// A failed save keeps the changes pending but still counts towards the
    /// interval, so the next attempt waits a full interval.
    pub fn record_save(&mut self, succeeded: bool) {
        self.last_save = Some(Instant::now());
        if succeeded {
            self.pending_since = None;
        } else {
            log::warn!("Auto-save failed; will retry after {:?}", self.interval);
        }
    }
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new()
    }
}
