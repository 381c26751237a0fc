//! Controller state published to views.

use chrono::{DateTime, Utc};

use crate::error::SyncError;

/// Lifecycle phase derived from a [`ControllerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

// == Controller State ==
/// What a view renders: the last good data, whether a fetch is running and
/// the most recent failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<SyncError>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Set while an auto-refresh is replacing data that is still shown
    pub is_stale: bool,
}

impl<T> Default for ControllerState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            last_updated: None,
            is_stale: false,
        }
    }
}

impl<T> ControllerState<T> {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.data.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}
