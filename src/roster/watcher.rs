//! Roster event reporting
//!
//! Translates participant events from the capture collaborator into
//! structured logs and observer notifications. Events are side-effect
//! only: nothing here mutates the tracker's frozen original roles except
//! the session-start roster scan.

use std::sync::Arc;

use super::tracker::{ParticipantId, Role, RoleTracker, RosterEntry};

/// Observer capability set for role notifications
///
/// All hooks default to no-ops; implement only what the embedding session
/// cares about.
pub trait RosterHooks: Send + Sync {
    fn on_host_detected(&self, _id: ParticipantId) {}
    fn on_cohost_detected(&self, _id: ParticipantId, _is_cohost: bool) {}
}

/// Hook implementation that ignores every notification
#[derive(Debug, Default)]
pub struct NoHooks;

impl RosterHooks for NoHooks {}

/// Receives roster events and keeps the role tracker's current view fresh
pub struct RosterWatcher {
    tracker: Arc<RoleTracker>,
    hooks: Box<dyn RosterHooks>,
}

impl RosterWatcher {
    pub fn new(tracker: Arc<RoleTracker>, hooks: Box<dyn RosterHooks>) -> Self {
        Self { tracker, hooks }
    }

    /// Watcher with no observer hooks attached
    pub fn with_tracker(tracker: Arc<RoleTracker>) -> Self {
        Self::new(tracker, Box::new(NoHooks))
    }

    /// Full roster scan at session start
    ///
    /// Latches the original roles on first call, then reports every
    /// non-self participant with both original and current role.
    pub fn roster_scanned(&self, roster: &[RosterEntry]) {
        self.tracker.capture_from_roster(roster);

        let mut others = 0;
        for entry in roster.iter().filter(|e| !e.is_self) {
            self.tracker.note_joined(entry.id, entry.is_host);
            others += 1;
            tracing::info!(
                id = entry.id,
                name = entry.display_name.as_deref().unwrap_or("Unknown"),
                original_role = ?self.tracker.classify(entry.id),
                current_host = entry.is_host,
                "Participant"
            );
        }

        if others == 0 {
            tracing::info!("No other participants found in the meeting");
        }
    }

    /// Participants joined mid-session
    pub fn participants_joined(&self, entries: &[RosterEntry]) {
        for entry in entries {
            self.tracker.note_joined(entry.id, entry.is_host);
            tracing::info!(
                id = entry.id,
                name = entry.display_name.as_deref().unwrap_or("Unknown"),
                host = entry.is_host,
                "User joined"
            );
        }
    }

    /// Participants left mid-session
    pub fn participants_left(&self, ids: &[ParticipantId]) {
        for &id in ids {
            self.tracker.note_left(id);
            tracing::info!(id, "User left");
        }
    }

    /// SDK reassigned the host role
    ///
    /// Reported against the original host for debugging; classification
    /// is unaffected.
    pub fn host_changed(&self, id: ParticipantId) {
        tracing::info!(
            new_host = id,
            original_host = ?self.tracker.original_host(),
            "Host role changed"
        );
        self.hooks.on_host_detected(id);
    }

    /// SDK granted or revoked a co-host
    pub fn co_host_changed(&self, id: ParticipantId, is_cohost: bool) {
        tracing::info!(id, is_cohost, "Co-host changed");
        self.hooks.on_cohost_detected(id, is_cohost);
    }

    /// Classification view, for callers that only hold the watcher
    pub fn classify(&self, id: ParticipantId) -> Role {
        self.tracker.classify(id)
    }
}
