//! Original-role tracking
//!
//! Audio attribution must stay stable even when the meeting SDK reassigns
//! the host role mid-session, so the tracker freezes the host/client
//! identity mapping the first time it sees a roster snapshot and
//! classifies every later identity against that frozen pair.

use std::collections::HashMap;
use std::sync::Mutex;

/// Opaque participant identity assigned by the capture SDK
///
/// Stable for the lifetime of a participant's session membership;
/// 0 is never a real identity.
pub type ParticipantId = u32;

/// Classification of an identity against the frozen original roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The original host
    Host,
    /// The original client
    Client,
    /// Neither original identity; e.g. an extra observer in the room
    Unknown,
}

/// One participant as reported by a roster snapshot query
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub id: ParticipantId,
    /// Whether this entry is the local bot itself
    pub is_self: bool,
    /// Whether this participant currently holds the host role
    pub is_host: bool,
    pub display_name: Option<String>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    latched: bool,
    original_host: Option<ParticipantId>,
    original_client: Option<ParticipantId>,
    /// Current roles, refreshed on join/leave; display and debug use only
    current_roles: HashMap<ParticipantId, bool>,
}

/// Derives and freezes the original host/client identities for a session
#[derive(Debug, Default)]
pub struct RoleTracker {
    inner: Mutex<TrackerInner>,
}

impl RoleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the discovery rule to a roster snapshot, exactly once
    ///
    /// The first non-self entry reporting host becomes the original host;
    /// the first non-self entry not reporting host becomes the original
    /// client. Either may stay unset if no such entry exists. A second
    /// call is a no-op regardless of the snapshot's contents.
    pub fn capture_from_roster(&self, roster: &[RosterEntry]) {
        let mut inner = self.inner.lock().unwrap();
        if inner.latched {
            return;
        }

        inner.original_host = roster
            .iter()
            .find(|e| !e.is_self && e.is_host)
            .map(|e| e.id);
        inner.original_client = roster
            .iter()
            .find(|e| !e.is_self && !e.is_host)
            .map(|e| e.id);
        inner.latched = true;

        tracing::info!(
            original_host = ?inner.original_host,
            original_client = ?inner.original_client,
            "Original roles stored"
        );
    }

    /// Classify an identity against the frozen snapshot
    ///
    /// Safe to call before any roster has been captured; everything is
    /// `Unknown` until the latch is set.
    pub fn classify(&self, id: ParticipantId) -> Role {
        let inner = self.inner.lock().unwrap();
        if inner.original_host == Some(id) {
            Role::Host
        } else if inner.original_client == Some(id) {
            Role::Client
        } else {
            Role::Unknown
        }
    }

    /// Whether the original roles have been captured
    pub fn is_latched(&self) -> bool {
        self.inner.lock().unwrap().latched
    }

    /// Frozen original host identity, if one was discovered
    pub fn original_host(&self) -> Option<ParticipantId> {
        self.inner.lock().unwrap().original_host
    }

    /// Frozen original client identity, if one was discovered
    pub fn original_client(&self) -> Option<ParticipantId> {
        self.inner.lock().unwrap().original_client
    }

    /// Record a participant's current role; never touches the frozen state
    pub fn note_joined(&self, id: ParticipantId, is_host: bool) {
        self.inner.lock().unwrap().current_roles.insert(id, is_host);
    }

    /// Forget a departed participant's current role
    pub fn note_left(&self, id: ParticipantId) {
        self.inner.lock().unwrap().current_roles.remove(&id);
    }

    /// Current host flag for a tracked participant, if known
    pub fn current_role(&self, id: ParticipantId) -> Option<bool> {
        self.inner.lock().unwrap().current_roles.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: ParticipantId, is_self: bool, is_host: bool) -> RosterEntry {
        RosterEntry {
            id,
            is_self,
            is_host,
            display_name: None,
        }
    }

    #[test]
    fn test_classify_before_capture_is_unknown() {
        let tracker = RoleTracker::new();
        assert_eq!(tracker.classify(42), Role::Unknown);
        assert!(!tracker.is_latched());
    }

    #[test]
    fn test_first_match_excludes_self() {
        let tracker = RoleTracker::new();
        // Bot itself holds host at scan time
        let roster = [entry(1, true, true), entry(2, false, true), entry(3, false, false)];
        tracker.capture_from_roster(&roster);

        assert_eq!(tracker.original_host(), Some(2));
        assert_eq!(tracker.original_client(), Some(3));
        assert_eq!(tracker.classify(1), Role::Unknown);
        assert_eq!(tracker.classify(2), Role::Host);
        assert_eq!(tracker.classify(3), Role::Client);
    }

    #[test]
    fn test_capture_is_idempotent_after_latch() {
        let tracker = RoleTracker::new();
        tracker.capture_from_roster(&[entry(10, false, true), entry(11, false, false)]);
        assert!(tracker.is_latched());

        // A later, different snapshot must not change anything
        tracker.capture_from_roster(&[entry(99, false, true), entry(98, false, false)]);
        assert_eq!(tracker.original_host(), Some(10));
        assert_eq!(tracker.original_client(), Some(11));
    }

    #[test]
    fn test_roles_stable_under_host_change() {
        let tracker = RoleTracker::new();
        tracker.capture_from_roster(&[entry(10, false, true), entry(11, false, false)]);

        // SDK reassigns host to the original client mid-meeting
        tracker.note_joined(11, true);
        tracker.note_joined(10, false);

        assert_eq!(tracker.classify(10), Role::Host);
        assert_eq!(tracker.classify(11), Role::Client);
        // Current-role view does move
        assert_eq!(tracker.current_role(11), Some(true));
    }

    #[test]
    fn test_missing_role_stays_unset() {
        let tracker = RoleTracker::new();
        // Only a host in the room at scan time
        tracker.capture_from_roster(&[entry(5, false, true)]);

        assert_eq!(tracker.original_host(), Some(5));
        assert_eq!(tracker.original_client(), None);
        assert!(tracker.is_latched());
        assert_eq!(tracker.classify(6), Role::Unknown);
    }

    #[test]
    fn test_note_left_forgets_current_role() {
        let tracker = RoleTracker::new();
        tracker.note_joined(7, false);
        assert_eq!(tracker.current_role(7), Some(false));

        tracker.note_left(7);
        assert_eq!(tracker.current_role(7), None);
    }
}
