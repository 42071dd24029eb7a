//! Participant role tracking
//!
//! The meeting SDK can reassign the host role mid-session, but audio
//! attribution must stay stable. [`RoleTracker`] freezes the host/client
//! identity pair at the first roster scan; [`RosterWatcher`] feeds it
//! roster events and reports them.

pub mod tracker;
pub mod watcher;

pub use tracker::{ParticipantId, Role, RoleTracker, RosterEntry};
pub use watcher::{NoHooks, RosterHooks, RosterWatcher};
