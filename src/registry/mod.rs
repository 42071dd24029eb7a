//! Subscriber connection registry
//!
//! Each broadcast service owns one registry: the set of WebSocket
//! subscribers currently attached to that service's listener.
//!
//! # Architecture
//!
//! ```text
//!                  Arc<ConnectionRegistry>
//!              ┌───────────────────────────┐
//!              │ connections: Mutex<       │
//!              │   HashMap<u64,            │
//!              │     ConnectionHandle {    │
//!              │       outbound: mpsc::Tx, │
//!              │     }                     │
//!              │   >                       │
//!              │ >                         │
//!              └────────────┬──────────────┘
//!                           │
//!          ┌────────────────┼────────────────┐
//!          │                │                │
//!          ▼                ▼                ▼
//!     [accept loop]    [broadcast()]    [writer task]
//!     add()/remove()   for each handle  outbound.recv()
//!                      queue message        │
//!                                           └──► WebSocket
//! ```
//!
//! Registry mutation and broadcast iteration share one mutex, but a send
//! only queues the message on the subscriber's channel; network writes
//! happen on that subscriber's own writer task, so the lock is never held
//! across socket I/O. Failed queues are pruned after the iteration
//! completes, never mid-walk.

pub mod handle;
pub mod store;

pub use handle::ConnectionHandle;
pub use store::ConnectionRegistry;
