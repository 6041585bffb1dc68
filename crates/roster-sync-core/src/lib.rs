//! `roster-sync-core`: keeps a record store consistent with an external
//! membership roster and with the messages still live on the chat platform.
//!
//! # Architecture
//!
//! ```text
//! Roster + SurfaceBindings
//!     │
//!     ▼
//! SyncEngine      ← six ordered phases, first store failure aborts
//!     │     │
//!     │     └──► Messaging   (DiscordMessaging: fetch / delete messages)
//!     ▼
//! Repository      (RecordStore: redb tables, JSON values)
//!     │
//!     ▼
//! SyncResult      ← 13 counters grouped by phase
//! ```

pub mod config;
pub mod discord;
pub mod error;
pub mod messaging;
pub mod paths;
pub mod repository;
pub mod result;
pub mod roster;
pub mod store;
pub mod sync;
pub mod types;

pub use discord::DiscordMessaging;
pub use error::{MessagingError, Result, StoreError, SyncError};
pub use messaging::{Message, Messaging};
pub use repository::Repository;
pub use result::{SyncResult, SyncSummary};
pub use roster::Roster;
pub use store::RecordStore;
pub use sync::{Phase, SyncEngine};
