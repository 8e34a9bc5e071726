//! Switchboard persistence.
//!
//! Two layers:
//!
//! - [`KvStore`] — raw namespaced byte storage with an in-memory
//!   implementation for tests and an embedded `SurrealKV` implementation
//!   for deployments.
//! - [`Store`] — the typed entity store the rest of the system uses:
//!   agents, capabilities, requests, plans, approvals, receipts, settings,
//!   audit events, and admin users, each a JSON value in its own
//!   namespace, with monotonically assigned integer ids.
//!
//! The store is single-node by design. Writes that must not race
//! (id assignment, conditional status transitions, uniqueness checks) are
//! serialized behind an internal async mutex.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod kv;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use kv::{KvStore, MemoryKvStore, SurrealKvStore};
pub use store::Store;
