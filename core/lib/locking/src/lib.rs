//! Database-backed named-lock service (§4.1): `Lock(id, ttl)`,
//! `MultiLock(ids, ttl)`, `Unlock`. Every lock is a single row in the
//! `locks` table; acquisition and release are serializable transactions so
//! that concurrent worker processes coordinate purely through Postgres.

mod service;

pub use service::{LockOutcome, MultiLockOutcome, NamedLockService};
pub use tekx_types::LockHandle;
