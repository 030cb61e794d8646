use chrono::{DateTime, Utc};

/// A handle to a held named lock. `Unlock` is a no-op unless the lock's
/// current `expires` still matches this handle's (§4.1, P8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    pub lock_id: String,
    pub expires: DateTime<Utc>,
}
