//! Connection pooling and instrumentation shared by every `tekx_dal`
//! query: a marker type per logical database, a cloneable pool, and an
//! `instrument()` combinator that attaches operation names and latency
//! logging to raw `sqlx` queries.

pub mod connection;
pub mod connection_pool;
pub mod error;
pub mod instrument;

pub use connection::{Connection, Core, DbMarker};
pub use connection_pool::{ConnectionPool, ConnectionPoolBuilder};
pub use error::{DalError, DalResult};
pub use instrument::InstrumentExt;
