use std::time::Duration;

/// Connection-pool sizing shared by every component that talks to Postgres.
#[derive(Debug, Clone, PartialEq)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub statement_timeout: Option<Duration>,
    pub acquire_timeout: Option<Duration>,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            statement_timeout: Some(Duration::from_secs(30)),
            acquire_timeout: Some(Duration::from_secs(10)),
        }
    }
}
