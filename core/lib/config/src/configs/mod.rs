pub mod attestation;
pub mod cleanup;
pub mod export_batcher;
pub mod federation;
pub mod postgres;
pub mod publish;
pub mod secrets;

pub use attestation::AttestationConfig;
pub use cleanup::CleanupConfig;
pub use export_batcher::ExportBatcherConfig;
pub use federation::{FederationInConfig, FederationOutConfig};
pub use postgres::PostgresConfig;
pub use publish::PublishConfig;
pub use secrets::{DatabaseSecrets, FederationInSecrets, Secrets, SensitiveUrl};
