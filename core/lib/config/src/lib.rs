pub use crate::configs::{
    AttestationConfig, CleanupConfig, DatabaseSecrets, ExportBatcherConfig, FederationInConfig,
    FederationInSecrets, FederationOutConfig, PostgresConfig, PublishConfig, Secrets, SensitiveUrl,
};

pub mod configs;
