//! Domain types shared across the publish, export, and federation
//! components. No persistence or network logic lives here — see
//! `tekx_dal` for database access and `tekx_object_store` for blobs.

mod authorized_app;
mod export_batch;
mod export_config;
mod export_file;
mod exposure;
mod federation;
mod lock;
mod platform;
mod time_window;

pub use authorized_app::{AuthorizedApp, DeviceCheckPolicy, SafetyNetPolicy};
pub use export_batch::{ExportBatch, ExportBatchStatus};
pub use export_config::{ExportConfig, ExportConfigError};
pub use export_file::{ExportFile, ExportFileStatus};
pub use exposure::{Exposure, ExposureKey};
pub use federation::{FederationInQuery, FederationInSync, FederationOutAuthorization};
pub use lock::LockHandle;
pub use platform::Platform;
pub use time_window::{interval_number, interval_to_time, truncate_window, INTERVAL_LENGTH};
