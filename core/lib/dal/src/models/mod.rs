mod storage_authorized_app;
mod storage_export;
mod storage_exposure;
mod storage_federation;
mod storage_signature_info;

pub use storage_authorized_app::StorageAuthorizedApp;
pub use storage_export::{StorageExportBatch, StorageExportConfig, StorageExportFile};
pub use storage_exposure::StorageExposure;
pub use storage_federation::{
    StorageFederationInQuery, StorageFederationInSync, StorageFederationOutAuthorization,
};
pub use storage_signature_info::StorageSignatureInfo;
