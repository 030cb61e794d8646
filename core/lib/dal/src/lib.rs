//! Typed queries against the server's single Postgres database: exposures,
//! export configuration/batches/files, signature info, authorized apps, and
//! federation state. Each entity gets its own `*Dal` struct holding a
//! borrowed [`Connection`]; [`CoreDal`] is the single entry point that hands
//! one out via a `conn.exposures_dal()`-style accessor.

mod authorized_app_dal;
mod export_batch_dal;
mod export_config_dal;
mod export_file_dal;
mod exposures_dal;
mod federation_in_dal;
mod federation_out_dal;
mod models;
mod signature_info_dal;

pub use authorized_app_dal::AuthorizedAppDal;
pub use export_batch_dal::ExportBatchDal;
pub use export_config_dal::ExportConfigDal;
pub use export_file_dal::ExportFileDal;
pub use exposures_dal::{ExposuresDal, IterateExposuresCriteria, ScanOutcome, ScanResult};
pub use federation_in_dal::FederationInDal;
pub use federation_out_dal::FederationOutDal;
pub use signature_info_dal::SignatureInfoDal;

use tekx_db_connection::{Connection, Core};

/// Extension trait handing out a typed DAL for each entity over a single
/// `Connection<'_, Core>`. Import this trait to get `conn.exposures_dal()`,
/// `conn.export_batch_dal()`, and so on.
pub trait CoreDal<'a> {
    fn exposures_dal(&mut self) -> ExposuresDal<'_, 'a>;
    fn export_config_dal(&mut self) -> ExportConfigDal<'_, 'a>;
    fn export_batch_dal(&mut self) -> ExportBatchDal<'_, 'a>;
    fn export_file_dal(&mut self) -> ExportFileDal<'_, 'a>;
    fn signature_info_dal(&mut self) -> SignatureInfoDal<'_, 'a>;
    fn authorized_app_dal(&mut self) -> AuthorizedAppDal<'_, 'a>;
    fn federation_in_dal(&mut self) -> FederationInDal<'_, 'a>;
    fn federation_out_dal(&mut self) -> FederationOutDal<'_, 'a>;
}

impl<'a> CoreDal<'a> for Connection<'a, Core> {
    fn exposures_dal(&mut self) -> ExposuresDal<'_, 'a> {
        ExposuresDal { storage: self }
    }

    fn export_config_dal(&mut self) -> ExportConfigDal<'_, 'a> {
        ExportConfigDal { storage: self }
    }

    fn export_batch_dal(&mut self) -> ExportBatchDal<'_, 'a> {
        ExportBatchDal { storage: self }
    }

    fn export_file_dal(&mut self) -> ExportFileDal<'_, 'a> {
        ExportFileDal { storage: self }
    }

    fn signature_info_dal(&mut self) -> SignatureInfoDal<'_, 'a> {
        SignatureInfoDal { storage: self }
    }

    fn authorized_app_dal(&mut self) -> AuthorizedAppDal<'_, 'a> {
        AuthorizedAppDal { storage: self }
    }

    fn federation_in_dal(&mut self) -> FederationInDal<'_, 'a> {
        FederationInDal { storage: self }
    }

    fn federation_out_dal(&mut self) -> FederationOutDal<'_, 'a> {
        FederationOutDal { storage: self }
    }
}
