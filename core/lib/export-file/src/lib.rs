//! Export-file assembler (C8, §4.6/§6): builds the two-entry zip archive
//! (`export.bin` + `export.sig`) a batch worker uploads for one shard of a
//! batch's exposures. The wire format is the protobuf schema in
//! `proto/export.proto`, generated at build time.

mod assembler;
mod error;
mod pb;

pub use assembler::{assemble, ExportFileInputs, DEFAULT_ROLLING_PERIOD, EXPORT_HEADER};
pub use error::AssemblerError;
pub use pb::{SignatureInfo as PbSignatureInfo, TekSignature, TekSignatureList, TemporaryExposureKey, TemporaryExposureKeyExport};
