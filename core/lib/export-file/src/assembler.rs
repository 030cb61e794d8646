use std::io::Write;

use chrono::{DateTime, Utc};
use prost::Message;
use tekx_crypto::{sha256, Signer};
use tekx_types::{Exposure, ExportBatch, SignatureInfo};
use zip::{write::FileOptions, CompressionMethod, DateTime as ZipDateTime, ZipWriter};

use crate::{error::AssemblerError, pb};

/// 16-byte ASCII header every `export.bin` starts with (§4.6, §6).
pub const EXPORT_HEADER: &[u8; 16] = b"EK Export v1    ";

const EXPORT_BIN_NAME: &str = "export.bin";
const EXPORT_SIG_NAME: &str = "export.sig";

/// Default `rollingPeriod` a key is assumed to have if unspecified; the
/// wire format omits the field when it equals this value (§4.6).
pub const DEFAULT_ROLLING_PERIOD: i32 = 144;

/// Everything the assembler needs to build one export file. `exposures`
/// must already fit within the configured `maxRecordsPerFile` — sharding
/// happens in the batch worker, not here.
pub struct ExportFileInputs<'a> {
    pub batch: &'a ExportBatch,
    pub exposures: &'a [Exposure],
    pub batch_num: i32,
    pub batch_size: i32,
    pub signature_infos: &'a [SignatureInfo],
}

/// Builds the zip archive described in §4.6/§6: `export.bin` then
/// `export.sig`, in that order, deterministic for a fixed input set.
pub async fn assemble(
    inputs: ExportFileInputs<'_>,
    signer: &dyn Signer,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, AssemblerError> {
    let export_bin = build_export_bin(&inputs);
    let digest = sha256(&export_bin);

    let active_infos: Vec<&SignatureInfo> = inputs
        .signature_infos
        .iter()
        .filter(|info| info.is_active(now))
        .collect();

    let mut signatures = Vec::with_capacity(active_infos.len());
    for info in &active_infos {
        let signature = signer
            .sign(&info.signing_key, &digest)
            .await
            .map_err(|source| AssemblerError::SignerFailed {
                signing_key: info.signing_key.clone(),
                source,
            })?;
        signatures.push(pb::TekSignature {
            signature_info: Some(pb::SignatureInfo {
                signing_key_version: info.signing_key_version.clone(),
                signing_key_id: info.signing_key_id.clone(),
                signature_algorithm: tekx_crypto::ECDSA_P256_SHA256_OID.to_string(),
                app_package_name: info.app_package_name.clone(),
                bundle_id: info.bundle_id.clone(),
            }),
            batch_num: inputs.batch_num,
            batch_size: inputs.batch_size,
            signature,
        });
    }

    let export_sig = pb::TekSignatureList { signatures }.encode_to_vec();

    write_archive(&export_bin, &export_sig)
}

fn build_export_bin(inputs: &ExportFileInputs<'_>) -> Vec<u8> {
    let mut sorted: Vec<&Exposure> = inputs.exposures.iter().collect();
    sorted.sort_by(|a, b| a.exposure_key.cmp(&b.exposure_key));

    let keys = sorted
        .iter()
        .map(|exposure| pb::TemporaryExposureKey {
            key_data: exposure.exposure_key.to_vec(),
            transmission_risk_level: exposure.transmission_risk as i32,
            rolling_start_interval_number: exposure.interval_number,
            rolling_period: if exposure.interval_count == DEFAULT_ROLLING_PERIOD {
                0
            } else {
                exposure.interval_count
            },
        })
        .collect();

    let signature_infos = inputs
        .signature_infos
        .iter()
        .map(|info| pb::SignatureInfo {
            signing_key_version: info.signing_key_version.clone(),
            signing_key_id: info.signing_key_id.clone(),
            signature_algorithm: tekx_crypto::ECDSA_P256_SHA256_OID.to_string(),
            app_package_name: info.app_package_name.clone(),
            bundle_id: info.bundle_id.clone(),
        })
        .collect();

    let export = pb::TemporaryExposureKeyExport {
        start_timestamp: inputs.batch.start_timestamp.timestamp(),
        end_timestamp: inputs.batch.end_timestamp.timestamp(),
        region: inputs.batch.region.clone(),
        batch_num: inputs.batch_num,
        batch_size: inputs.batch_size,
        keys,
        signature_infos,
    };

    let mut bytes = Vec::with_capacity(EXPORT_HEADER.len() + export.encoded_len());
    bytes.extend_from_slice(EXPORT_HEADER);
    export.encode(&mut bytes).expect("Vec<u8> writer never fails");
    bytes
}

fn write_archive(export_bin: &[u8], export_sig: &[u8]) -> Result<Vec<u8>, AssemblerError> {
    let mut buffer = Vec::new();
    let mut writer = ZipWriter::new(std::io::Cursor::new(&mut buffer));
    let fixed_time = ZipDateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .expect("1980-01-01 00:00:00 is representable as a DOS timestamp");
    let options: FileOptions = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(fixed_time);

    writer.start_file(EXPORT_BIN_NAME, options)?;
    writer.write_all(export_bin)?;
    writer.start_file(EXPORT_SIG_NAME, options)?;
    writer.write_all(export_sig)?;
    writer.finish()?;
    drop(writer);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;
    use tekx_types::ExportBatchStatus;

    use super::*;

    struct StubSigner;

    #[async_trait]
    impl Signer for StubSigner {
        async fn sign(&self, _signing_key: &str, digest: &[u8; 32]) -> Result<Vec<u8>, tekx_crypto::SignerError> {
            Ok(digest.to_vec())
        }
    }

    fn batch() -> ExportBatch {
        ExportBatch {
            batch_id: 1,
            config_id: 1,
            bucket_name: "bucket".to_string(),
            filename_root: "root".to_string(),
            start_timestamp: Utc.with_ymd_and_hms(2020, 12, 10, 9, 0, 0).unwrap(),
            end_timestamp: Utc.with_ymd_and_hms(2020, 12, 10, 10, 0, 0).unwrap(),
            region: "US".to_string(),
            status: ExportBatchStatus::Pending,
            lease_expires: None,
            signature_info_ids: vec![1],
        }
    }

    fn exposure(key: u8) -> Exposure {
        Exposure {
            exposure_key: [key; 16],
            transmission_risk: 2,
            app_package_name: "com.example".to_string(),
            regions: vec!["US".to_string()],
            interval_number: 100,
            interval_count: 144,
            created_at: Utc::now(),
            local_provenance: true,
            verification_authority_name: "authority".to_string(),
            federation_sync_id: None,
        }
    }

    fn signature_info(active: bool) -> SignatureInfo {
        SignatureInfo {
            id: 1,
            signing_key: "key-1".to_string(),
            app_package_name: "com.example".to_string(),
            bundle_id: "com.example".to_string(),
            signing_key_version: "v1".to_string(),
            signing_key_id: "key-id".to_string(),
            end_timestamp: if active {
                None
            } else {
                Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
            },
        }
    }

    #[tokio::test]
    async fn produces_a_two_entry_zip_with_ordered_keys() {
        let batch = batch();
        let exposures = vec![exposure(2), exposure(1)];
        let infos = vec![signature_info(true)];
        let inputs = ExportFileInputs {
            batch: &batch,
            exposures: &exposures,
            batch_num: 1,
            batch_size: 1,
            signature_infos: &infos,
        };

        let archive = assemble(inputs, &StubSigner, Utc::now()).await.unwrap();
        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), EXPORT_BIN_NAME);
        assert_eq!(zip.by_index(1).unwrap().name(), EXPORT_SIG_NAME);

        let mut bin_contents = Vec::new();
        std::io::Read::read_to_end(&mut zip.by_name(EXPORT_BIN_NAME).unwrap(), &mut bin_contents).unwrap();
        assert_eq!(&bin_contents[..16], EXPORT_HEADER);
        let export = pb::TemporaryExposureKeyExport::decode(&bin_contents[16..]).unwrap();
        assert_eq!(export.keys[0].key_data, vec![1u8; 16]);
        assert_eq!(export.keys[1].key_data, vec![2u8; 16]);
    }

    #[tokio::test]
    async fn skips_signature_infos_past_their_end_timestamp() {
        let batch = batch();
        let exposures = vec![exposure(1)];
        let infos = vec![signature_info(false)];
        let inputs = ExportFileInputs {
            batch: &batch,
            exposures: &exposures,
            batch_num: 1,
            batch_size: 1,
            signature_infos: &infos,
        };

        let archive = assemble(inputs, &StubSigner, Utc::now()).await.unwrap();
        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).unwrap();
        let mut sig_contents = Vec::new();
        std::io::Read::read_to_end(&mut zip.by_name(EXPORT_SIG_NAME).unwrap(), &mut sig_contents).unwrap();
        let list = pb::TekSignatureList::decode(&sig_contents[..]).unwrap();
        assert!(list.signatures.is_empty());
    }

    #[tokio::test]
    async fn signer_failure_fails_the_whole_assembly() {
        struct FailingSigner;
        #[async_trait]
        impl Signer for FailingSigner {
            async fn sign(&self, signing_key: &str, _digest: &[u8; 32]) -> Result<Vec<u8>, tekx_crypto::SignerError> {
                Err(tekx_crypto::SignerError::UnknownKey(signing_key.to_string()))
            }
        }

        let batch = batch();
        let exposures = vec![exposure(1)];
        let infos = vec![signature_info(true)];
        let inputs = ExportFileInputs {
            batch: &batch,
            exposures: &exposures,
            batch_num: 1,
            batch_size: 1,
            signature_infos: &infos,
        };
        let result = assemble(inputs, &FailingSigner, Utc::now()).await;
        assert!(matches!(result, Err(AssemblerError::SignerFailed { .. })));
    }
}
