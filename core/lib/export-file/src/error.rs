/// Failures assembling an export archive. Every variant fails the whole
/// batch (§7 "never-recover rule"): partial, unsigned output must never
/// reach blob storage.
#[derive(Debug, thiserror::Error)]
pub enum AssemblerError {
    #[error("signer rejected signing key {signing_key:?}: {source}")]
    SignerFailed {
        signing_key: String,
        #[source]
        source: tekx_crypto::SignerError,
    },
    #[error("failed to build zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
}
