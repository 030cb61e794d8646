/// Classifies a publish failure per §7. `InvalidInput` and `Unauthorized`
/// both collapse to a 200-OK response with a server-side log (§9: standardized
/// on 200 for every client-side problem, to avoid a timing/response-code
/// side channel); only `Transient`/`Fatal` ever produce a non-200 response.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("transient failure: {0}")]
    Transient(#[from] anyhow::Error),
}

impl PublishError {
    pub fn is_client_side(&self) -> bool {
        matches!(self, PublishError::InvalidInput(_) | PublishError::Unauthorized(_))
    }
}

impl From<tekx_db_connection::DalError> for PublishError {
    fn from(err: tekx_db_connection::DalError) -> Self {
        PublishError::Transient(anyhow::anyhow!(err))
    }
}
