#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("token rejected: {0}")]
    Oidc(#[from] crate::oidc::OidcError),
    #[error("no federation-out authorization for this caller")]
    NotAuthorized,
    #[error("token audience does not match authorization")]
    AudienceMismatch,
    #[error("database error: {0}")]
    Dal(#[from] tekx_db_connection::DalError),
}

impl From<FetchError> for tonic::Status {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::MissingToken | FetchError::Oidc(_) | FetchError::NotAuthorized | FetchError::AudienceMismatch => {
                tonic::Status::unauthenticated(err.to_string())
            }
            FetchError::Dal(err) => tonic::Status::internal(err.to_string()),
        }
    }
}
