#[derive(Debug, thiserror::Error)]
pub enum FederationInError {
    #[error("database error: {0}")]
    Dal(#[from] tekx_db_connection::DalError),
    #[error("failed to obtain bearer token: {0}")]
    Token(#[from] crate::token_provider::TokenError),
    #[error("failed to connect to peer {server_addr}: {source}")]
    Connect {
        server_addr: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("peer Fetch RPC failed: {0}")]
    Rpc(#[from] tonic::Status),
}
