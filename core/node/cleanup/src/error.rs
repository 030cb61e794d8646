#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("database error: {0}")]
    Dal(#[from] tekx_db_connection::DalError),
    #[error("object store error: {0}")]
    ObjectStore(#[from] tekx_object_store::ObjectStoreError),
}
