#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("database error: {0}")]
    Dal(#[from] tekx_db_connection::DalError),
    #[error("assembler failed: {0}")]
    Assembler(#[from] tekx_export_file::AssemblerError),
    #[error("object store error: {0}")]
    ObjectStore(#[from] tekx_object_store::ObjectStoreError),
    #[error("index-update lock contended for batch {batch_id}")]
    IndexLockContended { batch_id: i64 },
}
