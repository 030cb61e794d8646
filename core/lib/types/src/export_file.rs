use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFileStatus {
    Complete,
    Deleted,
}

/// A single file produced by the assembler and recorded once it has been
/// uploaded to blob storage. `filename` is the primary key; a conflicting
/// insert signals a known reprocess and is tolerated (§7 KeyConflict).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub filename: String,
    pub bucket_name: String,
    pub batch_id: i64,
    pub region: String,
    pub batch_num: i32,
    pub batch_size: i32,
    pub status: ExportFileStatus,
}
