//! The put/get/delete blob abstraction behind C1 (§9: "global singletons
//! become injected contracts"). A thin domain seam over the `object_store`
//! crate so the export-file assembler and index writer never see the
//! concrete backend (GCS/S3/local disk/in-memory test double).

mod store;

pub use store::{BlobKey, BucketStore, ObjectStoreError};
