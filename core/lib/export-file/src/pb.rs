//! Generated from `proto/export.proto` at build time.
include!(concat!(env!("OUT_DIR"), "/tekx.export.rs"));
