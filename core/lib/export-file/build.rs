fn main() -> Result<(), Box<dyn std::error::Error>> {
    prost_build::compile_protos(&["proto/export.proto"], &["proto/"])?;
    println!("cargo:rerun-if-changed=proto/export.proto");
    Ok(())
}
