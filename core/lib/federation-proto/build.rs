fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure().compile(&["proto/federation.proto"], &["proto/"])?;
    println!("cargo:rerun-if-changed=proto/federation.proto");
    Ok(())
}
