use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = PathBuf::from("../proto");

    println!("cargo:rerun-if-changed=../proto/controller/v1/");

    // Server stubs are generated as well so tests can stand up a fake controller.
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &["../proto/controller/v1/controller.proto"],
            &[&proto_root],
        )?;

    Ok(())
}
