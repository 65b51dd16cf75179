// Messages and ImageClassifier stubs are generated from proto/image_classifier.proto.
// protox compiles the file in-process, so no protoc is needed. The encoded
// descriptor set is kept for schema::init.

use std::env;
use std::path::PathBuf;

use prost::Message;

const PROTO: &str = "proto/image_classifier.proto";

// Response messages are also rendered as JSON in reports and logs.
const JSON_MESSAGES: [&str; 3] = [
    ".imageclassifier.ImageResponse",
    ".imageclassifier.ImageResult",
    ".imageclassifier.ImagesResponse",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", PROTO);

    let descriptors = protox::compile([PROTO], ["proto"])?;
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    std::fs::write(
        out_dir.join("imageclassifier_descriptor.bin"),
        descriptors.encode_to_vec(),
    )?;

    let mut builder = tonic_build::configure();
    for message in JSON_MESSAGES {
        builder = builder
            .type_attribute(message, "#[derive(serde::Serialize, serde::Deserialize)]")
            .type_attribute(message, "#[serde(rename_all = \"camelCase\")]");
    }
    builder.compile_fds(descriptors)?;

    Ok(())
}
