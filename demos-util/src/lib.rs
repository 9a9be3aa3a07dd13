use std::{fs::File, path::Path};

/// Reads the whole input and opens (truncating) the output file
pub fn setup_io(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<(String, File), std::io::Error> {
    // generated text has to be complete before it is parsed
    let input = std::fs::read_to_string(input_path.as_ref())?;

    let output = std::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(output_path.as_ref())?;
    Ok((input, output))
}

/// Directory of a demo, resolved relative to the workspace root
pub fn demo_dir(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("demos")
        .join(name)
}
