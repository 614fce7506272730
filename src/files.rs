//! File boundary: input validation, output naming and file conversion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult};
use crate::pipeline::Pipeline;

/// Output file name for `input`: `prefix` followed by the input's file name.
pub fn output_file_name(input: &Path, prefix: &str) -> ConvertResult<String> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy())
        .filter(|n| !n.trim().is_empty())
        .ok_or(ConvertError::EmptyFilename)?;
    Ok(format!("{prefix}{name}"))
}

/// Decode script bytes. Invalid UTF-8 is replaced rather than rejected.
pub fn decode_source(bytes: Vec<u8>, origin: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(origin, "input is not valid UTF-8, invalid bytes replaced");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Read and decode a script file.
pub fn read_source(path: &Path) -> ConvertResult<String> {
    let bytes = fs::read(path)?;
    Ok(decode_source(bytes, &path.display().to_string()))
}

/// Convert one script file and write the result.
///
/// The output lands in `out_dir` when given (created if missing), else next
/// to the input. Returns the path written.
pub fn convert_file(
    pipeline: &Pipeline,
    input: Option<&Path>,
    out_dir: Option<&Path>,
    prefix: &str,
) -> ConvertResult<PathBuf> {
    let input = input.ok_or(ConvertError::MissingInput)?;
    let name = output_file_name(input, prefix)?;

    let source = read_source(input)?;
    let converted = pipeline.convert(&source);

    let dir = match out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let output = dir.join(name);
    fs::write(&output, converted)?;

    tracing::info!(input = %input.display(), output = %output.display(), "converted file");
    Ok(output)
}
