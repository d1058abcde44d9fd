// crates/gifconv-core/src/paths.rs
//
// Input validation and destination resolution. Runs synchronously inside
// JobController::try_start, before the job slot is taken.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// Container extensions accepted as input (compared case-insensitively).
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

pub const OUTPUT_EXTENSION: &str = "gif";

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| wanted.iter().any(|w| e.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

/// The input must be an existing file with a supported video extension.
pub fn validate_input(path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::InputMissing);
    }
    if !path.is_file() {
        return Err(ValidationError::InputNotFound(path.to_path_buf()));
    }
    if !has_extension(path, SUPPORTED_INPUT_EXTENSIONS) {
        return Err(ValidationError::UnsupportedInput(path.to_path_buf()));
    }
    Ok(())
}

/// Resolve the file the GIF will be written to.
///
/// | `output`            | result                          |
/// |---------------------|---------------------------------|
/// | empty               | `input` with `.gif` extension   |
/// | no extension        | `output/<input stem>.gif`       |
/// | `.gif` extension    | `output` as given               |
/// | any other extension | `OutputExtension` error         |
///
/// The directory the file lands in must exist and not be read-only.
pub fn resolve_output(input: &Path, output: &Path) -> Result<PathBuf, ValidationError> {
    let resolved = if output.as_os_str().is_empty() {
        input.with_extension(OUTPUT_EXTENSION)
    } else if output.extension().is_none() {
        if !output.is_dir() {
            return Err(ValidationError::OutputDirectoryMissing(output.to_path_buf()));
        }
        let stem = input.file_stem().ok_or(ValidationError::InputMissing)?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(OUTPUT_EXTENSION);
        output.join(name)
    } else if has_extension(output, &[OUTPUT_EXTENSION]) {
        output.to_path_buf()
    } else {
        return Err(ValidationError::OutputExtension(output.to_path_buf()));
    };

    let parent = match resolved.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let writable = std::fs::metadata(&parent)
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false);
    if !writable {
        return Err(ValidationError::OutputNotWritable(resolved));
    }
    Ok(resolved)
}
