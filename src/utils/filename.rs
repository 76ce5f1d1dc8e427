//! Safe filename utilities

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on numbered candidates tried before giving up
const MAX_SUFFIX: u32 = 10000;

/// Keep alphanumerics plus space, hyphen, underscore and period; drop the rest
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Split a filename into stem and extension (extension keeps its leading dot)
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Candidate name for the given collision counter: `name.ext`, `name_1.ext`, ...
pub fn numbered_filename(filename: &str, counter: u32) -> String {
    if counter == 0 {
        return filename.to_string();
    }
    let (stem, ext) = split_extension(filename);
    format!("{}_{}{}", stem, counter, ext)
}

/// Atomically claim a free name in `dir` by creating an empty placeholder.
///
/// Each candidate is created with `create_new`, so two writers racing on the
/// same base name can never both claim it. The caller replaces the
/// placeholder with the real content.
pub fn reserve_unique_path(dir: &Path, filename: &str) -> io::Result<PathBuf> {
    for counter in 0..=MAX_SUFFIX {
        let candidate = dir.join(numbered_filename(filename, counter));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "Too many files with similar names",
    ))
}
