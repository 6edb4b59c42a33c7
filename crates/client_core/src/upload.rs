use reqwest::multipart::{Form, Part};

use crate::error::UploadError;

/// Extensions the remote service can ingest. Checked locally before any
/// network call.
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".pdf", ".txt", ".md", ".markdown"];

/// Rejects files whose extension is not on the allow-list. Only the
/// final dot-suffix counts, case-insensitively.
pub fn validate_extension(filename: &str) -> Result<(), UploadError> {
    let extension = filename
        .rfind('.')
        .map(|index| filename[index..].to_ascii_lowercase())
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(UploadError::UnsupportedType { extension })
    }
}

pub(crate) fn multipart_form(filename: &str, bytes: Vec<u8>) -> Form {
    Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()))
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
