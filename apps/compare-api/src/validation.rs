//! Upload validation
//!
//! Runs before any upstream call so bad requests never cost an API round-trip.

use shared_types::DocumentRole;

/// Extensions accepted for upload (lowercase, without the dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Media types accepted for upload
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Lowercased extension of a file name, if it has one
fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// True if either the extension or the declared media type names a PDF,
/// DOC or DOCX file
pub fn is_supported_file(file_name: &str, content_type: Option<&str>) -> bool {
    let ext_ok = extension(file_name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    let mime_ok = content_type
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            ALLOWED_MIME_TYPES.contains(&essence.as_str())
        })
        .unwrap_or(false);

    ext_ok || mime_ok
}

/// Validate an uploaded file
pub fn validate_file(file_name: &str, content_type: Option<&str>, size: usize) -> Result<(), String> {
    if !is_supported_file(file_name, content_type) {
        return Err("Invalid file type. Only PDF, DOC, and DOCX files are allowed.".to_string());
    }
    if size == 0 {
        return Err("Uploaded file is empty".to_string());
    }
    Ok(())
}

/// Parse the multipart `type` field
pub fn parse_role(raw: Option<&str>) -> Result<DocumentRole, String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        "Document type is required (referenceNda or customerNda)".to_string()
    })?;
    raw.parse()
        .map_err(|_| format!("Invalid document type '{}'. Expected referenceNda or customerNda", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_by_extension() {
        assert!(is_supported_file("nda.pdf", None));
        assert!(is_supported_file("NDA.DOCX", None));
        assert!(is_supported_file("old.doc", Some("application/octet-stream")));
    }

    #[test]
    fn accepts_by_media_type() {
        assert!(is_supported_file("upload", Some("application/pdf")));
        assert!(is_supported_file(
            "blob",
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        ));
        assert!(is_supported_file("x", Some("application/pdf; charset=binary")));
    }

    #[test]
    fn rejects_other_files() {
        assert!(!is_supported_file("notes.txt", Some("text/plain")));
        assert!(!is_supported_file("pdf", None));
        assert!(!is_supported_file(".pdf", None));
        assert!(!is_supported_file("image.png", None));
    }

    #[test]
    fn empty_file_rejected() {
        assert!(validate_file("nda.pdf", None, 0).is_err());
        assert!(validate_file("nda.pdf", None, 10).is_ok());
    }

    #[test]
    fn role_parsing() {
        assert_eq!(parse_role(Some("referenceNda")).unwrap(), DocumentRole::ReferenceNda);
        assert_eq!(parse_role(Some(" customerNda ")).unwrap(), DocumentRole::CustomerNda);
        assert!(parse_role(None).is_err());
        assert!(parse_role(Some("")).is_err());
        assert!(parse_role(Some("vendorNda")).is_err());
    }
}
