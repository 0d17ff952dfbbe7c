//! Local input checks for post writes. Nothing here touches the network;
//! a failure is always `AppError::Validation`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::common::utils::slug_text;
use crate::common::{AppError, AppResult, ProfileId};
use crate::domains::tag::actions::parse_tag_names;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 100_000;
pub const MAX_EXCERPT_CHARS: usize = 500;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_CHARS: usize = 50;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Featured image as submitted (base64 payload, optionally a data URL)
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data_base64: String,
}

/// Decoded image ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: String,
}

impl DecodedImage {
    /// Object path `{author_id}/{uuid}.{ext}`; fresh per upload so nothing is overwritten
    pub fn object_path(&self, author_id: ProfileId) -> String {
        format!("{}/{}.{}", author_id, uuid::Uuid::new_v4(), self.extension)
    }
}

/// Trimmed, length-checked title together with its slug
pub fn validate_title(title: &str) -> AppResult<(String, String)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }

    let slug = slug_text(title);
    if slug.is_empty() {
        return Err(AppError::validation(
            "title must contain at least one letter or digit",
        ));
    }

    Ok((title.to_string(), slug))
}

pub fn validate_content(content: &str) -> AppResult<String> {
    if content.trim().is_empty() {
        return Err(AppError::validation("content is required"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::validation(format!(
            "content must be at most {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(content.to_string())
}

/// Blank excerpts become `None`
pub fn validate_excerpt(excerpt: Option<&str>) -> AppResult<Option<String>> {
    let Some(excerpt) = excerpt.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    if excerpt.chars().count() > MAX_EXCERPT_CHARS {
        return Err(AppError::validation(format!(
            "excerpt must be at most {} characters",
            MAX_EXCERPT_CHARS
        )));
    }
    Ok(Some(excerpt.to_string()))
}

/// Parse comma-separated tags and enforce count and length limits
pub fn validate_tags(raw: Option<&str>) -> AppResult<Vec<String>> {
    let names = raw.map(parse_tag_names).unwrap_or_default();

    if names.len() > MAX_TAGS {
        return Err(AppError::validation(format!(
            "at most {} tags are allowed",
            MAX_TAGS
        )));
    }
    if let Some(long) = names.iter().find(|n| n.chars().count() > MAX_TAG_CHARS) {
        return Err(AppError::validation(format!(
            "tag '{}' is longer than {} characters",
            long, MAX_TAG_CHARS
        )));
    }

    Ok(names)
}

pub fn validate_image(image: &ImageUpload) -> AppResult<DecodedImage> {
    let content_type = image.content_type.trim().to_ascii_lowercase();
    if !content_type.starts_with("image/") || content_type.len() == "image/".len() {
        return Err(AppError::validation(format!(
            "unsupported image type '{}'",
            image.content_type
        )));
    }

    // Accept a bare payload or a data URL
    let payload = match image.data_base64.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image.data_base64.as_str(),
    };
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    // Cheap upper bound before decoding: 4 base64 chars per 3 bytes
    if payload.len() / 4 * 3 > MAX_IMAGE_BYTES + 3 {
        return Err(too_large());
    }

    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| AppError::validation(format!("image is not valid base64: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::validation("image is empty"));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(too_large());
    }

    Ok(DecodedImage {
        bytes,
        extension: image_extension(image.file_name.as_deref(), &content_type),
        content_type,
    })
}

fn too_large() -> AppError {
    AppError::validation(format!(
        "image must be at most {} MiB",
        MAX_IMAGE_BYTES / (1024 * 1024)
    ))
}

/// Extension from the file name when it has a sane one, else from the content type
fn image_extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext;
    }

    let subtype = content_type.split_once('/').map(|(_, s)| s).unwrap_or_default();
    match mime_guess::get_mime_extensions_str(content_type) {
        Some(known) if known.contains(&subtype) => subtype.to_string(),
        Some(known) if !known.is_empty() => known[0].to_string(),
        _ => "bin".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(data_base64: &str) -> ImageUpload {
        ImageUpload {
            file_name: Some("cover.PNG".into()),
            content_type: "image/png".into(),
            data_base64: data_base64.into(),
        }
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(
            validate_title("  Belfast Storm Warning ").unwrap(),
            (
                "Belfast Storm Warning".to_string(),
                "belfast-storm-warning".to_string()
            )
        );
        assert!(validate_title("   ").is_err());
        assert!(validate_title("!!!").is_err());
        assert!(validate_title(&"a".repeat(MAX_TITLE_CHARS + 1)).is_err());
        assert!(validate_title(&"a".repeat(MAX_TITLE_CHARS)).is_ok());
    }

    #[test]
    fn test_content_and_excerpt_rules() {
        assert!(validate_content(" \n ").is_err());
        assert!(validate_content(&"b".repeat(MAX_CONTENT_CHARS + 1)).is_err());
        assert_eq!(validate_excerpt(Some("  ")).unwrap(), None);
        assert_eq!(validate_excerpt(None).unwrap(), None);
        assert!(validate_excerpt(Some(&"c".repeat(MAX_EXCERPT_CHARS + 1))).is_err());
    }

    #[test]
    fn test_tag_limits() {
        let eleven = (0..11).map(|i| format!("t{}", i)).collect::<Vec<_>>().join(",");
        assert!(validate_tags(Some(&eleven)).is_err());

        // Duplicates collapse before counting
        let repeated = vec!["Same"; 20].join(",");
        assert_eq!(validate_tags(Some(&repeated)).unwrap(), vec!["Same".to_string()]);

        assert!(validate_tags(Some(&"x".repeat(MAX_TAG_CHARS + 1))).is_err());
        assert!(validate_tags(None).unwrap().is_empty());
    }

    #[test]
    fn test_image_decodes_plain_and_data_url_payloads() {
        let plain = validate_image(&png("aGVsbG8=")).unwrap();
        assert_eq!(plain.bytes, b"hello");
        assert_eq!(plain.extension, "png");

        let data_url = validate_image(&png("data:image/png;base64,aGVsbG8=")).unwrap();
        assert_eq!(data_url.bytes, b"hello");
    }

    #[test]
    fn test_image_rejects_bad_input() {
        let mut upload = png("aGVsbG8=");
        upload.content_type = "application/pdf".into();
        assert!(validate_image(&upload).is_err());

        assert!(validate_image(&png("not base64 at all!")).is_err());
        assert!(validate_image(&png("")).is_err());

        let oversized = STANDARD.encode(vec![0u8; MAX_IMAGE_BYTES + 1]);
        assert!(validate_image(&png(&oversized)).is_err());
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        assert_eq!(image_extension(None, "image/png"), "png");
        assert_eq!(image_extension(Some("photo"), "image/jpeg"), "jpeg");
        assert_eq!(image_extension(Some("a.webp"), "image/webp"), "webp");
        assert_eq!(image_extension(None, "image/x-unknown-thing"), "bin");
    }

    #[test]
    fn test_object_path_is_namespaced_by_author() {
        let author = ProfileId::new();
        let image = validate_image(&png("aGVsbG8=")).unwrap();
        let path = image.object_path(author);
        assert!(path.starts_with(&format!("{}/", author)));
        assert!(path.ends_with(".png"));
        assert_ne!(path, image.object_path(author));
    }
}
