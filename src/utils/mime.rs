//! MIME type and file extension helpers.

/// Extension implied by a `Content-Type` header value.
///
/// Takes the subtype of the media type, ignoring parameters. Structured
/// syntax suffixes are dropped (`image/svg+xml` gives `svg`) and the common
/// icon and progressive JPEG aliases are normalized.
pub fn content_type_extension(content_type: &str) -> String {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let subtype = media_type.rsplit('/').next().unwrap_or_default();
    let subtype = subtype.split('+').next().unwrap_or_default();

    match subtype {
        "x-icon" | "vnd.microsoft.icon" => "ico".to_string(),
        "pjpeg" => "jpeg".to_string(),
        "x-ms-bmp" => "bmp".to_string(),
        other => other.to_string(),
    }
}

/// Recognizable extension of a file name, lowercased.
///
/// Only short alphanumeric suffixes count; `archive.tar.gz` gives `gz`,
/// `.hidden` and `README` give nothing.
pub fn path_extension(file_name: &str) -> Option<String> {
    let dot_pos = file_name.rfind('.')?;
    let (basename, ext) = (&file_name[..dot_pos], &file_name[dot_pos + 1..]);

    if basename.is_empty()
        || ext.is_empty()
        || ext.len() > 5
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_extension() {
        assert_eq!(content_type_extension("image/jpeg"), "jpeg");
        assert_eq!(content_type_extension("image/PNG; charset=binary"), "png");
        assert_eq!(content_type_extension("image/svg+xml"), "svg");
        assert_eq!(content_type_extension("image/x-icon"), "ico");
        assert_eq!(content_type_extension("text/html; charset=utf-8"), "html");
        assert_eq!(content_type_extension(""), "");
    }

    #[test]
    fn test_path_extension() {
        assert_eq!(path_extension("cat.JPG"), Some("jpg".to_string()));
        assert_eq!(path_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(path_extension("README"), None);
        assert_eq!(path_extension(".hidden"), None);
        assert_eq!(path_extension("photo.jpg-large"), None);
    }
}
