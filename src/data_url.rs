use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a base64 data URL")]
    NotDataUrl,
    #[error("invalid base64 payload: {0}")]
    Payload(String),
}

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Wraps an already base64-encoded payload.
pub fn wrap_base64(mime: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime, payload)
}

/// Splits `data:<mime>;base64,<payload>` and decodes the payload.
pub fn decode(url: &str) -> Result<(String, Vec<u8>), DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUrlError::NotDataUrl)?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|err| DataUrlError::Payload(err.to_string()))?;
    Ok((mime.to_string(), bytes))
}

pub fn mime_of(url: &str) -> Option<&str> {
    url.strip_prefix("data:")?
        .split_once(',')?
        .0
        .strip_suffix(";base64")
}

/// Best-effort MIME type for an image file extension.
pub fn image_mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}

/// File extension used when exporting a payload of the given MIME type.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "image/webp" => "webp",
        "image/x-icon" => "ico",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_splits_mime_and_payload() {
        let url = encode("image/png", b"\x89PNG");
        let (mime, bytes) = decode(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"\x89PNG");
        assert_eq!(mime_of(&url), Some("image/png"));
    }

    #[test]
    fn decode_rejects_other_urls() {
        assert_eq!(decode("https://x/y.png"), Err(DataUrlError::NotDataUrl));
        assert_eq!(decode("data:text/plain,hello"), Err(DataUrlError::NotDataUrl));
        assert!(matches!(
            decode("data:image/png;base64,@@@"),
            Err(DataUrlError::Payload(_))
        ));
    }
}
