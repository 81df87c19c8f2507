//! Filename extension → MIME type.
//!
//! Audio and video types are "streamable": responses advertise
//! `Accept-Ranges`/`Cache-Control` instead of an attachment disposition.

const OCTET_STREAM: &str = "application/octet-stream";

/// Resolved MIME type for a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType {
    pub mime: &'static str,
    pub streamable: bool,
}

/// Resolve a filename's MIME type. Extension matching is case-sensitive.
pub fn resolve_content_type(filename: &str) -> ContentType {
    let mime = filename
        .rsplit_once('.')
        .map(|(_, ext)| mime_for_extension(ext))
        .unwrap_or(OCTET_STREAM);

    ContentType {
        mime,
        streamable: mime.starts_with("video/") || mime.starts_with("audio/"),
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "oga" => "audio/ogg",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_is_streamable() {
        let ct = resolve_content_type("movie.mp4");
        assert_eq!(ct.mime, "video/mp4");
        assert!(ct.streamable);
    }

    #[test]
    fn audio_is_streamable() {
        let ct = resolve_content_type("track.oga");
        assert_eq!(ct.mime, "audio/ogg");
        assert!(ct.streamable);
    }

    #[test]
    fn pdf_is_attachment() {
        let ct = resolve_content_type("doc.pdf");
        assert_eq!(ct.mime, "application/pdf");
        assert!(!ct.streamable);
    }

    #[test]
    fn unknown_extension_falls_back() {
        let ct = resolve_content_type("file.xyz");
        assert_eq!(ct.mime, "application/octet-stream");
        assert!(!ct.streamable);
    }

    #[test]
    fn no_extension_falls_back() {
        assert_eq!(resolve_content_type("README").mime, OCTET_STREAM);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert_eq!(resolve_content_type("PHOTO.JPG").mime, OCTET_STREAM);
        assert_eq!(resolve_content_type("photo.jpeg").mime, "image/jpeg");
    }

    #[test]
    fn only_last_extension_counts() {
        let ct = resolve_content_type("archive.mp4.pdf");
        assert_eq!(ct.mime, "application/pdf");
        assert!(!ct.streamable);
    }
}
