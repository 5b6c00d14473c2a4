//! Static MIME-type → file-extension table and the media predicate.

/// Return `true` if a content type counts as extractable media.
///
/// This is a deliberate substring test, not structured MIME parsing:
/// `"video/mp4"` matches, and so would `"imagefoo/x"`. Anything the
/// table below does not know still gets written (with a `.bin`
/// extension) as long as it passes this check.
pub fn is_media_type(content_type: &str) -> bool {
    content_type.contains("image") || content_type.contains("video")
}

/// Resolve a content type to a leading-dot file extension.
///
/// Exact string lookup; unrecognized types fall back to `.bin`.
/// Covers the formats MMS messages carry in practice, including the
/// legacy WAP bitmap type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => ".jpg",
        "image/jpg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/webp" => ".webp",
        "image/vnd.wap.wbmp" => ".wbmp",
        "video/mp4" => ".mp4",
        "video/3gpp" => ".3gp",
        "video/3gpp2" => ".3g2",
        "video/mpeg" => ".mpg",
        "video/quicktime" => ".mov",
        "video/webm" => ".webm",
        "video/x-msvideo" => ".avi",
        _ => ".bin",
    }
}
