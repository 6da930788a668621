/// Sniff an image MIME type from its leading bytes.
///
/// Generated images are always stored with a `.png` name; this is only used
/// to flag providers that answer with another encoding.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

pub fn is_png(bytes: &[u8]) -> bool {
    detect_image_mime(bytes) == "image/png"
}
