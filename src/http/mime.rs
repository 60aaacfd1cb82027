//! MIME type resolution.
//!
//! Maps file extensions to Content-Type values. Script files are special-cased
//! ahead of the table: browsers refuse to run ES modules served as
//! `text/plain` or `application/octet-stream`, which is what some default
//! tables report for `.js`.

use std::path::Path;

/// Content-Type forced for `.js` and `.mjs` files.
pub const JAVASCRIPT: &str = "application/javascript";

/// Resolve the Content-Type for a filesystem path.
///
/// `.js` and `.mjs` always resolve to [`JAVASCRIPT`], regardless of what the
/// default table would report. Everything else goes through the extension
/// table, falling back to `application/octet-stream`.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str());
    match extension {
        Some("js" | "mjs") => JAVASCRIPT,
        _ => content_type_for_extension(extension),
    }
}

/// Default extension-to-type table.
fn content_type_for_extension(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",

        // Data
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Media
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",

        // Default
        _ => "application/octet-stream",
    }
}
