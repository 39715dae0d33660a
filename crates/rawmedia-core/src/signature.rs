//! Best-effort file type detection from magic bytes.
//!
//! The table is priority-ordered: entries are tested top to bottom and the
//! first prefix match wins. Known shadowing: `RIFF` is labelled `wav` even for
//! AVI/WEBP containers, and the bare `ftyp` entry only matches at offset 0, so
//! ISO-BMFF files are in practice caught by the 24-byte-box `ftyp` entry.

/// Label returned when nothing in the table matches.
pub const FALLBACK_EXTENSION: &str = "bin";

/// One magic-byte prefix and the extension it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub prefix: &'static [u8],
    pub extension: &'static str,
}

const fn sig(prefix: &'static [u8], extension: &'static str) -> Signature {
    Signature { prefix, extension }
}

/// Signature table in match priority order.
pub const SIGNATURES: &[Signature] = &[
    sig(b"\xFF\xD8\xFF", "jpg"),
    sig(b"\x89PNG\r\n\x1a\n", "png"),
    sig(b"GIF87a", "gif"),
    sig(b"GIF89a", "gif"),
    sig(b"RIFF", "wav"),
    sig(b"OggS", "ogg"),
    sig(b"ID3", "mp3"),
    sig(b"\x00\x00\x00\x18ftyp", "mp4"),
    sig(b"ftyp", "mp4"),
    sig(b"PK\x03\x04", "zip"),
    sig(b"OpusHead", "opus"),
];

/// First table entry whose prefix matches `data`.
pub fn detect(data: &[u8]) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|s| data.starts_with(s.prefix))
}

/// Extension for `data`, or [`FALLBACK_EXTENSION`]. Never fails.
pub fn detect_extension(data: &[u8]) -> &'static str {
    detect(data)
        .map(|s| s.extension)
        .unwrap_or(FALLBACK_EXTENSION)
}
