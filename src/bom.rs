//! Byte-order-mark detection, stripping, and BOM-aware decoding to UTF-8.

use std::borrow::Cow;
use std::io::{self, BufRead};

use encoding_rs::Encoding;
use simdutf8::basic::from_utf8;

/// The UTF-8 BOM byte sequence: EF BB BF.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A byte-order-mark recognized at the start of a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomKind {
    /// EF BB BF
    Utf8,
    /// FE FF
    Utf16Be,
    /// FF FE
    Utf16Le,
}

impl BomKind {
    /// The text encoding implied by this mark.
    pub fn encoding(&self) -> &'static Encoding {
        match self {
            BomKind::Utf8 => encoding_rs::UTF_8,
            BomKind::Utf16Be => encoding_rs::UTF_16BE,
            BomKind::Utf16Le => encoding_rs::UTF_16LE,
        }
    }

    /// Length of the mark in bytes.
    pub const fn len(&self) -> usize {
        match self {
            BomKind::Utf8 => 3,
            BomKind::Utf16Be | BomKind::Utf16Le => 2,
        }
    }
}

/// Detect a byte-order-mark at the start of raw bytes.
///
/// Returns `None` for input shorter than the mark or without one.
pub fn detect(data: &[u8]) -> Option<BomKind> {
    if data.starts_with(&UTF8_BOM) {
        Some(BomKind::Utf8)
    } else if data.starts_with(&[0xFE, 0xFF]) {
        Some(BomKind::Utf16Be)
    } else if data.starts_with(&[0xFF, 0xFE]) {
        Some(BomKind::Utf16Le)
    } else {
        None
    }
}

/// Detect a byte-order-mark on a buffered byte source without consuming it.
///
/// Peeks via [`BufRead::fill_buf`], refilling until the longest mark fits in
/// the buffer or the buffer stops growing; the stream position is unchanged,
/// so the caller can hand the same reader to the line codec afterwards.
pub fn detect_stream<R: BufRead>(reader: &mut R) -> io::Result<Option<BomKind>> {
    let mut seen = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.len() >= UTF8_BOM.len() || buf.len() == seen {
            return Ok(detect(buf));
        }
        seen = buf.len();
    }
}

/// Check whether a decoded string still carries a leading BOM character.
///
/// A decoded Rust string re-encodes as UTF-8, so only the EF BB BF form can
/// appear here; UTF-16 marks are consumed during decoding.
pub fn is_bom_present(text: &str) -> bool {
    text.as_bytes().starts_with(&UTF8_BOM)
}

/// Strip one leading BOM character from a decoded string.
///
/// Returns the input unchanged if it is shorter than the mark or does not
/// start with one. Idempotent: stripping twice equals stripping once.
pub fn strip(text: &str) -> &str {
    if is_bom_present(text) {
        &text[UTF8_BOM.len()..]
    } else {
        text
    }
}

/// Decode raw bytes to UTF-8 text, honoring a leading byte-order-mark.
///
/// UTF-16 input is transcoded with the BOM removed; a UTF-8 BOM is skipped.
/// Input without a mark is validated as UTF-8 (SIMD-accelerated) and borrowed
/// when valid, otherwise decoded with replacement characters.
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    match detect(data) {
        Some(kind @ (BomKind::Utf16Be | BomKind::Utf16Le)) => {
            let (text, _) = kind.encoding().decode_with_bom_removal(data);
            text
        }
        Some(BomKind::Utf8) => decode_utf8(&data[UTF8_BOM.len()..]),
        None => decode_utf8(data),
    }
}

fn decode_utf8(data: &[u8]) -> Cow<'_, str> {
    match from_utf8(data) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _) = encoding_rs::UTF_8.decode_with_bom_removal(data);
            Cow::Owned(text.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_utf8_bom() {
        assert_eq!(detect(&[0xEF, 0xBB, 0xBF, b'a']), Some(BomKind::Utf8));
    }

    #[test]
    fn test_detect_utf16_boms() {
        assert_eq!(detect(&[0xFE, 0xFF, 0x00, b'a']), Some(BomKind::Utf16Be));
        assert_eq!(detect(&[0xFF, 0xFE, b'a', 0x00]), Some(BomKind::Utf16Le));
    }

    #[test]
    fn test_detect_none() {
        assert_eq!(detect(b"abc"), None);
        assert_eq!(detect(&[0xEF, 0xBB]), None);
        assert_eq!(detect(b""), None);
    }

    #[test]
    fn test_detect_stream_is_non_consuming() {
        let mut cursor = Cursor::new(vec![0xEF, 0xBB, 0xBF, b'a', b'b']);
        assert_eq!(detect_stream(&mut cursor).unwrap(), Some(BomKind::Utf8));

        let mut rest = Vec::new();
        std::io::Read::read_to_end(&mut cursor, &mut rest).unwrap();
        assert_eq!(rest, vec![0xEF, 0xBB, 0xBF, b'a', b'b']);
    }

    /// A reader whose buffer grows by one byte per `fill_buf` call, so a mark
    /// is never fully visible on the first fill.
    struct Trickle {
        data: Vec<u8>,
        buffered: usize,
        pos: usize,
    }

    impl Trickle {
        fn new(data: &[u8]) -> Self {
            Self {
                data: data.to_vec(),
                buffered: 0,
                pos: 0,
            }
        }
    }

    impl std::io::Read for Trickle {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let buf = self.fill_buf()?;
            let n = buf.len().min(out.len());
            out[..n].copy_from_slice(&buf[..n]);
            self.consume(n);
            Ok(n)
        }
    }

    impl BufRead for Trickle {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            if self.buffered < self.data.len() {
                self.buffered += 1;
            }
            Ok(&self.data[self.pos..self.buffered])
        }

        fn consume(&mut self, amt: usize) {
            self.pos += amt;
        }
    }

    #[test]
    fn test_detect_stream_mark_split_across_fills() {
        let mut reader = Trickle::new(&[0xEF, 0xBB, 0xBF, b'a']);
        assert_eq!(detect_stream(&mut reader).unwrap(), Some(BomKind::Utf8));

        let mut rest = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut rest).unwrap();
        assert_eq!(rest, vec![0xEF, 0xBB, 0xBF, b'a']);
    }

    #[test]
    fn test_detect_stream_short_input_terminates() {
        let mut reader = Trickle::new(&[0xFF, 0xFE]);
        assert_eq!(detect_stream(&mut reader).unwrap(), Some(BomKind::Utf16Le));

        let mut empty = Trickle::new(&[]);
        assert_eq!(detect_stream(&mut empty).unwrap(), None);
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip("\u{feff}abc"), "abc");
        assert_eq!(strip("abc"), "abc");
        assert_eq!(strip(""), "");
        assert_eq!(strip("ab"), "ab");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let once = strip("\u{feff}abc");
        assert_eq!(strip(once), once);
    }

    #[test]
    fn test_is_bom_present() {
        assert!(is_bom_present("\u{feff}x"));
        assert!(!is_bom_present("x"));
    }

    #[test]
    fn test_decode_utf16_le() {
        // "Hi" with a UTF-16 LE BOM
        let data: &[u8] = &[0xFF, 0xFE, b'H', 0x00, b'i', 0x00];
        assert_eq!(decode(data), "Hi");
    }

    #[test]
    fn test_decode_utf16_be() {
        let data: &[u8] = &[0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode(data), "Hi");
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let data: &[u8] = &[0xEF, 0xBB, 0xBF, b'a', b'b'];
        assert_eq!(decode(data), "ab");
    }

    #[test]
    fn test_decode_plain_borrows() {
        let decoded = decode(b"plain");
        assert!(matches!(decoded, Cow::Borrowed("plain")));
    }
}
