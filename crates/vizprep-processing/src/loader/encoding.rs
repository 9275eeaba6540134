//! Text encoding detection for delimited files.

use encoding_rs::{
    BIG5, EUC_KR, Encoding, GBK, ISO_8859_2, SHIFT_JIS, UTF_8, WINDOWS_1251, WINDOWS_1252,
};
use tracing::debug;

/// Number of leading bytes inspected when guessing an encoding.
pub const SAMPLE_SIZE: usize = 64 * 1024;

/// Single-byte encodings come first so they win ties against CJK encodings.
const CANDIDATES: [&Encoding; 7] = [
    WINDOWS_1252,
    ISO_8859_2,
    WINDOWS_1251,
    SHIFT_JIS,
    GBK,
    EUC_KR,
    BIG5,
];

/// Result of an encoding guess.
#[derive(Debug, Clone, Copy)]
pub struct DetectedEncoding {
    pub encoding: &'static Encoding,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub has_bom: bool,
}

/// Guess the encoding of `bytes` from a leading sample.
///
/// A byte order mark is trusted outright. Valid UTF-8 is preferred over any
/// legacy encoding; otherwise each candidate is scored by how cleanly and
/// how printably it decodes the sample.
pub fn detect_encoding(bytes: &[u8]) -> DetectedEncoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return DetectedEncoding {
            encoding,
            confidence: 1.0,
            has_bom: true,
        };
    }

    let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];

    if is_utf8_prefix(sample, sample.len() < bytes.len()) {
        let confidence = if sample.is_ascii() { 1.0 } else { 0.99 };
        return DetectedEncoding {
            encoding: UTF_8,
            confidence,
            has_bom: false,
        };
    }

    let mut best = DetectedEncoding {
        encoding: WINDOWS_1252,
        confidence: 0.0,
        has_bom: false,
    };
    for encoding in CANDIDATES {
        let score = decode_score(sample, encoding);
        debug!("Encoding candidate {}: score {:.3}", encoding.name(), score);
        if score > best.confidence {
            best = DetectedEncoding {
                encoding,
                confidence: score,
                has_bom: false,
            };
        }
    }

    // Legacy encodings are never certain.
    best.confidence *= 0.9;
    best
}

/// Decode `bytes` with `encoding`, dropping any BOM.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Replaced malformed sequences while decoding as {}", actual.name());
    }
    text.into_owned()
}

/// `true` when `sample` is UTF-8, allowing a code point cut at the end of a
/// truncated sample.
fn is_utf8_prefix(sample: &[u8], truncated: bool) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}

/// Printable share of the decoded text, penalized by replacement characters.
fn decode_score(sample: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, had_errors) = encoding.decode_without_bom_handling(sample);
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let replaced = text.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();
    let printable = text
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER && (!c.is_control() || matches!(c, '\t' | '\n' | '\r')))
        .count();

    let mut score = printable as f32 / total as f32 - replaced as f32 / total as f32;
    if had_errors {
        score *= 0.5;
    }
    score.clamp(0.0, 1.0)
}
