//! Best-effort text decodings of raw backup bytes
//!
//! Every decoder drops sequences it cannot decode instead of failing, so a
//! binary file still yields whatever labeled text it contains.

use std::fmt;

/// Text decodings tried in order by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Ascii,
    /// BOM-aware, little-endian when no BOM is present
    Utf16,
}

impl TextEncoding {
    pub const ALL: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Ascii,
        TextEncoding::Utf16,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Utf16 => "utf-16",
        }
    }

    /// Decode `raw`, silently dropping invalid sequences
    pub fn decode(&self, raw: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => decode_utf8_ignore(raw),
            TextEncoding::Latin1 => raw.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Ascii => raw
                .iter()
                .filter(|b| b.is_ascii())
                .map(|&b| char::from(b))
                .collect(),
            TextEncoding::Utf16 => decode_utf16_ignore(raw),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Best-effort UTF-8 decoding of arbitrary bytes
pub fn decode_utf8_ignore(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

fn decode_utf16_ignore(raw: &[u8]) -> String {
    let (body, big_endian) = match raw {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (raw, false),
    };

    // A trailing odd byte is a truncated code unit and is dropped
    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });

    char::decode_utf16(units).filter_map(Result::ok).collect()
}
