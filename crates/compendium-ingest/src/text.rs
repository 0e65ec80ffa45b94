// SPDX-License-Identifier: Apache-2.0

use compendium_model::TextEncoding;

use crate::IngestError;

/// Windows-1252 code points for bytes 0x80..=0x9F. `None` marks the five unassigned bytes.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Tries UTF-8 first, then each fallback in order. Returns the text and the encoding that worked.
pub fn decode_text(
    bytes: &[u8],
    fallbacks: &[TextEncoding],
) -> Result<(String, TextEncoding), IngestError> {
    let ladder = std::iter::once(TextEncoding::Utf8).chain(
        fallbacks
            .iter()
            .copied()
            .filter(|e| *e != TextEncoding::Utf8),
    );
    let mut failures = Vec::new();
    for encoding in ladder {
        match decode_with(bytes, encoding) {
            Ok(text) => return Ok((text, encoding)),
            Err(reason) => failures.push(format!("{}: {reason}", encoding.as_str())),
        }
    }
    Err(IngestError(format!(
        "no configured encoding could decode input ({})",
        failures.join("; ")
    )))
}

fn decode_with(bytes: &[u8], encoding: TextEncoding) -> Result<String, String> {
    match encoding {
        TextEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(ToString::to_string)
            .map_err(|e| e.to_string()),
        TextEncoding::Windows1252 => {
            let mut out = String::with_capacity(bytes.len());
            for (offset, &b) in bytes.iter().enumerate() {
                match b {
                    0x80..=0x9F => match WINDOWS_1252_HIGH[(b - 0x80) as usize] {
                        Some(c) => out.push(c),
                        None => {
                            return Err(format!("byte 0x{b:02x} at offset {offset} is unassigned"))
                        }
                    },
                    _ => out.push(char::from(b)),
                }
            }
            Ok(out)
        }
        TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}
