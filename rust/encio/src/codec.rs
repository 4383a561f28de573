//! Strict conversion between text and bytes for a single encoding.

use std::fmt::{self, Display, Formatter};

use encoding_rs::{DecoderResult, Encoding, EncoderResult};

use crate::{Error, Result};

/// Code page and locale codeset names that aren't WHATWG labels.
const ALIASES: &[(&str, &str)] = &[
    ("cp932", "shift_jis"),
    ("ms932", "shift_jis"),
    ("mskanji", "shift_jis"),
    ("cp936", "gbk"),
    ("ms936", "gbk"),
    ("cp949", "euc-kr"),
    ("ms949", "euc-kr"),
    ("uhc", "euc-kr"),
    ("cp950", "big5"),
    ("ms950", "big5"),
    // glibc locale codesets
    ("eucjp", "euc-jp"),
    ("ujis", "euc-jp"),
    ("euckr", "euc-kr"),
    ("euccn", "gb2312"),
];

/// Labels of 7-bit US-ASCII. WHATWG maps these to windows-1252.
const ASCII_LABELS: &[&str] = &[
    "ascii",
    "us-ascii",
    "ansi-x3.4-1968",
    "csascii",
    "iso646-us",
    "646",
];

/// Labels of ISO-8859-1 proper. WHATWG maps these to windows-1252.
const LATIN_1_LABELS: &[&str] = &[
    "latin1",
    "latin-1",
    "l1",
    "iso-8859-1",
    "iso8859-1",
    "iso88591",
    "iso-8859-1:1987",
    "iso-ir-100",
    "cp819",
    "ibm819",
    "csisolatin1",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Repr {
    Whatwg(&'static Encoding),
    /// Bytes 0x00 to 0x7F only.
    Ascii,
    /// Every byte maps to the code point of the same value.
    Latin1,
}

/// A character encoding used at one I/O boundary.
///
/// Wraps an [`encoding_rs::Encoding`] with strict decode and encode operations:
/// malformed input and unmappable characters are errors instead of being replaced.
/// US-ASCII and ISO-8859-1 are implemented directly, since the WHATWG Encoding
/// Standard treats both as aliases of windows-1252.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Codec(Repr);

impl Codec {
    /// Returns the UTF-8 codec, the fallback for every channel.
    pub fn utf_8() -> Self {
        Self(Repr::Whatwg(encoding_rs::UTF_8))
    }

    /// Looks up a codec by label.
    ///
    /// Accepts the labels of the WHATWG Encoding Standard, case-insensitively and
    /// ignoring surrounding whitespace, as well as underscore spellings such as
    /// `euc_jp` and common code page names such as `cp932`. ASCII and Latin-1
    /// labels select the strict 7-bit and 8-bit codecs rather than windows-1252.
    ///
    /// # Errors
    /// This function returns an error if `label` doesn't name a supported encoding.
    pub fn for_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        if ASCII_LABELS.contains(&normalized.as_str()) {
            return Ok(Self(Repr::Ascii));
        }
        if LATIN_1_LABELS.contains(&normalized.as_str()) {
            return Ok(Self(Repr::Latin1));
        }
        if let Some(encoding) = Encoding::for_label_no_replacement(trimmed.as_bytes())
            .or_else(|| Encoding::for_label_no_replacement(normalized.as_bytes()))
        {
            return Ok(Self(Repr::Whatwg(encoding)));
        }
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .and_then(|(_, canonical)| Encoding::for_label_no_replacement(canonical.as_bytes()))
            .map(|encoding| Self(Repr::Whatwg(encoding)))
            .ok_or_else(|| Error::unknown_encoding(trimmed))
    }

    /// Returns the canonical name of the encoding, e.g. `Shift_JIS`.
    pub fn name(&self) -> &'static str {
        match self.0 {
            Repr::Whatwg(encoding) => encoding.name(),
            Repr::Ascii => "US-ASCII",
            Repr::Latin1 => "ISO-8859-1",
        }
    }

    /// Decodes `bytes` into text. A byte order mark is treated as data.
    ///
    /// # Errors
    /// This function returns an error if `bytes` contains a malformed sequence.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self.0 {
            Repr::Whatwg(encoding) => self.decode_whatwg(encoding, bytes),
            Repr::Ascii | Repr::Latin1 => bytes
                .iter()
                .enumerate()
                .map(|(offset, &byte)| {
                    self.maps_byte(byte)
                        .then_some(char::from(byte))
                        .ok_or_else(|| Error::Decode {
                            encoding: self.name(),
                            offset,
                            len: 1,
                        })
                })
                .collect(),
        }
    }

    fn decode_whatwg(&self, encoding: &'static Encoding, bytes: &[u8]) -> Result<String> {
        let mut decoder = encoding.new_decoder_without_bom_handling();
        let mut text = String::with_capacity(
            decoder
                .max_utf8_buffer_length_without_replacement(bytes.len())
                .unwrap_or(bytes.len()),
        );
        let mut total_read = 0;
        loop {
            let (result, read) =
                decoder.decode_to_string_without_replacement(&bytes[total_read..], &mut text, true);
            total_read += read;
            match result {
                DecoderResult::InputEmpty => return Ok(text),
                DecoderResult::OutputFull => text.reserve(
                    decoder
                        .max_utf8_buffer_length_without_replacement(bytes.len() - total_read)
                        .unwrap_or(16)
                        .max(16),
                ),
                DecoderResult::Malformed(len, consumed_after) => {
                    return Err(Error::Decode {
                        encoding: self.name(),
                        offset: total_read - usize::from(consumed_after) - usize::from(len),
                        len: usize::from(len),
                    })
                }
            }
        }
    }

    /// Encodes `text` into bytes.
    ///
    /// # Errors
    /// This function returns an error if `text` contains a character that can't be
    /// represented in the encoding.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self.0 {
            Repr::Whatwg(encoding) => match encode_utf_16(encoding, text) {
                Some(bytes) => Ok(bytes),
                None => self.encode_whatwg(encoding, text),
            },
            Repr::Ascii | Repr::Latin1 => text
                .char_indices()
                .map(|(offset, ch)| {
                    self.byte_for(ch).ok_or_else(|| Error::Encode {
                        encoding: self.name(),
                        ch,
                        offset,
                    })
                })
                .collect(),
        }
    }

    fn encode_whatwg(&self, encoding: &'static Encoding, text: &str) -> Result<Vec<u8>> {
        let mut encoder = encoding.new_encoder();
        let mut bytes = Vec::with_capacity(
            encoder
                .max_buffer_length_from_utf8_without_replacement(text.len())
                .unwrap_or(text.len()),
        );
        let mut total_read = 0;
        loop {
            let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(
                &text[total_read..],
                &mut bytes,
                true,
            );
            total_read += read;
            match result {
                EncoderResult::InputEmpty => return Ok(bytes),
                EncoderResult::OutputFull => bytes.reserve(
                    encoder
                        .max_buffer_length_from_utf8_without_replacement(text.len() - total_read)
                        .unwrap_or(16)
                        .max(16),
                ),
                EncoderResult::Unmappable(ch) => {
                    return Err(Error::Encode {
                        encoding: self.name(),
                        ch,
                        offset: total_read - ch.len_utf8(),
                    })
                }
            }
        }
    }

    /// Encodes `text`, replacing unmappable characters with HTML numeric character
    /// references. Used for diagnostics, which must never fail on their own.
    pub fn encode_lossy(&self, text: &str) -> Vec<u8> {
        match self.0 {
            Repr::Whatwg(encoding) => encode_utf_16(encoding, text)
                .unwrap_or_else(|| encoding.encode(text).0.into_owned()),
            Repr::Ascii | Repr::Latin1 => {
                let mut bytes = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    match self.byte_for(ch) {
                        Some(byte) => bytes.push(byte),
                        None => {
                            bytes.extend_from_slice(format!("&#{};", u32::from(ch)).as_bytes())
                        }
                    }
                }
                bytes
            }
        }
    }

    fn maps_byte(&self, byte: u8) -> bool {
        match self.0 {
            Repr::Ascii => byte.is_ascii(),
            Repr::Latin1 => true,
            Repr::Whatwg(_) => false,
        }
    }

    fn byte_for(&self, ch: char) -> Option<u8> {
        u8::try_from(ch).ok().filter(|&byte| self.maps_byte(byte))
    }
}

// encoding_rs only encodes to UTF-16 via its UTF-8 output encoding
fn encode_utf_16(encoding: &'static Encoding, text: &str) -> Option<Vec<u8>> {
    if encoding == encoding_rs::UTF_16LE {
        Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
    } else if encoding == encoding_rs::UTF_16BE {
        Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect())
    } else {
        None
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::utf_8()
    }
}

impl Display for Codec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
