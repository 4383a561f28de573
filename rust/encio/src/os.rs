//! Conversions between text and the platform's OS strings.
//!
//! On Unix, OS strings are arbitrary bytes: arguments are decoded from their raw
//! bytes and paths are built from encoded bytes. Elsewhere OS strings are already
//! Unicode, so decoding only checks validity and encoding only checks that the
//! text is representable in the channel's encoding.

use std::ffi::{OsStr, OsString};

use crate::{Codec, Result};

/// Decodes an OS string, such as a command-line argument, with `codec`.
///
/// # Errors
/// This function returns an error if `value` isn't valid in `codec`.
#[cfg(unix)]
pub fn decode_os_str(codec: Codec, value: &OsStr) -> Result<String> {
    use std::os::unix::ffi::OsStrExt;

    codec.decode(value.as_bytes())
}

/// Decodes an OS string, such as a command-line argument, with `codec`.
///
/// # Errors
/// This function returns an error if `value` isn't valid Unicode.
#[cfg(not(unix))]
pub fn decode_os_str(codec: Codec, value: &OsStr) -> Result<String> {
    value.to_str().map(str::to_owned).ok_or_else(|| {
        // offset into the lossy conversion, the closest thing to a byte offset here
        let lossy = value.to_string_lossy();
        crate::Error::Decode {
            encoding: codec.name(),
            offset: lossy.find(char::REPLACEMENT_CHARACTER).unwrap_or(0),
            len: 1,
        }
    })
}

/// Encodes `text` with `codec` into an OS string, such as a path or a subprocess
/// argument.
///
/// # Errors
/// This function returns an error if `text` can't be represented in `codec`.
#[cfg(unix)]
pub fn encode_os_string(codec: Codec, text: &str) -> Result<OsString> {
    use std::os::unix::ffi::OsStringExt;

    Ok(OsString::from_vec(codec.encode(text)?))
}

/// Encodes `text` with `codec` into an OS string, such as a path or a subprocess
/// argument.
///
/// # Errors
/// This function returns an error if `text` can't be represented in `codec`.
#[cfg(not(unix))]
pub fn encode_os_string(codec: Codec, text: &str) -> Result<OsString> {
    codec.encode(text)?;
    Ok(OsString::from(text))
}
