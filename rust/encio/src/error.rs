//! Types for errors that can occur while converting text at an I/O boundary.
use thiserror::Error;

use crate::{resolve::Source, Channel};

/// An error that can occur while decoding, encoding, or moving text across a boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error while reading or writing a byte stream.
    #[error("IO error: {source} while {context}")]
    Io {
        /// The original error.
        #[source]
        source: std::io::Error,
        /// The context in which the error occurred.
        context: String,
    },
    /// Malformed input for the encoding in effect.
    #[error("malformed {encoding} sequence of {len} byte(s) at offset {offset}")]
    Decode {
        /// The name of the encoding used for decoding.
        encoding: &'static str,
        /// The byte offset of the malformed sequence.
        offset: usize,
        /// The length of the malformed sequence in bytes.
        len: usize,
    },
    /// A character that can't be represented in the encoding in effect.
    #[error("character {ch:?} at offset {offset} can't be encoded as {encoding}")]
    Encode {
        /// The name of the encoding used for encoding.
        encoding: &'static str,
        /// The unmappable character.
        ch: char,
        /// The byte offset of the character in the source text.
        offset: usize,
    },
    /// A label that doesn't name a supported encoding.
    #[error("unknown encoding '{label}'")]
    UnknownEncoding {
        /// The label as given.
        label: String,
    },
    /// The label configured for a channel doesn't name a supported encoding.
    #[error("unknown {channel} encoding '{label}' from {origin}")]
    ChannelEncoding {
        /// The channel being resolved.
        channel: Channel,
        /// Where the label came from.
        origin: Source,
        /// The label as given.
        label: String,
    },
    /// An invalid argument was passed to a function.
    #[error("bad argument {param_name}: {desc}")]
    BadArgument {
        /// The name of the parameter to which the bad argument was passed.
        param_name: String,
        /// The description of why the argument was invalid.
        desc: String,
    },
}

/// An alias for a `Result` with [`encio::Error`](crate::Error) as the error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new I/O [`encio::Error`](crate::Error).
    pub fn io(error: std::io::Error, context: impl ToString) -> Self {
        Self::Io {
            source: error,
            context: context.to_string(),
        }
    }

    /// Creates a new unknown encoding [`encio::Error`](crate::Error).
    pub fn unknown_encoding(label: impl ToString) -> Self {
        Self::UnknownEncoding {
            label: label.to_string(),
        }
    }

    /// Creates a new bad argument [`encio::Error`](crate::Error).
    pub fn bad_arg(param_name: impl ToString, desc: impl ToString) -> Self {
        Self::BadArgument {
            param_name: param_name.to_string(),
            desc: desc.to_string(),
        }
    }

    /// Returns `true` if the error is a decoding or encoding failure rather than an
    /// I/O or usage failure.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Encode { .. })
    }
}
