//! A crate for moving text across I/O boundaries with an explicitly chosen
//! [`Codec`] per [`Channel`]: command-line arguments, file-system paths, file
//! content, subprocess streams, and the standard streams.
//!
//! The effective encodings are resolved once into [`EncodingSettings`], from
//! explicit [`Overrides`], environment variables, the locale, and a UTF-8 fallback.
//! Every conversion is strict and reports where it failed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::missing_errors_doc)]

pub mod channel;
pub mod codec;
pub mod error;
pub mod escape;
pub mod os;
pub mod resolve;
pub mod subprocess;

pub use crate::{
    channel::Channel,
    codec::Codec,
    error::{Error, Result},
    escape::EscapePolicy,
    resolve::{EncodingSettings, Overrides, Resolved, Source},
};
