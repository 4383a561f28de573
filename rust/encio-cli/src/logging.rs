//! Logging through `env_logger`, with each record encoded like the rest of standard
//! error.

use std::{io::Write, sync::OnceLock};

use encio::Codec;
use log::Record;

/// The environment variable that overrides the default filter, e.g. `ENCIO_LOG=debug`.
pub const LOG_ENV: &str = "ENCIO_LOG";

static STDERR_CODEC: OnceLock<Codec> = OnceLock::new();

/// Installs the logger. The default filter is `warn`, or `debug` when `debug` is set.
pub fn init(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, default_filter))
        .format(|buf, record| {
            let codec = STDERR_CODEC.get().copied().unwrap_or_default();
            buf.write_all(&render_record(codec, record))
        })
        .init();
}

/// Sets the encoding of all later records. Records logged before the stderr encoding
/// is resolved are UTF-8.
pub fn set_stderr_codec(codec: Codec) {
    let _ = STDERR_CODEC.set(codec);
}

fn render_record(codec: Codec, record: &Record) -> Vec<u8> {
    codec.encode_lossy(&format!(
        "[{} {}] {}\n",
        record.level(),
        record.target(),
        record.args()
    ))
}
