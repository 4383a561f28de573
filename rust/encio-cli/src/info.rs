use std::fmt::Write;

use encio::{resolve::IO_ENCODING_ENV, EncodingSettings};

/// Formats the encoding info shown with `--ei`. `io_encoding` is the value of
/// `ENCIO_IOENCODING`, if set.
pub fn encoding_info(settings: &EncodingSettings, io_encoding: Option<&str>) -> String {
    let mut info = String::from("platform:\n");
    match settings.locale() {
        Some(locale) => {
            let _ = writeln!(
                info,
                "  locale: {}={} (codeset: {})",
                locale.var,
                locale.name,
                locale.codeset().unwrap_or("none")
            );
        }
        None => info.push_str("  locale: not set\n"),
    }
    let _ = writeln!(
        info,
        "  {IO_ENCODING_ENV}: {}",
        io_encoding.unwrap_or("not set")
    );
    info.push_str("channels:\n");
    for (channel, resolved) in settings.iter() {
        let _ = writeln!(
            info,
            "  {:<8} {:<18} {:<12} ({})",
            channel.flag(),
            channel.description(),
            resolved.codec.name(),
            resolved.source
        );
    }
    info
}
