//! Exit codes and the diagnostics printed before exiting with one.

use std::{
    fmt::Display,
    io::{self, Write},
    process,
};

use encio::{Channel, Codec, EncodingSettings};
use num_enum::IntoPrimitive;

/// The process exit code, one per failure point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum ExitCode {
    Ok = 0,
    /// Bad or conflicting command-line flags.
    Usage = 1,
    /// An encoding flag or variable names no supported encoding.
    InitEncoding = 2,
    DecodeInputArg = 3,
    DecodeInputFilePath = 4,
    EncodeInputFilePath = 5,
    OpenInputFile = 6,
    ReadInputFile = 7,
    DecodeInputFile = 8,
    ReadStdin = 9,
    DecodeStdin = 10,
    DecodeSubprocCmd = 11,
    EncodeSubprocCmd = 12,
    EncodeSubprocInput = 13,
    /// The subprocess couldn't be spawned or waited on, or the command was empty.
    RunSubproc = 14,
    DecodeSubprocStderr = 15,
    EncodeSubprocStderr = 16,
    WriteSubprocStderr = 17,
    DecodeSubprocStdout = 18,
    DecodeOutputFilePath = 19,
    EncodeOutputFilePath = 20,
    EncodeOutputFile = 21,
    OpenOutputFile = 22,
    WriteOutputFile = 23,
    EncodeStdout = 24,
    WriteStdout = 25,
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(u8::from(code))
    }
}

/// A failure at one step of the control path, with everything needed to report it.
#[derive(Debug)]
pub struct Failure {
    pub code: ExitCode,
    pub message: String,
    pub hints: Vec<String>,
    /// The underlying error, printed only in debug mode.
    pub source: Option<anyhow::Error>,
}

impl Failure {
    pub fn new(code: ExitCode, message: impl ToString) -> Self {
        Self {
            code,
            message: message.to_string(),
            hints: Vec::new(),
            source: None,
        }
    }

    /// A failure to decode `what` with the encoding of `channel`.
    pub fn decode(
        code: ExitCode,
        channel: Channel,
        settings: &EncodingSettings,
        what: impl Display,
        source: encio::Error,
    ) -> Self {
        Self::codec(code, "decode", channel, settings, what, source)
    }

    /// A failure to encode `what` with the encoding of `channel`.
    pub fn encode(
        code: ExitCode,
        channel: Channel,
        settings: &EncodingSettings,
        what: impl Display,
        source: encio::Error,
    ) -> Self {
        Self::codec(code, "encode", channel, settings, what, source)
    }

    fn codec(
        code: ExitCode,
        verb: &str,
        channel: Channel,
        settings: &EncodingSettings,
        what: impl Display,
        source: encio::Error,
    ) -> Self {
        let failure = Self::new(
            code,
            format!("failed to {verb} {what} as {}", settings.codec(channel)),
        );
        let failure = if source.is_codec_error() {
            failure.with_channel_hints(channel, settings)
        } else {
            failure
        };
        failure.with_source(source)
    }

    /// A failure to `what`, e.g. "open input file 'in.txt'".
    pub fn io(code: ExitCode, what: impl Display, source: io::Error) -> Self {
        Self::new(code, format!("failed to {what}: {source}")).with_source(source)
    }

    pub fn with_hint(mut self, hint: impl ToString) -> Self {
        self.hints.push(hint.to_string());
        self
    }

    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn with_channel_hints(self, channel: Channel, settings: &EncodingSettings) -> Self {
        let failure = self.with_hint(format!(
            "pass {} to choose a different {channel} encoding",
            channel.flag()
        ));
        match settings.alternate(channel) {
            Some(alternate) => failure.with_hint(format!("try `{} {alternate}`", channel.flag())),
            None => failure,
        }
    }

    /// Renders the report, including the full error chain when `debug` is set.
    pub fn render(&self, debug: bool) -> String {
        let mut report = format!("error: {}\n", self.message);
        for hint in &self.hints {
            report.push_str(&format!("hint: {hint}\n"));
        }
        if debug {
            if let Some(source) = &self.source {
                report.push_str(&format!("debug: {source:?}\n"));
            }
        }
        report
    }

    /// Writes the report to standard error. Never fails.
    pub fn report(&self, stderr_codec: Codec, debug: bool) {
        write_stderr_lossy(stderr_codec, &self.render(debug));
    }
}

/// Writes a diagnostic to standard error, replacing characters `codec` can't
/// represent. Write errors are ignored since there's nowhere left to report them.
pub fn write_stderr_lossy(codec: Codec, text: &str) {
    let mut stderr = io::stderr().lock();
    let _ = stderr
        .write_all(&codec.encode_lossy(text))
        .and_then(|()| stderr.flush());
}
