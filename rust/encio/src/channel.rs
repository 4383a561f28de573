//! The I/O boundaries whose encoding is resolved independently.

use std::fmt::{self, Display, Formatter};

/// One I/O boundary with its own effective encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Values passed on the command line: input text, paths, and the subprocess command.
    CmdArg = 0,
    /// Paths handed to the operating system.
    FileSystem = 1,
    /// Content of the input file.
    InputFile = 2,
    /// Content of the output file.
    OutputFile = 3,
    /// Program and arguments of the subprocess.
    SubprocCmd = 4,
    /// Data written to the subprocess standard input.
    SubprocStdin = 5,
    /// Data read from the subprocess standard output.
    SubprocStdout = 6,
    /// Data read from the subprocess standard error.
    SubprocStderr = 7,
    /// Standard input of this process.
    Stdin = 8,
    /// Standard output of this process.
    Stdout = 9,
    /// Standard error of this process.
    Stderr = 10,
}

impl Channel {
    /// Every channel, in resolution order.
    pub const ALL: [Channel; 11] = [
        Channel::CmdArg,
        Channel::FileSystem,
        Channel::InputFile,
        Channel::OutputFile,
        Channel::SubprocCmd,
        Channel::SubprocStdin,
        Channel::SubprocStdout,
        Channel::SubprocStderr,
        Channel::Stdin,
        Channel::Stdout,
        Channel::Stderr,
    ];

    /// The command-line flag that overrides the channel's encoding.
    pub const fn flag(&self) -> &'static str {
        match self {
            Channel::CmdArg => "--cae",
            Channel::FileSystem => "--fse",
            Channel::InputFile => "--ife",
            Channel::OutputFile => "--ofe",
            Channel::SubprocCmd => "--spce",
            Channel::SubprocStdin => "--spie",
            Channel::SubprocStdout => "--spoe",
            Channel::SubprocStderr => "--spee",
            Channel::Stdin => "--stdie",
            Channel::Stdout => "--stdoe",
            Channel::Stderr => "--stdee",
        }
    }

    /// The environment variable that overrides the channel's encoding when no flag
    /// is given.
    pub const fn env_var(&self) -> &'static str {
        match self {
            Channel::CmdArg => "ENCIO_CAE",
            Channel::FileSystem => "ENCIO_FSE",
            Channel::InputFile => "ENCIO_IFE",
            Channel::OutputFile => "ENCIO_OFE",
            Channel::SubprocCmd => "ENCIO_SPCE",
            Channel::SubprocStdin => "ENCIO_SPIE",
            Channel::SubprocStdout => "ENCIO_SPOE",
            Channel::SubprocStderr => "ENCIO_SPEE",
            Channel::Stdin => "ENCIO_STDIE",
            Channel::Stdout => "ENCIO_STDOE",
            Channel::Stderr => "ENCIO_STDEE",
        }
    }

    /// A human-readable description for diagnostics.
    pub const fn description(&self) -> &'static str {
        match self {
            Channel::CmdArg => "command argument",
            Channel::FileSystem => "file system",
            Channel::InputFile => "input file",
            Channel::OutputFile => "output file",
            Channel::SubprocCmd => "subprocess command",
            Channel::SubprocStdin => "subprocess stdin",
            Channel::SubprocStdout => "subprocess stdout",
            Channel::SubprocStderr => "subprocess stderr",
            Channel::Stdin => "stdin",
            Channel::Stdout => "stdout",
            Channel::Stderr => "stderr",
        }
    }

    /// Whether the channel is one of this process's standard streams, which share the
    /// `--stdioe` flag and `ENCIO_IOENCODING` variable.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Channel::Stdin | Channel::Stdout | Channel::Stderr)
    }

    /// Whether the locale codeset is consulted before falling back to UTF-8. File
    /// content and subprocess channels default straight to UTF-8.
    pub const fn uses_platform_default(&self) -> bool {
        matches!(self, Channel::CmdArg | Channel::FileSystem) || self.is_terminal()
    }

    pub(crate) const fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
