//! The linear control path: read the input, optionally filter it through a
//! subprocess, then write the result.

use std::{
    ffi::OsStr,
    fs::File,
    io::{self, Read, Write},
    path::PathBuf,
};

use encio::{
    os::{decode_os_str, encode_os_string},
    subprocess::CommandLine,
    Channel, EncodingSettings, EscapePolicy,
};

use crate::{Args, ExitCode, Failure};

const STDERR_BEGIN: &str = "--- subprocess stderr ---\n";
const STDERR_END: &str = "--- end of subprocess stderr ---\n";

/// Runs every step for `args`, stopping at the first failure.
pub fn run(args: &Args, settings: &EncodingSettings) -> Result<(), Failure> {
    let text = read_input(args, settings)?;
    let text = match &args.subproc_cmd {
        Some(command) => {
            run_subprocess(command, args.subproc_cmd_sep.as_deref(), &text, settings)?
        }
        None => text,
    };
    match &args.output_file {
        Some(path) => write_output_file(path, args.escape_policy(), &text, settings),
        None => write_stream(io::stdout().lock(), &text, settings),
    }
}

/// Obtains the input text from `--ia`, `--if`, or standard input.
pub fn read_input(args: &Args, settings: &EncodingSettings) -> Result<String, Failure> {
    if let Some(input_arg) = &args.input_arg {
        log::debug!("Reading input from the command line");
        decode_os_str(settings.codec(Channel::CmdArg), input_arg).map_err(|e| {
            Failure::decode(
                ExitCode::DecodeInputArg,
                Channel::CmdArg,
                settings,
                "the input argument",
                e,
            )
        })
    } else if let Some(path) = &args.input_file {
        read_file(path, settings)
    } else {
        log::debug!("Reading input from stdin");
        read_stream(io::stdin().lock(), settings)
    }
}

fn read_file(path: &OsStr, settings: &EncodingSettings) -> Result<String, Failure> {
    let path = decode_os_str(settings.codec(Channel::CmdArg), path).map_err(|e| {
        Failure::decode(
            ExitCode::DecodeInputFilePath,
            Channel::CmdArg,
            settings,
            format!("input file path '{}'", path.to_string_lossy()),
            e,
        )
    })?;
    let os_path = encode_os_string(settings.codec(Channel::FileSystem), &path).map_err(|e| {
        Failure::encode(
            ExitCode::EncodeInputFilePath,
            Channel::FileSystem,
            settings,
            format!("input file path '{path}'"),
            e,
        )
    })?;
    log::debug!("Reading input from '{path}'");
    let mut file = File::open(PathBuf::from(os_path)).map_err(|e| {
        Failure::io(
            ExitCode::OpenInputFile,
            format!("open input file '{path}'"),
            e,
        )
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| {
        Failure::io(
            ExitCode::ReadInputFile,
            format!("read input file '{path}'"),
            e,
        )
    })?;
    settings
        .codec(Channel::InputFile)
        .decode(&bytes)
        .map_err(|e| {
            Failure::decode(
                ExitCode::DecodeInputFile,
                Channel::InputFile,
                settings,
                format!("input file '{path}'"),
                e,
            )
        })
}

/// Reads all of `reader` and decodes it with the stdin encoding.
pub fn read_stream<R: Read>(mut reader: R, settings: &EncodingSettings) -> Result<String, Failure> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Failure::io(ExitCode::ReadStdin, "read stdin", e))?;
    log::debug!("Read {} byte(s) from stdin", bytes.len());
    settings.codec(Channel::Stdin).decode(&bytes).map_err(|e| {
        Failure::decode(ExitCode::DecodeStdin, Channel::Stdin, settings, "stdin", e)
    })
}

/// Pipes `text` through `command` and returns the decoded standard output of the
/// child. Anything the child writes to standard error is echoed to ours.
pub fn run_subprocess(
    command: &OsStr,
    separator: Option<&str>,
    text: &str,
    settings: &EncodingSettings,
) -> Result<String, Failure> {
    let command = decode_os_str(settings.codec(Channel::CmdArg), command).map_err(|e| {
        Failure::decode(
            ExitCode::DecodeSubprocCmd,
            Channel::CmdArg,
            settings,
            "the subprocess command",
            e,
        )
    })?;
    let command_line = CommandLine::parse(&command, separator).map_err(|e| {
        Failure::new(
            ExitCode::RunSubproc,
            format!("no program to run in subprocess command '{command}'"),
        )
        .with_source(e)
    })?;
    let encoded = command_line
        .encode(settings.codec(Channel::SubprocCmd))
        .map_err(|e| {
            Failure::encode(
                ExitCode::EncodeSubprocCmd,
                Channel::SubprocCmd,
                settings,
                format!("subprocess command '{command}'"),
                e,
            )
        })?;
    let input = settings
        .codec(Channel::SubprocStdin)
        .encode(text)
        .map_err(|e| {
            Failure::encode(
                ExitCode::EncodeSubprocInput,
                Channel::SubprocStdin,
                settings,
                "the subprocess input",
                e,
            )
        })?;
    let program = command_line.program();
    let output = encoded.run(&input).map_err(|e| {
        Failure::new(
            ExitCode::RunSubproc,
            format!("failed to run subprocess '{program}': {e}"),
        )
        .with_source(e)
    })?;
    if !output.status.success() {
        log::warn!("Subprocess '{program}' exited with {}", output.status);
    }
    let stderr_text = settings
        .codec(Channel::SubprocStderr)
        .decode(&output.stderr)
        .map_err(|e| {
            Failure::decode(
                ExitCode::DecodeSubprocStderr,
                Channel::SubprocStderr,
                settings,
                format!("stderr of subprocess '{program}'"),
                e,
            )
        })?;
    if !stderr_text.is_empty() {
        echo_stderr(io::stderr().lock(), &stderr_text, settings)?;
    }
    settings
        .codec(Channel::SubprocStdout)
        .decode(&output.stdout)
        .map_err(|e| {
            Failure::decode(
                ExitCode::DecodeSubprocStdout,
                Channel::SubprocStdout,
                settings,
                format!("stdout of subprocess '{program}'"),
                e,
            )
        })
}

/// Writes the child's standard error to `writer` inside a framed block, encoded
/// with the stderr encoding.
pub fn echo_stderr<W: Write>(
    mut writer: W,
    text: &str,
    settings: &EncodingSettings,
) -> Result<(), Failure> {
    let mut framed = String::with_capacity(STDERR_BEGIN.len() + text.len() + STDERR_END.len() + 1);
    framed.push_str(STDERR_BEGIN);
    framed.push_str(text);
    if !text.ends_with('\n') {
        framed.push('\n');
    }
    framed.push_str(STDERR_END);
    let bytes = settings.codec(Channel::Stderr).encode(&framed).map_err(|e| {
        Failure::encode(
            ExitCode::EncodeSubprocStderr,
            Channel::Stderr,
            settings,
            "the subprocess stderr",
            e,
        )
    })?;
    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| Failure::io(ExitCode::WriteSubprocStderr, "echo subprocess stderr", e))
}

/// Saves `text` to `path`, applying `escape_policy` to the file name. The text is
/// encoded before the file is opened so an encoding failure leaves any existing file
/// untouched.
pub fn write_output_file(
    path: &OsStr,
    escape_policy: Option<EscapePolicy>,
    text: &str,
    settings: &EncodingSettings,
) -> Result<(), Failure> {
    let path = decode_os_str(settings.codec(Channel::CmdArg), path).map_err(|e| {
        Failure::decode(
            ExitCode::DecodeOutputFilePath,
            Channel::CmdArg,
            settings,
            format!("output file path '{}'", path.to_string_lossy()),
            e,
        )
    })?;
    let path = match escape_policy {
        Some(policy) => {
            let escaped = policy.escape_path(&path);
            log::debug!("Escaped output file path '{path}' to '{escaped}' with {policy:?}");
            escaped
        }
        None => path,
    };
    let os_path = encode_os_string(settings.codec(Channel::FileSystem), &path).map_err(|e| {
        Failure::encode(
            ExitCode::EncodeOutputFilePath,
            Channel::FileSystem,
            settings,
            format!("output file path '{path}'"),
            e,
        )
    })?;
    let bytes = settings
        .codec(Channel::OutputFile)
        .encode(text)
        .map_err(|e| {
            Failure::encode(
                ExitCode::EncodeOutputFile,
                Channel::OutputFile,
                settings,
                "the result",
                e,
            )
        })?;
    log::debug!("Writing {} byte(s) to '{path}'", bytes.len());
    let mut file = File::create(PathBuf::from(os_path)).map_err(|e| {
        Failure::io(
            ExitCode::OpenOutputFile,
            format!("open output file '{path}'"),
            e,
        )
    })?;
    file.write_all(&bytes)
        .and_then(|()| file.flush())
        .map_err(|e| {
            Failure::io(
                ExitCode::WriteOutputFile,
                format!("write output file '{path}'"),
                e,
            )
        })
}

/// Encodes `text` with the stdout encoding and writes it to `writer`. A closed pipe
/// isn't a failure.
pub fn write_stream<W: Write>(
    mut writer: W,
    text: &str,
    settings: &EncodingSettings,
) -> Result<(), Failure> {
    let bytes = settings.codec(Channel::Stdout).encode(text).map_err(|e| {
        Failure::encode(
            ExitCode::EncodeStdout,
            Channel::Stdout,
            settings,
            "the result",
            e,
        )
    })?;
    log::debug!("Writing {} byte(s) to stdout", bytes.len());
    match writer.write_all(&bytes).and_then(|()| writer.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!("Stdout was closed early");
            Ok(())
        }
        Err(e) => Err(Failure::io(ExitCode::WriteStdout, "write stdout", e)),
    }
}
