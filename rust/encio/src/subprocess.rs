//! Running an external command with the payload as its standard input.

use std::{
    ffi::OsString,
    io::{self, Write},
    process::{Command, ExitStatus, Stdio},
    thread,
};

use crate::{os::encode_os_string, Codec, Error, Result};

/// A command line split into a program and its arguments, still as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    parts: Vec<String>,
}

impl CommandLine {
    /// Splits `command` on `separator`, or on whitespace when `separator` is `None`
    /// or empty. Empty parts are dropped.
    ///
    /// # Errors
    /// This function returns an error if `command` contains no program.
    pub fn parse(command: &str, separator: Option<&str>) -> Result<Self> {
        let parts: Vec<String> = match separator.filter(|sep| !sep.is_empty()) {
            Some(sep) => command
                .split(sep)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect(),
            None => command.split_whitespace().map(str::to_owned).collect(),
        };
        if parts.is_empty() {
            return Err(Error::bad_arg("command", "no program to run"));
        }
        Ok(Self { parts })
    }

    /// The program to run.
    pub fn program(&self) -> &str {
        &self.parts[0]
    }

    /// The arguments passed to the program.
    pub fn args(&self) -> &[String] {
        &self.parts[1..]
    }

    /// Encodes the program and arguments with `codec`.
    ///
    /// # Errors
    /// This function returns an error if any part can't be represented in `codec`.
    pub fn encode(&self, codec: Codec) -> Result<EncodedCommand> {
        let mut parts = self
            .parts
            .iter()
            .map(|part| encode_os_string(codec, part))
            .collect::<Result<Vec<_>>>()?;
        let args = parts.split_off(1);
        Ok(EncodedCommand {
            program: parts.remove(0),
            args,
        })
    }
}

/// A command whose program and arguments are ready to hand to the operating system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCommand {
    program: OsString,
    args: Vec<OsString>,
}

/// The raw result of running an [`EncodedCommand`].
#[derive(Clone, Debug)]
pub struct Output {
    /// The exit status of the child.
    pub status: ExitStatus,
    /// Everything the child wrote to its standard output.
    pub stdout: Vec<u8>,
    /// Everything the child wrote to its standard error.
    pub stderr: Vec<u8>,
}

impl EncodedCommand {
    /// Runs the program directly, without a shell, writing `input` to its standard
    /// input and collecting its standard output and error. Blocks until the child
    /// exits.
    ///
    /// A child that exits without reading all of `input` isn't an error.
    ///
    /// # Errors
    /// This function returns an error if the child can't be spawned or waited on, or
    /// if writing its standard input fails for a reason other than a closed pipe.
    pub fn run(&self, input: &[u8]) -> Result<Output> {
        let program = self.program.to_string_lossy();
        log::debug!(
            "Spawning '{program}' with {} argument(s) and {} byte(s) of input",
            self.args.len(),
            input.len()
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::io(e, format!("spawning '{program}'")))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::bad_arg("stdin", "child stdin wasn't piped"))?;
        // feed stdin from a second thread so a chatty child can't deadlock on a full pipe
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input));
            let output = child.wait_with_output();
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    log::debug!("'{program}' exited before reading all of its input");
                }
                Ok(Err(e)) => return Err(Error::io(e, format!("writing stdin of '{program}'"))),
                Err(panic) => std::panic::resume_unwind(panic),
            }
            output.map_err(|e| Error::io(e, format!("waiting for '{program}'")))
        })?;
        log::debug!(
            "'{program}' exited with {} and wrote {} byte(s) to stdout, {} to stderr",
            output.status,
            output.stdout.len(),
            output.stderr.len()
        );
        Ok(Output {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
