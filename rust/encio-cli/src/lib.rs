use std::ffi::OsString;

use clap::{ArgAction, Parser};
use encio::{EscapePolicy, Overrides};

pub mod failure;
pub mod info;
pub mod logging;
pub mod pipeline;

pub use failure::{ExitCode, Failure};

#[derive(Debug, Parser)]
#[clap(name = "encio", version, about)]
#[cfg_attr(test, derive(Default))]
pub struct Args {
    #[clap(
        long = "debug",
        action = ArgAction::SetTrue,
        default_value = "false",
        help = "Show debugging info, including the full detail of any failure"
    )]
    pub debug: bool,
    #[clap(
        long = "ei",
        action = ArgAction::SetTrue,
        default_value = "false",
        help = "Show encoding info on standard error before processing"
    )]
    pub show_encoding_info: bool,
    #[clap(
        long = "ia",
        value_name = "INPUT_ARG",
        group = "input",
        value_parser = clap::value_parser!(OsString),
        help = "Use INPUT_ARG as the input text, decoded with the command-argument encoding. If neither --ia nor --if is given, the input is read from standard input"
    )]
    pub input_arg: Option<OsString>,
    #[clap(
        long = "if",
        value_name = "INPUT_FILE",
        group = "input",
        value_parser = clap::value_parser!(OsString),
        help = "Read the input text from INPUT_FILE, decoded with the input-file encoding"
    )]
    pub input_file: Option<OsString>,
    #[clap(
        long = "of",
        value_name = "OUTPUT_FILE",
        value_parser = clap::value_parser!(OsString),
        help = "Save the result to OUTPUT_FILE, encoded with the output-file encoding. If no path is specified, the result is written to standard output"
    )]
    pub output_file: Option<OsString>,
    #[clap(
        long = "ofnte",
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "escape",
        requires = "output_file",
        help = "Remove characters that are invalid in file names from the output file name"
    )]
    pub escape_to_empty: bool,
    #[clap(
        long = "ofnts",
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "escape",
        requires = "output_file",
        help = "Replace characters that are invalid in file names with spaces in the output file name"
    )]
    pub escape_to_space: bool,
    #[clap(
        long = "ofntn",
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "escape",
        requires = "output_file",
        help = "Replace characters that are invalid in file names with %XX notation in the output file name"
    )]
    pub escape_to_notation: bool,
    #[clap(
        long = "sp",
        value_name = "CMD",
        value_parser = clap::value_parser!(OsString),
        help = "Pipe the input text through CMD and use its standard output as the result. CMD is run directly, without a shell"
    )]
    pub subproc_cmd: Option<OsString>,
    #[clap(
        long = "spsep",
        value_name = "SEP",
        requires = "subproc_cmd",
        help = "Split CMD into program and arguments on SEP instead of on whitespace"
    )]
    pub subproc_cmd_sep: Option<String>,
    // Encoding overrides
    #[clap(
        long = "cae",
        value_name = "ENCODING",
        help = "Command-argument encoding. By default the locale codeset"
    )]
    pub cae: Option<String>,
    #[clap(
        long = "fse",
        value_name = "ENCODING",
        help = "File-system encoding. By default the locale codeset"
    )]
    pub fse: Option<String>,
    #[clap(
        long = "ife",
        value_name = "ENCODING",
        help = "Input-file encoding. By default UTF-8"
    )]
    pub ife: Option<String>,
    #[clap(
        long = "ofe",
        value_name = "ENCODING",
        help = "Output-file encoding. By default UTF-8"
    )]
    pub ofe: Option<String>,
    #[clap(
        long = "spce",
        value_name = "ENCODING",
        help = "Subprocess command encoding. By default UTF-8"
    )]
    pub spce: Option<String>,
    #[clap(
        long = "spie",
        value_name = "ENCODING",
        help = "Subprocess stdin encoding. By default UTF-8"
    )]
    pub spie: Option<String>,
    #[clap(
        long = "spoe",
        value_name = "ENCODING",
        help = "Subprocess stdout encoding. By default UTF-8"
    )]
    pub spoe: Option<String>,
    #[clap(
        long = "spee",
        value_name = "ENCODING",
        help = "Subprocess stderr encoding. By default UTF-8"
    )]
    pub spee: Option<String>,
    #[clap(
        long = "stdioe",
        value_name = "ENCODING",
        help = "Encoding of stdin, stdout, and stderr. Overrides the ENCIO_IOENCODING environment variable"
    )]
    pub stdioe: Option<String>,
    #[clap(
        long = "stdie",
        value_name = "ENCODING",
        help = "Stdin encoding. Overrides --stdioe and ENCIO_IOENCODING"
    )]
    pub stdie: Option<String>,
    #[clap(
        long = "stdoe",
        value_name = "ENCODING",
        help = "Stdout encoding. Overrides --stdioe and ENCIO_IOENCODING"
    )]
    pub stdoe: Option<String>,
    #[clap(
        long = "stdee",
        value_name = "ENCODING",
        help = "Stderr encoding. Overrides --stdioe and ENCIO_IOENCODING"
    )]
    pub stdee: Option<String>,
}

impl Args {
    /// Consolidates the escape flag booleans into a single optional policy.
    pub fn escape_policy(&self) -> Option<EscapePolicy> {
        if self.escape_to_empty {
            Some(EscapePolicy::Remove)
        } else if self.escape_to_space {
            Some(EscapePolicy::Space)
        } else if self.escape_to_notation {
            Some(EscapePolicy::Notation)
        } else {
            None
        }
    }

    /// Collects the explicit encoding flags.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            cae: self.cae.clone(),
            fse: self.fse.clone(),
            ife: self.ife.clone(),
            ofe: self.ofe.clone(),
            spce: self.spce.clone(),
            spie: self.spie.clone(),
            spoe: self.spoe.clone(),
            spee: self.spee.clone(),
            stdioe: self.stdioe.clone(),
            stdie: self.stdie.clone(),
            stdoe: self.stdoe.clone(),
            stdee: self.stdee.clone(),
        }
    }
}
