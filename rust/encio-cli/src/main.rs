use std::process;

use clap::Parser;
use encio::{Channel, Codec, EncodingSettings};
use encio_cli::{
    failure::write_stderr_lossy, info::encoding_info, logging, pipeline, Args, ExitCode, Failure,
};

fn main() -> process::ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::Usage.into()
            } else {
                ExitCode::Ok.into()
            };
        }
    };
    logging::init(args.debug);
    let settings = match EncodingSettings::from_env(&args.overrides()) {
        Ok(settings) => settings,
        Err(e) => {
            // the stderr encoding itself may be the one that failed
            let failure = Failure::new(ExitCode::InitEncoding, &e)
                .with_hint("run with --help to list the encoding flags")
                .with_source(e);
            failure.report(Codec::utf_8(), args.debug);
            return failure.code.into();
        }
    };
    let stderr_codec = settings.codec(Channel::Stderr);
    logging::set_stderr_codec(stderr_codec);
    if args.show_encoding_info {
        let io_encoding = std::env::var(encio::resolve::IO_ENCODING_ENV).ok();
        write_stderr_lossy(
            stderr_codec,
            &encoding_info(&settings, io_encoding.as_deref()),
        );
    }
    match pipeline::run(&args, &settings) {
        Ok(()) => ExitCode::Ok.into(),
        Err(failure) => {
            log::debug!("Exiting with {:?}", failure.code);
            failure.report(stderr_codec, args.debug);
            failure.code.into()
        }
    }
}
