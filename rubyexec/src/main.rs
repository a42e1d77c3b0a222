use rubyexec::args::Invocation;
use rubyexec::resolve::Layout;
use rubyexec::{init_logging, run};
use std::process::ExitCode;
use tracing::error;

pub fn main() -> ExitCode {
    let argv = std::env::args_os().collect::<Vec<_>>();
    let spec = match Invocation::parse(&argv) {
        Invocation::Help => {
            eprintln!(
                "rubyexec: usage: {} impl,...[,--autopick] [args]",
                argv.first()
                    .map(|s| s.to_string_lossy())
                    .unwrap_or("rubyexec".into())
            );
            return ExitCode::from(2);
        }
        Invocation::MissingSpec => {
            eprintln!("rubyexec: invalid number of arguments");
            return ExitCode::from(2);
        }
        Invocation::Run { spec } => spec,
    };

    let _logging_guard = init_logging();
    let err = match run(spec, &argv, &Layout::default()) {
        Ok(never) => match never {},
        Err(err) => err,
    };
    error!("{err}");
    eprintln!("rubyexec: {err}");
    ExitCode::from(1)
}
