use color_eyre::eyre::Error;
use std::convert::Infallible;
use std::ffi::{OsStr, OsString};
use tracing::debug;
use tracing::subscriber::DefaultGuard;

pub mod args;
pub mod catalog;
pub mod launch;
pub mod resolve;
pub mod select;

use args::Preferences;
use resolve::{Layout, Resolved};

/// Environment variable holding the syslog level filter, e.g. `debug`.
pub const LOG_ENV: &str = "RUBYEXEC_LOG";

/// Sends events to syslog. Returns `None` when syslog is unreachable.
pub fn init_logging() -> Option<DefaultGuard> {
    use tracing::level_filters::LevelFilter;
    use tracing_rfc_5424::{
        rfc3164::Rfc3164, tracing::TrivialTracingFormatter, transport::UnixSocket,
    };
    use tracing_subscriber::Registry;
    use tracing_subscriber::{
        layer::SubscriberExt, // Needed to get `with()`
    };

    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::WARN);
    let syslog = tracing_rfc_5424::layer::Layer::<
        tracing_subscriber::Registry,
        Rfc3164,
        TrivialTracingFormatter,
        UnixSocket,
    >::try_default()
    .ok()?;
    let subscriber = Registry::default().with(syslog).with(level);
    Some(tracing::subscriber::set_default(subscriber))
}

/// Execs the best runtime for the preference list `spec`, forwarding
/// `argv[2..]`. Only returns if something went wrong.
pub fn run(spec: &OsStr, argv: &[OsString], layout: &Layout) -> Result<Infallible, Error> {
    let prefs = Preferences::parse(&spec.to_string_lossy())?;
    debug!("preferences: {prefs:?}");
    let resolved = Resolved::resolve(layout)?;
    let path = select::select(&prefs, &resolved, select::exists)?;
    let argv = launch::build_argv(&path, argv)?;
    debug!("executing {} with {} arguments", path.display(), argv.len() - 1);
    launch::launch(&path, &argv)
}

#[test]
fn test_run_rejects_spec_before_resolving() {
    let layout = Layout {
        self_exe: "/nonexistent/rubyexec".into(),
        default_link: "ruby".into(),
    };
    let argv = ["rubyexec", "perl,python"].map(OsString::from);
    let err = run(&argv[1], &argv, &layout).unwrap_err();
    assert_eq!(err.to_string(), "no valid implementations found");
}

#[test]
fn test_run_unsupported_default() {
    use std::os::unix::fs::symlink;

    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("rubyexec"), "").unwrap();
    symlink(tmp.path().join("rubyexec"), tmp.path().join("self")).unwrap();
    symlink("ruby32", tmp.path().join("ruby")).unwrap();
    std::fs::write(tmp.path().join("ruby27"), "").unwrap();

    let layout = Layout {
        self_exe: tmp.path().join("self"),
        default_link: "ruby".into(),
    };
    let argv = ["rubyexec", "ruby27", "script.rb"].map(OsString::from);
    let err = run(&argv[1], &argv, &layout).unwrap_err();
    assert_eq!(
        err.to_string(),
        "script does not support currently selected implementation (ruby32)"
    );
}
