use crate::catalog::{Implementation, AUTOPICK};
use color_eyre::eyre::{bail, Error};
use std::ffi::OsString;

/// What the command line asks rubyexec to do.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation<'a> {
    /// `-h` or `--help` came first.
    Help,
    /// No preference list was given.
    MissingSpec,
    Run { spec: &'a OsString },
}

impl<'a> Invocation<'a> {
    pub fn parse(argv: &'a [OsString]) -> Self {
        let Some(spec) = argv.get(1) else {
            return Invocation::MissingSpec;
        };
        if spec == "-h" || spec == "--help" {
            return Invocation::Help;
        }
        Invocation::Run { spec }
    }
}

/// The implementations a script declared support for, in the order it
/// prefers them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Preferences {
    pub implementations: Vec<Implementation>,
    pub autopick: bool,
}

impl Preferences {
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let mut prefs = Preferences::default();
        for token in spec.split(',').filter(|t| !t.is_empty()) {
            if token == AUTOPICK {
                prefs.autopick = true;
            } else if let Some(implementation) = Implementation::lookup(token) {
                if !prefs.contains(implementation) {
                    prefs.implementations.push(implementation);
                }
            }
        }
        if prefs.implementations.is_empty() {
            bail!("no valid implementations found");
        }
        Ok(prefs)
    }

    pub fn contains(&self, implementation: Implementation) -> bool {
        self.implementations.contains(&implementation)
    }

    /// Whether `name` is a catalog name this script accepts.
    pub fn accepts(&self, name: &str) -> bool {
        Implementation::lookup(name).is_some_and(|i| self.contains(i))
    }
}

#[test]
fn test_invocation() {
    let argv = |args: &[&str]| args.iter().map(OsString::from).collect::<Vec<_>>();

    assert_eq!(Invocation::parse(&argv(&[])), Invocation::MissingSpec);
    assert_eq!(Invocation::parse(&argv(&["rubyexec"])), Invocation::MissingSpec);
    assert_eq!(Invocation::parse(&argv(&["rubyexec", "-h"])), Invocation::Help);
    assert_eq!(
        Invocation::parse(&argv(&["rubyexec", "--help", "ruby27"])),
        Invocation::Help
    );

    let args = argv(&["rubyexec", "ruby27", "-h"]);
    assert_eq!(
        Invocation::parse(&args),
        Invocation::Run { spec: &args[1] }
    );
}

#[test]
fn test_dedup_keeps_first_seen_order() {
    use Implementation::*;

    let prefs = Preferences::parse("ruby31,ruby31,ruby27,ruby31").unwrap();
    assert_eq!(prefs.implementations, vec![Ruby31, Ruby27]);
    assert!(!prefs.autopick);
}

#[test]
fn test_autopick_interleaved() {
    use Implementation::*;

    let prefs = Preferences::parse("ruby27,--autopick,ruby30").unwrap();
    assert_eq!(prefs.implementations, vec![Ruby27, Ruby30]);
    assert!(prefs.autopick);
}

#[test]
fn test_unknown_and_empty_tokens_are_dropped() {
    use Implementation::*;

    let prefs = Preferences::parse(",,python3,jruby,,RBX,rbx,").unwrap();
    assert_eq!(prefs.implementations, vec![Jruby, Rbx]);
    assert!(prefs.accepts("rbx"));
    assert!(!prefs.accepts("ruby27"));
    assert!(!prefs.accepts("python3"));
}

#[test]
fn test_no_valid_implementations() {
    for spec in ["", ",", "python3,perl", "--autopick", "ruby,--autopick"] {
        let err = Preferences::parse(spec).unwrap_err();
        assert_eq!(err.to_string(), "no valid implementations found");
    }
}
