use color_eyre::eyre::{eyre, Error};
use std::convert::Infallible;
use std::ffi::{CString, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

fn c_string(bytes: &[u8]) -> Result<CString, Error> {
    CString::new(bytes).map_err(|_| {
        eyre!(
            "argument {:?} contains a nul byte",
            String::from_utf8_lossy(bytes)
        )
    })
}

/// Argument vector for the runtime: `path` as argv[0], followed by
/// everything after rubyexec's own name and preference list.
pub fn build_argv(path: &Path, argv: &[OsString]) -> Result<Vec<CString>, Error> {
    std::iter::once(path.as_os_str())
        .chain(argv.iter().skip(2).map(|a| a.as_os_str()))
        .map(|a| c_string(a.as_bytes()))
        .collect()
}

/// Replaces this process with the runtime at `path`. Only returns on failure.
pub fn launch(path: &Path, argv: &[CString]) -> Result<Infallible, Error> {
    let program = c_string(path.as_os_str().as_bytes())?;
    nix::unistd::execv(&program, argv)
        .map_err(|errno| eyre!("{} failed to execute: {}", path.display(), errno.desc()))
}

#[test]
fn test_build_argv_drops_name_and_spec() {
    let argv = ["/usr/bin/rubyexec", "ruby27,--autopick", "script.rb", "--", "-x"]
        .map(OsString::from);
    let built = build_argv(Path::new("/usr/bin/ruby27"), &argv).unwrap();
    assert_eq!(
        built,
        ["/usr/bin/ruby27", "script.rb", "--", "-x"].map(|s| CString::new(s).unwrap())
    );
}

#[test]
fn test_build_argv_without_extra_args() {
    let argv = ["rubyexec", "ruby27"].map(OsString::from);
    let built = build_argv(Path::new("ruby27"), &argv).unwrap();
    assert_eq!(built, vec![CString::new("ruby27").unwrap()]);
}

#[test]
fn test_launch_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ruby27");
    std::fs::write(&path, "").unwrap();

    let argv = build_argv(&path, &[]).unwrap();
    let err = launch(&path, &argv).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("{} failed to execute: Permission denied", path.display())
    );
}
