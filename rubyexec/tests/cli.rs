use std::fs;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_rubyexec");

/// A directory holding a private rubyexec next to its `ruby` link.
struct Install {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Install {
    fn new(default: &str) -> Self {
        let dir = tempfile::tempdir_in(env!("CARGO_TARGET_TMPDIR")).unwrap();
        // /proc/self/exe reports the canonical path.
        let root = dir.path().canonicalize().unwrap();
        let exe = root.join("rubyexec");
        if fs::hard_link(BIN, &exe).is_err() {
            fs::copy(BIN, &exe).unwrap();
        }
        symlink(default, root.join("ruby")).unwrap();
        Install { _dir: dir, root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Installs a fake runtime that prints its argv one per line.
    fn runtime(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, "#!/bin/sh\nprintf '%s\\n' \"$0\" \"$@\"\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        rubyexec(&self.path("rubyexec"), args)
    }
}

fn rubyexec(exe: &Path, args: &[&str]) -> Output {
    Command::new(exe).args(args).output().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.to_owned())
        .collect()
}

#[test]
fn test_help() {
    for flag in ["-h", "--help"] {
        let output = rubyexec(Path::new(BIN), &[flag, "ruby27"]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).starts_with("rubyexec: usage: "), "{}", stderr(&output));
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn test_missing_spec() {
    let output = rubyexec(Path::new(BIN), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr(&output), "rubyexec: invalid number of arguments\n");
}

#[test]
fn test_no_valid_implementations() {
    let install = Install::new("ruby27");
    install.runtime("ruby27");

    let output = install.run(&["python3,,perl,--autopick", "script.rb"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "rubyexec: no valid implementations found\n");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_exec_default() {
    let install = Install::new("ruby27");
    let ruby27 = install.runtime("ruby27");
    install.runtime("ruby30");

    let output = install.run(&["ruby30,ruby27", "script.rb", "two words", "--autopick"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout_lines(&output),
        [ruby27.display().to_string(), "script.rb".into(), "two words".into(), "--autopick".into()]
    );
}

#[test]
fn test_exec_absolute_default() {
    let install = Install::new("ruby27");
    let ruby27 = install.runtime("ruby27");
    fs::remove_file(install.path("ruby")).unwrap();
    symlink(&ruby27, install.path("ruby")).unwrap();

    let output = install.run(&["ruby27"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout_lines(&output), [ruby27.display().to_string()]);
}

#[test]
fn test_exec_autopick() {
    let install = Install::new("ruby32");
    install.runtime("ruby32");
    let ruby30 = install.runtime("ruby30");
    install.runtime("ruby27");

    let output = install.run(&["ruby26,--autopick,ruby30,ruby27", "-e", "puts 1"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout_lines(&output),
        [ruby30.display().to_string(), "-e".into(), "puts 1".into()]
    );
}

#[test]
fn test_unsupported_default() {
    let install = Install::new("ruby32");
    install.runtime("ruby32");
    install.runtime("ruby27");

    let output = install.run(&["ruby27", "script.rb"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "rubyexec: script does not support currently selected implementation (ruby32)\n"
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_no_usable_implementations() {
    let install = Install::new("ruby32");

    let output = install.run(&["ruby26,ruby27,--autopick"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "rubyexec: no usable implementations found\n");
}

#[test]
fn test_missing_default_link() {
    let install = Install::new("ruby27");
    fs::remove_file(install.path("ruby")).unwrap();

    let output = install.run(&["ruby27"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        format!(
            "rubyexec: failed to resolve {}: No such file or directory\n",
            install.path("ruby").display()
        )
    );
}

#[test]
fn test_exec_failure() {
    let install = Install::new("ruby27");
    let ruby27 = install.path("ruby27");
    fs::write(&ruby27, "").unwrap();

    let output = install.run(&["ruby27"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        format!(
            "rubyexec: {} failed to execute: Permission denied\n",
            ruby27.display()
        )
    );
}
