use crate::args::Preferences;
use crate::resolve::Resolved;
use color_eyre::eyre::{bail, Error};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Presence check used for autopick. Execute permission is not required.
pub fn exists(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::F_OK).is_ok()
}

/// Picks the runtime binary to launch.
///
/// The system default wins whenever the script accepts it. Otherwise, with
/// autopick, the first preference found on disk is used.
pub fn select(
    prefs: &Preferences,
    resolved: &Resolved,
    mut exists: impl FnMut(&Path) -> bool,
) -> Result<PathBuf, Error> {
    let selected = resolved.selected.as_deref();
    if selected.is_some_and(|name| prefs.accepts(name)) {
        return Ok(resolved.default_path());
    }

    if !prefs.autopick {
        bail!(
            "script does not support currently selected implementation ({})",
            selected.unwrap_or("unknown")
        );
    }

    for implementation in &prefs.implementations {
        let path = resolved.candidate(implementation.name());
        if exists(&path) {
            debug!("autopicked {}", path.display());
            return Ok(path);
        }
        debug!("{} is not installed", path.display());
    }
    bail!("no usable implementations found")
}

#[cfg(test)]
fn resolved(default_target: &str) -> Resolved {
    let default_target = PathBuf::from(default_target);
    Resolved {
        exe: "/usr/bin/rubyexec".into(),
        dir: "/usr/bin".into(),
        selected: default_target
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_owned()),
        default_target,
    }
}

#[test]
fn test_default_wins_without_probing() {
    let prefs = Preferences::parse("ruby27,ruby31,--autopick").unwrap();
    let mut probed = Vec::new();

    let path = select(&prefs, &resolved("ruby31"), |p| {
        probed.push(p.to_path_buf());
        true
    })
    .unwrap();
    assert_eq!(path, PathBuf::from("/usr/bin/ruby31"));
    assert!(probed.is_empty());

    let path = select(&prefs, &resolved("/opt/ruby27/bin/ruby27"), |_| false).unwrap();
    assert_eq!(path, PathBuf::from("/opt/ruby27/bin/ruby27"));
}

#[test]
fn test_unsupported_without_autopick() {
    let prefs = Preferences::parse("ruby27,ruby30").unwrap();
    let mut probed = 0;

    let err = select(&prefs, &resolved("ruby32"), |_| {
        probed += 1;
        true
    })
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "script does not support currently selected implementation (ruby32)"
    );
    assert_eq!(probed, 0);
}

#[test]
fn test_autopick_first_existing_in_order() {
    let prefs = Preferences::parse("--autopick,ruby26,ruby30,ruby27").unwrap();
    let mut probed = Vec::new();

    let path = select(&prefs, &resolved("ruby32"), |p| {
        probed.push(p.to_path_buf());
        p.ends_with("ruby30") || p.ends_with("ruby27")
    })
    .unwrap();
    assert_eq!(path, PathBuf::from("/usr/bin/ruby30"));
    assert_eq!(
        probed,
        vec![
            PathBuf::from("/usr/bin/ruby26"),
            PathBuf::from("/usr/bin/ruby30")
        ]
    );
}

#[test]
fn test_autopick_exhausted() {
    let prefs = Preferences::parse("ruby26,ruby27,--autopick").unwrap();
    let err = select(&prefs, &resolved("not-a-ruby"), |_| false).unwrap_err();
    assert_eq!(err.to_string(), "no usable implementations found");
}

#[test]
fn test_exists() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("ruby27");
    assert!(!exists(&file));
    std::fs::write(&file, "").unwrap();
    assert!(exists(&file));
}
